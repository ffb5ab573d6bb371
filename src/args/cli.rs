use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use super::defaults::{
    DEFAULT_BUCKETS, DEFAULT_CONCURRENCY, DEFAULT_PROFILE_ADDR, DEFAULT_REQUESTS, DEFAULT_TIMEOUT,
};
use super::parsers::{parse_duration_arg, parse_positive_usize};
use super::types::PositiveUsize;

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "thrash",
    version,
    about = "Fire N GET requests at a URL with bounded concurrency and report latency, throughput and a response time histogram."
)]
pub struct ThrashArgs {
    /// Target URL (http or https)
    #[arg(env = "THRASH_URL")]
    pub url: Option<String>,

    /// Total number of requests to send
    #[arg(
        long,
        short = 'n',
        env = "THRASH_REQUESTS",
        default_value = DEFAULT_REQUESTS,
        value_parser = parse_positive_usize
    )]
    pub requests: PositiveUsize,

    /// Maximum number of requests in flight at once
    #[arg(
        long,
        short = 'c',
        env = "THRASH_CONCURRENCY",
        default_value = DEFAULT_CONCURRENCY,
        value_parser = parse_positive_usize
    )]
    pub concurrency: PositiveUsize,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        short = 't',
        env = "THRASH_TIMEOUT",
        default_value = DEFAULT_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Print the response time histogram
    #[arg(long, short = 'H')]
    pub histogram: bool,

    /// Number of histogram buckets
    #[arg(long, default_value = DEFAULT_BUCKETS, value_parser = parse_positive_usize)]
    pub buckets: PositiveUsize,

    /// Print every request error after the summary
    #[arg(long = "print-errors", short = 'e')]
    pub print_errors: bool,

    /// Serve live run counters as JSON on the debug endpoint
    #[arg(long, short = 'p')]
    pub profile: bool,

    /// Listen address for the debug endpoint
    #[arg(long = "profile-addr", default_value = DEFAULT_PROFILE_ADDR)]
    pub profile_addr: SocketAddr,

    /// Disable the progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by THRASH_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Path to config file (TOML/JSON). Defaults to ./thrash.toml or ./thrash.json if present.
    #[arg(long)]
    pub config: Option<String>,
}
