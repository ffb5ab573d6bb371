use std::net::SocketAddr;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveUsize, ThrashArgs};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments.
///
/// Values passed explicitly on the command line win over the file.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut ThrashArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "requests")
        && let Some(value) = config.requests
    {
        args.requests = ensure_positive_usize(value, "requests")?;
    }

    if !is_cli(matches, "concurrency")
        && let Some(value) = config.concurrency
    {
        args.concurrency = ensure_positive_usize(value, "concurrency")?;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = timeout
            .to_duration()
            .map_err(|err| AppError::config(ConfigError::InvalidTimeout { source: err }))?;
    }

    if !is_cli(matches, "histogram")
        && let Some(value) = config.histogram
    {
        args.histogram = value;
    }

    if !is_cli(matches, "buckets")
        && let Some(value) = config.buckets
    {
        args.buckets = ensure_positive_usize(value, "buckets")?;
    }

    if !is_cli(matches, "print_errors")
        && let Some(value) = config.print_errors
    {
        args.print_errors = value;
    }

    if !is_cli(matches, "profile")
        && let Some(value) = config.profile
    {
        args.profile = value;
    }

    if !is_cli(matches, "profile_addr")
        && let Some(value) = config.profile_addr.as_deref()
    {
        args.profile_addr = value.parse::<SocketAddr>().map_err(|err| {
            AppError::config(ConfigError::InvalidProfileAddr {
                value: value.to_owned(),
                source: err,
            })
        })?;
    }

    if !is_cli(matches, "no_progress")
        && let Some(value) = config.no_progress
    {
        args.no_progress = value;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_usize(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive { field, source: err })
    })
}
