use clap::ArgMatches;
use tracing::debug;

use crate::app::summary::{RunReport, SummaryOptions, print_summary};
use crate::app::{resolve_target, run_local};
use crate::args::ThrashArgs;
use crate::config::{apply_config, load_config};
use crate::error::AppResult;

/// Merges the config file into `args` and validates everything a run needs.
///
/// Nothing is sent until this succeeds.
pub(super) fn build_plan(mut args: ThrashArgs, matches: &ArgMatches) -> AppResult<ThrashArgs> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }
    let url = resolve_target(&args)?;
    debug!(
        url = %url,
        requests = args.requests.get(),
        concurrency = args.concurrency.get(),
        timeout = ?args.request_timeout,
        "Run planned"
    );
    Ok(args)
}

pub(super) async fn execute_plan(args: ThrashArgs) -> AppResult<()> {
    let outcome = run_local(&args).await?;

    let report = RunReport {
        summary: &outcome.summary,
        elapsed: outcome.elapsed,
    };
    let options = SummaryOptions {
        histogram: args.histogram,
        buckets: args.buckets,
        print_errors: args.print_errors,
    };
    print_summary(&report, &options);
    Ok(())
}
