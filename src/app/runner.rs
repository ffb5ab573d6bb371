use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::args::{ThrashArgs, parse_target_url};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{
    ClientSettings, DispatchCounters, DispatchPlan, FetchRequest, HttpFetcher, build_client,
    dispatch,
};
use crate::metrics::{ResponseSummary, collect_outcomes};
use crate::shutdown::ShutdownSender;

use super::profiler::{DebugState, setup_debug_endpoint};
use super::progress::setup_progress_indicator;
use super::summary::header_lines;

pub(crate) struct RunOutcome {
    pub(crate) summary: ResponseSummary,
    /// Wall-clock time from the first dispatch to the last collected outcome.
    pub(crate) elapsed: Duration,
}

/// Validates the target before any client or task exists.
pub(crate) fn resolve_target(args: &ThrashArgs) -> AppResult<Url> {
    let raw = args
        .url
        .as_deref()
        .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
    parse_target_url(raw)
}

pub(crate) async fn run_local(args: &ThrashArgs) -> AppResult<RunOutcome> {
    let url = resolve_target(args)?;
    let plan = DispatchPlan {
        requests: args.requests,
        concurrency: args.concurrency,
    };
    let client = build_client(ClientSettings {
        timeout: args.request_timeout,
        pool_size: args.concurrency,
    })?;
    let fetcher = Arc::new(HttpFetcher::new(client));

    for line in header_lines(&url, plan.concurrency, plan.requests) {
        println!("{}", line);
    }

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let counters = Arc::new(DispatchCounters::default());
    let run_start = Instant::now();

    let debug_handle = if args.profile {
        let state = DebugState {
            requests: plan.requests,
            concurrency: plan.concurrency,
            counters: Arc::clone(&counters),
            run_start,
        };
        match setup_debug_endpoint(args.profile_addr, state, &shutdown_tx).await {
            Ok((_, handle)) => Some(handle),
            Err(err) => {
                warn!("Debug endpoint disabled: {}", err);
                None
            }
        }
    } else {
        None
    };

    let progress_handle = if args.no_progress || args.verbose {
        None
    } else {
        Some(setup_progress_indicator(
            Arc::clone(&counters),
            plan.requests,
            &shutdown_tx,
        ))
    };

    let mut stream = dispatch(fetcher, FetchRequest::new(url), plan, Arc::clone(&counters));
    let collected = collect_outcomes(plan.requests, stream.receiver_mut()).await;
    let elapsed = run_start.elapsed();

    stop_observers(&shutdown_tx);
    if let Some(handle) = progress_handle {
        handle.await?;
    }
    if let Some(handle) = debug_handle {
        handle.await?;
    }

    let summary = collected?;
    stream.join().await?;
    debug!(elapsed_ms = elapsed.as_millis(), "Run finished");

    Ok(RunOutcome { summary, elapsed })
}

fn stop_observers(shutdown_tx: &ShutdownSender) {
    // No receivers when both observers are off.
    drop(shutdown_tx.send(()));
}
