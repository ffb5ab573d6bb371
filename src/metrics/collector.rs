use tokio::sync::mpsc;
use tracing::debug;

use crate::args::PositiveUsize;
use crate::error::MetricsError;

use super::summary::ResponseSummary;
use super::types::Outcome;

/// Drains exactly `expected` outcomes from `outcomes_rx` and folds them into a
/// sealed [`ResponseSummary`].
///
/// This loop is the only writer of the summary; outcomes are folded one at a
/// time in arrival order.
///
/// # Errors
///
/// Returns [`MetricsError::OutcomeStreamClosed`] when every sender is gone
/// before `expected` outcomes arrived.
pub async fn collect_outcomes(
    expected: PositiveUsize,
    outcomes_rx: &mut mpsc::Receiver<Outcome>,
) -> Result<ResponseSummary, MetricsError> {
    let mut summary = ResponseSummary::new(expected);

    while !summary.is_sealed() {
        let Some(outcome) = outcomes_rx.recv().await else {
            return Err(MetricsError::OutcomeStreamClosed {
                expected: expected.get(),
                received: summary.num_responses(),
            });
        };

        if let Outcome::Failure(failure) = &outcome {
            debug!(
                error = %failure.error,
                timed_out = failure.error.is_timeout(),
                elapsed = ?failure.timing.elapsed(),
                "Request failed"
            );
        }
        summary.record(outcome)?;
    }

    debug!(
        responses = summary.num_responses(),
        ok = summary.num_ok(),
        errors = summary.num_errors(),
        "Collected all outcomes"
    );
    Ok(summary)
}
