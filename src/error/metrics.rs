use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Outcome stream closed after {received} of {expected} outcomes.")]
    OutcomeStreamClosed { expected: usize, received: usize },
    #[error("Summary is sealed after {expected} outcomes; refusing to record more.")]
    SummarySealed { expected: usize },
    #[error("Histogram error during {context}: {source}")]
    Histogram {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
