//! Outcome types, single-writer aggregation, and latency histograms.
mod buckets;
mod collector;
mod histogram;
mod summary;
mod types;


pub use buckets::{Histogram, HistogramBucket, build_histogram};
pub use collector::collect_outcomes;
pub use histogram::{LatencyHistogram, LatencyPercentiles};
pub use summary::ResponseSummary;
pub use types::{FailureInfo, Outcome, ResponseInfo, Timing};
