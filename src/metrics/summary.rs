use std::collections::BTreeMap;
use std::time::Duration;

use tracing::warn;

use crate::args::PositiveUsize;
use crate::error::{FetchError, MetricsError};

use super::buckets::{Histogram, build_histogram};
use super::histogram::{LatencyHistogram, LatencyPercentiles};
use super::types::{FailureInfo, Outcome, ResponseInfo};

/// Running totals for one run of `expected` requests.
///
/// Only the collector folds outcomes into it, one at a time. After the
/// `expected`-th outcome the summary is sealed and further records are
/// rejected, so `num_responses` never exceeds the request count.
#[derive(Debug)]
pub struct ResponseSummary {
    expected: usize,
    num_responses: usize,
    num_ok: usize,
    bytes_transferred: u64,
    sum_response_times: Duration,
    min_response_time: Option<Duration>,
    max_response_time: Option<Duration>,
    response_times: Vec<Duration>,
    status_counts: BTreeMap<u16, u64>,
    errors: Vec<FetchError>,
    latency: Option<LatencyHistogram>,
}

impl ResponseSummary {
    #[must_use]
    pub fn new(expected: PositiveUsize) -> Self {
        let latency = match LatencyHistogram::new() {
            Ok(histogram) => Some(histogram),
            Err(err) => {
                warn!("Failed to initialize latency histogram: {}", err);
                None
            }
        };

        Self {
            expected: expected.get(),
            num_responses: 0,
            num_ok: 0,
            bytes_transferred: 0,
            sum_response_times: Duration::ZERO,
            min_response_time: None,
            max_response_time: None,
            response_times: Vec::with_capacity(expected.get()),
            status_counts: BTreeMap::new(),
            errors: Vec::new(),
            latency,
        }
    }

    /// Folds one outcome into the totals.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::SummarySealed`] once all expected outcomes
    /// have been recorded.
    pub(crate) fn record(&mut self, outcome: Outcome) -> Result<(), MetricsError> {
        if self.is_sealed() {
            return Err(MetricsError::SummarySealed {
                expected: self.expected,
            });
        }

        self.num_responses = self.num_responses.saturating_add(1);
        match outcome {
            Outcome::Failure(failure) => self.record_failure(failure),
            Outcome::Success(response) => self.record_success(&response),
        }
        Ok(())
    }

    fn record_failure(&mut self, failure: FailureInfo) {
        self.errors.push(failure.error);
    }

    fn record_success(&mut self, response: &ResponseInfo) {
        self.num_ok = self.num_ok.saturating_add(1);

        let count = self.status_counts.entry(response.status_code).or_insert(0);
        *count = count.saturating_add(1);

        if let Some(length) = response.content_length {
            self.bytes_transferred = self.bytes_transferred.saturating_add(length);
        }

        let response_time = response.timing.elapsed();
        self.response_times.push(response_time);
        self.sum_response_times = self.sum_response_times.saturating_add(response_time);

        match self.min_response_time {
            Some(min) if response_time >= min => {}
            _ => self.min_response_time = Some(response_time),
        }
        match self.max_response_time {
            Some(max) if response_time <= max => {}
            _ => self.max_response_time = Some(response_time),
        }

        if let Some(latency) = self.latency.as_mut()
            && let Err(err) = latency.record(response_time)
        {
            warn!("Failed to record latency: {}", err);
        }
    }

    /// True once every expected outcome has been recorded.
    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        self.num_responses >= self.expected
    }

    #[must_use]
    pub const fn num_responses(&self) -> usize {
        self.num_responses
    }

    #[must_use]
    pub const fn num_ok(&self) -> usize {
        self.num_ok
    }

    #[must_use]
    pub fn num_errors(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub const fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    #[must_use]
    pub const fn min_response_time(&self) -> Option<Duration> {
        self.min_response_time
    }

    #[must_use]
    pub const fn max_response_time(&self) -> Option<Duration> {
        self.max_response_time
    }

    /// Response times of successful requests in arrival order.
    #[must_use]
    pub fn response_times(&self) -> &[Duration] {
        &self.response_times
    }

    #[must_use]
    pub const fn status_counts(&self) -> &BTreeMap<u16, u64> {
        &self.status_counts
    }

    #[must_use]
    pub fn errors(&self) -> &[FetchError] {
        &self.errors
    }

    /// Share of successful responses, truncated to a whole percent.
    ///
    /// `None` when nothing was recorded.
    #[must_use]
    pub fn pct_ok(&self) -> Option<u64> {
        let total = u128::try_from(self.num_responses).ok()?;
        let ok = u128::try_from(self.num_ok).ok()?;
        let pct = ok.saturating_mul(100).checked_div(total)?;
        u64::try_from(pct).ok()
    }

    /// Mean response time of successful requests.
    ///
    /// `None` when no request succeeded; failures never contribute timing.
    #[must_use]
    pub fn avg_response_time(&self) -> Option<Duration> {
        let num_ok = u128::try_from(self.num_ok).ok()?;
        let nanos = self.sum_response_times.as_nanos().checked_div(num_ok)?;
        Some(Duration::from_nanos(
            u64::try_from(nanos).unwrap_or(u64::MAX),
        ))
    }

    #[must_use]
    pub fn percentiles(&self) -> Option<LatencyPercentiles> {
        self.latency
            .as_ref()
            .and_then(LatencyHistogram::percentiles)
    }

    /// Buckets the successful response times between min and max.
    ///
    /// `None` when no request succeeded.
    #[must_use]
    pub fn histogram(&self, bucket_count: PositiveUsize) -> Option<Histogram> {
        if self.num_ok == 0 {
            return None;
        }
        let min = self.min_response_time?;
        let max = self.max_response_time?;
        build_histogram(&self.response_times, min, max, bucket_count)
    }
}
