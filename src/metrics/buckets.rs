use std::time::Duration;

use crate::args::PositiveUsize;

/// One bar character per this many percent.
const PERCENT_PER_BRICK: u64 = 2;
const BRICK: &str = "∎";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramBucket {
    pub start: Duration,
    pub end: Duration,
    pub count: u64,
    /// Share of all samples in this bucket, truncated to a whole percent.
    pub percent: u64,
    pub bar: String,
}

/// Linear partition of `[min, max]` response times into equal-width buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    buckets: Vec<HistogramBucket>,
    total: u64,
}

impl Histogram {
    #[must_use]
    pub fn buckets(&self) -> &[HistogramBucket] {
        &self.buckets
    }

    /// Number of samples that were bucketed.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }
}

/// Buckets `samples` into `bucket_count` equal-width intervals over `[min, max]`.
///
/// Intervals are half-open except the last, which also holds `max`. When
/// `min == max` every sample lands in the first bucket. Returns `None` for an
/// empty sample set or an inverted range.
#[must_use]
pub fn build_histogram(
    samples: &[Duration],
    min: Duration,
    max: Duration,
    bucket_count: PositiveUsize,
) -> Option<Histogram> {
    if samples.is_empty() || max < min {
        return None;
    }

    let bucket_count = bucket_count.get();
    let buckets_u128 = u128::try_from(bucket_count).ok()?;
    let span = max.saturating_sub(min).as_nanos();
    let last_index = bucket_count.saturating_sub(1);

    let mut counts = vec![0u64; bucket_count];
    for sample in samples {
        let index = bucket_index(*sample, min, span, buckets_u128).min(last_index);
        if let Some(count) = counts.get_mut(index) {
            *count = count.saturating_add(1);
        }
    }

    let total = u64::try_from(samples.len()).unwrap_or(u64::MAX);
    let buckets = counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| {
            let index_u128 = u128::try_from(index).unwrap_or(u128::MAX);
            let start = offset(min, span, index_u128, buckets_u128);
            let end = offset(min, span, index_u128.saturating_add(1), buckets_u128);
            let percent = count.saturating_mul(100).checked_div(total).unwrap_or(0);
            let bricks = usize::try_from(percent.checked_div(PERCENT_PER_BRICK).unwrap_or(0))
                .unwrap_or(0);
            HistogramBucket {
                start,
                end,
                count,
                percent,
                bar: BRICK.repeat(bricks),
            }
        })
        .collect();

    Some(Histogram { buckets, total })
}

/// `floor((sample - min) / width)` with `width = span / buckets`, in integer
/// nanoseconds so the maximum sample cannot drift past the last bucket.
fn bucket_index(sample: Duration, min: Duration, span: u128, buckets: u128) -> usize {
    if span == 0 {
        return 0;
    }
    let distance = sample.saturating_sub(min).as_nanos();
    let index = distance
        .saturating_mul(buckets)
        .checked_div(span)
        .unwrap_or(0);
    usize::try_from(index).unwrap_or(usize::MAX)
}

fn offset(min: Duration, span: u128, step: u128, buckets: u128) -> Duration {
    let nanos = span
        .saturating_mul(step)
        .checked_div(buckets)
        .unwrap_or(0);
    min.saturating_add(Duration::from_nanos(
        u64::try_from(nanos).unwrap_or(u64::MAX),
    ))
}
