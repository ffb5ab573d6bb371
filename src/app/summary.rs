use std::collections::BTreeMap;
use std::time::Duration;

use url::Url;

use crate::args::PositiveUsize;
use crate::metrics::{Histogram, ResponseSummary};

/// Fixed-point scale for two decimal places.
const PERCENT_DIVISOR: u128 = 100;
/// Nanoseconds per second, for throughput scaling.
const NS_PER_SEC: u128 = 1_000_000_000;

const NO_SUCCESS: &str = "n/a (no successful responses)";

/// What to print besides the always-on totals.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SummaryOptions {
    pub(crate) histogram: bool,
    pub(crate) buckets: PositiveUsize,
    pub(crate) print_errors: bool,
}

/// Sealed result of one run plus the context it was produced under.
pub(crate) struct RunReport<'run> {
    pub(crate) summary: &'run ResponseSummary,
    /// Wall-clock time from first dispatch to last outcome.
    pub(crate) elapsed: Duration,
}

/// Opening lines, printed before any request is sent.
pub(crate) fn header_lines(
    url: &Url,
    concurrency: PositiveUsize,
    requests: PositiveUsize,
) -> Vec<String> {
    vec![
        format!("Thrashing {}", url),
        format!(
            "Concurrency {} Num Requests {}",
            format_count(concurrency.get()),
            format_count(requests.get())
        ),
    ]
}

pub(crate) fn summary_lines(report: &RunReport<'_>, options: &SummaryOptions) -> Vec<String> {
    let summary = report.summary;
    let mut lines = Vec::new();

    let pct_ok = summary.pct_ok().unwrap_or(0);
    lines.push(format!(
        "Responses OK: {}% ({}/{}), Errors: {}",
        pct_ok,
        format_count(summary.num_ok()),
        format_count(summary.num_responses()),
        format_count(summary.num_errors())
    ));
    lines.push(format!(
        "Status Codes: {}",
        status_counts_json(summary.status_counts())
    ));
    lines.push(format!(
        "Bytes Transferred: {}",
        format_count(summary.bytes_transferred())
    ));
    lines.push(format!(
        "Avg Response Time: {}",
        format_optional(summary.avg_response_time())
    ));
    lines.push(format!(
        "Min Response Time: {}",
        format_optional(summary.min_response_time())
    ));
    lines.push(format!(
        "Max Response Time: {}",
        format_optional(summary.max_response_time())
    ));
    match summary.percentiles() {
        Some(percentiles) => lines.push(format!(
            "Latency p50/p90/p99: {:?} / {:?} / {:?}",
            percentiles.p50, percentiles.p90, percentiles.p99
        )),
        None => lines.push(format!("Latency p50/p90/p99: {}", NO_SUCCESS)),
    }
    lines.push(format!(
        "Throughput: {} req/s",
        format_rate(summary.num_responses(), report.elapsed)
    ));

    if options.histogram {
        match summary.histogram(options.buckets) {
            Some(histogram) => lines.extend(histogram_lines(&histogram)),
            None => lines.push(format!("Histogram: {}", NO_SUCCESS)),
        }
    }

    if options.print_errors {
        lines.extend(summary.errors().iter().map(ToString::to_string));
    }

    lines
}

pub(crate) fn print_summary(report: &RunReport<'_>, options: &SummaryOptions) {
    for line in summary_lines(report, options) {
        println!("{}", line);
    }
}

/// One line per bucket: `( 40%) ∎∎∎∎ [28ms - 46ms]`.
pub(crate) fn histogram_lines(histogram: &Histogram) -> Vec<String> {
    histogram
        .buckets()
        .iter()
        .map(|bucket| {
            let separator = if bucket.bar.is_empty() { "" } else { " " };
            format!(
                "({:3}%) {}{}[{:?} - {:?}]",
                bucket.percent, bucket.bar, separator, bucket.start, bucket.end
            )
        })
        .collect()
}

/// Groups digits in threes with commas, e.g. `1,234,567`.
pub(crate) fn format_count<T>(value: T) -> String
where
    T: ToString,
{
    let digits = value.to_string();
    let len = digits.len();
    let mut grouped = String::with_capacity(len.saturating_add(len.checked_div(3).unwrap_or(0)));
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && len.saturating_sub(index).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn format_optional(value: Option<Duration>) -> String {
    value.map_or_else(|| NO_SUCCESS.to_owned(), |duration| format!("{:?}", duration))
}

fn status_counts_json(counts: &BTreeMap<u16, u64>) -> String {
    let map: serde_json::Map<String, serde_json::Value> = counts
        .iter()
        .map(|(code, count)| (code.to_string(), serde_json::Value::from(*count)))
        .collect();
    serde_json::Value::Object(map).to_string()
}

/// Responses per second with two decimals, in integer arithmetic.
pub(super) fn format_rate(responses: usize, elapsed: Duration) -> String {
    let nanos = elapsed.as_nanos().max(1);
    let responses = u128::try_from(responses).unwrap_or(u128::MAX);
    let rate_x100 = responses
        .saturating_mul(NS_PER_SEC)
        .saturating_mul(PERCENT_DIVISOR)
        .checked_div(nanos)
        .unwrap_or(0);
    let whole = rate_x100.checked_div(PERCENT_DIVISOR).unwrap_or(0);
    let frac = rate_x100.checked_rem(PERCENT_DIVISOR).unwrap_or(0);
    format!("{}.{:02}", format_count(whole), frac)
}
