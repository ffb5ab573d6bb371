use std::time::Duration;

use tokio::time::Instant;

use crate::error::FetchError;

/// Wall-clock bounds of one request.
///
/// `end` is never earlier than `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    start: Instant,
    end: Instant,
}

impl Timing {
    #[must_use]
    pub fn new(start: Instant, end: Instant) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    #[must_use]
    pub const fn start(&self) -> Instant {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> Instant {
        self.end
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseInfo {
    /// Status line as sent by the server, e.g. `200 OK`.
    pub status: String,
    pub status_code: u16,
    /// Declared `Content-Length`; `None` when the server did not send one.
    pub content_length: Option<u64>,
    pub timing: Timing,
}

#[derive(Debug)]
pub struct FailureInfo {
    pub error: FetchError,
    pub timing: Timing,
}

/// Result of one dispatched request.
#[derive(Debug)]
pub enum Outcome {
    Success(ResponseInfo),
    Failure(FailureInfo),
}
