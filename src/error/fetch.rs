use thiserror::Error;

/// Why a single request did not produce a usable response.
///
/// Carried inside a failed outcome; never aborts the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build request: {source}")]
    BuildRequest {
        #[source]
        source: reqwest::Error,
    },
    #[error("request timed out: {source}")]
    Timeout {
        #[source]
        source: reqwest::Error,
    },
    #[error("connection failed: {source}")]
    Connect {
        #[source]
        source: reqwest::Error,
    },
    #[error("request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read response body: {source}")]
    ReadBody {
        #[source]
        source: reqwest::Error,
    },
    #[cfg(test)]
    #[error("{message}")]
    Simulated { message: &'static str },
}

impl FetchError {
    /// Classifies an error returned while sending the request.
    #[must_use]
    pub fn from_send(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchError::Timeout { source }
        } else if source.is_connect() {
            FetchError::Connect { source }
        } else if source.is_builder() {
            FetchError::BuildRequest { source }
        } else {
            FetchError::Transport { source }
        }
    }

    /// Classifies an error returned while draining the response body.
    #[must_use]
    pub fn from_body(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchError::Timeout { source }
        } else {
            FetchError::ReadBody { source }
        }
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}
