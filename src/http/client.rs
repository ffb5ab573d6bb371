use std::time::Duration;

use reqwest::Client;

use crate::args::{DEFAULT_USER_AGENT, PositiveUsize};
use crate::error::HttpError;

/// Knobs for the shared client.
#[derive(Debug, Clone, Copy)]
pub struct ClientSettings {
    /// Per-request timeout covering connect, headers and body.
    pub timeout: Duration,
    /// Idle connections kept per host; matches the concurrency limit.
    pub pool_size: PositiveUsize,
}

/// Builds the one client shared by every fetch task.
///
/// # Errors
///
/// Returns [`HttpError::BuildClientFailed`] when reqwest cannot initialize
/// the TLS backend or connector.
pub fn build_client(settings: ClientSettings) -> Result<Client, HttpError> {
    Client::builder()
        .timeout(settings.timeout)
        .pool_max_idle_per_host(settings.pool_size.get())
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|err| HttpError::BuildClientFailed { source: err })
}
