use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::time::Instant;
use url::Url;

use crate::error::FetchError;
use crate::metrics::{FailureInfo, Outcome, ResponseInfo, Timing};

/// The unit of work: a GET against `url`. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    url: Url,
}

impl FetchRequest {
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self { url }
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

/// Executes one request and classifies the result.
///
/// Implementations always produce an [`Outcome`]; faults are reported as
/// [`Outcome::Failure`], never as a panic or a missing value.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Outcome;
}

/// [`Fetcher`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Outcome {
        let prepared = match self.client.get(request.url().clone()).build() {
            Ok(prepared) => prepared,
            Err(err) => {
                let now = Instant::now();
                return failed(FetchError::BuildRequest { source: err }, now);
            }
        };

        let start = Instant::now();
        let response = match self.client.execute(prepared).await {
            Ok(response) => response,
            Err(err) => return failed(FetchError::from_send(err), start),
        };

        let status = response.status();
        let content_length = response.content_length();
        if let Err(err) = drain_response_body(response).await {
            return failed(FetchError::from_body(err), start);
        }

        Outcome::Success(ResponseInfo {
            status: status.to_string(),
            status_code: status.as_u16(),
            content_length,
            timing: Timing::new(start, Instant::now()),
        })
    }
}

fn failed(error: FetchError, start: Instant) -> Outcome {
    Outcome::Failure(FailureInfo {
        error,
        timing: Timing::new(start, Instant::now()),
    })
}

async fn drain_response_body(response: reqwest::Response) -> Result<(), reqwest::Error> {
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        chunk?;
    }
    Ok(())
}
