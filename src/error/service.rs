use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to bind debug endpoint on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode debug snapshot: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to read debug request: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write debug response: {source}")]
    Write {
        #[source]
        source: std::io::Error,
    },
}
