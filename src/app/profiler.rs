use std::net::SocketAddr;
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::args::PositiveUsize;
use crate::error::ServiceError;
use crate::http::DispatchCounters;
use crate::shutdown::ShutdownSender;

const MAX_REQUEST_BYTES: usize = 8 * 1024;
const VARS_PATH: &str = "/debug/vars";

/// What the debug endpoint reports about the current run.
#[derive(Debug, Clone)]
pub(crate) struct DebugState {
    pub(crate) requests: PositiveUsize,
    pub(crate) concurrency: PositiveUsize,
    pub(crate) counters: Arc<DispatchCounters>,
    pub(crate) run_start: Instant,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct DebugSnapshot {
    pub(crate) requests: usize,
    pub(crate) concurrency: usize,
    pub(crate) launched: u64,
    pub(crate) completed: u64,
    pub(crate) in_flight: u64,
    pub(crate) elapsed_ms: u64,
}

impl DebugState {
    pub(crate) fn snapshot(&self) -> DebugSnapshot {
        DebugSnapshot {
            requests: self.requests.get(),
            concurrency: self.concurrency.get(),
            launched: self.counters.launched(),
            completed: self.counters.completed(),
            in_flight: self.counters.in_flight(),
            elapsed_ms: u64::try_from(self.run_start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Binds `addr` and serves `GET /debug/vars` until shutdown is broadcast.
///
/// Returns the bound address, which differs from `addr` when port 0 was
/// requested.
///
/// # Errors
///
/// Returns [`ServiceError::Bind`] when the address cannot be bound.
pub(crate) async fn setup_debug_endpoint(
    addr: SocketAddr,
    state: DebugState,
    shutdown_tx: &ShutdownSender,
) -> Result<(SocketAddr, JoinHandle<()>), ServiceError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| ServiceError::Bind { addr, source: err })?;
    let local_addr = listener
        .local_addr()
        .map_err(|err| ServiceError::Bind { addr, source: err })?;
    info!("Debug endpoint listening on http://{}{}", local_addr, VARS_PATH);

    let mut shutdown_rx = shutdown_tx.subscribe();
    let state = Arc::new(state);
    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                accept = listener.accept() => {
                    let (socket, peer) = match accept {
                        Ok(result) => result,
                        Err(err) => {
                            debug!("Debug endpoint accept failed: {}", err);
                            continue;
                        }
                    };
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(socket, &state).await {
                            debug!("Debug request from {} failed: {}", peer, err);
                        }
                    });
                }
            }
        }
    });

    Ok((local_addr, handle))
}

async fn handle_connection(mut socket: TcpStream, state: &DebugState) -> Result<(), ServiceError> {
    let Some((method, path)) = read_request_line(&mut socket).await? else {
        return write_error(&mut socket, 400, "malformed request").await;
    };

    if path != VARS_PATH {
        return write_error(&mut socket, 404, "not found").await;
    }
    if method != "GET" {
        return write_error(&mut socket, 405, "method not allowed").await;
    }

    let body = serde_json::to_vec(&state.snapshot())
        .map_err(|err| ServiceError::Serialize { source: err })?;
    write_response(&mut socket, 200, &body).await
}

/// Reads the request head and returns its method and path.
///
/// `None` when the head is empty, oversized, or not valid UTF-8.
async fn read_request_line(
    socket: &mut TcpStream,
) -> Result<Option<(String, String)>, ServiceError> {
    let mut buffer: Vec<u8> = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let bytes = socket
            .read(&mut chunk)
            .await
            .map_err(|err| ServiceError::Read { source: err })?;
        if bytes == 0 {
            return Ok(None);
        }
        let Some(read_slice) = chunk.get(..bytes) else {
            return Ok(None);
        };
        buffer.extend_from_slice(read_slice);
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
        if buffer.len() > MAX_REQUEST_BYTES {
            return Ok(None);
        }
    };

    let Some(head) = buffer.get(..header_end) else {
        return Ok(None);
    };
    let Ok(head) = std::str::from_utf8(head) else {
        return Ok(None);
    };
    let Some(request_line) = head.split("\r\n").next() else {
        return Ok(None);
    };
    let mut parts = request_line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => {
            let path = target.split_once('?').map_or(target, |(path, _)| path);
            Ok(Some((method.to_owned(), path.to_owned())))
        }
        _ => Ok(None),
    }
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

const fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "OK",
    }
}

async fn write_error(socket: &mut TcpStream, status: u16, message: &str) -> Result<(), ServiceError> {
    #[derive(Serialize)]
    struct ErrorResponse<'msg> {
        error: &'msg str,
    }
    let body = serde_json::to_vec(&ErrorResponse { error: message })
        .map_err(|err| ServiceError::Serialize { source: err })?;
    write_response(socket, status, &body).await
}

async fn write_response(socket: &mut TcpStream, status: u16, body: &[u8]) -> Result<(), ServiceError> {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        status_text(status),
        body.len()
    );
    socket
        .write_all(head.as_bytes())
        .await
        .map_err(|err| ServiceError::Write { source: err })?;
    socket
        .write_all(body)
        .await
        .map_err(|err| ServiceError::Write { source: err })?;
    socket
        .shutdown()
        .await
        .map_err(|err| ServiceError::Write { source: err })
}
