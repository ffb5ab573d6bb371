use super::profiler::{DebugState, setup_debug_endpoint};
use super::progress::{ProgressStyle, build_progress_line};
use super::summary::{
    RunReport, SummaryOptions, format_count, format_rate, header_lines, histogram_lines,
    summary_lines,
};
use super::{resolve_target, run_local};
use crate::args::{PositiveUsize, ThrashArgs};
use crate::error::{AppError, FetchError};
use crate::http::DispatchCounters;
use crate::metrics::{FailureInfo, Outcome, ResponseInfo, ResponseSummary, Timing};
use clap::Parser;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::time::Instant;
use url::Url;

fn positive(value: usize) -> Result<PositiveUsize, String> {
    PositiveUsize::try_from(value).map_err(|err| format!("invalid positive value: {}", err))
}

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn summary_of(expected: usize, samples: &[(Option<u64>, u16)]) -> Result<ResponseSummary, String> {
    let start = Instant::now();
    let mut summary = ResponseSummary::new(positive(expected)?);
    for (millis, code) in samples {
        let outcome = match millis {
            Some(millis) => {
                let end = start
                    .checked_add(Duration::from_millis(*millis))
                    .ok_or_else(|| "instant overflow".to_owned())?;
                Outcome::Success(ResponseInfo {
                    status: format!("{} OK", code),
                    status_code: *code,
                    content_length: Some(1_000),
                    timing: Timing::new(start, end),
                })
            }
            None => Outcome::Failure(FailureInfo {
                error: FetchError::Simulated {
                    message: "dial tcp: connection refused",
                },
                timing: Timing::new(start, start),
            }),
        };
        summary
            .record(outcome)
            .map_err(|err| format!("record failed: {}", err))?;
    }
    Ok(summary)
}

fn options(histogram: bool, print_errors: bool) -> Result<SummaryOptions, String> {
    Ok(SummaryOptions {
        histogram,
        buckets: positive(5)?,
        print_errors,
    })
}

#[test]
fn format_count_groups_thousands() -> Result<(), String> {
    let cases: [(u64, &str); 6] = [
        (0, "0"),
        (999, "999"),
        (1_000, "1,000"),
        (12_345, "12,345"),
        (1_234_567, "1,234,567"),
        (100_000_000, "100,000,000"),
    ];
    for (value, expected) in cases {
        let actual = format_count(value);
        if actual != expected {
            return Err(format!("Expected {} for {}, got {}", expected, value, actual));
        }
    }
    Ok(())
}

#[test]
fn format_rate_uses_two_decimals() -> Result<(), String> {
    let cases = [
        (10, Duration::from_secs(1), "10.00"),
        (1, Duration::from_millis(3), "333.33"),
        (5_000, Duration::from_secs(2), "2,500.00"),
        (0, Duration::from_secs(1), "0.00"),
    ];
    for (responses, elapsed, expected) in cases {
        let actual = format_rate(responses, elapsed);
        if actual != expected {
            return Err(format!(
                "Expected {} for {} in {:?}, got {}",
                expected, responses, elapsed, actual
            ));
        }
    }
    Ok(())
}

#[test]
fn header_echoes_target_and_settings() -> Result<(), String> {
    let url = Url::parse("http://example.com/health").map_err(|err| err.to_string())?;
    let lines = header_lines(&url, positive(8)?, positive(10_000)?);
    let expected = vec![
        "Thrashing http://example.com/health".to_owned(),
        "Concurrency 8 Num Requests 10,000".to_owned(),
    ];
    if lines == expected {
        Ok(())
    } else {
        Err(format!("Unexpected header: {:?}", lines))
    }
}

#[test]
fn summary_lines_report_totals() -> Result<(), String> {
    let summary = summary_of(
        4,
        &[(Some(10), 200), (Some(30), 200), (Some(20), 404), (None, 0)],
    )?;
    let report = RunReport {
        summary: &summary,
        elapsed: Duration::from_secs(2),
    };
    let lines = summary_lines(&report, &options(false, false)?);

    let expected_prefix = [
        "Responses OK: 75% (3/4), Errors: 1",
        "Status Codes: {\"200\":2,\"404\":1}",
        "Bytes Transferred: 3,000",
        "Avg Response Time: 20ms",
        "Min Response Time: 10ms",
        "Max Response Time: 30ms",
    ];
    for (index, expected) in expected_prefix.iter().enumerate() {
        match lines.get(index) {
            Some(line) if line == expected => {}
            other => {
                return Err(format!(
                    "Line {}: expected {:?}, got {:?}",
                    index, expected, other
                ));
            }
        }
    }
    if !lines.iter().any(|line| line == "Throughput: 2.00 req/s") {
        return Err(format!("Missing throughput line in {:?}", lines));
    }
    if !lines.iter().any(|line| line.starts_with("Latency p50/p90/p99: ")) {
        return Err(format!("Missing percentile line in {:?}", lines));
    }
    if lines.iter().any(|line| line.contains("connection refused")) {
        return Err("Errors printed without the flag".to_owned());
    }
    Ok(())
}

#[test]
fn summary_lines_without_successes_print_no_average() -> Result<(), String> {
    let summary = summary_of(2, &[(None, 0), (None, 0)])?;
    let report = RunReport {
        summary: &summary,
        elapsed: Duration::from_secs(1),
    };
    let lines = summary_lines(&report, &options(true, true)?);

    let required = [
        "Responses OK: 0% (0/2), Errors: 2",
        "Status Codes: {}",
        "Bytes Transferred: 0",
        "Avg Response Time: n/a (no successful responses)",
        "Histogram: n/a (no successful responses)",
    ];
    for expected in required {
        if !lines.iter().any(|line| line == expected) {
            return Err(format!("Missing {:?} in {:?}", expected, lines));
        }
    }
    let error_lines = lines
        .iter()
        .filter(|line| line.as_str() == "dial tcp: connection refused")
        .count();
    if error_lines != 2 {
        return Err(format!("Expected 2 error lines, got {}", error_lines));
    }
    Ok(())
}

#[test]
fn histogram_lines_render_bars_and_bounds() -> Result<(), String> {
    let summary = summary_of(
        5,
        &[
            (Some(10), 200),
            (Some(20), 200),
            (Some(30), 200),
            (Some(40), 200),
            (Some(100), 200),
        ],
    )?;
    let histogram = summary
        .histogram(positive(5)?)
        .ok_or_else(|| "Expected a histogram".to_owned())?;
    let lines = histogram_lines(&histogram);
    let bar40 = "∎".repeat(20);
    let bar20 = "∎".repeat(10);
    let expected = vec![
        format!("( 40%) {} [10ms - 28ms]", bar40),
        format!("( 40%) {} [28ms - 46ms]", bar40),
        "(  0%) [46ms - 64ms]".to_owned(),
        "(  0%) [64ms - 82ms]".to_owned(),
        format!("( 20%) {} [82ms - 100ms]", bar20),
    ];
    if lines == expected {
        Ok(())
    } else {
        Err(format!("Unexpected histogram lines: {:?}", lines))
    }
}

#[test]
fn progress_line_tracks_completed_requests() -> Result<(), String> {
    let style = ProgressStyle::new(10);
    let text: String = build_progress_line(&style, 42, 100)
        .into_iter()
        .map(|segment| segment.text)
        .collect();
    if text == "[####------] 42.00% | 42/100" {
        Ok(())
    } else {
        Err(format!("Unexpected progress line: {}", text))
    }
}

#[test]
fn progress_line_clamps_overshoot() -> Result<(), String> {
    let style = ProgressStyle::new(4);
    let text: String = build_progress_line(&style, 12, 10)
        .into_iter()
        .map(|segment| segment.text)
        .collect();
    if text == "[####] 100.00% | 10/10" {
        Ok(())
    } else {
        Err(format!("Unexpected progress line: {}", text))
    }
}

async fn raw_get(addr: SocketAddr, path: &str) -> Result<String, String> {
    let mut socket = tokio::net::TcpStream::connect(addr)
        .await
        .map_err(|err| format!("connect failed: {}", err))?;
    let request = format!("GET {} HTTP/1.1\r\nHost: {}\r\n\r\n", path, addr);
    socket
        .write_all(request.as_bytes())
        .await
        .map_err(|err| format!("write failed: {}", err))?;
    let mut response = String::new();
    socket
        .read_to_string(&mut response)
        .await
        .map_err(|err| format!("read failed: {}", err))?;
    Ok(response)
}

#[test]
fn debug_endpoint_serves_counters() -> Result<(), String> {
    run_async_test(async {
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let state = DebugState {
            requests: positive(100)?,
            concurrency: positive(4)?,
            counters: Arc::new(DispatchCounters::default()),
            run_start: Instant::now(),
        };
        let listen: SocketAddr = "127.0.0.1:0"
            .parse()
            .map_err(|err| format!("bad addr: {}", err))?;
        let (addr, handle) = setup_debug_endpoint(listen, state, &shutdown_tx)
            .await
            .map_err(|err| format!("setup failed: {}", err))?;

        let vars = raw_get(addr, "/debug/vars").await?;
        if !vars.starts_with("HTTP/1.1 200 OK") {
            return Err(format!("Unexpected vars response: {}", vars));
        }
        let body = vars
            .split("\r\n\r\n")
            .nth(1)
            .ok_or_else(|| "Missing body".to_owned())?;
        let json: serde_json::Value =
            serde_json::from_str(body).map_err(|err| format!("bad json: {}", err))?;
        if json.get("requests") != Some(&serde_json::json!(100))
            || json.get("concurrency") != Some(&serde_json::json!(4))
            || json.get("completed") != Some(&serde_json::json!(0))
            || json.get("in_flight").is_none()
            || json.get("elapsed_ms").is_none()
        {
            return Err(format!("Unexpected snapshot: {}", json));
        }

        let missing = raw_get(addr, "/nope").await?;
        if !missing.starts_with("HTTP/1.1 404 Not Found") {
            return Err(format!("Unexpected 404 response: {}", missing));
        }

        shutdown_tx
            .send(())
            .map_err(|err| format!("shutdown failed: {}", err))?;
        handle
            .await
            .map_err(|err| format!("endpoint task failed: {}", err))?;
        Ok(())
    })
}

#[test]
fn debug_endpoint_reports_bind_failure() -> Result<(), String> {
    run_async_test(async {
        let taken = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|err| format!("bind failed: {}", err))?;
        let addr = taken
            .local_addr()
            .map_err(|err| format!("local_addr failed: {}", err))?;
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let state = DebugState {
            requests: positive(1)?,
            concurrency: positive(1)?,
            counters: Arc::new(DispatchCounters::default()),
            run_start: Instant::now(),
        };
        match setup_debug_endpoint(addr, state, &shutdown_tx).await {
            Err(crate::error::ServiceError::Bind { .. }) => Ok(()),
            Err(err) => Err(format!("Expected a bind error, got {}", err)),
            Ok(_) => Err("Expected the second bind to fail".to_owned()),
        }
    })
}

#[test]
fn resolve_target_requires_url() -> Result<(), String> {
    let args = ThrashArgs::try_parse_from(["thrash"]).map_err(|err| err.to_string())?;
    match resolve_target(&args) {
        Err(AppError::Validation(crate::error::ValidationError::MissingUrl)) => Ok(()),
        other => Err(format!("Expected MissingUrl, got {:?}", other)),
    }
}

async fn spawn_body_server(body: &'static [u8]) -> Result<SocketAddr, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("local_addr failed: {}", err))?;
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                if socket.read(&mut buf).await.is_err() {
                    return;
                }
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                if socket.write_all(head.as_bytes()).await.is_err() {
                    return;
                }
                if socket.write_all(body).await.is_err() {
                    return;
                }
                let _ = socket.shutdown().await;
            });
        }
    });
    Ok(addr)
}

#[test]
fn run_local_collects_every_response() -> Result<(), String> {
    run_async_test(async {
        let addr = spawn_body_server(b"hello").await?;
        let url = format!("http://{}/", addr);
        let args = ThrashArgs::try_parse_from([
            "thrash",
            url.as_str(),
            "-n",
            "10",
            "-c",
            "10",
            "--no-progress",
        ])
        .map_err(|err| err.to_string())?;

        let outcome = run_local(&args)
            .await
            .map_err(|err| format!("run failed: {}", err))?;
        let summary = outcome.summary;
        if summary.num_ok() != 10
            || summary.bytes_transferred() != 50
            || summary.status_counts().get(&200) != Some(&10)
            || summary.num_errors() != 0
        {
            return Err(format!(
                "Unexpected summary: ok={} bytes={} statuses={:?} errors={}",
                summary.num_ok(),
                summary.bytes_transferred(),
                summary.status_counts(),
                summary.num_errors()
            ));
        }
        Ok(())
    })
}
