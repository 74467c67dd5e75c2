use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. Output goes to stderr so stdout stays
/// reserved for command output and the MCP stdio stream.
pub fn init_logging(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let duration_ms = started_at.elapsed().as_millis();

    if path == "/health" {
        debug!(method = %method, path = %path, status, duration_ms, "request summary");
    } else {
        info!(method = %method, path = %path, status, duration_ms, "request summary");
    }

    match status {
        401 => warn!(method = %method, path = %path, "authentication failure"),
        500..=599 => warn!(method = %method, path = %path, status, "request failed"),
        _ => {}
    }

    response
}
