use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, info, warn};

/// Failure reason attached to error responses so it can be logged once here.
#[derive(Clone, Debug)]
pub struct ErrorReport(pub String);

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = start.elapsed();
    let reason = response
        .extensions()
        .get::<ErrorReport>()
        .map(|report| report.0.as_str())
        .unwrap_or("-");

    if status.is_server_error() {
        error!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            reason = %reason,
            "Failed to process request"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            reason = %reason,
            "Rejected request"
        );
    } else {
        info!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            "Processed request"
        );
    }

    response
}
