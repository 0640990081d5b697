//! Request logging middleware
//!
//! Logs one `HTTP_REQUEST` line per request with method, URI, status and
//! elapsed microseconds.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::observability::{Event, Logger};

pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    let elapsed = started.elapsed().as_micros().to_string();
    Logger::info(
        Event::HttpRequest.as_str(),
        &[
            ("method", method.as_str()),
            ("uri", uri.as_str()),
            ("status", status.as_str()),
            ("elapsed_us", elapsed.as_str()),
        ],
    );

    response
}
