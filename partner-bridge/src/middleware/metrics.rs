use crate::services::metrics::record_http_request;
use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Label for requests that matched no route, so stray paths share one series.
pub const UNMATCHED_PATH: &str = "unmatched";

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = route_label(&req);

    let response = next.run(req).await;

    record_http_request(
        &method,
        &path,
        response.status().as_str(),
        start.elapsed().as_secs_f64(),
    );

    response
}

fn route_label(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string())
}
