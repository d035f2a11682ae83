use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Registry plus the collectors registered in it, published together.
pub struct BridgeMetrics {
    pub registry: Registry,
    pub messages_total: IntCounterVec,
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
}

static METRICS: OnceLock<BridgeMetrics> = OnceLock::new();

/// Register the collectors. Later calls keep the first registry.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let messages_total = IntCounterVec::new(
        Opts::new(
            "bridge_messages_total",
            "Partner messages handled, by outcome",
        ),
        &["outcome"],
    )?;

    let requests_total = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"],
    )?;

    let request_duration = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        ),
        &["method", "path", "status"],
    )?;

    registry.register(Box::new(messages_total.clone()))?;
    registry.register(Box::new(requests_total.clone()))?;
    registry.register(Box::new(request_duration.clone()))?;

    // Losing a concurrent init is fine, the winner's set is complete
    let _ = METRICS.set(BridgeMetrics {
        registry,
        messages_total,
        http_requests_total: requests_total,
        http_request_duration_seconds: request_duration,
    });

    Ok(())
}

/// Count one handled message. No-op until [`init_metrics`] has run.
pub fn record_message(outcome: &str) {
    if let Some(metrics) = METRICS.get() {
        metrics.messages_total.with_label_values(&[outcome]).inc();
    }
}

pub fn record_http_request(method: &str, path: &str, status: &str, seconds: f64) {
    let Some(metrics) = METRICS.get() else {
        return;
    };
    let labels = [method, path, status];
    metrics.http_requests_total.with_label_values(&labels).inc();
    metrics
        .http_request_duration_seconds
        .with_label_values(&labels)
        .observe(seconds);
}

pub fn get_metrics() -> String {
    let Some(metrics) = METRICS.get() else {
        return String::new();
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
