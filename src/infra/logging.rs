pub fn init() {
    // Initialize tracing subscriber once, honoring RUST_LOG if set.
    // Logs go to stderr: stdout carries the protocol in stdio mode.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Record a metric and mirror it to the log.
///
/// Metrics ending in `_total` are counters, everything else is a histogram.
/// Without an installed recorder the `metrics` calls are no-ops.
pub fn log_metric(tool: &str, metric: &str, value: f64) {
    tracing::info!(tool = tool, metric = metric, value = value, "metric");
    let tool = tool.to_string();
    if metric.ends_with("_total") {
        metrics::counter!(metric.to_string(), "tool" => tool).increment(value as u64);
    } else {
        metrics::histogram!(metric.to_string(), "tool" => tool).record(value);
    }
}
