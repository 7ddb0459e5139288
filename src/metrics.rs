// =============================================================================
// METRICS MODULE
// =============================================================================
// This module sets up Prometheus metrics for observability.
//
// LEARNING NOTES:
// - Prometheus uses a "pull" model - it scrapes /metrics endpoint
// - Counter: only goes up. Gauge: goes up and down. Histogram: buckets.
// - Labels add dimensions to metrics (e.g., screen="products")
// =============================================================================

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

// =============================================================================
// METRIC NAMES (Constants)
// =============================================================================

/// Labels: method, endpoint, status
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

/// Labels: method, endpoint
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Labels: operation (list/procedure)
pub const DB_QUERY_DURATION_SECONDS: &str = "db_query_duration_seconds";

/// Labels: operation (get/set/delete)
pub const REDIS_OPERATION_DURATION_SECONDS: &str = "redis_operation_duration_seconds";

/// Products currently below the low-stock threshold
pub const CONSOLE_LOW_STOCK_ITEMS: &str = "console_low_stock_items";

/// Rows left after filtering, per list screen
/// Labels: screen
pub const CONSOLE_LIST_ROWS: &str = "console_list_rows";

/// Form submissions by outcome
/// Labels: form, outcome (accepted/invalid/duplicate/failed)
pub const CONSOLE_SUBMISSIONS_TOTAL: &str = "console_submissions_total";

// =============================================================================
// SETUP FUNCTION
// =============================================================================
/// Install the Prometheus recorder and return the handle used by /metrics.
pub fn setup_metrics() -> Result<PrometheusHandle> {
    // 1ms .. 10s, the useful range for HTTP and backend calls
    let latency_buckets = &[
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    // Row counts per list view
    let row_buckets = &[0.0, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
            latency_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full(DB_QUERY_DURATION_SECONDS.to_string()),
            latency_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full(REDIS_OPERATION_DURATION_SECONDS.to_string()),
            latency_buckets,
        )?
        .set_buckets_for_metric(Matcher::Full(CONSOLE_LIST_ROWS.to_string()), row_buckets)?
        .install_recorder()?;

    describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests received");
    describe_histogram!(HTTP_REQUEST_DURATION_SECONDS, "HTTP request latency in seconds");
    describe_histogram!(DB_QUERY_DURATION_SECONDS, "Backend query latency in seconds");
    describe_histogram!(REDIS_OPERATION_DURATION_SECONDS, "Redis operation latency in seconds");
    describe_gauge!(
        CONSOLE_LOW_STOCK_ITEMS,
        "Number of products currently below the low-stock threshold"
    );
    describe_histogram!(CONSOLE_LIST_ROWS, "Rows matching the filters of a list request");
    describe_counter!(CONSOLE_SUBMISSIONS_TOTAL, "Form submissions by outcome");

    Ok(handle)
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

pub fn record_http_request(method: &str, endpoint: &str, status: u16, duration_secs: f64) {
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string()
    )
    .record(duration_secs);
}

pub fn record_db_query(operation: &str, duration_secs: f64) {
    histogram!(
        DB_QUERY_DURATION_SECONDS,
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

pub fn record_redis_operation(operation: &str, duration_secs: f64) {
    histogram!(
        REDIS_OPERATION_DURATION_SECONDS,
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

pub fn set_low_stock_count(count: usize) {
    gauge!(CONSOLE_LOW_STOCK_ITEMS).set(count as f64);
}

pub fn record_list_rows(screen: &str, rows: usize) {
    histogram!(CONSOLE_LIST_ROWS, "screen" => screen.to_string()).record(rows as f64);
}

pub fn record_submission(form: &str, outcome: &str) {
    counter!(
        CONSOLE_SUBMISSIONS_TOTAL,
        "form" => form.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}
