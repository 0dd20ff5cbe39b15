//! Prometheus metrics for invoicing-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Dashboard action outcomes.
pub static ACTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoicing_actions_total",
        "Total number of invoice actions by outcome",
        &["action", "outcome"] // outcome: success, invalid, database_error
    )
    .expect("Failed to register actions_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "invoicing_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Login attempts by outcome.
pub static LOGIN_ATTEMPTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoicing_login_attempts_total",
        "Total number of login attempts by outcome",
        &["outcome"]
    )
    .expect("Failed to register login_attempts_total")
});

/// Record one action outcome.
pub fn record_action(action: &str, outcome: &str) {
    ACTIONS_TOTAL.with_label_values(&[action, outcome]).inc();
}

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&ACTIONS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&LOGIN_ATTEMPTS_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
