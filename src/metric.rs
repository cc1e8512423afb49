use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("chipdog_statds")
        .with_description("Chipdog client statistics")
        .with_unit("attempt")
        .build()
});

fn incr_statds(metric: String, value: String) {
    STATDS.add(1, &[KeyValue::new(metric, value)]);
}

pub fn incr_user_action_statds(action: &str) {
    incr_statds("user_action".to_string(), action.into())
}

pub fn incr_finder_action_statds(action: &str) {
    incr_statds("finder_action".to_string(), action.into())
}

pub fn incr_backend_error_statds(operation: &str) {
    incr_statds("backend_error".to_string(), operation.into())
}
