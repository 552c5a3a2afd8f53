use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("whatsapp_bridge_statds")
        .with_description("WhatsApp bridge webhook and outbound statistics")
        .with_unit("event")
        .build()
});

fn incr_statds(metric: &str, value: &str) {
    STATDS.add(1, &[KeyValue::new(metric.to_string(), value.to_string())]);
}

/// Counts one dispatched webhook item: "message", "status" or "error"
pub fn incr_webhook_event_statds(kind: &str) {
    incr_statds("webhook_event", kind)
}

/// Counts one rejected webhook call: "signature" or "decode"
pub fn incr_webhook_rejected_statds(reason: &str) {
    incr_statds("webhook_rejected", reason)
}

/// Counts one outbound send attempt by outcome
pub fn incr_outbound_statds(outcome: &str) {
    incr_statds("outbound", outcome)
}
