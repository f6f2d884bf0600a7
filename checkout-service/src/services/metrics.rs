use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use crate::models::Destination;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once.
pub fn init_metrics() -> anyhow::Result<()> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

pub fn record_order_created(destination: Destination) {
    counter!("orders_created_total", "destination" => destination.collection()).increment(1);
}

/// `reason` is `payment_id` or `recent_match`.
pub fn record_duplicate(reason: &'static str) {
    counter!("orders_deduplicated_total", "reason" => reason).increment(1);
}

pub fn record_webhook(event: &str, outcome: &'static str) {
    counter!(
        "webhook_events_total",
        "event" => event.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
