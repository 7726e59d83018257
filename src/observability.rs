use std::net::SocketAddr;

use crate::engine::RejectReason;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: reservations committed.
pub const RESERVATIONS_COMMITTED_TOTAL: &str = "aforo_reservations_committed_total";

/// Counter: proposals rejected by the validator. Labels: reason.
pub const RESERVATIONS_REJECTED_TOTAL: &str = "aforo_reservations_rejected_total";

/// Counter: reservations cancelled.
pub const RESERVATIONS_CANCELLED_TOTAL: &str = "aforo_reservations_cancelled_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: rooms in the catalog.
pub const ROOMS_ACTIVE: &str = "aforo_rooms_active";

/// Install a Prometheus metrics exporter on the given port. No-op if port is
/// None. Called once by the embedding application, not by the library.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Map a rejection to a short label for metrics.
pub fn reject_label(reason: &RejectReason) -> &'static str {
    match reason {
        RejectReason::OutsideBusinessHours => "business_hours",
        RejectReason::InvalidSlotShape => "slot_shape",
        RejectReason::Overlap { .. } => "overlap",
    }
}
