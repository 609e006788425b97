//! Business counters, served from their own registry at `/metrics/orders`.
//! Request metrics come from the middleware at `/metrics`.

use actix_web::{HttpResponse, Responder};
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry =
        Registry::new_custom(Some("rxpad".to_string()), None).expect("valid registry prefix");
    pub static ref SESSIONS_CREATED_TOTAL: IntCounter =
        IntCounter::new("sessions_created_total", "Wizard sessions started")
            .expect("valid metric");
    pub static ref ORDERS_SUBMITTED_TOTAL: IntCounter =
        IntCounter::new("orders_submitted_total", "Orders placed").expect("valid metric");
    pub static ref EXPORTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("exports_total", "PDF exports by outcome"),
        &["outcome"]
    )
    .expect("valid metric");
}

/// Registers every counter once. Later calls are no-ops.
pub fn register() {
    let collectors: [Box<dyn prometheus::core::Collector>; 3] = [
        Box::new(SESSIONS_CREATED_TOTAL.clone()),
        Box::new(ORDERS_SUBMITTED_TOTAL.clone()),
        Box::new(EXPORTS_TOTAL.clone()),
    ];
    for collector in collectors {
        if let Err(e) = REGISTRY.register(collector) {
            log::debug!("Metric already registered: {}", e);
        }
    }
}

pub fn record_export(outcome: &str) {
    EXPORTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub async fn render() -> impl Responder {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    match encoder.encode(&REGISTRY.gather(), &mut buffer) {
        Ok(()) => HttpResponse::Ok()
            .content_type(encoder.format_type())
            .body(buffer),
        Err(e) => {
            log::error!("Failed to encode metrics: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        register();
        register();
        record_export("skipped");
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&REGISTRY.gather(), &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("rxpad_exports_total{outcome=\"skipped\"}"));
    }
}
