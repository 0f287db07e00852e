//! Controller metrics
//!
//! Filter decisions and reconciliations, exported in Prometheus text format.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Controller metrics registry
    pub static ref CONTROLLER_METRICS_REGISTRY: Registry = Registry::new();

    /// Watch events seen by the class filter
    static ref INGRESS_FILTER_DECISIONS_TOTAL: IntCounterVec = {
        let opts = Opts::new(
            "ingress_filter_decisions_total",
            "Total number of watch events evaluated by the ingress class filter",
        );
        let counter = IntCounterVec::new(opts, &["kind", "event", "result"])
            .expect("Failed to create counter");
        CONTROLLER_METRICS_REGISTRY
            .register(Box::new(counter.clone()))
            .expect("Failed to register counter");
        counter
    };

    /// Ingress reconciliation duration
    static ref INGRESS_RECONCILIATION_DURATION: HistogramVec = {
        let opts = HistogramOpts::new(
            "ingress_reconciliation_duration_seconds",
            "Ingress reconciliation duration in seconds",
        );
        let histogram = HistogramVec::new(opts, &["namespace"])
            .expect("Failed to create histogram");
        CONTROLLER_METRICS_REGISTRY
            .register(Box::new(histogram.clone()))
            .expect("Failed to register histogram");
        histogram
    };

    /// Ingress reconciliations total
    static ref INGRESS_RECONCILIATIONS_TOTAL: IntCounterVec = {
        let opts = Opts::new(
            "ingress_reconciliations_total",
            "Total number of ingress reconciliations",
        );
        let counter = IntCounterVec::new(opts, &["namespace", "result"])
            .expect("Failed to create counter");
        CONTROLLER_METRICS_REGISTRY
            .register(Box::new(counter.clone()))
            .expect("Failed to register counter");
        counter
    };
}

/// Record a class filter decision
pub fn record_filter_decision(kind: &str, event: &str, accepted: bool) {
    let result = if accepted { "accepted" } else { "filtered" };
    INGRESS_FILTER_DECISIONS_TOTAL
        .with_label_values(&[kind, event, result])
        .inc();
}

/// Record Ingress reconciliation
///
/// `result` is one of `claimed`, `ignored`, `error`.
pub fn record_ingress_reconciliation(namespace: &str, duration_secs: f64, result: &str) {
    INGRESS_RECONCILIATION_DURATION
        .with_label_values(&[namespace])
        .observe(duration_secs);

    INGRESS_RECONCILIATIONS_TOTAL
        .with_label_values(&[namespace, result])
        .inc();
}

/// Gather controller metrics
pub fn gather_controller_metrics() -> Result<String, String> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = CONTROLLER_METRICS_REGISTRY.gather();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("Failed to encode metrics: {}", e))?;

    String::from_utf8(buffer).map_err(|e| format!("Failed to convert to UTF-8: {}", e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_decisions_recorded() {
        record_filter_decision("ingress", "create", true);
        record_filter_decision("knative_ingress", "update", false);

        let metrics = gather_controller_metrics().expect("Should gather metrics");
        assert!(metrics.contains("ingress_filter_decisions_total"));
        assert!(metrics.contains(r#"result="accepted""#));
        assert!(metrics.contains(r#"result="filtered""#));
    }

    #[test]
    fn test_reconciliations_recorded() {
        record_ingress_reconciliation("default", 0.004, "claimed");

        let metrics = gather_controller_metrics().expect("Should gather metrics");
        assert!(
            metrics.contains("ingress_reconciliations_total"),
            "Should contain counter metric"
        );
        assert!(
            metrics.contains("ingress_reconciliation_duration_seconds"),
            "Should contain histogram metric"
        );
    }
}
