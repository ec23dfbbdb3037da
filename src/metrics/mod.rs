//! Metrics collection for observability

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
    register_int_gauge_with_registry, CounterVec, HistogramVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Pipeline metrics
    pub pipeline_runs: CounterVec,
    pub stage_duration: HistogramVec,

    // Upstream service metrics
    pub llm_requests: CounterVec,
    pub llm_request_duration: HistogramVec,

    // Store metrics
    pub store_size: IntGauge,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let pipeline_runs = register_counter_vec_with_registry!(
            Opts::new("fact_pipeline_runs_total", "Total pipeline runs by outcome"),
            &["outcome"],
            registry
        )?;

        let stage_duration = register_histogram_vec_with_registry!(
            "fact_pipeline_stage_duration_seconds",
            "Pipeline stage duration in seconds",
            &["stage"],
            registry
        )?;

        let llm_requests = register_counter_vec_with_registry!(
            Opts::new("llm_requests_total", "Total LLM requests"),
            &["operation", "status"],
            registry
        )?;

        let llm_request_duration = register_histogram_vec_with_registry!(
            "llm_request_duration_seconds",
            "LLM request duration in seconds",
            &["operation"],
            registry
        )?;

        let store_size = register_int_gauge_with_registry!(
            Opts::new("fact_store_size", "Number of facts currently held"),
            registry
        )?;

        Ok(Self {
            registry,
            pipeline_runs,
            stage_duration,
            llm_requests,
            llm_request_duration,
            store_size,
        })
    }

    /// Record the terminal outcome of a pipeline run
    pub fn record_run(&self, outcome: &str) {
        self.pipeline_runs.with_label_values(&[outcome]).inc();
    }

    /// Record an upstream LLM call
    pub fn record_llm_request(&self, operation: &str, status: &str) {
        self.llm_requests.with_label_values(&[operation, status]).inc();
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Helper macro to time operations
#[macro_export]
macro_rules! time_operation {
    ($histogram:expr, $label:expr, $operation:expr) => {{
        let timer = $histogram.with_label_values(&[$label]).start_timer();
        let result = $operation;
        timer.observe_duration();
        result
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let metrics = Metrics::new();
        assert!(metrics.is_ok());
    }

    #[test]
    fn test_record_run_and_export() {
        let metrics = Metrics::new().unwrap();
        metrics.record_run("committed");
        metrics.record_run("rejected");
        metrics.record_llm_request("classify", "success");

        let exported = metrics.export_prometheus();
        assert!(exported.contains("fact_pipeline_runs_total"));
        assert!(exported.contains("llm_requests_total"));
    }

    #[test]
    fn test_time_operation_macro() {
        let metrics = Metrics::new().unwrap();
        let value = crate::time_operation!(metrics.stage_duration, "source", 40 + 2);
        assert_eq!(value, 42);
    }
}
