use axum::{routing::get, Router};
use metrics::describe_counter;
use metrics::describe_histogram;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and register series descriptions.
    pub fn init() -> Self {
        // Use default buckets to avoid API differences across crate versions.
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_counter!("predict_requests_total", "Prediction requests accepted");
        describe_counter!(
            "predict_neutral_override_total",
            "Predictions resolved by the neutral short-text override"
        );
        describe_counter!(
            "gated_label_total",
            "Final gated verdicts by label"
        );
        describe_counter!(
            "scorer_errors_total",
            "Component scorer failures by scorer"
        );
        describe_histogram!("predict_ms", "End-to-end prediction latency (ms)");

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
