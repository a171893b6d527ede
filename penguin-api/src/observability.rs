use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const REQUESTS_TOTAL: &str = "penguin_api_requests_total";
pub const PREDICTION_DURATION_SECONDS: &str = "penguin_api_prediction_duration_seconds";
pub const PREDICTIONS_TOTAL: &str = "penguin_api_predictions_total";

/// Final state of a request. Panics are counted for every route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ValidationError,
    InferenceError,
    /// The body could not be buffered (too large, or the stream failed).
    RejectedBody,
    /// A handler panicked.
    InternalError,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::ValidationError => "validation_error",
            Outcome::InferenceError => "inference_error",
            Outcome::RejectedBody => "rejected_body",
            Outcome::InternalError => "internal_error",
        }
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

/// Installs the Prometheus recorder and returns the handle used by `/metrics`.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

pub fn record_outcome(outcome: Outcome) {
    counter!(REQUESTS_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

pub fn record_prediction(label: &str, elapsed: Duration) {
    record_outcome(Outcome::Success);
    counter!(PREDICTIONS_TOTAL, "species" => label.to_string()).increment(1);
    histogram!(PREDICTION_DURATION_SECONDS).record(elapsed.as_secs_f64());
}
