use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};

use crate::model::predictor::Predictor;

/// Shared Application State. Built once before serving and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
    /// Pass internal error messages through to 500 responses.
    pub expose_internal_detail: bool,
    pub metrics: PrometheusHandle,
}

// --- DTOs (Data Transfer Objects) ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PredictResponse {
    pub predicted_species: String,
}
