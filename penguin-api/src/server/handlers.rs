use axum::{extract::State, Json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::observability::{self, Outcome};
use crate::preprocessing::schema::PenguinFeatures;
use crate::server::extract::ValidatedJson;
use crate::server::types::*;

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    ValidatedJson(features): ValidatedJson<PenguinFeatures>,
) -> Result<Json<PredictResponse>, ApiError> {
    let start = Instant::now();

    // 1. Align to the model columns, 2. classify and decode
    let outcome = state
        .predictor
        .transform(&features)
        .and_then(|row| state.predictor.predict_row(&row));

    match outcome {
        Ok(prediction) => {
            let elapsed = start.elapsed();
            debug!(
                species = %prediction.label,
                class_index = prediction.class_index,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                "Prediction complete"
            );
            observability::record_prediction(&prediction.label, elapsed);
            Ok(Json(PredictResponse {
                predicted_species: prediction.label,
            }))
        }
        Err(err) => {
            error!(error = %err, ?features, "Prediction failed");
            observability::record_outcome(Outcome::InferenceError);
            Err(ApiError::from_inference(&err, state.expose_internal_detail))
        }
    }
}
