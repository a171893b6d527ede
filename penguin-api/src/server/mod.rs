pub mod extract;
pub mod handlers;
pub mod routes;
pub mod types;

#[cfg(test)]
mod tests;

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ArtifactError;
use crate::model::artifact::ArtifactBundle;
use crate::model::predictor::Predictor;
use types::AppState;

/// Loads the artifact named in `config` and assembles the shared state.
/// Nothing is served if this fails.
pub fn build_state(config: &AppConfig, metrics: PrometheusHandle) -> Result<AppState, ArtifactError> {
    let bundle = ArtifactBundle::load(&config.artifact.path)?;
    Ok(AppState {
        predictor: Predictor::new(Arc::new(bundle)),
        expose_internal_detail: config.errors.expose_internal_detail,
        metrics,
    })
}
