use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::model::artifact::ArtifactBundle;
use crate::model::predictor::Predictor;
use crate::preprocessing::schema::{Island, PenguinFeatures, Sex};
use crate::server::types::AppState;

/// Column order used throughout the tests. Feature indices in the tree below
/// refer to this layout.
pub fn scenario_columns() -> Value {
    json!([
        "island_Biscoe",
        "island_Dream",
        "island_Torgersen",
        "sex_male",
        "sex_female",
        "bill_length_mm",
        "bill_depth_mm",
        "flipper_length_mm",
        "body_mass_g"
    ])
}

/// A single decision tree over the scenario columns:
/// flipper <= 206.5 and bill <= 43.35 is Adelie, long bills on Dream are
/// Chinstrap, long flippers with shallow bills are Gentoo.
pub fn scenario_artifact_json() -> Value {
    json!({
        "model": {
            "kind": "forest",
            "n_features": 9,
            "n_classes": 3,
            "trees": [{
                "nodes": [
                    { "split": { "feature": 7, "threshold": 206.5, "left": 1, "right": 2 } },
                    { "split": { "feature": 5, "threshold": 43.35, "left": 3, "right": 4 } },
                    { "split": { "feature": 6, "threshold": 17.65, "left": 5, "right": 6 } },
                    { "leaf": { "distribution": [0.97, 0.03, 0.0] } },
                    { "split": { "feature": 1, "threshold": 0.5, "left": 7, "right": 8 } },
                    { "leaf": { "distribution": [0.0, 0.01, 0.99] } },
                    { "leaf": { "distribution": [0.62, 0.38, 0.0] } },
                    { "leaf": { "distribution": [0.75, 0.0, 0.25] } },
                    { "leaf": { "distribution": [0.04, 0.96, 0.0] } }
                ]
            }]
        },
        "label_encoder": { "classes": ["Adelie", "Chinstrap", "Gentoo"] },
        "columns": scenario_columns()
    })
}

/// A linear model whose scores overflow to NaN for any real penguin, so
/// every prediction that reaches the classifier fails.
pub fn exploding_artifact_json() -> Value {
    let row = json!([0.0, 0.0, 0.0, 0.0, 0.0, 1e308, -1e308, 0.0, 0.0]);
    json!({
        "model": {
            "kind": "linear",
            "coefficients": [row.clone(), row.clone(), row],
            "intercepts": [0.0, 0.0, 0.0]
        },
        "label_encoder": { "classes": ["Adelie", "Chinstrap", "Gentoo"] },
        "columns": scenario_columns()
    })
}

pub fn scenario_bundle() -> ArtifactBundle {
    ArtifactBundle::from_json_slice(scenario_artifact_json().to_string().as_bytes()).unwrap()
}

pub fn exploding_bundle() -> ArtifactBundle {
    ArtifactBundle::from_json_slice(exploding_artifact_json().to_string().as_bytes()).unwrap()
}

pub fn biscoe_male() -> PenguinFeatures {
    PenguinFeatures {
        island: Island::Biscoe,
        bill_length_mm: 45.1,
        bill_depth_mm: 14.5,
        flipper_length_mm: 210,
        body_mass_g: 4500,
        sex: Sex::Male,
    }
}

pub fn biscoe_male_body() -> Value {
    json!({
        "island": "Biscoe",
        "bill_length_mm": 45.1,
        "bill_depth_mm": 14.5,
        "flipper_length_mm": 210,
        "body_mass_g": 4500,
        "sex": "male"
    })
}

/// App state with a Prometheus handle that is not installed globally.
pub fn app_state(bundle: ArtifactBundle, expose_internal_detail: bool) -> AppState {
    let metrics = PrometheusBuilder::new().build_recorder().handle();
    AppState {
        predictor: Predictor::new(Arc::new(bundle)),
        expose_internal_detail,
        metrics,
    }
}
