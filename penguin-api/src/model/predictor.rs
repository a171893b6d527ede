use std::sync::Arc;

use crate::error::InferenceError;
use crate::model::artifact::ArtifactBundle;
use crate::preprocessing::schema::PenguinFeatures;
use crate::preprocessing::transform::{self, AlignedRow};

/// A decoded prediction for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub class_index: usize,
    pub label: String,
}

/// Runs the classifier against the shared, read-only artifact bundle.
#[derive(Debug, Clone)]
pub struct Predictor {
    bundle: Arc<ArtifactBundle>,
}

impl Predictor {
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        Self { bundle }
    }

    /// Aligns a validated request to the bundle's column schema.
    pub fn transform(&self, features: &PenguinFeatures) -> Result<AlignedRow<'_>, InferenceError> {
        transform::transform(features, self.bundle.columns())
    }

    pub fn predict_row(&self, row: &AlignedRow<'_>) -> Result<Prediction, InferenceError> {
        let class_index = self.bundle.classifier().predict(row.values())?;
        let label = self
            .bundle
            .label_encoder()
            .inverse_transform(class_index)?
            .to_string();
        Ok(Prediction { class_index, label })
    }

    pub fn predict(&self, features: &PenguinFeatures) -> Result<Prediction, InferenceError> {
        let row = self.transform(features)?;
        self.predict_row(&row)
    }
}
