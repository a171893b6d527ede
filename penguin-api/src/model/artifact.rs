use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::ArtifactError;
use crate::model::classifier::Classifier;
use crate::model::columns::ModelColumns;
use crate::model::label_encoder::LabelEncoder;

/// The serialized bundle produced at training time: classifier, label
/// encoder and column schema. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactBundle {
    classifier: Classifier,
    label_encoder: LabelEncoder,
    columns: ModelColumns,
}

#[derive(Deserialize)]
struct RawBundle {
    model: Classifier,
    label_encoder: RawLabelEncoder,
    columns: Vec<String>,
}

#[derive(Deserialize)]
struct RawLabelEncoder {
    classes: Vec<String>,
}

impl ArtifactBundle {
    /// Builds a bundle from its parts, checking that they agree with each other.
    pub fn from_parts(
        classifier: Classifier,
        label_encoder: LabelEncoder,
        columns: ModelColumns,
    ) -> Result<Self, ArtifactError> {
        classifier.validate().map_err(ArtifactError::Invalid)?;

        if classifier.num_features() != columns.len() {
            return Err(ArtifactError::Invalid(format!(
                "classifier expects {} features but the column schema has {}",
                classifier.num_features(),
                columns.len()
            )));
        }
        if classifier.num_classes() != label_encoder.len() {
            return Err(ArtifactError::Invalid(format!(
                "classifier predicts {} classes but the label encoder has {}",
                classifier.num_classes(),
                label_encoder.len()
            )));
        }

        Ok(Self {
            classifier,
            label_encoder,
            columns,
        })
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let raw: RawBundle = serde_json::from_slice(bytes)?;
        let label_encoder =
            LabelEncoder::new(raw.label_encoder.classes).map_err(ArtifactError::Invalid)?;
        let columns = ModelColumns::new(raw.columns).map_err(ArtifactError::Invalid)?;
        Self::from_parts(raw.model, label_encoder, columns)
    }

    /// Loads the bundle from disk. Any failure here must abort startup.
    ///
    /// # Arguments
    /// * `path` - Path to the JSON artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.display().to_string()));
        }

        let bytes = fs::read(path)?;
        let bundle = Self::from_json_slice(&bytes)?;

        info!(
            path = %path.display(),
            classifier = bundle.classifier.kind(),
            classes = ?bundle.label_encoder.classes(),
            columns = bundle.columns.len(),
            "Loaded artifact"
        );
        Ok(bundle)
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn label_encoder(&self) -> &LabelEncoder {
        &self.label_encoder
    }

    pub fn columns(&self) -> &ModelColumns {
        &self.columns
    }
}
