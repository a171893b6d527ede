use ndarray::{Array1, ArrayView1};

use crate::error::InferenceError;
use crate::model::columns::ModelColumns;
use crate::preprocessing::schema::{Categorical, PenguinFeatures};

/// Value written for every column the request did not produce.
pub const FILL_VALUE: f64 = 0.0;

/// Single-row table derived from one request, before alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<(String, f64)>,
}

impl FeatureFrame {
    /// Numeric fields keep their names. Each categorical field is replaced by
    /// one indicator column for its observed value.
    pub fn from_features(features: &PenguinFeatures) -> Self {
        let columns = vec![
            (
                PenguinFeatures::BILL_LENGTH_MM.to_string(),
                features.bill_length_mm,
            ),
            (
                PenguinFeatures::BILL_DEPTH_MM.to_string(),
                features.bill_depth_mm,
            ),
            (
                PenguinFeatures::FLIPPER_LENGTH_MM.to_string(),
                features.flipper_length_mm as f64,
            ),
            (
                PenguinFeatures::BODY_MASS_G.to_string(),
                features.body_mass_g as f64,
            ),
            (indicator_column(features.island), 1.0),
            (indicator_column(features.sex), 1.0),
        ];
        Self { columns }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| *value)
    }

    /// Re-expresses the frame against `schema`. Missing columns become
    /// [`FILL_VALUE`], extra columns are dropped, order follows the schema.
    pub fn reindex<'a>(&self, schema: &'a ModelColumns) -> Result<AlignedRow<'a>, InferenceError> {
        let values = schema
            .iter()
            .map(|column| {
                let value = self.get(column).unwrap_or(FILL_VALUE);
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(InferenceError::NonFiniteFeature {
                        column: column.clone(),
                    })
                }
            })
            .collect::<Result<Vec<f64>, _>>()?;

        Ok(AlignedRow {
            columns: schema,
            values: Array1::from_vec(values),
        })
    }
}

/// A numeric row laid out exactly like the model columns.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow<'a> {
    columns: &'a ModelColumns,
    values: Array1<f64>,
}

impl<'a> AlignedRow<'a> {
    pub fn columns(&self) -> &'a [String] {
        self.columns
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns.position(column).map(|i| self.values[i])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub fn indicator_column<T: Categorical>(value: T) -> String {
    format!("{}_{}", T::FIELD, value.as_str())
}

/// Expand-then-reindex in one step. The expansion alone only carries the
/// observed indicators, so it is never handed to a classifier.
pub fn transform<'a>(
    features: &PenguinFeatures,
    schema: &'a ModelColumns,
) -> Result<AlignedRow<'a>, InferenceError> {
    FeatureFrame::from_features(features).reindex(schema)
}
