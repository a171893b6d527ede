pub mod config;
pub mod error;
pub mod model;
pub mod observability;
pub mod preprocessing;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

// Re-export common types
pub use error::{ApiError, ArtifactError, InferenceError};
pub use model::artifact::ArtifactBundle;
pub use model::predictor::{Prediction, Predictor};
pub use preprocessing::schema::PenguinFeatures;
