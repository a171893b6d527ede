use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::preprocessing::schema::FieldViolation;

/// Detail string returned for any 500 whose cause is kept server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Failures while reading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Failures while loading the artifact bundle. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Artifact not found at path: {0}")]
    NotFound(String),

    #[error("Failed to read artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode artifact: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid artifact: {0}")]
    Invalid(String),
}

/// Failures while aligning a request to the model columns or running the classifier.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("Input shape mismatch: expected {expected} features, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("Feature '{column}' is not a finite number")]
    NonFiniteFeature { column: String },

    #[error("Classifier produced a non-finite score for class {class}")]
    NonFiniteScore { class: usize },

    #[error("Classifier produced no scores")]
    EmptyScores,

    #[error("Predicted class index {0} is not known to the label encoder")]
    UnknownClass(usize),

    #[error("Malformed tree {tree}: {reason}")]
    MalformedTree { tree: usize, reason: String },
}

/// Error returned by HTTP handlers. Conversion to a status code happens only here.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request validation failed with {} error(s)", .detail.len())]
    Validation {
        detail: Vec<FieldViolation>,
        body: Value,
    },

    #[error("{detail}")]
    Http { status: StatusCode, detail: String },

    #[error("{}", INTERNAL_ERROR_MESSAGE)]
    Internal,
}

impl ApiError {
    /// Maps a transform/predict failure to a 500. The message is only passed
    /// through when `expose_detail` is set.
    pub fn from_inference(err: &InferenceError, expose_detail: bool) -> Self {
        if expose_detail {
            ApiError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: err.to_string(),
            }
        } else {
            ApiError::Internal
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Http { status, .. } => *status,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation { detail, body } => json!({
                "error": "validation_error",
                "detail": detail,
                "body": body,
            }),
            ApiError::Http { detail, .. } => json!({
                "error": "http_error",
                "detail": detail,
            }),
            ApiError::Internal => json!({
                "error": "internal_server_error",
                "detail": INTERNAL_ERROR_MESSAGE,
            }),
        };

        (status, Json(body)).into_response()
    }
}
