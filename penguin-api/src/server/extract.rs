use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;
use crate::observability::{self, Outcome};
use crate::preprocessing::schema::{FieldViolation, ValidateBody};

/// JSON body extractor that runs [`ValidateBody`] before the handler.
///
/// Any violation becomes a 422 carrying every field error and the raw body,
/// so handlers only ever see well-formed input.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: ValidateBody + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            warn!(status = %rejection.status(), "Failed to buffer request body");
            observability::record_outcome(Outcome::RejectedBody);
            ApiError::Http {
                status: rejection.status(),
                detail: rejection.body_text(),
            }
        })?;

        let result = match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => T::validate_body(&body)
                .map_err(|detail| ApiError::Validation { detail, body }),
            Err(err) => Err(ApiError::Validation {
                detail: vec![FieldViolation::invalid_json(&err.to_string())],
                body: Value::String(String::from_utf8_lossy(&bytes).into_owned()),
            }),
        };

        if let Err(ApiError::Validation { detail, .. }) = &result {
            warn!(violations = detail.len(), "Rejected invalid request body");
            observability::record_outcome(Outcome::ValidationError);
        }
        result.map(ValidatedJson)
    }
}
