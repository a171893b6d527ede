use crate::error::ApiError;
use crate::observability::{self, Outcome};
use crate::server::{handlers, types::AppState};
use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route("/predict", post(handlers::predict));

    with_boundary(router).with_state(state)
}

/// Request tracing plus the outermost panic boundary. Layers added later wrap
/// earlier ones, so the panic handler sees everything.
pub(crate) fn with_boundary<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(panic = message, "Request handler panicked");
    observability::record_outcome(Outcome::InternalError);

    ApiError::Internal.into_response()
}
