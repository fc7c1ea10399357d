use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pitchdeck_core::error::CoreError;
use pitchdeck_db::DbError;
use pitchdeck_pipeline::ServiceError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`ServiceError`] for failures
/// of the deck service, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `pitchdeck_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An error from the deck service or one of its collaborators.
    #[error(transparent)]
    Service(ServiceError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body exceeds the configured limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(core) => AppError::Core(core),
            other => AppError::Service(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::Service(err) => classify_service_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Classify a service error into an HTTP status, error code, and message.
///
/// A record store `NotFound` maps to 404; everything else is a collaborator
/// failure and maps to 500 with a sanitized message.
fn classify_service_error(err: &ServiceError) -> (StatusCode, &'static str, String) {
    match err {
        ServiceError::Core(core) => classify_core_error(core),
        ServiceError::Db(DbError::NotFound(id)) => {
            classify_core_error(&CoreError::deck_not_found(id))
        }
        other => {
            tracing::error!(error = %other, "Deck service error");
            internal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_core_errors_unwrap_into_core() {
        let err: AppError = ServiceError::Core(CoreError::Forbidden("no".into())).into();
        assert!(matches!(err, AppError::Core(CoreError::Forbidden(_))));
    }

    #[test]
    fn statuses_follow_the_error_kind() {
        let cases = [
            (AppError::Core(CoreError::deck_not_found("x")), StatusCode::NOT_FOUND),
            (AppError::Core(CoreError::Validation("bad".into())), StatusCode::BAD_REQUEST),
            (AppError::Core(CoreError::Unauthorized("who".into())), StatusCode::UNAUTHORIZED),
            (
                AppError::Service(ServiceError::Db(DbError::NotFound(uuid::Uuid::nil()))),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Service(ServiceError::Db(DbError::Api {
                    status: 503,
                    body: "down".into(),
                })),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::PayloadTooLarge("big".into()), StatusCode::PAYLOAD_TOO_LARGE),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
