use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use validator::ValidationErrors;

use crate::authz::DeniedKind;

/// ApiError
///
/// Application-level error type for HTTP handlers. Every request outcome that is not
/// a success maps onto exactly one of these variants; nothing is signalled through
/// panics or collapsed into a generic failure. Implements [`IntoResponse`] so handlers
/// can propagate with `?` and still produce consistent JSON error bodies.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing input fields. Carries a field -> messages map that is
    /// returned verbatim as the 400 body.
    #[error("validation failed")]
    Validation(BTreeMap<String, Vec<String>>),

    /// No identity could be resolved for the request (missing, invalid, or expired
    /// credentials, or a token whose user no longer exists).
    #[error("{0}")]
    AuthenticationRequired(String),

    /// The identity is known but the action is disallowed. The kind distinguishes
    /// the ownership denial from the admin-only denial so the 403 bodies differ.
    #[error("permission denied")]
    Denied(DeniedKind),

    /// The target object is absent, or sits outside the caller's visible scope.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A database failure. Logged in full, surfaced to the client sanitized.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<DeniedKind> for ApiError {
    fn from(kind: DeniedKind) -> Self {
        ApiError::Denied(kind)
    }
}

impl From<ValidationErrors> for ApiError {
    /// Flattens `validator`'s nested error structure into the field -> messages map
    /// the API returns for 400 responses.
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value for {}", field))
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        ApiError::Validation(fields)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // 400: the body *is* the field error map.
            ApiError::Validation(fields) => (StatusCode::BAD_REQUEST, json!(fields)),

            ApiError::AuthenticationRequired(detail) => {
                (StatusCode::UNAUTHORIZED, json!({ "detail": detail }))
            }

            // Both denials are 403, but the payloads are deliberately distinguishable:
            // the verification guard has its own message, ownership gets the generic one.
            ApiError::Denied(DeniedKind::Ownership) => (
                StatusCode::FORBIDDEN,
                json!({ "detail": "You do not have permission to perform this action." }),
            ),
            ApiError::Denied(DeniedKind::AdminOnly) => (
                StatusCode::FORBIDDEN,
                json!({ "status": "Only admin users can verify projects" }),
            ),

            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "detail": "Not found." })),

            ApiError::Database(e) => {
                tracing::error!(error = ?e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": "An internal error occurred." }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
