//! Consistent error responses.
//!
//! Every failure leaves the API as one of:
//! - `{"detail": "..."}` (auth, not found, malformed body, server errors)
//! - `{"field": ["message", ...]}` (validation)

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use fitclub_core::{DomainError, FieldErrors};
use fitclub_infra::StoreError;

pub const NOT_FOUND: &str = "Not found.";
pub const INVALID_PAGE: &str = "Invalid page.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized: {detail}")]
    Unauthorized {
        detail: &'static str,
        code: Option<&'static str>,
    },

    #[error("JSON parse error - {0}")]
    MalformedJson(String),

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_authenticated() -> Self {
        ApiError::Unauthorized {
            detail: "Authentication credentials were not provided.",
            code: Some("not_authenticated"),
        }
    }

    pub fn bad_credentials() -> Self {
        ApiError::Unauthorized {
            detail: "No active account found with the given credentials",
            code: Some("no_active_account"),
        }
    }

    /// A bearer token on a protected route failed validation.
    pub fn bearer_not_valid() -> Self {
        ApiError::Unauthorized {
            detail: "Given token not valid for any token type",
            code: Some("token_not_valid"),
        }
    }

    /// A token submitted to the refresh/verify endpoints failed validation.
    pub fn token_not_valid() -> Self {
        ApiError::Unauthorized {
            detail: "Token is invalid or expired",
            code: Some("token_not_valid"),
        }
    }

    pub fn user_not_found() -> Self {
        ApiError::Unauthorized {
            detail: "User not found",
            code: Some("user_not_found"),
        }
    }

    pub fn user_inactive() -> Self {
        ApiError::Unauthorized {
            detail: "User is inactive",
            code: Some("user_inactive"),
        }
    }

    pub fn not_found() -> Self {
        ApiError::NotFound(NOT_FOUND)
    }

    pub fn invalid_page() -> Self {
        ApiError::NotFound(INVALID_PAGE)
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(FieldErrors::single(field, message))
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidId(msg) => {
                tracing::debug!(%msg, "unparseable path id");
                ApiError::not_found()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { field, message } => ApiError::field(field, message),
            StoreError::MissingReference { field } => {
                ApiError::field(field, "Invalid pk - object does not exist.")
            }
            StoreError::Database(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized { detail, code } => {
                tracing::debug!(detail, "authentication failed");
                let body = match code {
                    Some(code) => json!({ "detail": detail, "code": code }),
                    None => json!({ "detail": detail }),
                };
                let mut response = (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static("Bearer realm=\"api\""),
                );
                response
            }
            ApiError::MalformedJson(msg) => json_detail(
                StatusCode::BAD_REQUEST,
                format!("JSON parse error - {msg}"),
            ),
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, axum::Json(errors)).into_response()
            }
            ApiError::NotFound(detail) => json_detail(StatusCode::NOT_FOUND, detail),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                json_detail(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A server error occurred.",
                )
            }
        }
    }
}

pub fn json_detail(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "detail": detail.into() }))).into_response()
}
