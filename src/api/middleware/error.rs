use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Request-level error taxonomy. Every variant maps to a machine-readable
/// `error` kind plus a human-readable `message`, so the client can render an
/// actionable prompt instead of a dead-end toast.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    /// Unknown lifecycle action in the request body.
    InvalidAction(String),
    /// Generic stage mismatch for an otherwise well-formed action.
    InvalidState(String),
    /// Cancellation blocked because work has already started. Kept separate
    /// from InvalidState so the client shows the policy message verbatim.
    AntiFraudBlock(String),
    /// Start proof fields absent; the client must prompt for them.
    MissingProof(String),
    /// Start proof fields present but not usable (range, non-finite).
    InvalidProof(String),
    PaymentGateway(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    /// Machine-readable error kind, stable across message wording changes.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized => "unauthenticated",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::InvalidAction(_) => "invalid_action",
            ApiError::InvalidState(_) => "invalid_state",
            ApiError::AntiFraudBlock(_) => "anti_fraud_block",
            ApiError::MissingProof(_) => "missing_proof",
            ApiError::InvalidProof(_) => "invalid_proof",
            ApiError::PaymentGateway(_) => "payment_gateway_error",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_)
            | ApiError::InvalidAction(_)
            | ApiError::InvalidState(_)
            | ApiError::AntiFraudBlock(_)
            | ApiError::MissingProof(_)
            | ApiError::InvalidProof(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PaymentGateway(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized => None,
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::InvalidAction(msg)
            | ApiError::InvalidState(msg)
            | ApiError::AntiFraudBlock(msg)
            | ApiError::MissingProof(msg)
            | ApiError::InvalidProof(msg)
            | ApiError::PaymentGateway(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => Some(msg),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => write!(f, "{}: {}", self.kind(), msg),
            None => write!(f, "{}", self.kind()),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Internal detail never leaks to the client; it goes to the log.
        if let ApiError::Internal(msg) = &self {
            tracing::error!("internal error: {}", msg);
        }

        let status = self.status_code();
        let body = match (&self, self.message()) {
            (ApiError::Internal(_), _) => Json(json!({
                "error": self.kind(),
                "message": "Internal server error",
            })),
            (_, Some(msg)) => Json(json!({
                "error": self.kind(),
                "message": msg,
            })),
            (_, None) => Json(json!({
                "error": self.kind(),
            })),
        };

        (status, body).into_response()
    }
}

// Convert from sqlx errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                ApiError::Internal(format!("Database error: {}", db_err.message()))
            }
            _ => ApiError::Internal("Internal server error".to_string()),
        }
    }
}

// Convert from argon2 errors
impl From<argon2::password_hash::Error> for ApiError {
    fn from(_: argon2::password_hash::Error) -> Self {
        ApiError::Internal("Password hashing error".to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
