//! Error taxonomy shared by the matching core and its HTTP adapters.
//!
//! Every variant maps to a stable machine-readable code so clients can
//! branch on `error` instead of parsing `message`.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LumeError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Premium required: {0}")]
    PremiumRequired(String),

    #[error("Daily view limit reached, resets at {resets_at}")]
    QuotaExceeded { resets_at: DateTime<Utc> },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, LumeError>;

impl From<validator::ValidationErrors> for LumeError {
    fn from(errors: validator::ValidationErrors) -> Self {
        LumeError::Validation(errors.to_string())
    }
}

impl LumeError {
    /// Stable code surfaced to clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::PremiumRequired(_) => "PREMIUM_REQUIRED",
            Self::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_)
            | Self::Migrate(_)
            | Self::Cache(_)
            | Self::Http(_)
            | Self::Serialization(_)
            | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True for failures the caller can fix by changing the request
    pub fn is_user_correctable(&self) -> bool {
        !matches!(self.code(), "INTERNAL_ERROR")
    }

    fn public_message(&self) -> String {
        if self.is_user_correctable() {
            self.to_string()
        } else {
            // Don't leak infrastructure details
            "An internal error occurred".to_string()
        }
    }

    fn resets_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::QuotaExceeded { resets_at } => Some(*resets_at),
            _ => None,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(rename = "resetsAt", skip_serializing_if = "Option::is_none", default)]
    pub resets_at: Option<DateTime<Utc>>,
}

impl ResponseError for LumeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::FORBIDDEN,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::PremiumRequired(_) => StatusCode::PAYMENT_REQUIRED,
            Self::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_user_correctable() {
            tracing::info!(code = self.code(), "Request rejected: {}", self);
        } else {
            tracing::error!(error = ?self, "Internal error");
        }

        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.public_message(),
            status_code: status.as_u16(),
            resets_at: self.resets_at(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = vec![
            LumeError::NotFound("x".into()),
            LumeError::Conflict("x".into()),
            LumeError::Unauthorized("x".into()),
            LumeError::Unauthenticated("x".into()),
            LumeError::PremiumRequired("x".into()),
            LumeError::QuotaExceeded { resets_at: Utc::now() },
            LumeError::Validation("x".into()),
            LumeError::Internal("x".into()),
        ];

        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(LumeError::NotFound("m".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(LumeError::Conflict("m".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            LumeError::PremiumRequired("m".into()).status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            LumeError::QuotaExceeded { resets_at: Utc::now() }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_internal_message_not_leaked() {
        let err = LumeError::Internal("connection string postgres://secret".into());
        assert!(!err.is_user_correctable());
        assert_eq!(err.public_message(), "An internal error occurred");
    }
}
