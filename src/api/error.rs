use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use super::observability::ErrorCode;
use crate::services::ServiceError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    InvalidUrlParameter(String),

    ValidationError(String),

    EmailAlreadyUsed,

    EmailNotFound,

    IncorrectPassword,

    SameNewPassword,

    TokenMissingOrMalformed,

    TokenInvalid,

    NotImplemented(String),

    DatabaseError(String),

    InternalError(String),
}

impl ApiError {
    /// Machine-readable status carried in the response envelope.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidUrlParameter(_) => "invalid_url_parameter",
            Self::ValidationError(_) => "invalid_request",
            Self::EmailAlreadyUsed => "email_already_used",
            Self::EmailNotFound => "email_not_found",
            Self::IncorrectPassword => "incorrect_password",
            Self::SameNewPassword => "same_new_password",
            Self::TokenMissingOrMalformed => "token_missing_or_malformed",
            Self::TokenInvalid => "token_invalid",
            Self::NotImplemented(_) => "not_implemented",
            Self::DatabaseError(_) | Self::InternalError(_) => "internal_server_error",
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidUrlParameter(_)
            | Self::ValidationError(_)
            | Self::EmailAlreadyUsed
            | Self::EmailNotFound
            | Self::IncorrectPassword
            | Self::SameNewPassword => StatusCode::BAD_REQUEST,
            Self::TokenMissingOrMalformed | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::InvalidUrlParameter(msg) => write!(f, "Invalid URL parameter: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::EmailAlreadyUsed => write!(f, "Email already used"),
            Self::EmailNotFound => write!(f, "Email not found"),
            Self::IncorrectPassword => write!(f, "Incorrect password"),
            Self::SameNewPassword => write!(f, "New password must differ from the current one"),
            Self::TokenMissingOrMalformed => write!(f, "Token missing or malformed"),
            Self::TokenInvalid => write!(f, "Token invalid"),
            Self::NotImplemented(msg) => write!(f, "Not implemented: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                "A database error occurred".to_string()
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            Self::NotFound(msg)
            | Self::InvalidUrlParameter(msg)
            | Self::ValidationError(msg)
            | Self::NotImplemented(msg) => msg.clone(),
            other => other.to_string(),
        };

        let code = self.code();
        let mut response =
            (self.status(), Json(ApiResponse::<()>::error(code, message))).into_response();
        response.extensions_mut().insert(ErrorCode(code));
        response
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound => Self::NotFound("Resource not found".to_string()),
            ServiceError::EmailAlreadyUsed => Self::EmailAlreadyUsed,
            ServiceError::IncorrectPassword => Self::IncorrectPassword,
            ServiceError::TokenInvalid => Self::TokenInvalid,
            ServiceError::SameNewPassword => Self::SameNewPassword,
            ServiceError::SearchDisabled => {
                Self::NotImplemented("Search is not enabled on this server".to_string())
            }
            ServiceError::Database(e) => Self::DatabaseError(e.to_string()),
            other @ (ServiceError::Hash(_) | ServiceError::Token(_) | ServiceError::Search(_)) => {
                Self::InternalError(other.to_string())
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidUrlParameter(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}
