use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::episodes::EpisodeError;
use crate::services::search::SearchError;
use crate::services::subscriptions::SubscriptionError;
use crate::services::users::UserError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    /// A failed form field, reported with the field name so clients can
    /// attach the message to the right input.
    FormError { field: String, message: String },

    Conflict(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ExternalApiError { service, message } => {
                write!(f, "{service} error: {message}")
            }
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::FormError { field, message } => write!(f, "{field}: {message}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{service} API error: {message}");
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{service} service is unavailable"),
                )
            }
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::FormError { field, message } => {
                (StatusCode::BAD_REQUEST, format!("{field}: {message}"))
            }
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NameTaken | UserError::MailTaken => Self::Conflict(err.to_string()),
            UserError::NoSuchUser => Self::NotFound(err.to_string()),
            UserError::WrongPassword | UserError::WrongRecoveryKey => {
                Self::Unauthorized(err.to_string())
            }
            UserError::PasswordMismatch => Self::ValidationError(err.to_string()),
            UserError::Validation { field, message } => Self::FormError {
                field: field.to_string(),
                message,
            },
            UserError::Mail(e) => Self::ExternalApiError {
                service: "mail".to_string(),
                message: e.to_string(),
            },
            UserError::Database(msg) | UserError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<SubscriptionError> for ApiError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::ShowMissing | SubscriptionError::IllegalShowId => {
                Self::ValidationError(err.to_string())
            }
            SubscriptionError::ShowNotFound | SubscriptionError::NotSubscribed => {
                Self::NotFound(err.to_string())
            }
            SubscriptionError::CatalogUnavailable(message) => Self::ExternalApiError {
                service: "catalog".to_string(),
                message,
            },
            SubscriptionError::Database(msg) => Self::InternalError(msg),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::TermMissing => Self::ValidationError(err.to_string()),
            SearchError::CatalogUnavailable(message) => Self::ExternalApiError {
                service: "catalog".to_string(),
                message,
            },
        }
    }
}

impl From<EpisodeError> for ApiError {
    fn from(err: EpisodeError) -> Self {
        match err {
            EpisodeError::Database(msg) => Self::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
}
