//! Error types for the bookstore backend

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::routes::ApiResponse;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),

    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Insufficient role for this resource")]
    InsufficientRole,

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User '{0}' already exists")]
    UserAlreadyExists(String),

    #[error("Book '{0}' not found")]
    BookNotFound(String),

    #[error("Order '{0}' not found")]
    OrderNotFound(String),

    #[error("Insufficient stock for book '{0}'")]
    InsufficientStock(String),

    #[error("{0}")]
    Validation(String),

    #[error("Config file not found. Run 'bookstore init' first.")]
    ConfigNotFound,

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl Error {
    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingToken | Error::InvalidToken | Error::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Error::InsufficientRole => StatusCode::FORBIDDEN,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::BookNotFound(_) | Error::OrderNotFound(_) => StatusCode::NOT_FOUND,
            Error::UserAlreadyExists(_) | Error::InsufficientStock(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a client.
    ///
    /// Token failures all collapse to "Unauthorized" so callers cannot tell
    /// which verification step rejected them.
    pub fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::UNAUTHORIZED if !matches!(self, Error::InvalidCredentials) => {
                "Unauthorized".to_string()
            }
            StatusCode::FORBIDDEN => "Forbidden".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(ApiResponse::<()>::err(self.public_message()))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
