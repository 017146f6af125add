//! Platform-wide error type.

use thiserror::Error;

/// Errors produced anywhere in the platform.
#[derive(Debug, Error)]
pub enum EjareError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Token signature did not validate or the token has expired.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Notification error: {0}")]
    Notify(String),
}

impl EjareError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, EjareError>;
