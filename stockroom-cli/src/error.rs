//! Error types for stockroom-cli

use thiserror::Error;

/// Shown when a stored session has been idle too long
pub const SESSION_EXPIRED_NOTICE: &str = "Session expired. Please log in again.";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Server answered 401 (wrong or missing API key)
    #[error("Access not authorized")]
    Unauthorized,

    /// Any other non-success answer, with the server's `error` detail
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Could not reach the server: {0}")]
    Connection(#[from] reqwest::Error),

    /// Success status but a body that is not the expected JSON
    #[error("Unexpected response from server: {0}")]
    InvalidResponse(String),

    /// Session role may not modify records
    #[error("Only a master user can create, edit or delete materials")]
    Forbidden,

    #[error("{}", SESSION_EXPIRED_NOTICE)]
    SessionExpired,

    #[error("Not logged in. Run `stockroom login` first.")]
    NotLoggedIn,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
