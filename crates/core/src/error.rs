//! Domain error model.
//!
//! Every failure that crosses the core boundary is one of these variants. The
//! `Display` text of each variant is the only detail a caller ever sees, so it
//! must never carry store, crypto, or hashing internals.

use thiserror::Error;

/// Result type used across the auth core.
pub type AuthResult<T> = Result<T, AuthError>;

/// Coarse classification of an [`AuthError`], independent of any transport.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    Unauthenticated,
    PermissionDenied,
    AlreadyExists,
    NotFound,
    Internal,
}

/// Domain-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The inbound request carried no metadata at all.
    #[error("Missing context authentication metadata.")]
    MissingContextMetadata,

    /// Zero or more than one `authorization` value was present.
    #[error("Missing authorization header.")]
    MissingAuthHeader,

    #[error("Malformed authorization token.")]
    MalformedToken,

    #[error("Invalid authorization scheme provided.")]
    InvalidAuthorizationScheme,

    #[error("Invalid access token provided.")]
    InvalidToken,

    #[error("Expired access token provided.")]
    ExpiredToken,

    /// Identity could not be established.
    ///
    /// Deliberately generic: unknown email, wrong password and a vanished
    /// account all collapse into this one outcome.
    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Account has been deactivated.")]
    InactiveAccount,

    #[error("The password confirmation does not match.")]
    PasswordConfirmationMismatch,

    #[error("Email is already in use.")]
    EmailExists,

    #[error("Phone number is already in use.")]
    PhoneNumberExists,

    /// A uniqueness violation on a field the core does not know about.
    #[error("Resource already exists.")]
    AlreadyExists,

    #[error("Resource not found.")]
    NotFound,

    /// Rejected by request validation; the message is surfaced verbatim.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Internal server error.")]
    Internal,
}

impl AuthError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidArgument(_) | AuthError::PasswordConfirmationMismatch => {
                ErrorKind::InvalidArgument
            }
            AuthError::MissingContextMetadata
            | AuthError::MissingAuthHeader
            | AuthError::MalformedToken
            | AuthError::InvalidAuthorizationScheme
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::Unauthenticated => ErrorKind::Unauthenticated,
            AuthError::InactiveAccount => ErrorKind::PermissionDenied,
            AuthError::EmailExists | AuthError::PhoneNumberExists | AuthError::AlreadyExists => {
                ErrorKind::AlreadyExists
            }
            AuthError::NotFound => ErrorKind::NotFound,
            AuthError::Internal => ErrorKind::Internal,
        }
    }
}
