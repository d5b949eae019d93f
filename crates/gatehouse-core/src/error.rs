//! Unified application error types for Gatehouse.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the `?` operator. The [`ErrorKind`] decides the
//! HTTP status a failure surfaces with.

use std::fmt;
use thiserror::Error;

/// Error categories used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Malformed or missing fields, weak password.
    InvalidInput,
    /// An account with the given email already exists.
    AlreadyExists,
    /// A single-use code did not match (unknown or already consumed).
    InvalidCode,
    /// The addressed account does not exist.
    NotFound,
    /// Password mismatch or missing session.
    Unauthorized,
    /// A bearer token failed verification.
    InvalidToken,
    /// A token could not be decoded (signature or structure).
    MalformedToken,
    /// A token predates the user's current credential epoch.
    TokenExpired,
    /// A valid token names a user that no longer exists.
    UserNotFound,
    /// Required configuration is missing or invalid.
    Configuration,
    /// Credential store failure.
    Database,
    /// Decision cache failure.
    Cache,
    /// Task dispatch failure.
    Dispatch,
    /// JSON (de)serialization failure.
    Serialization,
    /// Any other internal failure.
    Internal,
}

impl ErrorKind {
    /// HTTP status code for this kind of failure.
    ///
    /// Business-rule failures are uniformly `400`, credential failures `401`,
    /// and everything infrastructural `500`.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput | Self::AlreadyExists | Self::InvalidCode | Self::NotFound => 400,
            Self::Unauthorized
            | Self::InvalidToken
            | Self::MalformedToken
            | Self::TokenExpired
            | Self::UserNotFound => 401,
            Self::Configuration
            | Self::Database
            | Self::Cache
            | Self::Dispatch
            | Self::Serialization
            | Self::Internal => 500,
        }
    }

    /// Whether this kind is an infrastructure failure rather than a caller error.
    pub fn is_infrastructure(&self) -> bool {
        self.status_code() >= 500
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "INVALID_INPUT"),
            Self::AlreadyExists => write!(f, "ALREADY_EXISTS"),
            Self::InvalidCode => write!(f, "INVALID_CODE"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::InvalidToken => write!(f, "INVALID_TOKEN"),
            Self::MalformedToken => write!(f, "MALFORMED_TOKEN"),
            Self::TokenExpired => write!(f, "TOKEN_EXPIRED"),
            Self::UserNotFound => write!(f, "USER_NOT_FOUND"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Database => write!(f, "DATABASE"),
            Self::Cache => write!(f, "CACHE"),
            Self::Dispatch => write!(f, "DISPATCH"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Gatehouse.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message, safe to return to clients.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// Create an already-exists error.
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    /// Create an invalid-code error.
    pub fn invalid_code(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCode, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create an invalid-token error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidToken, message)
    }

    /// Create a malformed-token error.
    pub fn malformed_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedToken, message)
    }

    /// Create a token-expired error.
    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenExpired, message)
    }

    /// Create a user-not-found error.
    pub fn user_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UserNotFound, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a dispatch error.
    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Dispatch, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns `true` if the error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
