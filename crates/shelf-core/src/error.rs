//! Error types for list caches and their page sources.

use serde::{Deserialize, Serialize};

/// List and page-source errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    /// Transport failure (connect, timeout, body read).
    #[error("network error: {message}")]
    Network { message: String },

    /// The remote source reported a failure.
    #[error("backend error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Backend {
        status: Option<u16>,
        message: String,
    },

    /// A looked-up parent or document does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// The source answered with a payload that could not be decoded.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Search-term persistence failed.
    #[error("storage error: {message}")]
    Storage { message: String },
}

/// Discriminant of a [`ListError`], cheap to copy into cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Backend,
    NotFound,
    InvalidResponse,
    Config,
    Storage,
}

impl ListError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn backend(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Backend { .. } => ErrorKind::Backend,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            Self::Config { .. } => ErrorKind::Config,
            Self::Storage { .. } => ErrorKind::Storage,
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => 1,
            Self::Config { .. } => 2,

            // Network/transient
            Self::Network { .. } => 5,
            Self::Backend { .. } => 5,

            // Other
            Self::InvalidResponse { .. } => 6,
            Self::Storage { .. } => 7,
        }
    }

    /// Whether the error is worth retrying with the same request.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Backend { status, .. } => matches!(status, Some(429) | Some(500..=599)),
            _ => false,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Backend => "backend",
            Self::NotFound => "not_found",
            Self::InvalidResponse => "invalid_response",
            Self::Config => "config",
            Self::Storage => "storage",
        };
        f.write_str(name)
    }
}

impl From<std::io::Error> for ListError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }
}

/// Result type for list operations.
pub type ListResult<T> = Result<T, ListError>;
