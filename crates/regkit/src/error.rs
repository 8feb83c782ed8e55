//! Error types for registry operations.

use serde::Serialize;
use thiserror::Error;

/// Registry access errors.
#[derive(Debug, Error)]
pub enum RegError {
    #[error("Invalid registry key path '{0}'")]
    InvalidPath(String),

    #[error("Registry key '{0}' not found")]
    KeyNotFound(String),

    #[error("Value not found: '{value}' under '{key}'")]
    ValueNotFound { key: String, value: String },

    #[error("Access denied to registry key '{0}'")]
    AccessDenied(String),

    #[error("Registry error at '{path}': {message} (code {code})")]
    Os {
        path: String,
        code: u32,
        message: String,
    },

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// Coarse classification of a [`RegError`], reported to callers next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidPath,
    NotFound,
    AccessDenied,
    OsFailure,
    Snapshot,
}

impl RegError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegError::InvalidPath(_) => ErrorKind::InvalidPath,
            RegError::KeyNotFound(_) | RegError::ValueNotFound { .. } => ErrorKind::NotFound,
            RegError::AccessDenied(_) => ErrorKind::AccessDenied,
            RegError::Os { .. } => ErrorKind::OsFailure,
            RegError::Snapshot(_) => ErrorKind::Snapshot,
        }
    }

    /// Create an Os error.
    pub fn os(path: impl Into<String>, code: u32, message: impl Into<String>) -> Self {
        RegError::Os {
            path: path.into(),
            code,
            message: message.into(),
        }
    }

    /// Create a ValueNotFound error.
    pub fn value_not_found(key: impl Into<String>, value: impl Into<String>) -> Self {
        RegError::ValueNotFound {
            key: key.into(),
            value: value.into(),
        }
    }
}

pub type RegResult<T> = Result<T, RegError>;
