//! Error types for Basee operations.
//!
//! This module defines [`BaseeError`], the primary error type used throughout
//! the library, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `BaseeError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `BaseeError::Other`) for unexpected errors
//! - Remote license/version checks never surface transport errors to callers;
//!   they fail open and log instead

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Basee operations.
#[derive(Debug, Error)]
pub enum BaseeError {
    /// A template namespace collides with the host's reserved layout variables.
    #[error("The \"{namespace}:\" namespace is reserved")]
    ReservedNamespace { namespace: String },

    /// Migration directory not found or unreadable.
    #[error("Migration path {path:?} is not readable or does not exist")]
    MigrationPathUnreadable { path: PathBuf },

    /// A pending migration version has no registered handler.
    #[error("No migration registered for version {version}")]
    MigrationNotRegistered { version: String },

    /// Hook template is missing required keys or carries unknown ones.
    #[error("Invalid hook template: {message}")]
    InvalidHookTemplate { message: String },

    /// One or more settings rows could not be upserted.
    #[error("Failed to save settings for keys: {}", keys.join(", "))]
    SettingsSaveFailed { keys: Vec<String> },

    /// The cache driver rejected an operation.
    #[error("Cache driver error: {message}")]
    CacheDriver { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Basee operations.
pub type Result<T> = std::result::Result<T, BaseeError>;
