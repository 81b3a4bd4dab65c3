//! # Error Handling
//!
//! This module defines the centralized error type for `ansible-template-render`.
//! It uses `thiserror` to build one `Error` enum covering every failure the
//! preparation pipeline can report, and a `Result<T>` alias used throughout
//! the library.
//!
//! The variants follow the pipeline's error taxonomy:
//!
//! - **`NotFound`**: a playbook, inventory, role tasks directory or meta file
//!   does not exist.
//! - **`Parse`**: a document exists but its content is malformed.
//! - **`Internal`**: copy, mkdir or other workspace bookkeeping failed.
//! - **`ExecutionFailure`**: an external Ansible binary exited unsuccessfully.
//!
//! Whether an error is fatal depends on where it is raised. A `NotFound` or
//! `Parse` on a role's meta document is downgraded to a warning by the role
//! resolver, while the same error on a playbook aborts that playbook's run.

use thiserror::Error;

/// Main error type for ansible-template-render operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required file or directory does not exist.
    #[error("{what} not found: {path}")]
    NotFound {
        /// What was being looked up ("playbook", "inventory", ...)
        what: String,
        path: String,
    },

    /// A document could not be parsed or has an unusable shape.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// The run configuration is invalid.
    ///
    /// Includes an optional hint about how to fix the configuration.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Config {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// Workspace bookkeeping failed (copy, mkdir, write).
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// An external command exited with a failure status.
    #[error("Command failed: {command} ({status})")]
    ExecutionFailure { command: String, status: String },

    /// One or more playbooks in a batch failed.
    #[error("{failed} of {total} playbooks failed")]
    BatchFailed { failed: usize, total: usize },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Shorthand for building a `NotFound` error.
    pub fn not_found(what: &str, path: impl std::fmt::Display) -> Self {
        Error::NotFound {
            what: what.to_string(),
            path: path.to_string(),
        }
    }

    /// Shorthand for building an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error means "the thing is missing".
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
