//! Crate-wide error types.
//!
//! Every failure is terminal and reported at the point of detection; there is
//! no retry or partial state. Messages carry the offending path, section,
//! server, or service name so callers can report them verbatim.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by configuration loading, store merging, and compose
/// editing.
#[derive(Error, Debug)]
pub enum StackError {
    /// A required configuration file does not exist.
    #[error("missing configuration file '{filename}' in '{path}'")]
    MissingConfigFile { path: PathBuf, filename: String },

    /// The expected docker-compose document is absent.
    #[error("no docker-compose file found in '{0}'")]
    NoComposeFile(PathBuf),

    /// A top-level key of the configuration is not a recognized section.
    #[error("unknown configuration section '{0}' (expected 'global' or 'services')")]
    UnknownConfigSection(String),

    /// A query referenced a server never declared in the configuration.
    #[error("unknown server '{0}'")]
    UnknownServer(String),

    /// A compose edit referenced a service never created in the builder.
    #[error("unknown service '{0}'")]
    UnknownService(String),

    /// The service exists but has no volume list (never added, or cleared).
    #[error("service '{0}' has no volumes")]
    MissingServiceVolumes(String),

    /// Namespace entries were structurally invalid (not a mapping, or not
    /// representable as JSON data).
    #[error("invalid entries for namespace '{namespace}': {reason}")]
    InvalidEntries { namespace: String, reason: String },

    /// The document as a whole has the wrong shape.
    #[error("invalid configuration document '{filename}': {reason}")]
    InvalidDocument { filename: String, reason: String },

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for stackenv operations.
pub type Result<T> = std::result::Result<T, StackError>;
