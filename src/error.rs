//! Error types for the configuration store.

use crate::value::ValueKind;
use thiserror::Error;

/// Errors reported by store, backend, loader, and ingestion operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration path not found: {0}")]
    NotFound(String),

    #[error("Type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("Structural conflict at {0}: node has children and cannot hold a value")]
    StructuralConflict(String),

    #[error("Out of resources: {0}")]
    OutOfMemory(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Document encoding error: {0}")]
    Encoding(String),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Nesting exceeds {limit} levels at {path}")]
    DepthExceeded { path: String, limit: usize },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether this error means the addressed path does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Whether a failure during ingestion of one element must abort the
    /// remaining sibling traversal. Everything else skips the element.
    pub fn is_hard_ingest_failure(&self) -> bool {
        matches!(
            self,
            StoreError::DepthExceeded { .. } | StoreError::OutOfMemory(_)
        )
    }
}

impl From<config::ConfigError> for StoreError {
    fn from(err: config::ConfigError) -> Self {
        StoreError::Settings(err.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
