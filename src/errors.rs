//! Typed error hierarchy for the gate and the inventory data layer.
//!
//! Four enums cover the subsystems:
//! - `GateError`: endpoint configuration, transport and response failures
//! - `FormatError`: the two ways a gate response can be untrusted
//! - `StoreError`: durable key-value storage failures
//! - `InventoryError`: container catalog and edit failures

use std::path::PathBuf;
use thiserror::Error;

/// Why a gate response was rejected. Always resolves to the native app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("bad-segment-count")]
    BadSegmentCount { found: usize },

    #[error("bad-token")]
    BadToken,
}

/// Errors from a single gate round-trip.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Invalid gate endpoint '{endpoint}': {reason}")]
    Config { endpoint: String, reason: String },

    #[error("Gate request failed: {0}")]
    Network(String),

    #[error("Malformed gate response: {0}")]
    Format(#[from] FormatError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GateError {
    /// Only transport failures are worth another attempt; everything else is
    /// either a definitive answer or a build-time mistake.
    pub fn is_transient(&self) -> bool {
        matches!(self, GateError::Network(_))
    }
}

/// Errors from the durable key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access store at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store at {path} is not a valid JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Saved value under '{key}' could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Saved value under '{key}' could not be decoded; clear it before writing")]
    Undecodable { key: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Errors from the container inventory.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Container {id} not found")]
    ContainerNotFound { id: u32 },

    #[error("Container {id} already exists")]
    DuplicateId { id: u32 },

    #[error("Invalid container catalog: {0}")]
    InvalidCatalog(#[source] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
