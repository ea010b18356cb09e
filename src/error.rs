//! Error types shared by the storage, catalog and progression layers.

use thiserror::Error;

/// A purchase (or a raw spend) that could not go through. State is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("no upgrade at catalog index {0}")]
    UnknownUpgrade(usize),
    #[error("upgrade {0} is still locked")]
    Locked(usize),
    #[error("insufficient hobbits: need {needed}, have {available}")]
    InsufficientResource { needed: u64, available: u64 },
}

/// Failure to obtain a usable upgrade catalog.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("catalog request failed: {0}")]
    Fetch(String),
    #[error("catalog request returned HTTP {0}")]
    Status(u16),
    #[error("catalog request timed out after {0} ms")]
    TimedOut(u32),
    #[error("catalog is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("catalog entry rejected: {0}")]
    Invalid(String),
}

/// Best-effort persistence failure. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("localStorage is unavailable")]
    Unavailable,
    #[error("failed to read {key:?}: {reason}")]
    Read { key: String, reason: String },
    #[error("failed to write {key:?}: {reason}")]
    Write { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse game config: {0}")]
    Parse(#[from] serde_json::Error),
}
