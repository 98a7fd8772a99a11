//! Error types for the acquisition pipeline and the preset store
//!
//! Scan errors never leave the scanner: they are folded into scanner states.
//! Preset errors are returned to the presentation layer as-is.

use thiserror::Error;

/// A foreign-memory read that did not return the requested bytes.
///
/// Process gone, access denied, unmapped page and short read all end up here;
/// callers only need to know the read can be retried later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("failed to read {size} bytes at {address:#x}")]
pub struct ReadFailed {
    pub address: u64,
    pub size: usize,
}

/// Reasons the scanner could not produce a snapshot this tick
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("game process is not available")]
    ProcessUnavailable,

    #[error("memory signature `{0}` could not be resolved")]
    SignatureUnresolved(String),

    #[error(transparent)]
    ReadFailed(#[from] ReadFailed),
}

/// Errors from preset store operations
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("preset payload is malformed: {0}")]
    ImportMalformed(String),

    #[error("no preset named `{0}`")]
    NotFound(String),

    #[error("no preset is active")]
    NoActivePreset,

    #[error("no actor with id {0:08X}")]
    UnknownActor(u32),

    #[error("filter index {index} out of range (preset has {len} filters)")]
    FilterIndex { index: usize, len: usize },

    #[error("failed to encode preset: {0}")]
    Encode(#[from] serde_json::Error),
}
