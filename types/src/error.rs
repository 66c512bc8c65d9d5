//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for values built from untrusted bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DposError {
    #[error("invalid address: expected {expected} bytes, got {got}")]
    InvalidAddressLength { expected: usize, got: usize },

    #[error("invalid index name: {0}")]
    InvalidIndex(String),
}
