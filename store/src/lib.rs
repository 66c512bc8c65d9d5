//! Abstract ledger-state storage for the DPoS delegation ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The delegation engine depends only on the traits.
//!
//! Reads return `Ok(None)` for an absent key and `Err` only for a real
//! storage fault, so callers can always tell "not found" from "faulted".

pub mod error;
pub mod ledger;

pub use error::StoreError;
pub use ledger::{LedgerState, LedgerStore, LedgerView, WriteBatch};

/// A key/value pair read back from an index.
pub type Entry = (Vec<u8>, Vec<u8>);
