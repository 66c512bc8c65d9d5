//! Nullable infrastructure for deterministic testing.
//!
//! Storage is abstracted behind the `dpos-store` traits. This crate provides
//! a test-friendly implementation that:
//! - Keeps every index in memory and never touches the filesystem
//! - Honors the same batch/commit semantics as the persistent backend
//! - Can be told to fail specific operations, to exercise fault propagation
//!
//! Usage: swap the LMDB store for [`NullLedgerStore`] in tests.

pub mod store;

pub use store::{FaultOp, NullLedgerStore, NullView, NullWriteBatch};
