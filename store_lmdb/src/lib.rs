//! LMDB storage backend for the DPoS delegation ledger.
//!
//! Implements the `dpos-store` ledger traits using the `heed` LMDB bindings.
//! Each ledger index maps to one named LMDB database within a single
//! environment, so one write transaction covers all three indexes.

pub mod environment;
pub mod error;
pub mod integrity;
pub mod ledger;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
pub use ledger::{LmdbView, LmdbWriteBatch};
