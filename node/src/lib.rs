//! DPoS ledger node.
//!
//! Wires the delegation engine to persistent storage: configuration loading,
//! structured logging, genesis seeding, and the block processor that applies
//! delegation transactions one at a time, in order, each in its own batch.

pub mod block_processor;
pub mod config;
pub mod error;
pub mod logging;

pub use block_processor::{BlockProcessor, BlockReceipt, DelegationTx, Receipt};
pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
