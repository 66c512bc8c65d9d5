//! Fundamental types for the DPoS delegation ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, gas amounts, the ledger index identifiers, and the shared error.

pub mod address;
pub mod error;
pub mod gas;
pub mod index;

pub use address::Address;
pub use error::DposError;
pub use gas::Gas;
pub use index::Index;
