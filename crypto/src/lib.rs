//! Cryptographic primitives for the DPoS delegation ledger.
//!
//! - **Blake2b** for hashing (address checksums, key-to-address derivation)
//! - Address encoding with `dpos_` prefix and base32 + checksum

pub mod address;
pub mod hash;

pub use address::{derive_address, encode_address, parse_address, validate_address, AddressError};
pub use hash::blake2b_256;
