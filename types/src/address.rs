//! Account address: a fixed 32-byte identifier.
//!
//! The human-readable `dpos_` form is produced and parsed by `dpos-crypto`;
//! this type only carries the raw bytes and compares them byte-for-byte.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DposError;

/// A 32-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address([u8; 32]);

impl Address {
    /// Length of an address in bytes.
    pub const LEN: usize = 32;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build an address from a byte slice read back from storage.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DposError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| DposError::InvalidAddressLength {
                expected: Self::LEN,
                got: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

// Inline hex encoding to avoid adding the `hex` crate as a dependency of types.
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_accepts_exact_length() {
        let addr = Address::from_slice(&[7u8; 32]).unwrap();
        assert_eq!(addr, Address::new([7u8; 32]));
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        let err = Address::from_slice(&[7u8; 31]).unwrap_err();
        assert_eq!(
            err,
            DposError::InvalidAddressLength {
                expected: 32,
                got: 31
            }
        );
        assert!(Address::from_slice(&[0u8; 64]).is_err());
    }

    #[test]
    fn equality_is_byte_exact() {
        let mut bytes = [1u8; 32];
        let a = Address::new(bytes);
        bytes[31] = 2;
        let b = Address::new(bytes);
        assert_ne!(a, b);
        assert_eq!(a, Address::new([1u8; 32]));
    }

    #[test]
    fn display_is_full_hex() {
        let addr = Address::new([0xab; 32]);
        assert_eq!(addr.to_string(), "ab".repeat(32));
        assert_eq!(format!("{:?}", addr), "Address(abababab)");
    }
}
