//! Human-readable address encoding.
//!
//! Address format: `dpos_` + base32(address, 52 chars) + base32(checksum, 8 chars)
//!
//! Checksum: first 5 bytes of Blake2b-256(address bytes).
//! Base32 alphabet: `13456789abcdefghijkmnopqrstuwxyz` (avoids ambiguous chars).
//! Total address length: 5 (prefix) + 52 + 8 = 65 characters.

use dpos_types::Address;
use thiserror::Error;

/// Base32 alphabet (32 chars, avoids visually ambiguous 0/O, 2/Z, l/I, v).
const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = BASE32_ALPHABET;
    let mut i = 0;
    while i < 32 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Prefix for all ledger addresses.
pub const PREFIX: &str = "dpos_";
/// Expected length of the encoded part (after the prefix): 52 address + 8 checksum.
const ENCODED_LEN: usize = 60;
/// Number of base32 characters for the address bytes (256 bits → ceil(256/5) = 52).
const ADDRESS_CHARS: usize = 52;
/// Number of checksum bytes appended to the encoding.
const CHECKSUM_LEN: usize = 5;

/// Reasons an address string fails to parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must start with {PREFIX}")]
    BadPrefix,

    #[error("address body must be {ENCODED_LEN} characters, got {0}")]
    BadLength(usize),

    #[error("address contains a character outside the base32 alphabet")]
    BadCharacter,

    #[error("address checksum mismatch")]
    BadChecksum,
}

/// Encode a byte slice as base32 using the ledger alphabet.
fn encode_base32(bytes: &[u8]) -> String {
    let total_bits = bytes.len() * 8;
    let num_chars = total_bits.div_ceil(5);
    let mut result = String::with_capacity(num_chars);

    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let idx = ((buffer >> bits_in_buffer) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[idx] as char);
        }
    }
    // Remaining bits (padded with zeros on the right).
    if bits_in_buffer > 0 {
        let idx = ((buffer << (5 - bits_in_buffer)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[idx] as char);
    }

    result
}

/// Decode a base32 string into a fixed-size byte array.
///
/// Trailing pad bits must be zero so every address has exactly one encoding.
fn decode_base32_fixed<const N: usize>(s: &str) -> Result<[u8; N], AddressError> {
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;
    let mut result = [0u8; N];
    let mut pos = 0;

    for c in s.bytes() {
        if c >= 128 {
            return Err(AddressError::BadCharacter);
        }
        let val = BASE32_DECODE[c as usize];
        if val == 0xFF {
            return Err(AddressError::BadCharacter);
        }
        buffer = (buffer << 5) | val as u64;
        bits_in_buffer += 5;
        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            if pos == N {
                return Err(AddressError::BadLength(s.len()));
            }
            result[pos] = (buffer >> bits_in_buffer) as u8;
            pos += 1;
        }
    }

    if pos < N {
        return Err(AddressError::BadLength(s.len()));
    }
    if buffer & ((1u64 << bits_in_buffer) - 1) != 0 {
        return Err(AddressError::BadCharacter);
    }
    Ok(result)
}

fn checksum(bytes: &[u8; 32]) -> [u8; CHECKSUM_LEN] {
    let hash = crate::blake2b_256(bytes);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&hash[..CHECKSUM_LEN]);
    out
}

/// Derive an address from a 32-byte public key (Blake2b-256 of the key).
pub fn derive_address(public_key: &[u8; 32]) -> Address {
    Address::new(crate::blake2b_256(public_key))
}

/// Render an address in its `dpos_`-prefixed human-readable form.
pub fn encode_address(address: &Address) -> String {
    let body = encode_base32(address.as_bytes());
    let check = encode_base32(&checksum(address.as_bytes()));
    format!("{}{}{}", PREFIX, body, check)
}

/// Parse a human-readable address, verifying prefix, length, alphabet and checksum.
pub fn parse_address(s: &str) -> Result<Address, AddressError> {
    let encoded = s.strip_prefix(PREFIX).ok_or(AddressError::BadPrefix)?;
    if encoded.len() != ENCODED_LEN {
        return Err(AddressError::BadLength(encoded.len()));
    }
    if !encoded.is_ascii() {
        return Err(AddressError::BadCharacter);
    }

    let (body, check) = encoded.split_at(ADDRESS_CHARS);
    let bytes: [u8; 32] = decode_base32_fixed(body)?;
    let check_bytes: [u8; CHECKSUM_LEN] = decode_base32_fixed(check)?;

    if check_bytes != checksum(&bytes) {
        return Err(AddressError::BadChecksum);
    }
    Ok(Address::new(bytes))
}

/// Validate that an address string is well-formed and its checksum is correct.
pub fn validate_address(s: &str) -> bool {
    parse_address(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_and_validate() {
        let addr = derive_address(&[7u8; 32]);
        let encoded = encode_address(&addr);
        assert!(encoded.starts_with("dpos_"));
        assert_eq!(encoded.len(), 65);
        assert!(validate_address(&encoded));
    }

    #[test]
    fn derive_is_deterministic() {
        assert_eq!(derive_address(&[9u8; 32]), derive_address(&[9u8; 32]));
        assert_ne!(derive_address(&[9u8; 32]), derive_address(&[8u8; 32]));
    }

    #[test]
    fn parse_roundtrip() {
        let addr = Address::new([0x5a; 32]);
        assert_eq!(parse_address(&encode_address(&addr)).unwrap(), addr);
    }

    #[test]
    fn invalid_prefix_rejected() {
        let encoded = encode_address(&Address::new([1u8; 32]));
        let swapped = encoded.replacen("dpos_", "nano_", 1);
        assert_eq!(parse_address(&swapped), Err(AddressError::BadPrefix));
    }

    #[test]
    fn invalid_checksum_rejected() {
        let mut bad = encode_address(&Address::new([3u8; 32]));
        let last = bad.pop().unwrap();
        bad.push(if last == '1' { '3' } else { '1' });
        assert_eq!(parse_address(&bad), Err(AddressError::BadChecksum));
    }

    #[test]
    fn wrong_length_rejected() {
        assert_eq!(parse_address("dpos_tooshort"), Err(AddressError::BadLength(8)));
        assert_eq!(parse_address("dpos_"), Err(AddressError::BadLength(0)));
    }

    #[test]
    fn bad_character_rejected() {
        let mut bad = encode_address(&Address::new([3u8; 32]));
        bad.replace_range(10..11, "0");
        assert_eq!(parse_address(&bad), Err(AddressError::BadCharacter));
    }

    #[test]
    fn non_canonical_padding_rejected() {
        let addr = Address::new([0u8; 32]);
        let encoded = encode_address(&addr);
        // The 52nd body character carries 4 pad bits; '3' sets the lowest one.
        let mut tweaked = encoded.clone();
        tweaked.replace_range(56..57, "3");
        assert_ne!(tweaked, encoded);
        assert!(parse_address(&tweaked).is_err());
    }

    #[test]
    fn base32_encode_decode_roundtrip() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF, 0x42];
        let encoded = encode_base32(&data);
        let decoded: [u8; 5] = decode_base32_fixed(&encoded).unwrap();
        assert_eq!(decoded, data);
    }
}
