use proptest::prelude::*;

use dpos_crypto::{encode_address, parse_address, validate_address};
use dpos_types::Address;

proptest! {
    /// Every address survives encode -> parse unchanged.
    #[test]
    fn address_codec_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let addr = Address::new(bytes);
        let encoded = encode_address(&addr);
        prop_assert_eq!(encoded.len(), 65);
        prop_assert_eq!(parse_address(&encoded).unwrap(), addr);
    }

    /// Flipping any single body character to another alphabet symbol is detected.
    #[test]
    fn single_char_corruption_detected(
        bytes in prop::array::uniform32(0u8..),
        pos in 5usize..65,
        sym in 0usize..32,
    ) {
        let alphabet = "13456789abcdefghijkmnopqrstuwxyz";
        let encoded = encode_address(&Address::new(bytes));
        let replacement = &alphabet[sym..sym + 1];
        prop_assume!(&encoded[pos..pos + 1] != replacement);
        let mut corrupted = encoded.clone();
        corrupted.replace_range(pos..pos + 1, replacement);
        prop_assert!(parse_address(&corrupted).map(|a| a != Address::new(bytes)).unwrap_or(true));
    }

    /// Arbitrary strings never panic the parser.
    #[test]
    fn parser_never_panics(s in ".{0,80}") {
        let _ = validate_address(&s);
    }
}
