use proptest::prelude::*;

use dpos_types::{Address, Gas};

proptest! {
    /// Address roundtrip: new -> as_bytes -> from_slice produces identical address.
    #[test]
    fn address_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let addr = Address::new(bytes);
        prop_assert_eq!(addr.as_bytes(), &bytes);
        prop_assert_eq!(Address::from_slice(addr.as_ref()).unwrap(), addr);
    }

    /// Address ordering follows the lexicographic order of the raw bytes.
    #[test]
    fn address_ordering_matches_bytes(
        a in prop::array::uniform32(0u8..),
        b in prop::array::uniform32(0u8..),
    ) {
        prop_assert_eq!(Address::new(a).cmp(&Address::new(b)), a.cmp(&b));
    }

    /// Address JSON serialization roundtrip.
    #[test]
    fn address_json_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let addr = Address::new(bytes);
        let encoded = serde_json::to_vec(&addr).unwrap();
        let decoded: Address = serde_json::from_slice(&encoded).unwrap();
        prop_assert_eq!(decoded, addr);
    }

    /// Gas checked_add agrees with u128 checked_add.
    #[test]
    fn gas_checked_add(a in any::<u128>(), b in any::<u128>()) {
        let sum = Gas::new(a).checked_add(Gas::new(b)).map(|g| g.raw());
        prop_assert_eq!(sum, a.checked_add(b));
    }
}
