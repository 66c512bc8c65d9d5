#![no_main]

use libfuzzer_sys::fuzz_target;

use dpos_crypto::{encode_address, parse_address, validate_address};
use dpos_types::Address;

// Address strings come straight from payloads; parsing must be total.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let parsed = parse_address(s);
        assert_eq!(parsed.is_ok(), validate_address(s));
        if let Ok(address) = parsed {
            // Only the canonical form parses.
            assert_eq!(encode_address(&address), s);
        }
    }

    if data.len() >= Address::LEN {
        let address = Address::from_slice(&data[..Address::LEN]).expect("exact length");
        assert_eq!(parse_address(&encode_address(&address)), Ok(address));
    }
});
