#![no_main]

use libfuzzer_sys::fuzz_target;

use dpos_delegation::{check_consistency, execute_encoded, register_candidate, DelegationAction};
use dpos_nullables::NullLedgerStore;
use dpos_store::{LedgerStore, WriteBatch};
use dpos_types::Address;

// Decode and execute arbitrary payloads against a small seeded ledger.
fuzz_target!(|data: &[u8]| {
    // 1. Decoding never panics; successful decodes re-encode losslessly.
    if let Ok(action) = DelegationAction::decode(data) {
        let reencoded = action.encode().expect("decoded payload re-encodes");
        assert_eq!(DelegationAction::decode(&reencoded).as_ref(), Ok(&action));
    }

    // 2. Execution never panics and never breaks index consistency.
    let store = NullLedgerStore::new();
    let Ok(mut batch) = store.write_batch() else { return };
    for seed in 1..=3u8 {
        let _ = register_candidate(&mut batch, &Address::new([seed; 32]));
    }
    if batch.commit().is_err() {
        return;
    }

    let delegator = Address::new([data.first().copied().unwrap_or(0); 32]);
    let Ok(mut batch) = store.write_batch() else { return };
    if let Ok(outcome) = execute_encoded(data, &delegator, &mut batch) {
        if outcome.is_ok() {
            let _ = batch.commit();
        }
    }

    let view = store.view().expect("in-memory view");
    let found = check_consistency(&view).expect("in-memory scan");
    assert!(found.is_empty(), "inconsistent indexes: {found:?}");
});
