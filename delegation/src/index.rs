//! Key layout and typed access to the three delegation indexes.
//!
//! | index     | key                         | value        |
//! |-----------|-----------------------------|--------------|
//! | Candidate | candidate (32)              | marker byte  |
//! | Vote      | delegator (32)              | delegatee    |
//! | Delegate  | delegatee ‖ delegator (64)  | delegator    |

use std::collections::{BTreeMap, BTreeSet};

use dpos_store::{LedgerState, LedgerView, StoreError};
use dpos_types::{Address, Index};

/// Value stored for every CandidateIndex entry. Only presence matters.
pub const CANDIDATE_MARKER: &[u8] = &[1];

/// Composite DelegateIndex key: `delegatee ‖ delegator`.
pub fn delegate_key(delegatee: &Address, delegator: &Address) -> [u8; 64] {
    let mut key = [0u8; 64];
    key[..32].copy_from_slice(delegatee.as_bytes());
    key[32..].copy_from_slice(delegator.as_bytes());
    key
}

/// Decode an address read back from an index; a wrong length means corruption.
pub(crate) fn stored_address(index: Index, bytes: &[u8]) -> Result<Address, StoreError> {
    Address::from_slice(bytes).map_err(|e| StoreError::Corruption(format!("{}: {}", index, e)))
}

/// Whether `address` is a registered candidate.
pub fn is_candidate<V: LedgerView + ?Sized>(view: &V, address: &Address) -> Result<bool, StoreError> {
    view.contains(Index::Candidate, address.as_bytes())
}

/// The delegatee `delegator` currently votes through, if any.
pub fn current_delegatee<V: LedgerView + ?Sized>(
    view: &V,
    delegator: &Address,
) -> Result<Option<Address>, StoreError> {
    view.get(Index::Vote, delegator.as_bytes())?
        .map(|bytes| stored_address(Index::Vote, &bytes))
        .transpose()
}

/// Every delegator currently delegating to `candidate`, in address order.
pub fn delegators_of<V: LedgerView + ?Sized>(
    view: &V,
    candidate: &Address,
) -> Result<Vec<Address>, StoreError> {
    view.scan_prefix(Index::Delegate, candidate.as_bytes())?
        .into_iter()
        .map(|(_, value)| stored_address(Index::Delegate, &value))
        .collect()
}

/// Every registered candidate, in address order.
pub fn candidates<V: LedgerView + ?Sized>(view: &V) -> Result<Vec<Address>, StoreError> {
    view.scan_prefix(Index::Candidate, &[])?
        .into_iter()
        .map(|(key, _)| stored_address(Index::Candidate, &key))
        .collect()
}

/// Add `address` to the CandidateIndex. Returns `false` if it was already present.
///
/// Candidate registration is its own ledger action; this only maintains the
/// membership entry (genesis seeding, tooling, tests).
pub fn register_candidate<S: LedgerState + ?Sized>(
    state: &mut S,
    address: &Address,
) -> Result<bool, StoreError> {
    if is_candidate(&*state, address)? {
        return Ok(false);
    }
    state.put(Index::Candidate, address.as_bytes(), CANDIDATE_MARKER)?;
    tracing::debug!(candidate = %address, "candidate registered");
    Ok(true)
}

/// Remove `address` from the CandidateIndex. Existing delegations to it are
/// left in place. Returns `false` if it was not registered.
pub fn withdraw_candidate<S: LedgerState + ?Sized>(
    state: &mut S,
    address: &Address,
) -> Result<bool, StoreError> {
    let removed = state.delete(Index::Candidate, address.as_bytes())?;
    if removed {
        tracing::debug!(candidate = %address, "candidate withdrawn");
    }
    Ok(removed)
}

/// A violation of the VoteIndex ⇔ DelegateIndex correspondence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    /// A DelegateIndex entry with no matching VoteIndex entry.
    OrphanedDelegateEntry { delegatee: Address, delegator: Address },
    /// A VoteIndex entry with no matching DelegateIndex entry.
    MissingDelegateEntry { delegator: Address, delegatee: Address },
    /// A DelegateIndex entry whose value is not the delegator half of its key.
    MismatchedDelegateValue { delegatee: Address, delegator: Address },
    /// An entry whose key or value is not address-shaped.
    MalformedEntry { index: Index, key: Vec<u8> },
}

/// Cross-check VoteIndex against DelegateIndex in both directions.
pub fn check_consistency<V: LedgerView + ?Sized>(view: &V) -> Result<Vec<Inconsistency>, StoreError> {
    let mut found = Vec::new();

    let mut votes = BTreeMap::new();
    for (key, value) in view.scan_prefix(Index::Vote, &[])? {
        match (Address::from_slice(&key), Address::from_slice(&value)) {
            (Ok(delegator), Ok(delegatee)) => {
                votes.insert(delegator, delegatee);
            }
            _ => found.push(Inconsistency::MalformedEntry {
                index: Index::Vote,
                key,
            }),
        }
    }

    let mut delegate_pairs = BTreeSet::new();
    for (key, value) in view.scan_prefix(Index::Delegate, &[])? {
        if key.len() != 64 {
            found.push(Inconsistency::MalformedEntry {
                index: Index::Delegate,
                key,
            });
            continue;
        }
        let delegatee = Address::from_slice(&key[..32]).map_err(|e| StoreError::Corruption(e.to_string()))?;
        let delegator = Address::from_slice(&key[32..]).map_err(|e| StoreError::Corruption(e.to_string()))?;
        if value.as_slice() != delegator.as_bytes() {
            found.push(Inconsistency::MismatchedDelegateValue {
                delegatee,
                delegator,
            });
        }
        if votes.get(&delegator) != Some(&delegatee) {
            found.push(Inconsistency::OrphanedDelegateEntry {
                delegatee,
                delegator,
            });
        }
        delegate_pairs.insert((delegatee, delegator));
    }

    for (delegator, delegatee) in votes {
        if !delegate_pairs.contains(&(delegatee, delegator)) {
            found.push(Inconsistency::MissingDelegateEntry {
                delegator,
                delegatee,
            });
        }
    }

    if !found.is_empty() {
        tracing::warn!(count = found.len(), "delegation indexes are inconsistent");
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpos_nullables::NullLedgerStore;
    use dpos_store::{LedgerStore, WriteBatch};

    fn addr(seed: u8) -> Address {
        Address::new([seed; 32])
    }

    #[test]
    fn delegate_key_is_delegatee_then_delegator() {
        let key = delegate_key(&addr(1), &addr(2));
        assert_eq!(&key[..32], &[1u8; 32]);
        assert_eq!(&key[32..], &[2u8; 32]);
    }

    #[test]
    fn register_and_withdraw_candidate() {
        let store = NullLedgerStore::new();
        let mut batch = store.write_batch().unwrap();
        assert!(register_candidate(&mut batch, &addr(1)).unwrap());
        assert!(!register_candidate(&mut batch, &addr(1)).unwrap());
        assert!(register_candidate(&mut batch, &addr(2)).unwrap());
        assert!(withdraw_candidate(&mut batch, &addr(2)).unwrap());
        assert!(!withdraw_candidate(&mut batch, &addr(3)).unwrap());
        batch.commit().unwrap();

        let view = store.view().unwrap();
        assert!(is_candidate(&view, &addr(1)).unwrap());
        assert!(!is_candidate(&view, &addr(2)).unwrap());
        assert_eq!(candidates(&view).unwrap(), vec![addr(1)]);
    }

    #[test]
    fn delegators_are_scoped_to_one_candidate() {
        let store = NullLedgerStore::new();
        for (delegatee, delegator) in [(1u8, 10u8), (1, 11), (2, 12)] {
            store.insert_raw(
                Index::Delegate,
                &delegate_key(&addr(delegatee), &addr(delegator)),
                addr(delegator).as_bytes(),
            );
        }
        let view = store.view().unwrap();
        assert_eq!(delegators_of(&view, &addr(1)).unwrap(), vec![addr(10), addr(11)]);
        assert_eq!(delegators_of(&view, &addr(2)).unwrap(), vec![addr(12)]);
        assert!(delegators_of(&view, &addr(3)).unwrap().is_empty());
    }

    #[test]
    fn current_delegatee_rejects_corrupt_value() {
        let store = NullLedgerStore::new();
        store.insert_raw(Index::Vote, addr(10).as_bytes(), b"short");
        let view = store.view().unwrap();
        assert!(matches!(
            current_delegatee(&view, &addr(10)),
            Err(StoreError::Corruption(_))
        ));
        assert_eq!(current_delegatee(&view, &addr(11)).unwrap(), None);
    }

    #[test]
    fn consistency_detects_each_kind_of_damage() {
        let store = NullLedgerStore::new();
        // Healthy pair.
        store.insert_raw(Index::Vote, addr(10).as_bytes(), addr(1).as_bytes());
        store.insert_raw(Index::Delegate, &delegate_key(&addr(1), &addr(10)), addr(10).as_bytes());
        assert!(check_consistency(&store.view().unwrap()).unwrap().is_empty());

        // Orphan left behind by a redirect without cleanup.
        store.insert_raw(Index::Delegate, &delegate_key(&addr(2), &addr(10)), addr(10).as_bytes());
        // Vote with no secondary entry.
        store.insert_raw(Index::Vote, addr(11).as_bytes(), addr(1).as_bytes());
        // Secondary entry with the wrong value.
        store.insert_raw(Index::Vote, addr(12).as_bytes(), addr(1).as_bytes());
        store.insert_raw(Index::Delegate, &delegate_key(&addr(1), &addr(12)), addr(99).as_bytes());

        let found = check_consistency(&store.view().unwrap()).unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.contains(&Inconsistency::OrphanedDelegateEntry {
            delegatee: addr(2),
            delegator: addr(10)
        }));
        assert!(found.contains(&Inconsistency::MissingDelegateEntry {
            delegator: addr(11),
            delegatee: addr(1)
        }));
        assert!(found.contains(&Inconsistency::MismatchedDelegateValue {
            delegatee: addr(1),
            delegator: addr(12)
        }));
    }
}
