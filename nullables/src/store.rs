//! Thread-safe in-memory ledger state for testing.

use dpos_store::{Entry, LedgerState, LedgerStore, LedgerView, StoreError, WriteBatch};
use dpos_types::Index;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

type IndexMap = BTreeMap<Vec<u8>, Vec<u8>>;

/// Storage operations that can be made to fail on purpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultOp {
    Get,
    Put,
    Delete,
    Scan,
    /// Committing a batch (index is ignored).
    Commit,
}

/// An in-memory ledger store for testing.
/// Thread-safe for use from multiple test threads.
pub struct NullLedgerStore {
    indexes: Mutex<BTreeMap<Index, IndexMap>>,
    faults: Mutex<HashSet<(FaultOp, Option<Index>)>>,
}

impl NullLedgerStore {
    pub fn new() -> Self {
        Self {
            indexes: Mutex::new(BTreeMap::new()),
            faults: Mutex::new(HashSet::new()),
        }
    }

    /// Make every future `op` on `index` fail with a backend error.
    pub fn fail_on(&self, op: FaultOp, index: Index) {
        self.faults.lock().unwrap().insert((op, Some(index)));
    }

    /// Make every future batch commit fail.
    pub fn fail_commits(&self) {
        self.faults.lock().unwrap().insert((FaultOp::Commit, None));
    }

    /// Remove all injected faults.
    pub fn clear_faults(&self) {
        self.faults.lock().unwrap().clear();
    }

    /// Write directly to committed state, bypassing batches and faults.
    pub fn insert_raw(&self, index: Index, key: &[u8], value: &[u8]) {
        self.indexes
            .lock()
            .unwrap()
            .entry(index)
            .or_default()
            .insert(key.to_vec(), value.to_vec());
    }

    /// Delete directly from committed state, bypassing batches and faults.
    pub fn remove_raw(&self, index: Index, key: &[u8]) {
        if let Some(map) = self.indexes.lock().unwrap().get_mut(&index) {
            map.remove(key);
        }
    }

    /// All committed entries of one index, in key order.
    pub fn entries(&self, index: Index) -> Vec<Entry> {
        self.indexes
            .lock()
            .unwrap()
            .get(&index)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Number of committed entries in one index.
    pub fn len(&self, index: Index) -> usize {
        self.indexes
            .lock()
            .unwrap()
            .get(&index)
            .map(|m| m.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.lock().unwrap().values().all(|m| m.is_empty())
    }

    fn check(&self, op: FaultOp, index: Option<Index>) -> Result<(), StoreError> {
        if self.faults.lock().unwrap().contains(&(op, index)) {
            let target = index.map(|i| i.name()).unwrap_or("batch");
            return Err(StoreError::Backend(format!(
                "injected {:?} fault on {}",
                op, target
            )));
        }
        Ok(())
    }

    fn committed_get(&self, index: Index, key: &[u8]) -> Option<Vec<u8>> {
        self.indexes
            .lock()
            .unwrap()
            .get(&index)
            .and_then(|m| m.get(key).cloned())
    }

    fn committed_prefix(&self, index: Index, prefix: &[u8]) -> IndexMap {
        self.indexes
            .lock()
            .unwrap()
            .get(&index)
            .map(|m| prefix_range(m, prefix))
            .unwrap_or_default()
    }
}

impl Default for NullLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

fn prefix_range(map: &IndexMap, prefix: &[u8]) -> IndexMap {
    map.range(prefix.to_vec()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

impl LedgerStore for NullLedgerStore {
    type View<'a> = NullView<'a>;
    type Batch<'a> = NullWriteBatch<'a>;

    fn view(&self) -> Result<NullView<'_>, StoreError> {
        let snapshot = self.indexes.lock().unwrap().clone();
        Ok(NullView {
            store: self,
            snapshot,
        })
    }

    fn write_batch(&self) -> Result<NullWriteBatch<'_>, StoreError> {
        Ok(NullWriteBatch {
            store: self,
            staged: BTreeMap::new(),
        })
    }
}

/// A point-in-time copy of the committed indexes.
pub struct NullView<'a> {
    store: &'a NullLedgerStore,
    snapshot: BTreeMap<Index, IndexMap>,
}

impl LedgerView for NullView<'_> {
    fn get(&self, index: Index, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.store.check(FaultOp::Get, Some(index))?;
        Ok(self.snapshot.get(&index).and_then(|m| m.get(key).cloned()))
    }

    fn scan_prefix(&self, index: Index, prefix: &[u8]) -> Result<Vec<Entry>, StoreError> {
        self.store.check(FaultOp::Scan, Some(index))?;
        Ok(self
            .snapshot
            .get(&index)
            .map(|m| prefix_range(m, prefix).into_iter().collect())
            .unwrap_or_default())
    }
}

/// Staged writes on top of the committed indexes. `None` marks a deletion.
pub struct NullWriteBatch<'a> {
    store: &'a NullLedgerStore,
    staged: BTreeMap<Index, BTreeMap<Vec<u8>, Option<Vec<u8>>>>,
}

impl NullWriteBatch<'_> {
    /// Number of staged (uncommitted) mutations.
    pub fn staged_len(&self) -> usize {
        self.staged.values().map(|m| m.len()).sum()
    }
}

impl LedgerView for NullWriteBatch<'_> {
    fn get(&self, index: Index, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.store.check(FaultOp::Get, Some(index))?;
        if let Some(staged) = self.staged.get(&index).and_then(|m| m.get(key)) {
            return Ok(staged.clone());
        }
        Ok(self.store.committed_get(index, key))
    }

    fn scan_prefix(&self, index: Index, prefix: &[u8]) -> Result<Vec<Entry>, StoreError> {
        self.store.check(FaultOp::Scan, Some(index))?;
        let mut merged = self.store.committed_prefix(index, prefix);
        if let Some(staged) = self.staged.get(&index) {
            for (key, value) in staged.range(prefix.to_vec()..) {
                if !key.starts_with(prefix) {
                    break;
                }
                match value {
                    Some(v) => merged.insert(key.clone(), v.clone()),
                    None => merged.remove(key),
                };
            }
        }
        Ok(merged.into_iter().collect())
    }
}

impl LedgerState for NullWriteBatch<'_> {
    fn put(&mut self, index: Index, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.store.check(FaultOp::Put, Some(index))?;
        self.staged
            .entry(index)
            .or_default()
            .insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, index: Index, key: &[u8]) -> Result<bool, StoreError> {
        self.store.check(FaultOp::Delete, Some(index))?;
        let existed = match self.staged.get(&index).and_then(|m| m.get(key)) {
            Some(staged) => staged.is_some(),
            None => self.store.committed_get(index, key).is_some(),
        };
        self.staged
            .entry(index)
            .or_default()
            .insert(key.to_vec(), None);
        Ok(existed)
    }
}

impl WriteBatch for NullWriteBatch<'_> {
    fn commit(self) -> Result<(), StoreError> {
        self.store.check(FaultOp::Commit, None)?;
        let mut indexes = self.store.indexes.lock().unwrap();
        for (index, staged) in self.staged {
            let map = indexes.entry(index).or_default();
            for (key, value) in staged {
                match value {
                    Some(v) => map.insert(key, v),
                    None => map.remove(&key),
                };
            }
        }
        Ok(())
    }
}
