//! Ledger-state traits over the three delegation indexes.

use dpos_types::Index;

use crate::{Entry, StoreError};

/// Read access to the ledger indexes.
pub trait LedgerView {
    /// Fetch the value stored under `key`, or `None` if absent.
    fn get(&self, index: Index, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn scan_prefix(&self, index: Index, prefix: &[u8]) -> Result<Vec<Entry>, StoreError>;

    /// Whether `key` is present.
    fn contains(&self, index: Index, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(index, key)?.is_some())
    }
}

/// Mutable access to the ledger indexes.
pub trait LedgerState: LedgerView {
    /// Insert or overwrite the value under `key`.
    fn put(&mut self, index: Index, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Remove `key`. Returns whether an entry was actually removed.
    fn delete(&mut self, index: Index, key: &[u8]) -> Result<bool, StoreError>;
}

/// A set of staged mutations applied all at once by [`WriteBatch::commit`].
///
/// Dropping a batch without committing discards every staged mutation.
/// Reads through the batch observe its own staged writes.
pub trait WriteBatch: LedgerState {
    fn commit(self) -> Result<(), StoreError>;
}

/// A ledger-state backend that hands out read views and write batches.
pub trait LedgerStore {
    type View<'a>: LedgerView
    where
        Self: 'a;

    type Batch<'a>: WriteBatch
    where
        Self: 'a;

    /// Open a consistent read-only view of the committed state.
    fn view(&self) -> Result<Self::View<'_>, StoreError>;

    /// Begin a new write batch.
    fn write_batch(&self) -> Result<Self::Batch<'_>, StoreError>;
}
