//! Read views and write batches over the LMDB ledger indexes.
//!
//! A [`LmdbWriteBatch`] owns a single LMDB write transaction. If the batch
//! is dropped without calling [`WriteBatch::commit`], all operations are
//! rolled back (the underlying transaction is aborted).

use heed::types::Bytes;
use heed::{Database, RoTxn, RwTxn};

use dpos_store::{Entry, LedgerState, LedgerView, StoreError, WriteBatch};
use dpos_types::Index;

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

fn read(
    db: Database<Bytes, Bytes>,
    txn: &RoTxn,
    key: &[u8],
) -> Result<Option<Vec<u8>>, StoreError> {
    let val = db.get(txn, key).map_err(LmdbError::from)?;
    Ok(val.map(|v| v.to_vec()))
}

fn scan(db: Database<Bytes, Bytes>, txn: &RoTxn, prefix: &[u8]) -> Result<Vec<Entry>, StoreError> {
    // LMDB rejects a zero-length key, so an empty prefix is a full scan.
    if prefix.is_empty() {
        collect(db.iter(txn).map_err(LmdbError::from)?)
    } else {
        collect(db.prefix_iter(txn, prefix).map_err(LmdbError::from)?)
    }
}

fn collect<'t>(
    iter: impl Iterator<Item = heed::Result<(&'t [u8], &'t [u8])>>,
) -> Result<Vec<Entry>, StoreError> {
    let mut results = Vec::new();
    for entry in iter {
        let (key, val) = entry.map_err(LmdbError::from)?;
        results.push((key.to_vec(), val.to_vec()));
    }
    Ok(results)
}

/// A consistent read-only snapshot of the committed indexes.
pub struct LmdbView<'a> {
    txn: RoTxn<'a>,
    env: &'a LmdbEnvironment,
}

impl<'a> LmdbView<'a> {
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, StoreError> {
        let txn = env.env().read_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, env })
    }
}

impl LedgerView for LmdbView<'_> {
    fn get(&self, index: Index, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        read(self.env.db(index), &self.txn, key)
    }

    fn scan_prefix(&self, index: Index, prefix: &[u8]) -> Result<Vec<Entry>, StoreError> {
        scan(self.env.db(index), &self.txn, prefix)
    }
}

/// All mutations of one ledger action, applied in a single LMDB write transaction.
pub struct LmdbWriteBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
}

impl<'a> LmdbWriteBatch<'a> {
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, StoreError> {
        let txn = env.env().write_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, env })
    }
}

impl LedgerView for LmdbWriteBatch<'_> {
    fn get(&self, index: Index, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        read(self.env.db(index), &self.txn, key)
    }

    fn scan_prefix(&self, index: Index, prefix: &[u8]) -> Result<Vec<Entry>, StoreError> {
        scan(self.env.db(index), &self.txn, prefix)
    }
}

impl LedgerState for LmdbWriteBatch<'_> {
    fn put(&mut self, index: Index, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.env
            .db(index)
            .put(&mut self.txn, key, value)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete(&mut self, index: Index, key: &[u8]) -> Result<bool, StoreError> {
        let removed = self
            .env
            .db(index)
            .delete(&mut self.txn, key)
            .map_err(LmdbError::from)?;
        Ok(removed)
    }
}

impl WriteBatch for LmdbWriteBatch<'_> {
    fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
