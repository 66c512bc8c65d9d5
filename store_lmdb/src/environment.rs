//! LMDB environment setup.

use std::path::{Path, PathBuf};

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use dpos_store::{LedgerStore, StoreError};
use dpos_types::Index;

use crate::ledger::{LmdbView, LmdbWriteBatch};
use crate::LmdbError;

/// Upper bound on named databases; leaves room for future indexes.
const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and one database handle per ledger index.
pub struct LmdbEnvironment {
    env: Env,
    path: PathBuf,
    candidates_db: Database<Bytes, Bytes>,
    votes_db: Database<Bytes, Bytes>,
    delegates_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path, creating the
    /// index databases if they do not exist yet.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process and per path;
        // callers must not open the same directory twice concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let candidates_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some(Index::Candidate.name()))?;
        let votes_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some(Index::Vote.name()))?;
        let delegates_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some(Index::Delegate.name()))?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB ledger environment");

        Ok(Self {
            env,
            path: path.to_path_buf(),
            candidates_db,
            votes_db,
            delegates_db,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn env(&self) -> &Env {
        &self.env
    }

    /// Database handle backing one ledger index.
    pub(crate) fn db(&self, index: Index) -> Database<Bytes, Bytes> {
        match index {
            Index::Candidate => self.candidates_db,
            Index::Vote => self.votes_db,
            Index::Delegate => self.delegates_db,
        }
    }
}

impl LedgerStore for LmdbEnvironment {
    type View<'a> = LmdbView<'a>;
    type Batch<'a> = LmdbWriteBatch<'a>;

    fn view(&self) -> Result<LmdbView<'_>, StoreError> {
        LmdbView::new(self)
    }

    fn write_batch(&self) -> Result<LmdbWriteBatch<'_>, StoreError> {
        LmdbWriteBatch::new(self)
    }
}
