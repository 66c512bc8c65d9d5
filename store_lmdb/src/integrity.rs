//! LMDB database integrity checks.
//!
//! Run on startup to detect corruption early, before any ledger action is
//! executed. Only the physical shape of entries is checked here; the
//! cross-index delegation invariants are checked by `dpos-delegation`.

use std::collections::BTreeMap;
use std::path::Path;

use dpos_types::{Address, Index};

use crate::{LmdbEnvironment, LmdbError};

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub entries: BTreeMap<Index, u64>,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_entries(&self) -> u64 {
        self.entries.values().sum()
    }
}

/// Expected `(key, value)` lengths per index. `None` means any length.
fn expected_shape(index: Index) -> (usize, Option<usize>) {
    match index {
        Index::Candidate => (Address::LEN, None),
        Index::Vote => (Address::LEN, Some(Address::LEN)),
        Index::Delegate => (2 * Address::LEN, Some(Address::LEN)),
    }
}

/// Walk every index and record entries whose key or value has the wrong
/// length. Read failures are recorded in the report rather than causing a
/// hard error.
pub fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();
    let rtxn = env.env().read_txn()?;

    for index in Index::ALL {
        let db = env.db(index);
        let (key_len, value_len) = expected_shape(index);
        let iter = match db.iter(&rtxn) {
            Ok(iter) => iter,
            Err(e) => {
                report
                    .errors
                    .push(format!("failed to read database '{}': {}", index, e));
                continue;
            }
        };

        let mut count = 0u64;
        for entry in iter {
            let (key, val) = match entry {
                Ok(kv) => kv,
                Err(e) => {
                    report
                        .errors
                        .push(format!("failed to read entry in '{}': {}", index, e));
                    break;
                }
            };
            count += 1;
            if key.len() != key_len {
                report.errors.push(format!(
                    "'{}' key has length {}, expected {}",
                    index,
                    key.len(),
                    key_len
                ));
            }
            if let Some(expected) = value_len {
                if val.len() != expected {
                    report.errors.push(format!(
                        "'{}' value has length {}, expected {}",
                        index,
                        val.len(),
                        expected
                    ));
                }
            }
        }
        report.entries.insert(index, count);
    }

    if !report.is_healthy() {
        tracing::warn!(errors = report.errors.len(), "LMDB integrity check found problems");
    }
    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// corruption or misconfiguration.
pub fn check_data_dir(path: &Path) -> Result<(), LmdbError> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(LmdbError::MissingDatabase(format!(
            "data.mdb at {}",
            path.display()
        )));
    }
    Ok(())
}
