//! Identifiers for the three ledger indexes touched by delegation.

use std::fmt;
use std::str::FromStr;

use crate::DposError;

/// One of the ledger-wide keyed indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Index {
    /// Registered candidates (membership only).
    Candidate,
    /// Delegator → current delegatee.
    Vote,
    /// Delegatee ‖ delegator → delegator.
    Delegate,
}

impl Index {
    pub const ALL: [Index; 3] = [Index::Candidate, Index::Vote, Index::Delegate];

    /// Stable name, used as the database name by persistent backends.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Candidate => "candidates",
            Self::Vote => "votes",
            Self::Delegate => "delegates",
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Index {
    type Err = DposError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|index| index.name() == s)
            .ok_or_else(|| DposError::InvalidIndex(s.to_string()))
    }
}
