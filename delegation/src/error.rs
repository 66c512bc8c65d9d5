use dpos_crypto::AddressError;
use dpos_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DelegationError {
    #[error("malformed delegation payload: {0}")]
    MalformedPayload(String),

    #[error("invalid delegatee address '{address}': {reason}")]
    InvalidAddress {
        address: String,
        reason: AddressError,
    },

    #[error("cannot delegate to {0}: not a registered candidate")]
    NotACandidate(String),

    #[error("{delegatee} is not the current delegatee of {delegator}")]
    NotCurrentDelegatee { delegator: String, delegatee: String },

    #[error("invalid delegation action '{0}'")]
    InvalidActionKind(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl DelegationError {
    /// Whether this is a deterministic rejection of the action (as opposed to
    /// a storage fault the caller must treat as fatal).
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}
