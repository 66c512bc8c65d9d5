//! Delegated voting for the DPoS ledger.
//!
//! A delegator names one registered candidate to vote on its behalf, or
//! revokes that choice. Three ledger indexes are kept mutually consistent:
//!
//! - **CandidateIndex**: who may be delegated to (membership only)
//! - **VoteIndex**: delegator → current delegatee (at most one per delegator)
//! - **DelegateIndex**: delegatee ‖ delegator → delegator, for enumerating a
//!   candidate's delegators without scanning VoteIndex
//!
//! Every execution charges the same [`BASE_GAS`], whether it succeeds or not.

pub mod engine;
pub mod error;
pub mod index;
pub mod payload;

pub use engine::{execute, execute_encoded, ExecutionOutcome, Transition};
pub use error::DelegationError;
pub use index::{
    candidates, check_consistency, current_delegatee, delegate_key, delegators_of, is_candidate,
    register_candidate, withdraw_candidate, Inconsistency,
};
pub use payload::{ActionKind, DelegationAction, BASE_GAS};
