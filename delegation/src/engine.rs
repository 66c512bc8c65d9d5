//! Execution of delegation actions against ledger state.
//!
//! Per delegator, VoteIndex moves between two states:
//!
//! - `Undelegated --Delegate(C)--> DelegatedTo(C)`
//! - `DelegatedTo(C) --Delegate(C')--> DelegatedTo(C')`
//! - `DelegatedTo(C) --Undelegate(C)--> Undelegated`
//!
//! Every other combination is rejected. The engine only stages writes on the
//! handle it is given; the caller commits the batch when the outcome is `Ok`
//! and drops it otherwise, so a rejected or faulted action never leaves a
//! partial update behind.

use dpos_crypto::{encode_address, parse_address};
use dpos_store::{LedgerState, StoreError};
use dpos_types::{Address, Gas, Index};

use crate::index::{current_delegatee, delegate_key, is_candidate};
use crate::payload::{ActionKind, DelegationAction, BASE_GAS};
use crate::DelegationError;

/// The state change a successful action performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The delegator now votes through `to`; `from` is the delegatee it replaced.
    Delegated { from: Option<Address>, to: Address },
    /// The delegator revoked its delegation to `from`.
    Undelegated { from: Address },
}

/// Gas charged plus the result of one execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub gas_used: Gas,
    pub result: Result<Transition, DelegationError>,
}

impl ExecutionOutcome {
    fn charged(result: Result<Transition, DelegationError>) -> Self {
        Self {
            gas_used: BASE_GAS,
            result,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Execute `action` on behalf of the authenticated `delegator`.
///
/// Always charges [`BASE_GAS`]. On error, writes already staged on `state`
/// must be discarded by the caller.
pub fn execute<S: LedgerState + ?Sized>(
    action: &DelegationAction,
    delegator: &Address,
    state: &mut S,
) -> ExecutionOutcome {
    let result = apply(action, delegator, state);
    match &result {
        Ok(transition) => {
            tracing::debug!(delegator = %delegator, ?transition, "delegation applied");
        }
        Err(DelegationError::Storage(e)) => {
            tracing::warn!(delegator = %delegator, error = %e, "storage fault during delegation");
        }
        Err(e) => {
            tracing::debug!(delegator = %delegator, action = %action.kind(), error = %e, "delegation rejected");
        }
    }
    ExecutionOutcome::charged(result)
}

/// Decode and execute a raw payload.
///
/// Returns `Err` only for `MalformedPayload`, which is rejected before
/// execution and not charged. An unknown action tag is charged like any
/// other rejected action.
pub fn execute_encoded<S: LedgerState + ?Sized>(
    payload: &[u8],
    delegator: &Address,
    state: &mut S,
) -> Result<ExecutionOutcome, DelegationError> {
    match DelegationAction::decode(payload) {
        Ok(action) => Ok(execute(&action, delegator, state)),
        Err(e @ DelegationError::InvalidActionKind(_)) => {
            tracing::debug!(delegator = %delegator, error = %e, "delegation rejected");
            Ok(ExecutionOutcome::charged(Err(e)))
        }
        Err(e) => Err(e),
    }
}

fn apply<S: LedgerState + ?Sized>(
    action: &DelegationAction,
    delegator: &Address,
    state: &mut S,
) -> Result<Transition, DelegationError> {
    let delegatee = parse_address(action.delegatee()).map_err(|reason| {
        DelegationError::InvalidAddress {
            address: action.delegatee().to_string(),
            reason,
        }
    })?;

    if !is_candidate(&*state, &delegatee)? {
        return Err(DelegationError::NotACandidate(action.delegatee().to_string()));
    }

    let prior = current_delegatee(&*state, delegator)?;

    match action.kind() {
        ActionKind::Delegate => {
            // Drop the previous target's secondary entry before adding the new one.
            if let Some(previous) = prior {
                remove_existing(state, Index::Delegate, &delegate_key(&previous, delegator))?;
            }
            state.put(
                Index::Delegate,
                &delegate_key(&delegatee, delegator),
                delegator.as_bytes(),
            )?;
            state.put(Index::Vote, delegator.as_bytes(), delegatee.as_bytes())?;
            Ok(Transition::Delegated {
                from: prior,
                to: delegatee,
            })
        }
        ActionKind::Undelegate => {
            if prior != Some(delegatee) {
                return Err(DelegationError::NotCurrentDelegatee {
                    delegator: encode_address(delegator),
                    delegatee: action.delegatee().to_string(),
                });
            }
            remove_existing(state, Index::Delegate, &delegate_key(&delegatee, delegator))?;
            remove_existing(state, Index::Vote, delegator.as_bytes())?;
            Ok(Transition::Undelegated { from: delegatee })
        }
    }
}

/// Delete an entry the VoteIndex says must exist; its absence is corruption.
fn remove_existing<S: LedgerState + ?Sized>(
    state: &mut S,
    index: Index,
    key: &[u8],
) -> Result<(), StoreError> {
    if !state.delete(index, key)? {
        return Err(StoreError::Corruption(format!(
            "expected entry missing from {} index",
            index
        )));
    }
    Ok(())
}
