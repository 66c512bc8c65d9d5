//! Block processing for delegation transactions.
//!
//! Each transaction in a block is executed in its own write batch, in block
//! order. A batch is committed only when execution succeeds; a rejected
//! action leaves the ledger untouched but is still charged. A storage fault
//! aborts the whole block: earlier transactions stay committed, the faulted
//! one is discarded, and later ones are never attempted.

use dpos_delegation::{
    execute_encoded, register_candidate, withdraw_candidate, DelegationError, Transition,
};
use dpos_store::{LedgerStore, WriteBatch};
use dpos_types::{Address, Gas};

use crate::NodeError;

/// A delegation transaction as it appears in a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegationTx {
    /// The authenticated sender; always the delegator.
    pub sender: Address,
    /// Encoded delegation payload.
    pub payload: Vec<u8>,
}

impl DelegationTx {
    pub fn new(sender: Address, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            sender,
            payload: payload.into(),
        }
    }
}

/// Outcome of one transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub sender: Address,
    /// `None` only when the payload could not be decoded at all.
    pub gas_used: Option<Gas>,
    pub result: Result<Transition, DelegationError>,
}

impl Receipt {
    pub fn is_applied(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of a whole block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockReceipt {
    pub receipts: Vec<Receipt>,
    pub gas_used: Gas,
}

impl BlockReceipt {
    pub fn applied(&self) -> usize {
        self.receipts.iter().filter(|r| r.is_applied()).count()
    }

    pub fn rejected(&self) -> usize {
        self.receipts.len() - self.applied()
    }
}

/// Applies delegation transactions to a ledger store.
pub struct BlockProcessor<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> BlockProcessor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Execute one transaction in its own batch.
    ///
    /// Validation failures are reported in the receipt. Storage faults,
    /// including a failed commit, are returned as `Err` and nothing from this
    /// transaction is persisted.
    pub fn process_transaction(&self, tx: &DelegationTx) -> Result<Receipt, NodeError> {
        let mut batch = self.store.write_batch()?;
        let outcome = match execute_encoded(&tx.payload, &tx.sender, &mut batch) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(sender = %tx.sender, error = %e, "undecodable delegation payload");
                return Ok(Receipt {
                    sender: tx.sender,
                    gas_used: None,
                    result: Err(e),
                });
            }
        };

        match outcome.result {
            Ok(transition) => {
                batch.commit()?;
                Ok(Receipt {
                    sender: tx.sender,
                    gas_used: Some(outcome.gas_used),
                    result: Ok(transition),
                })
            }
            Err(DelegationError::Storage(e)) => Err(NodeError::Store(e)),
            Err(e) => {
                debug_assert!(e.is_validation());
                Ok(Receipt {
                    sender: tx.sender,
                    gas_used: Some(outcome.gas_used),
                    result: Err(e),
                })
            }
        }
    }

    /// Execute every transaction of a block, in order.
    pub fn process_block(&self, txs: &[DelegationTx]) -> Result<BlockReceipt, NodeError> {
        let mut block = BlockReceipt::default();
        for (position, tx) in txs.iter().enumerate() {
            let receipt = self.process_transaction(tx).map_err(|e| {
                tracing::error!(position, sender = %tx.sender, error = %e, "block aborted");
                e
            })?;
            if let Some(gas) = receipt.gas_used {
                block.gas_used = block.gas_used.saturating_add(gas);
            }
            block.receipts.push(receipt);
        }
        tracing::info!(
            txs = txs.len(),
            applied = block.applied(),
            rejected = block.rejected(),
            gas = %block.gas_used,
            "block processed"
        );
        Ok(block)
    }

    /// Register candidates in a single batch. Returns how many were new.
    pub fn register_candidates(&self, candidates: &[Address]) -> Result<usize, NodeError> {
        let mut batch = self.store.write_batch()?;
        let mut added = 0;
        for candidate in candidates {
            if register_candidate(&mut batch, candidate)? {
                added += 1;
            }
        }
        batch.commit()?;
        if added > 0 {
            tracing::info!(added, "candidates registered");
        }
        Ok(added)
    }

    /// Remove a candidate. Existing delegations to it are kept.
    pub fn withdraw_candidate(&self, candidate: &Address) -> Result<bool, NodeError> {
        let mut batch = self.store.write_batch()?;
        let removed = withdraw_candidate(&mut batch, candidate)?;
        batch.commit()?;
        if removed {
            tracing::info!(candidate = %candidate, "candidate withdrawn");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpos_crypto::encode_address;
    use dpos_delegation::{current_delegatee, DelegationAction, BASE_GAS};
    use dpos_nullables::{FaultOp, NullLedgerStore};
    use dpos_types::Index;

    fn addr(seed: u8) -> Address {
        Address::new([seed; 32])
    }

    fn delegate(from: u8, to: u8) -> DelegationTx {
        DelegationTx::new(
            addr(from),
            DelegationAction::delegate(encode_address(&addr(to))).encode().unwrap(),
        )
    }

    fn undelegate(from: u8, to: u8) -> DelegationTx {
        DelegationTx::new(
            addr(from),
            DelegationAction::undelegate(encode_address(&addr(to))).encode().unwrap(),
        )
    }

    fn processor() -> BlockProcessor<NullLedgerStore> {
        let processor = BlockProcessor::new(NullLedgerStore::new());
        processor.register_candidates(&[addr(1), addr(2)]).unwrap();
        processor
    }

    #[test]
    fn applied_transaction_is_committed() {
        let processor = processor();
        let receipt = processor.process_transaction(&delegate(10, 1)).unwrap();
        assert_eq!(receipt.gas_used, Some(BASE_GAS));
        assert_eq!(
            receipt.result,
            Ok(Transition::Delegated {
                from: None,
                to: addr(1)
            })
        );
        let view = processor.store().view().unwrap();
        assert_eq!(current_delegatee(&view, &addr(10)).unwrap(), Some(addr(1)));
    }

    #[test]
    fn rejected_transaction_is_charged_but_not_committed() {
        let processor = processor();
        let receipt = processor.process_transaction(&undelegate(10, 1)).unwrap();
        assert_eq!(receipt.gas_used, Some(BASE_GAS));
        assert!(matches!(
            receipt.result,
            Err(DelegationError::NotCurrentDelegatee { .. })
        ));
        assert_eq!(processor.store().len(Index::Vote), 0);
    }

    #[test]
    fn malformed_payload_is_not_charged() {
        let processor = processor();
        let receipt = processor
            .process_transaction(&DelegationTx::new(addr(10), b"{".to_vec()))
            .unwrap();
        assert_eq!(receipt.gas_used, None);
        assert!(matches!(
            receipt.result,
            Err(DelegationError::MalformedPayload(_))
        ));
    }

    #[test]
    fn unknown_action_is_charged() {
        let processor = processor();
        let tx = DelegationTx::new(addr(10), br#"{"Action":"redo","Delegatee":"x"}"#.to_vec());
        let receipt = processor.process_transaction(&tx).unwrap();
        assert_eq!(receipt.gas_used, Some(BASE_GAS));
        assert_eq!(
            receipt.result,
            Err(DelegationError::InvalidActionKind("redo".into()))
        );
    }

    #[test]
    fn block_totals() {
        let processor = processor();
        let block = processor
            .process_block(&[
                delegate(10, 1),
                delegate(11, 3),
                DelegationTx::new(addr(12), b"garbage".to_vec()),
                delegate(10, 2),
            ])
            .unwrap();
        assert_eq!(block.applied(), 2);
        assert_eq!(block.rejected(), 2);
        assert_eq!(block.gas_used, Gas::new(3));
    }

    #[test]
    fn storage_fault_aborts_block() {
        let processor = processor();
        processor.process_block(&[delegate(10, 1)]).unwrap();
        processor.store().fail_on(FaultOp::Put, Index::Vote);

        let result = processor.process_block(&[delegate(11, 1), delegate(12, 1)]);
        assert!(matches!(result, Err(NodeError::Store(_))));
        // Nothing from the faulted transaction reached committed state.
        assert_eq!(processor.store().len(Index::Delegate), 1);
        assert_eq!(processor.store().len(Index::Vote), 1);
    }

    #[test]
    fn failed_commit_is_a_store_error() {
        let processor = processor();
        processor.store().fail_commits();
        assert!(matches!(
            processor.process_transaction(&delegate(10, 1)),
            Err(NodeError::Store(_))
        ));
        assert_eq!(processor.store().len(Index::Vote), 0);
    }

    #[test]
    fn register_and_withdraw() {
        let processor = processor();
        assert_eq!(processor.register_candidates(&[addr(2), addr(3)]).unwrap(), 1);
        assert!(processor.withdraw_candidate(&addr(3)).unwrap());
        assert!(!processor.withdraw_candidate(&addr(3)).unwrap());
    }
}
