//! Block reward transactions.

use ela_chain::transaction::{Payload, Transaction};
use ela_state::{ConsensusAlgorithm, References};

use super::{ContextFlow, TransactionChecker};
use crate::{context::ValidationContext, error::TransactionError, transaction::check};

/// Pays the block reward.
///
/// The first output carries the share that doesn't go to the miner, and
/// where it goes depends on the height and consensus mode.
pub struct CoinBase;

impl TransactionChecker for CoinBase {
    fn check_transaction_input(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        match tx.inputs.as_slice() {
            [input] if input.is_coinbase_sentinel() => Ok(()),
            [_] => Err(TransactionError::input("invalid coinbase input")),
            _ => Err(TransactionError::input("coinbase must has only one input")),
        }
    }

    fn check_transaction_output(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::output_count(tx)?;
        if tx.outputs.len() < 2 {
            return Err(TransactionError::output(
                "coinbase output is not enough, at least 2",
            ));
        }

        check::output_values(tx, ctx)
    }

    fn check_attribute_program(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::attributes_without_programs(tx)
    }

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        match tx.payload {
            Payload::CoinBase(_) => Ok(()),
            _ => Err(check::payload_mismatch()),
        }
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let params = ctx.params;
        let first = tx
            .outputs
            .first()
            .ok_or_else(|| TransactionError::output("coinbase output is not enough, at least 2"))?;

        if ctx.height < params.cr_committee_start_height {
            if first.program_hash != params.foundation_address {
                return Err(TransactionError::output(
                    "first output address should be foundation address",
                ));
            }
        } else if ctx.state.consensus_algorithm() == ConsensusAlgorithm::Pow {
            if first.program_hash != params.destroy_address {
                return Err(TransactionError::output(
                    "first output address should be DestroyAddress in POW consensus algorithm",
                ));
            }
        } else if first.program_hash != params.cr_assets_address {
            return Err(TransactionError::output(
                "first output address should be CR assets address",
            ));
        }

        // at least 30% of the reward
        let total = i128::from(check::output_total(tx)?.sela());
        if i128::from(first.value.sela()) * 10 < total * 3 {
            return Err(TransactionError::balance(
                "reward to the first output in coinbase < 30%",
            ));
        }

        Ok(ContextFlow::End)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}
