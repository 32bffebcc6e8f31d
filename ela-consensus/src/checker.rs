//! Per-type transaction rules.
//!
//! Every transaction type shares one validation pipeline, see
//! [`crate::transaction`]. The pipeline calls into a [`TransactionChecker`]
//! at fixed points, and each type overrides only the hooks where its rules
//! differ from the defaults.
//!
//! [`checker_for`] is the dispatch table from type tags to checkers.

use ela_chain::transaction::{Transaction, TxType, TxVersion};
use ela_state::References;

use crate::{context::ValidationContext, error::TransactionError, transaction::check};

/// Implements the input, output and attribute hooks of a transaction type
/// that has no inputs or outputs, and so pays no fee.
///
/// `no_programs` types are authorized by their payload alone, and
/// `single_program` types by one multi-signature program.
macro_rules! no_cost_hooks {
    (no_programs) => {
        no_cost_hooks!(@io);

        fn check_attribute_program(
            &self,
            tx: &Transaction,
            _ctx: &ValidationContext<'_>,
        ) -> Result<(), TransactionError> {
            check::no_attributes_or_programs(tx)
        }
    };
    (single_program) => {
        no_cost_hooks!(@io);

        fn check_attribute_program(
            &self,
            tx: &Transaction,
            _ctx: &ValidationContext<'_>,
        ) -> Result<(), TransactionError> {
            check::single_program(tx)
        }
    };
    (@io) => {
        fn check_transaction_input(
            &self,
            tx: &Transaction,
            _ctx: &ValidationContext<'_>,
        ) -> Result<(), TransactionError> {
            check::no_inputs(tx)
        }

        fn check_transaction_output(
            &self,
            tx: &Transaction,
            _ctx: &ValidationContext<'_>,
        ) -> Result<(), TransactionError> {
            check::no_outputs(tx)
        }
    };
}

mod arbiters;
mod asset;
mod coinbase;
mod cr;
mod evidence;
mod producer;
mod proposal;
mod proposal_flow;
mod side_chain;
mod stake;

#[cfg(test)]
mod tests;

/// Whether the context pipeline continues after a type's own context rules.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ContextFlow {
    /// Run the remaining common checks: fees, deposits, signatures, spent
    /// coinbases and votes.
    Continue,
    /// The type's own rules were complete, stop here and accept.
    End,
}

/// The hooks a transaction type can override.
///
/// The default methods implement the rules shared by ordinary transfers.
pub trait TransactionChecker: Send + Sync {
    /// Rejects transaction types and payload versions that are not active at
    /// the context height.
    fn height_version_check(
        &self,
        _tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        Ok(())
    }

    /// Checks the serialized size.
    fn check_transaction_size(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::transaction_size(tx, ctx.params)
    }

    /// Checks the inputs without looking them up.
    fn check_transaction_input(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::transaction_inputs(tx)
    }

    /// Checks the outputs.
    fn check_transaction_output(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::transaction_outputs(tx, ctx)
    }

    /// Checks attributes and programs.
    fn check_attribute_program(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::attributes_and_programs(tx)
    }

    /// Checks the payload shape, without chain state.
    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::payload_type(tx)
    }

    /// Returns `true` if the transaction may be included while blocks are
    /// mined with proof of work.
    fn is_allowed_in_pow_consensus(&self, _tx: &Transaction, _references: &References) -> bool {
        true
    }

    /// Applies the type's rules that need chain state.
    fn special_context_check(
        &self,
        _tx: &Transaction,
        _ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        Ok(ContextFlow::Continue)
    }

    /// Returns `true` if the programs must sign for the spent outputs.
    ///
    /// System transactions are authorized by chain state instead.
    fn requires_signature(&self, _tx: &Transaction) -> bool {
        true
    }

    /// Returns `true` if vote outputs must be checked against the candidate
    /// sets.
    fn checks_vote_outputs(&self, tx: &Transaction) -> bool {
        tx.version >= TxVersion::V09
    }
}

/// Returns the checker for `tx_type`.
pub fn checker_for(tx_type: TxType) -> &'static dyn TransactionChecker {
    match tx_type {
        TxType::CoinBase => &coinbase::CoinBase,
        TxType::RegisterAsset => &asset::RegisterAsset,
        TxType::TransferAsset => &asset::TransferAsset,
        TxType::Record => &asset::Record,
        TxType::SideChainPow => &side_chain::SideChainPow,
        TxType::WithdrawFromSideChain => &side_chain::WithdrawFromSideChain,
        TxType::TransferCrossChainAsset => &side_chain::TransferCrossChainAsset,
        TxType::ReturnSideChainDepositCoin => &side_chain::ReturnSideChainDepositCoin,
        TxType::RegisterProducer => &producer::RegisterProducer,
        TxType::CancelProducer => &producer::CancelProducer,
        TxType::UpdateProducer => &producer::UpdateProducer,
        TxType::ReturnDepositCoin => &producer::ReturnDepositCoin,
        TxType::ActivateProducer => &producer::ActivateProducer,
        TxType::IllegalProposalEvidence => &evidence::IllegalProposals,
        TxType::IllegalVoteEvidence => &evidence::IllegalVotes,
        TxType::IllegalBlockEvidence => &evidence::IllegalBlocks,
        TxType::IllegalSidechainEvidence => &evidence::IllegalSidechainData,
        TxType::InactiveArbitrators => &arbiters::InactiveArbitrators,
        TxType::UpdateVersion => &arbiters::UpdateVersion,
        TxType::NextTurnDPOSInfo => &arbiters::NextTurnDposInfo,
        TxType::RevertToPOW => &arbiters::RevertToPow,
        TxType::RevertToDPOS => &arbiters::RevertToDpos,
        TxType::RegisterCR => &cr::RegisterCr,
        TxType::UnregisterCR => &cr::UnregisterCr,
        TxType::UpdateCR => &cr::UpdateCr,
        TxType::ReturnCRDepositCoin => &cr::ReturnCrDepositCoin,
        TxType::CRCouncilMemberClaimNode => &cr::ClaimNode,
        TxType::CRCProposal => &proposal::CrcProposal,
        TxType::CRCProposalReview => &proposal_flow::Review,
        TxType::CRCProposalTracking => &proposal_flow::Tracking,
        TxType::CRCProposalWithdraw => &proposal_flow::Withdraw,
        TxType::CRCProposalRealWithdraw => &proposal_flow::RealWithdraw,
        TxType::CRCAppropriation => &proposal_flow::Appropriation,
        TxType::CRAssetsRectify => &proposal_flow::AssetsRectify,
        TxType::ExchangeVotes => &stake::ExchangeVotes,
        TxType::Voting => &stake::Voting,
    }
}

/// Rejects `tx` if the context height is below `activation`.
fn activated_at(
    tx: &Transaction,
    ctx: &ValidationContext<'_>,
    activation: u32,
) -> Result<(), TransactionError> {
    if ctx.height < activation {
        return Err(TransactionError::height_version(format!(
            "not support {} transaction before height {}",
            tx.tx_type, activation
        )));
    }

    Ok(())
}

/// Rejects payload version `version` of `tx` below `activation`.
fn payload_version_activated_at(
    tx: &Transaction,
    ctx: &ValidationContext<'_>,
    version: u8,
    activation: u32,
) -> Result<(), TransactionError> {
    if tx.payload_version >= version && ctx.height < activation {
        return Err(TransactionError::height_version(format!(
            "not support {} payload version {} before height {}",
            tx.tx_type, tx.payload_version, activation
        )));
    }

    Ok(())
}

/// Verifies the single program of `tx` as a majority multi-signature of
/// `signers`.
fn signer_set_signature(tx: &Transaction, signers: &[Vec<u8>]) -> Result<(), TransactionError> {
    let [program] = tx.programs.as_slice() else {
        return Err(TransactionError::attribute_program(format!(
            "{} transactions should have one and only one program",
            tx.tx_type
        )));
    };

    ela_script::check_signer_set_signature(
        program,
        &tx.unsigned_bytes(),
        signers,
        check::majority(signers.len()),
    )?;

    Ok(())
}

/// Checks a registration's nickname and URL lengths.
fn nickname_and_url(nickname: &str, url: &str, max_len: usize) -> Result<(), TransactionError> {
    if nickname.is_empty() || nickname.len() > max_len {
        return Err(TransactionError::payload("invalid nick name"));
    }
    if url.len() > max_len {
        return Err(TransactionError::payload("invalid url"));
    }

    Ok(())
}
