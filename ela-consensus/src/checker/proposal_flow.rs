//! What happens to a proposal after registration: reviews, progress
//! tracking, and paying out its budget from the CR funds.
//!
//! The CR assets and CR expenses addresses have no keys. Transactions
//! spending them are authorized by committee state instead of programs.

use std::collections::HashSet;

use ela_chain::{
    transaction::{
        payload::{
            CrcProposalTracking, ProposalTrackingType, CRC_PROPOSAL_DATA_VERSION,
            CRC_PROPOSAL_WITHDRAW_V1,
        },
        Payload, Transaction,
    },
    Amount, Hash, ProgramHash,
};
use ela_state::{MemberStatus, ProposalState, ProposalStatus, References};

use super::{activated_at, payload_version_activated_at, ContextFlow, TransactionChecker};
use crate::{context::ValidationContext, error::TransactionError, transaction::check};

/// Rejects references that don't belong to `address`.
fn spends_only(
    references: &References,
    address: &ProgramHash,
    detail: &str,
) -> Result<(), TransactionError> {
    if references
        .iter()
        .any(|(_, output)| output.program_hash != *address)
    {
        return Err(TransactionError::input(detail));
    }

    Ok(())
}

/// Checks inline proposal data against its hash.
fn inline_data(
    data: &[u8],
    hash: &Hash,
    max_len: usize,
    name: &str,
) -> Result<(), TransactionError> {
    if data.len() > max_len {
        return Err(TransactionError::payload(format!(
            "the {name} data cannot be more than {max_len} bytes"
        )));
    }
    if Hash::sha256d(data) != *hash {
        return Err(TransactionError::payload(format!(
            "the {name} data and {name} hash are inconsistent"
        )));
    }

    Ok(())
}

fn existing_proposal(
    ctx: &ValidationContext<'_>,
    hash: &Hash,
) -> Result<ProposalState, TransactionError> {
    ctx.state
        .proposal(hash)
        .ok_or_else(|| TransactionError::payload("proposal not exist"))
}

/// Proposal flow types share the committee activation and the inline data
/// payload version.
fn committee_height_version(
    tx: &Transaction,
    ctx: &ValidationContext<'_>,
) -> Result<(), TransactionError> {
    activated_at(tx, ctx, ctx.params.cr_committee_start_height)?;
    payload_version_activated_at(
        tx,
        ctx,
        CRC_PROPOSAL_DATA_VERSION,
        ctx.params.crc_proposal_draft_data_start_height,
    )
}

/// A council member's review of a registered proposal.
pub struct Review;

impl TransactionChecker for Review {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        committee_height_version(tx, ctx)
    }

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let Payload::CRCProposalReview(review) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        if tx.payload_version >= CRC_PROPOSAL_DATA_VERSION {
            inline_data(
                &review.opinion_data,
                &review.opinion_hash,
                ctx.params.max_proposal_data_len,
                "opinion",
            )?;
        }

        Ok(())
    }

    fn is_allowed_in_pow_consensus(&self, _tx: &Transaction, _references: &References) -> bool {
        false
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::CRCProposalReview(review) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        let member = ctx
            .state
            .member(&review.did)
            .ok_or_else(|| TransactionError::payload("did correspond crMember not exists"))?;
        if member.status != MemberStatus::Elected {
            return Err(TransactionError::payload(
                "should be an elected CR members",
            ));
        }

        let proposal = existing_proposal(ctx, &review.proposal_hash)?;
        if proposal.status != ProposalStatus::Registered {
            return Err(TransactionError::payload(
                "should review proposal in Registered status",
            ));
        }

        let data = check::unsigned_bytes(|w| review.serialize_unsigned(w, tx.payload_version));
        check::code_signature(&member.info.code, &data, &review.signature)?;

        Ok(ContextFlow::Continue)
    }
}

/// Reports progress on an approved proposal, countersigned by the
/// secretary general.
pub struct Tracking;

impl TransactionChecker for Tracking {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        committee_height_version(tx, ctx)
    }

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let Payload::CRCProposalTracking(tracking) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        if tx.payload_version >= CRC_PROPOSAL_DATA_VERSION {
            let max_len = ctx.params.max_proposal_data_len;
            inline_data(&tracking.message_data, &tracking.message_hash, max_len, "message")?;
            inline_data(
                &tracking.secretary_general_opinion_data,
                &tracking.secretary_general_opinion_hash,
                max_len,
                "opinion",
            )?;
        }

        Ok(())
    }

    fn is_allowed_in_pow_consensus(&self, _tx: &Transaction, _references: &References) -> bool {
        false
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::CRCProposalTracking(tracking) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        let proposal = existing_proposal(ctx, &tracking.proposal_hash)?;
        if proposal.status != ProposalStatus::VoterAgreed {
            return Err(TransactionError::payload(
                "proposal status is not VoterAgreed",
            ));
        }
        if proposal.tracking_count >= ctx.params.max_proposal_tracking_count {
            return Err(TransactionError::payload("reached max tracking count"));
        }
        if tracking.owner_key != proposal.owner_key {
            return Err(TransactionError::payload(
                "the owner key is not the proposal owner",
            ));
        }

        tracking_stage(tracking, &proposal)?;
        tracking_signatures(tx, tracking, ctx)?;

        Ok(ContextFlow::Continue)
    }
}

/// Checks the reported stage and new owner against the tracking type.
fn tracking_stage(
    tracking: &CrcProposalTracking,
    proposal: &ProposalState,
) -> Result<(), TransactionError> {
    let expected_stage = match tracking.tracking_type {
        ProposalTrackingType::Common
        | ProposalTrackingType::Terminated
        | ProposalTrackingType::ChangeOwner => 0,
        ProposalTrackingType::Progress | ProposalTrackingType::Rejected => {
            proposal.current_stage
        }
        ProposalTrackingType::Finalized => proposal
            .final_payment_stage()
            .ok_or_else(|| TransactionError::payload("proposal has no final payment"))?,
    };
    if tracking.stage != expected_stage {
        return Err(TransactionError::payload(format!(
            "invalid tracking stage {}, expected {expected_stage}",
            tracking.stage
        )));
    }

    if tracking.tracking_type == ProposalTrackingType::ChangeOwner {
        if tracking.new_owner_key.is_empty() || tracking.new_owner_key == proposal.owner_key {
            return Err(TransactionError::payload("invalid new owner key"));
        }
    } else if !tracking.new_owner_key.is_empty() {
        return Err(TransactionError::payload(
            "the NewOwnerPublicKey need to be empty",
        ));
    }

    Ok(())
}

fn tracking_signatures(
    tx: &Transaction,
    tracking: &CrcProposalTracking,
    ctx: &ValidationContext<'_>,
) -> Result<(), TransactionError> {
    let version = tx.payload_version;

    check::key_signature(
        &tracking.owner_key,
        &tracking.owner_signed_data(version),
        &tracking.owner_signature,
        "proposal owner",
    )?;

    if tracking.new_owner_key.is_empty() {
        if !tracking.new_owner_signature.is_empty() {
            return Err(TransactionError::payload(
                "the new owner signature need to be empty",
            ));
        }
    } else {
        check::key_signature(
            &tracking.new_owner_key,
            &tracking.new_owner_signed_data(version),
            &tracking.new_owner_signature,
            "proposal new owner",
        )?;
    }

    check::key_signature(
        &ctx.state.secretary_general(),
        &tracking.secretary_general_signed_data(version),
        &tracking.secretary_general_signature,
        "secretary general",
    )
}

/// Withdraws the budget an approved proposal has earned.
///
/// Version 0 pays the recipient directly from the CR expenses address.
/// Version 1 only records the withdrawal; a later real withdraw pays it.
pub struct Withdraw;

impl TransactionChecker for Withdraw {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        activated_at(tx, ctx, ctx.params.cr_committee_start_height)?;

        let v1_height = ctx.params.crc_proposal_withdraw_payload_v1_height;
        if tx.payload_version >= CRC_PROPOSAL_WITHDRAW_V1 && ctx.height < v1_height {
            return Err(TransactionError::height_version(format!(
                "not support CRCProposalWithdraw payload version 1 before height {v1_height}"
            )));
        }
        if tx.payload_version < CRC_PROPOSAL_WITHDRAW_V1 && ctx.height >= v1_height {
            return Err(TransactionError::height_version(format!(
                "not support CRCProposalWithdraw payload version 0 after height {v1_height}"
            )));
        }

        Ok(())
    }

    fn check_transaction_input(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        if tx.payload_version >= CRC_PROPOSAL_WITHDRAW_V1 {
            check::no_inputs(tx)
        } else {
            check::transaction_inputs(tx)
        }
    }

    fn check_transaction_output(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        if tx.payload_version >= CRC_PROPOSAL_WITHDRAW_V1 {
            check::no_outputs(tx)
        } else {
            check::transaction_outputs(tx, ctx)
        }
    }

    fn check_attribute_program(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::attributes_without_programs(tx)
    }

    fn is_allowed_in_pow_consensus(&self, _tx: &Transaction, _references: &References) -> bool {
        false
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::CRCProposalWithdraw(withdraw) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        let proposal = existing_proposal(ctx, &withdraw.proposal_hash)?;
        if !matches!(
            proposal.status,
            ProposalStatus::VoterAgreed
                | ProposalStatus::Finished
                | ProposalStatus::Aborted
                | ProposalStatus::Terminated
        ) {
            return Err(TransactionError::payload(
                "proposal status is not VoterAgreed, Finished, Aborted or Terminated",
            ));
        }
        if withdraw.owner_key != proposal.owner_key {
            return Err(TransactionError::payload(
                "the owner key is not the proposal owner",
            ));
        }

        let available = ctx.state.available_withdraw_amount(&withdraw.proposal_hash);
        if available <= Amount::ZERO {
            return Err(TransactionError::payload("no need to withdraw"));
        }

        let flow = if tx.payload_version >= CRC_PROPOSAL_WITHDRAW_V1 {
            if withdraw.amount != available {
                return Err(TransactionError::balance(
                    "withdraw amount is not equal to the available amount",
                ));
            }
            if withdraw.recipient != proposal.recipient {
                return Err(TransactionError::payload("invalid withdraw recipient"));
            }
            ContextFlow::End
        } else {
            let expenses = &ctx.params.cr_expenses_address;
            spends_only(
                references,
                expenses,
                "proposal withdraw transaction can only spend CR expenses",
            )?;

            let Some((payment, change)) = tx.outputs.split_first() else {
                return Err(TransactionError::output("withdraw transaction has no output"));
            };
            if payment.program_hash != proposal.recipient {
                return Err(TransactionError::output(
                    "the first output must pay the proposal recipient",
                ));
            }
            if change.iter().any(|output| output.program_hash != *expenses) {
                return Err(TransactionError::output(
                    "the change output must go to the CR expenses address",
                ));
            }

            let fee = check::fee(tx, references)?;
            if payment.value.checked_add(fee)? != available {
                return Err(TransactionError::balance(
                    "withdraw amount plus fee is not equal to the available amount",
                ));
            }
            ContextFlow::Continue
        };

        let data = check::unsigned_bytes(|w| withdraw.serialize_unsigned(w, tx.payload_version));
        check::key_signature(
            &withdraw.owner_key,
            &data,
            &withdraw.signature,
            "proposal owner",
        )?;

        Ok(flow)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}

/// Pays out recorded withdrawals from the CR expenses address.
///
/// Output `i` pays withdrawal `i`, less a fixed fee per withdrawal. An
/// optional last output returns the change.
pub struct RealWithdraw;

impl TransactionChecker for RealWithdraw {
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
        let Payload::CRCProposalRealWithdraw(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        let hashes = &payload.withdraw_transaction_hashes;
        if hashes.is_empty() {
            return Err(TransactionError::payload(
                "real withdraw transaction hashes is empty",
            ));
        }
        if hashes.iter().collect::<HashSet<_>>().len() != hashes.len() {
            return Err(TransactionError::payload(
                "duplicated real withdraw transaction hash",
            ));
        }

        Ok(())
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::CRCProposalRealWithdraw(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };
        let params = ctx.params;
        let hashes = &payload.withdraw_transaction_hashes;

        spends_only(
            references,
            &params.cr_expenses_address,
            "real withdraw transaction can only spend CR expenses",
        )?;

        if tx.outputs.len() != hashes.len() && tx.outputs.len() != hashes.len() + 1 {
            return Err(TransactionError::output(
                "invalid real withdraw output count",
            ));
        }

        for (hash, output) in hashes.iter().zip(&tx.outputs) {
            let withdrawal = ctx.state.real_withdrawal(hash).ok_or_else(|| {
                TransactionError::payload("invalid withdraw transaction hash")
            })?;

            if output.program_hash != withdrawal.recipient {
                return Err(TransactionError::output(
                    "invalid real withdraw output address",
                ));
            }
            if output.value != withdrawal.amount.checked_sub(params.real_withdraw_single_fee)? {
                return Err(TransactionError::balance(
                    "invalid real withdraw output amount",
                ));
            }
        }

        if let Some(change) = tx.outputs.get(hashes.len()) {
            if change.program_hash != params.cr_expenses_address {
                return Err(TransactionError::output(
                    "invalid real withdraw change address",
                ));
            }
        }

        let count = i64::try_from(hashes.len())
            .map_err(|_| TransactionError::payload("too many real withdraw hashes"))?;
        let expected_fee = params.real_withdraw_single_fee.ratio(count, 1)?;
        if check::fee(tx, references)? != expected_fee {
            return Err(TransactionError::balance(
                "invalid real withdraw transaction fee",
            ));
        }

        Ok(ContextFlow::End)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}

/// Moves the next stage's budget from CR assets to CR expenses.
pub struct Appropriation;

impl TransactionChecker for Appropriation {
    fn check_attribute_program(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::attributes_without_programs(tx)
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let params = ctx.params;
        let amount = ctx.state.appropriation_amount().ok_or_else(|| {
            TransactionError::payload("should have no appropriation transaction")
        })?;

        spends_only(
            references,
            &params.cr_assets_address,
            "appropriation transaction can only spend CR assets",
        )?;

        let [expenses, assets] = tx.outputs.as_slice() else {
            return Err(TransactionError::output(
                "new appropriation transaction must have two outputs",
            ));
        };
        if expenses.program_hash != params.cr_expenses_address {
            return Err(TransactionError::output(
                "the first output must be the CR expenses address",
            ));
        }
        if expenses.value != amount {
            return Err(TransactionError::balance("invalid appropriation amount"));
        }
        if assets.program_hash != params.cr_assets_address {
            return Err(TransactionError::output(
                "the second output must be the CR assets address",
            ));
        }
        if check::fee(tx, references)? != Amount::ZERO {
            return Err(TransactionError::balance(
                "appropriation transaction should have no fee",
            ));
        }

        Ok(ContextFlow::End)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}

/// Merges CR assets outputs into one.
pub struct AssetsRectify;

impl TransactionChecker for AssetsRectify {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        activated_at(tx, ctx, ctx.params.cr_assets_rectify_transaction_height)
    }

    fn check_transaction_input(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::transaction_inputs(tx)?;

        let params = ctx.params;
        if !(params.min_cr_assets_utxo_count..=params.max_cr_assets_utxo_count)
            .contains(&tx.inputs.len())
        {
            return Err(TransactionError::input(format!(
                "rectify transaction should spend {} to {} inputs",
                params.min_cr_assets_utxo_count, params.max_cr_assets_utxo_count
            )));
        }

        Ok(())
    }

    fn check_transaction_output(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::transaction_outputs(tx, ctx)?;
        if tx.outputs.len() != 1 {
            return Err(TransactionError::output(
                "rectify transaction should have only one output",
            ));
        }

        Ok(())
    }

    fn check_attribute_program(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::attributes_without_programs(tx)
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let params = ctx.params;

        spends_only(
            references,
            &params.cr_assets_address,
            "rectify transaction can only spend CR assets",
        )?;
        if tx
            .outputs
            .iter()
            .any(|output| output.program_hash != params.cr_assets_address)
        {
            return Err(TransactionError::output(
                "rectify transaction should pay to the CR assets address",
            ));
        }
        if check::fee(tx, references)? != params.rectify_tx_fee {
            return Err(TransactionError::balance(
                "invalid rectify transaction fee",
            ));
        }

        Ok(ContextFlow::End)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}
