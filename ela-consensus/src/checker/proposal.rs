//! CR council proposals.
//!
//! A proposal is signed in layers: the owner signs the payload, the new
//! owner or secretary general (for the sub-types that have one) signs over
//! the owner's signature, and the sponsoring council member signs over
//! everything before it.

use std::collections::HashSet;

use ela_chain::{
    transaction::{
        payload::{BudgetType, CrcProposal as Proposal, ProposalType, CRC_PROPOSAL_DATA_VERSION},
        Payload, Transaction,
    },
    Amount, Hash, Prefix, ProgramHash,
};
use ela_state::{MemberStatus, ProposalState, ProposalStatus, References};

use super::{activated_at, payload_version_activated_at, ContextFlow, TransactionChecker};
use crate::{context::ValidationContext, error::TransactionError, transaction::check};

fn proposal(tx: &Transaction) -> Result<&Proposal, TransactionError> {
    match &tx.payload {
        Payload::CRCProposal(proposal) => Ok(proposal),
        _ => Err(check::payload_mismatch()),
    }
}

fn is_custom_id_type(proposal_type: ProposalType) -> bool {
    matches!(
        proposal_type,
        ProposalType::RESERVE_CUSTOM_ID
            | ProposalType::RECEIVE_CUSTOM_ID
            | ProposalType::CHANGE_CUSTOM_ID_FEE
    )
}

/// Registers a proposal sponsored by a council member.
pub struct CrcProposal;

impl TransactionChecker for CrcProposal {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let params = ctx.params;
        activated_at(tx, ctx, params.cr_committee_start_height)?;
        payload_version_activated_at(
            tx,
            ctx,
            CRC_PROPOSAL_DATA_VERSION,
            params.crc_proposal_draft_data_start_height,
        )?;

        let proposal_type = proposal(tx)?.proposal_type;
        if is_custom_id_type(proposal_type) && ctx.height < params.custom_id_proposal_start_height
        {
            return Err(TransactionError::height_version(format!(
                "not support custom id proposal before height {}",
                params.custom_id_proposal_start_height
            )));
        }
        if proposal_type == ProposalType::REGISTER_SIDE_CHAIN
            && ctx.height < params.new_cross_chain_start_height
        {
            return Err(TransactionError::height_version(format!(
                "not support register side chain proposal before height {}",
                params.new_cross_chain_start_height
            )));
        }

        Ok(())
    }

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let proposal = proposal(tx)?;
        let params = ctx.params;

        if !proposal.proposal_type.is_known() {
            return Err(TransactionError::payload("type of proposal should be known"));
        }
        if proposal.category_data.len() > params.max_category_data_len {
            return Err(TransactionError::payload(format!(
                "the Proposal category data cannot be more than {} characters",
                params.max_category_data_len
            )));
        }

        if tx.payload_version >= CRC_PROPOSAL_DATA_VERSION {
            if proposal.draft_data.len() > params.max_proposal_data_len {
                return Err(TransactionError::payload(format!(
                    "the Proposal draft data cannot be more than {} bytes",
                    params.max_proposal_data_len
                )));
            }
            if Hash::sha256d(&proposal.draft_data) != proposal.draft_hash {
                return Err(TransactionError::payload(
                    "the draft data and draft hash of proposal are inconsistent",
                ));
            }
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
        let proposal = proposal(tx)?;
        let state = ctx.state;

        if !state.is_proposal_allowed(ctx.height) {
            return Err(TransactionError::payload(
                "cr proposal tx must not during voting period",
            ));
        }

        let member = state
            .member(&proposal.cr_council_member_did)
            .ok_or_else(|| {
                TransactionError::payload("CR Council Member should be one of the CR members")
            })?;
        if member.status != MemberStatus::Elected {
            return Err(TransactionError::payload(
                "CR Council Member should be an elected CR members",
            ));
        }
        if state.proposal_count(&proposal.cr_council_member_did)
            >= ctx.params.max_committee_proposal_count
        {
            return Err(TransactionError::payload("proposal is full"));
        }
        if state.proposal(&proposal.hash(tx.payload_version)).is_some() {
            return Err(TransactionError::payload("duplicated proposal"));
        }

        match proposal.proposal_type {
            ProposalType::CHANGE_PROPOSAL_OWNER => change_owner(proposal, ctx)?,
            ProposalType::CLOSE_PROPOSAL => {
                target_proposal(proposal, ctx)?;
            }
            ProposalType::SECRETARY_GENERAL => secretary_general(proposal)?,
            ProposalType::RESERVE_CUSTOM_ID => reserve_custom_id(proposal, ctx)?,
            ProposalType::RECEIVE_CUSTOM_ID => receive_custom_id(proposal, ctx)?,
            ProposalType::CHANGE_CUSTOM_ID_FEE => change_custom_id_fee(proposal, ctx)?,
            ProposalType::REGISTER_SIDE_CHAIN => register_side_chain(proposal, ctx)?,
            _ => {
                budgets(proposal, ctx)?;
                recipient(&proposal.recipient)?;
            }
        }

        signatures(tx, proposal, &member.info.code)?;

        Ok(ContextFlow::Continue)
    }
}

/// Verifies every signature layer of the proposal.
fn signatures(
    tx: &Transaction,
    proposal: &Proposal,
    member_code: &[u8],
) -> Result<(), TransactionError> {
    let version = tx.payload_version;

    check::key_signature(
        &proposal.owner_key,
        &proposal.owner_signed_data(version),
        &proposal.signature,
        "proposal owner",
    )?;

    match proposal.proposal_type {
        ProposalType::CHANGE_PROPOSAL_OWNER => {
            let new_owner = if proposal.new_owner_key.is_empty() {
                &proposal.owner_key
            } else {
                &proposal.new_owner_key
            };
            check::key_signature(
                new_owner,
                &proposal.second_signed_data(version),
                &proposal.new_owner_signature,
                "proposal new owner",
            )?;
        }
        ProposalType::SECRETARY_GENERAL => {
            check::key_signature(
                &proposal.secretary_general_public_key,
                &proposal.second_signed_data(version),
                &proposal.secretary_general_signature,
                "secretary general",
            )?;
        }
        _ => {}
    }

    check::code_signature(
        member_code,
        &proposal.council_member_signed_data(version),
        &proposal.cr_council_member_signature,
    )
}

/// Returns the proposal targeted by an owner change or close, which must
/// have been agreed by voters.
fn target_proposal(
    proposal: &Proposal,
    ctx: &ValidationContext<'_>,
) -> Result<ProposalState, TransactionError> {
    let target = ctx
        .state
        .proposal(&proposal.target_proposal_hash)
        .ok_or_else(|| TransactionError::payload("proposal doesn't exist"))?;
    if target.status != ProposalStatus::VoterAgreed {
        return Err(TransactionError::payload(
            "proposal status is not VoterAgreed",
        ));
    }

    Ok(target)
}

fn change_owner(proposal: &Proposal, ctx: &ValidationContext<'_>) -> Result<(), TransactionError> {
    let target = target_proposal(proposal, ctx)?;

    if target.owner_key != proposal.owner_key {
        return Err(TransactionError::payload(
            "owner key is not the current proposal owner",
        ));
    }
    if proposal.new_owner_key.is_empty() && proposal.new_recipient.is_zero() {
        return Err(TransactionError::payload(
            "new owner or new recipient should be set",
        ));
    }
    if !proposal.new_recipient.is_zero() {
        recipient(&proposal.new_recipient)?;
    }

    Ok(())
}

fn secretary_general(proposal: &Proposal) -> Result<(), TransactionError> {
    let key = &proposal.secretary_general_public_key;
    if key.is_empty() {
        return Err(TransactionError::payload(
            "invalid secretary general public key",
        ));
    }
    if ela_script::did(&ela_script::standard_code(key)) != proposal.secretary_general_did {
        return Err(TransactionError::payload(
            "the secretary general did does not match the public key",
        ));
    }

    Ok(())
}

fn reserve_custom_id(proposal: &Proposal, ctx: &ValidationContext<'_>) -> Result<(), TransactionError> {
    if !ctx.state.reserved_custom_ids().is_empty() {
        return Err(TransactionError::payload("already have reserved custom id"));
    }
    if proposal.reserved_custom_id_list.is_empty() {
        return Err(TransactionError::payload("reserved custom id list is empty"));
    }

    let mut seen = HashSet::new();
    for id in &proposal.reserved_custom_id_list {
        if id.is_empty() || id.len() > ctx.params.max_reserved_custom_id_len {
            return Err(TransactionError::payload(format!(
                "invalid reserved custom id length {}",
                id.len()
            )));
        }
        if !seen.insert(id) {
            return Err(TransactionError::payload(format!(
                "duplicated reserved custom id {id}"
            )));
        }
    }

    Ok(())
}

fn receive_custom_id(proposal: &Proposal, ctx: &ValidationContext<'_>) -> Result<(), TransactionError> {
    if proposal.received_custom_id_list.is_empty() {
        return Err(TransactionError::payload("received custom id list is empty"));
    }
    if proposal.receiver_did.is_zero() {
        return Err(TransactionError::payload("invalid receiver did"));
    }

    let reserved = ctx.state.reserved_custom_ids();
    let received = ctx.state.received_custom_ids();
    for id in &proposal.received_custom_id_list {
        if !reserved.contains(id) {
            return Err(TransactionError::payload(format!(
                "custom id {id} is not reserved"
            )));
        }
        if received.contains(id) {
            return Err(TransactionError::payload(format!(
                "custom id {id} is already received"
            )));
        }
    }

    Ok(())
}

fn change_custom_id_fee(
    proposal: &Proposal,
    ctx: &ValidationContext<'_>,
) -> Result<(), TransactionError> {
    if proposal.rate_of_custom_id_fee.is_negative() {
        return Err(TransactionError::payload("invalid fee rate of custom ID"));
    }
    if proposal.eid_effective_height <= ctx.height {
        return Err(TransactionError::payload("invalid EID effective height"));
    }

    Ok(())
}

fn register_side_chain(
    proposal: &Proposal,
    ctx: &ValidationContext<'_>,
) -> Result<(), TransactionError> {
    let info = &proposal.side_chain_info;
    let state = ctx.state;

    if info.side_chain_name.is_empty() || state.is_side_chain_name_used(&info.side_chain_name) {
        return Err(TransactionError::payload("side chain name already in use"));
    }
    if state.is_side_chain_magic_used(info.magic_number) {
        return Err(TransactionError::payload("side chain magic number already in use"));
    }
    if info.genesis_hash.is_zero() || state.is_side_chain_genesis_used(&info.genesis_hash) {
        return Err(TransactionError::payload("side chain genesis hash already in use"));
    }
    if info.exchange_rate != Amount::from_ela(1) {
        return Err(TransactionError::payload("exchange rate should be 1"));
    }
    if info.effective_height <= ctx.height {
        return Err(TransactionError::payload("invalid side chain effective height"));
    }

    Ok(())
}

/// Budget recipients must be spendable by a key or multi-signature.
fn recipient(recipient: &ProgramHash) -> Result<(), TransactionError> {
    match recipient.prefix() {
        Some(Prefix::Standard | Prefix::MultiSig) => Ok(()),
        _ => Err(TransactionError::payload("invalid recipient prefix")),
    }
}

/// Checks the budget stages and that the committee can afford them.
///
/// Stages are numbered from 1, with an optional imprest at stage 0, and end
/// with exactly one final payment.
fn budgets(proposal: &Proposal, ctx: &ValidationContext<'_>) -> Result<(), TransactionError> {
    let mut budgets = proposal.budgets.clone();
    budgets.sort_by_key(|budget| budget.stage);

    let mut imprests = 0;
    let mut finals = 0;
    let mut next_stage = None;
    for budget in &budgets {
        if budget.amount.is_negative() {
            return Err(TransactionError::payload("invalid budget amount"));
        }

        match budget.budget_type {
            BudgetType::Imprest => {
                if budget.stage != 0 {
                    return Err(TransactionError::payload(
                        "imprest payment budget should be stage 0",
                    ));
                }
                imprests += 1;
                continue;
            }
            BudgetType::FinalPayment => finals += 1,
            BudgetType::NormalPayment => {}
        }

        match next_stage {
            None if budget.stage != 1 => {
                return Err(TransactionError::payload(
                    "the first general type budget needs to be stage 1",
                ))
            }
            Some(expected) if budget.stage != expected => {
                return Err(TransactionError::payload(
                    "budgets stages should be continuous",
                ))
            }
            _ => {}
        }
        next_stage = Some(budget.stage.saturating_add(1));
    }

    if imprests > 1 {
        return Err(TransactionError::payload("imprest payment count invalid"));
    }
    if finals != 1 {
        return Err(TransactionError::payload("final payment count invalid"));
    }
    if budgets.last().map(|budget| budget.budget_type) != Some(BudgetType::FinalPayment) {
        return Err(TransactionError::payload(
            "the last budget should be final payment",
        ));
    }

    let total = Amount::try_sum(budgets.iter().map(|budget| budget.amount))?;
    let current = ctx.state.current_stage_amount();
    let percentage = ctx.params.crc_proposal_budgets_percentage;
    if total > current.ratio(percentage, 100)? {
        return Err(TransactionError::balance(format!(
            "budgets exceeds {percentage}% of CRC committee balance"
        )));
    }
    if total > current.checked_sub(ctx.state.committee_used_amount())? {
        return Err(TransactionError::balance(
            "budgets exceeds the balance of CRC committee",
        ));
    }

    Ok(())
}
