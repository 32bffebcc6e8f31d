//! CR candidates and council members.
//!
//! Candidates identify themselves with a standard redeem script: the
//! candidate id and DID are both derived from it, and it signs their
//! payloads.

use ela_chain::transaction::{
    payload::{CrInfo, CR_INFO_DID_VERSION},
    Payload, Transaction,
};
use ela_script::CodeType;
use ela_state::{CandidateStatus, MemberStatus, References};

use super::{
    activated_at, nickname_and_url, payload_version_activated_at, ContextFlow,
    TransactionChecker,
};
use crate::{context::ValidationContext, error::TransactionError, transaction::check};

/// Returns the CR info payload of a register or update transaction.
fn cr_info(tx: &Transaction) -> Result<&CrInfo, TransactionError> {
    match &tx.payload {
        Payload::RegisterCR(info) | Payload::UpdateCR(info) => Ok(info),
        _ => Err(check::payload_mismatch()),
    }
}

/// Register and update share their activation heights.
fn cr_info_height_version(
    tx: &Transaction,
    ctx: &ValidationContext<'_>,
) -> Result<(), TransactionError> {
    activated_at(tx, ctx, ctx.params.cr_voting_start_height)?;
    payload_version_activated_at(
        tx,
        ctx,
        CR_INFO_DID_VERSION,
        ctx.params.register_cr_by_did_height,
    )
}

fn voting_period(ctx: &ValidationContext<'_>) -> Result<(), TransactionError> {
    if !ctx.state.is_in_voting_period(ctx.height) {
        return Err(TransactionError::payload(
            "should create tx during voting period",
        ));
    }

    Ok(())
}

/// Checks that the payload identifiers derive from its code, and verifies
/// the payload signature.
fn cr_info_identity(tx: &Transaction, info: &CrInfo) -> Result<(), TransactionError> {
    match ela_script::code_type(&info.code) {
        Some(CodeType::Standard) => {}
        Some(CodeType::MultiSig) => {
            return Err(TransactionError::payload("CR not support multi sign code"))
        }
        None => return Err(TransactionError::payload("invalid redeem script code")),
    }

    if ela_script::cid(&info.code) != info.cid {
        return Err(TransactionError::payload("invalid cid address"));
    }
    if tx.payload_version >= CR_INFO_DID_VERSION && ela_script::did(&info.code) != info.did {
        return Err(TransactionError::payload("invalid did address"));
    }

    let data = check::unsigned_bytes(|w| info.serialize_unsigned(w, tx.payload_version));
    check::code_signature(&info.code, &data, &info.signature)
}

/// Registers a CR candidate and locks its deposit.
pub struct RegisterCr;

impl TransactionChecker for RegisterCr {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        cr_info_height_version(tx, ctx)
    }

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let info = cr_info(tx)?;
        nickname_and_url(&info.nickname, &info.url, ctx.params.max_nickname_len)
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
        let info = cr_info(tx)?;
        voting_period(ctx)?;

        if ctx.state.is_cr_nickname_used(&info.nickname) {
            return Err(TransactionError::payload(format!(
                "nick name {} already inuse",
                info.nickname
            )));
        }
        if ctx.state.candidate(&info.cid).is_some() {
            return Err(TransactionError::payload("cid already exist"));
        }

        cr_info_identity(tx, info)?;

        let deposit_address = ela_script::deposit_address(&info.code);
        let deposits: Vec<_> = tx
            .outputs
            .iter()
            .filter(|output| output.program_hash == deposit_address)
            .map(|output| output.value)
            .collect();
        if deposits.is_empty() {
            return Err(TransactionError::output(
                "deposit address does not match the code in payload",
            ));
        }
        if check::total(&deposits)? < ctx.params.min_cr_deposit_amount {
            return Err(TransactionError::balance(
                "CR deposit amount is insufficient",
            ));
        }

        Ok(ContextFlow::Continue)
    }
}

/// Updates a candidate's nickname, URL or location.
pub struct UpdateCr;

impl TransactionChecker for UpdateCr {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        cr_info_height_version(tx, ctx)
    }

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let info = cr_info(tx)?;
        nickname_and_url(&info.nickname, &info.url, ctx.params.max_nickname_len)
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
        let info = cr_info(tx)?;
        voting_period(ctx)?;

        let candidate = ctx
            .state
            .candidate(&info.cid)
            .ok_or_else(|| TransactionError::payload("updating unknown CR"))?;
        if !matches!(
            candidate.status,
            CandidateStatus::Pending | CandidateStatus::Active
        ) {
            return Err(TransactionError::payload(
                "updating canceled or returned CR",
            ));
        }
        if candidate.info.code != info.code {
            return Err(TransactionError::payload("code does not match the CR"));
        }
        if candidate.info.nickname != info.nickname && ctx.state.is_cr_nickname_used(&info.nickname)
        {
            return Err(TransactionError::payload(format!(
                "nick name {} already inuse",
                info.nickname
            )));
        }

        cr_info_identity(tx, info)?;

        Ok(ContextFlow::Continue)
    }
}

/// Withdraws a candidacy, starting the deposit lockup.
pub struct UnregisterCr;

impl TransactionChecker for UnregisterCr {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        activated_at(tx, ctx, ctx.params.cr_voting_start_height)
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
        let Payload::UnregisterCR(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };
        voting_period(ctx)?;

        let candidate = ctx
            .state
            .candidate(&payload.cid)
            .ok_or_else(|| TransactionError::payload("unregister unknown CR"))?;
        if !matches!(
            candidate.status,
            CandidateStatus::Pending | CandidateStatus::Active
        ) {
            return Err(TransactionError::payload(
                "unregister canceled or returned CR",
            ));
        }

        let data = check::unsigned_bytes(|w| payload.serialize_unsigned(w));
        check::code_signature(&candidate.info.code, &data, &payload.signature)?;

        Ok(ContextFlow::Continue)
    }
}

/// Returns the deposit of a canceled candidate or a former council member.
///
/// Every input must come from the deposit address of one signer, so a
/// transaction returns a single deposit.
pub struct ReturnCrDepositCoin;

impl TransactionChecker for ReturnCrDepositCoin {
    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let deposit_address = match references.first() {
            Some((_, output)) => output.program_hash,
            None => return Err(TransactionError::input("transaction has no inputs")),
        };
        if references
            .iter()
            .any(|(_, output)| output.program_hash != deposit_address)
        {
            return Err(TransactionError::input(
                "inputs must come from one deposit address",
            ));
        }

        let program = tx
            .programs
            .iter()
            .find(|program| ela_script::deposit_address(&program.code) == deposit_address)
            .ok_or_else(|| {
                TransactionError::input("the deposit address does not belong to any signer")
            })?;
        let cid = ela_script::cid(&program.code);

        if let Some(candidate) = ctx.state.candidate(&cid) {
            if candidate.status != CandidateStatus::Canceled {
                return Err(TransactionError::payload(
                    "candidate must be canceled before returning the deposit",
                ));
            }
            let unlock_height = candidate
                .cancel_height
                .saturating_add(ctx.params.cr_deposit_lockup_blocks);
            if ctx.height < unlock_height {
                return Err(TransactionError::payload(
                    "the deposit does not meet the lockup limit",
                ));
            }
        } else if let Some(member) = ctx.state.member_by_cid(&cid) {
            if member.status == MemberStatus::Elected {
                return Err(TransactionError::payload(
                    "an elected member can not return its deposit",
                ));
            }
        } else {
            return Err(TransactionError::payload(
                "signer must be candidate or member",
            ));
        }

        let available = ctx
            .state
            .available_deposit_amount(&cid)
            .ok_or_else(|| TransactionError::payload("no deposit to return"))?;

        let change: Vec<_> = tx
            .outputs
            .iter()
            .filter(|output| output.program_hash == deposit_address)
            .map(|output| output.value)
            .collect();

        let returned = check::input_total(references)?.checked_sub(check::total(&change)?)?;
        if returned > available {
            return Err(TransactionError::balance("overspend deposit"));
        }

        Ok(ContextFlow::Continue)
    }
}

/// Lets a council member claim a DPoS node key.
pub struct ClaimNode;

impl TransactionChecker for ClaimNode {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        activated_at(tx, ctx, ctx.params.cr_claim_dpos_node_start_height)
    }

    no_cost_hooks!(no_programs);

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::CRCouncilMemberClaimNode(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        let member = ctx
            .state
            .member(&payload.cr_council_member_did)
            .ok_or_else(|| TransactionError::payload("the originator must be members"))?;
        if !matches!(
            member.status,
            MemberStatus::Elected | MemberStatus::Inactive
        ) {
            return Err(TransactionError::payload(
                "CR Council Member should be an elected or inactive CR members",
            ));
        }

        let node = payload.node_public_key.as_slice();
        if ctx.state.producer_by_node(node).is_some() || ctx.state.producer_by_owner(node).is_some()
        {
            return Err(TransactionError::payload(
                "producer already registered this node public key",
            ));
        }

        let data = check::unsigned_bytes(|w| payload.serialize_unsigned(w));
        check::code_signature(&member.info.code, &data, &payload.signature)?;

        Ok(ContextFlow::End)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}
