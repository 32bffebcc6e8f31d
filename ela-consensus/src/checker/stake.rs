//! DPoS v2 staking and voting.
//!
//! Staking locks coins in the stake pool and credits vote rights to the
//! staker's DPoS v2 address. Voting spends those rights and moves no coins.

use std::collections::HashSet;

use ela_chain::{
    transaction::{
        output_payload::{OutputPayload, VoteType},
        payload::{VotesWithLockTime, RENEWAL_VOTE_VERSION},
        Payload, Program, Transaction,
    },
    Amount, Prefix,
};
use ela_state::References;

use super::{activated_at, ContextFlow, TransactionChecker};
use crate::{
    context::ValidationContext,
    error::TransactionError,
    transaction::{check, vote},
};

fn single_program(tx: &Transaction) -> Result<&Program, TransactionError> {
    match tx.programs.as_slice() {
        [program] => Ok(program),
        _ => Err(TransactionError::attribute_program(format!(
            "{} transactions should have one and only one program",
            tx.tx_type
        ))),
    }
}

/// Exchanges coins for DPoS v2 vote rights.
pub struct ExchangeVotes;

impl TransactionChecker for ExchangeVotes {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        activated_at(tx, ctx, ctx.params.dpos_v2_start_height)
    }

    fn check_transaction_output(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::transaction_outputs(tx, ctx)?;

        if tx.outputs.len() > 2 {
            return Err(TransactionError::output(
                "output count should not be greater than 2",
            ));
        }
        let stake = tx
            .outputs
            .first()
            .ok_or_else(|| TransactionError::output("transaction has no outputs"))?;

        let OutputPayload::Stake(payload) = &stake.payload else {
            return Err(TransactionError::output("invalid output type"));
        };
        if stake.program_hash != ctx.params.stake_pool_address {
            return Err(TransactionError::output(
                "first output address need to be stake address",
            ));
        }
        if !payload.stake_address.has_prefix(Prefix::DposV2) {
            return Err(TransactionError::output("invalid stake address prefix"));
        }

        Ok(())
    }

    fn check_attribute_program(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::single_program(tx)
    }

    fn is_allowed_in_pow_consensus(&self, _tx: &Transaction, _references: &References) -> bool {
        false
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let program = single_program(tx)?;
        let stake_address = match tx.outputs.first().map(|output| &output.payload) {
            Some(OutputPayload::Stake(payload)) => payload.stake_address,
            _ => return Err(TransactionError::output("invalid output type")),
        };

        if stake_address != ela_script::stake_address(&program.code) {
            return Err(TransactionError::output(
                "stake address does not match the program code",
            ));
        }

        Ok(ContextFlow::Continue)
    }
}

/// Casts or renews DPoS v2 era votes with vote rights.
pub struct Voting;

impl TransactionChecker for Voting {
    no_cost_hooks!(single_program);

    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        activated_at(tx, ctx, ctx.params.dpos_v2_start_height)
    }

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let Payload::Voting(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        if tx.payload_version >= RENEWAL_VOTE_VERSION {
            if payload.renewal_contents.is_empty() {
                return Err(TransactionError::payload("invalid renewal voting content"));
            }

            let mut refer_keys = HashSet::new();
            for renewal in &payload.renewal_contents {
                if renewal.refer_key.is_zero() || !refer_keys.insert(renewal.refer_key) {
                    return Err(TransactionError::payload("invalid renewal refer key"));
                }
                positive_votes(&renewal.votes_info)?;
            }

            return Ok(());
        }

        if payload.contents.is_empty() {
            return Err(TransactionError::payload("invalid voting content"));
        }

        let mut vote_types = HashSet::new();
        for content in &payload.contents {
            match VoteType::from_u8(content.vote_type) {
                None => return Err(TransactionError::payload("invalid vote type")),
                Some(VoteType::Delegate) => {
                    return Err(TransactionError::payload(
                        "delegate votes are not supported by voting transactions",
                    ))
                }
                Some(_) => {}
            }
            if !vote_types.insert(content.vote_type) {
                return Err(TransactionError::payload("duplicate vote type"));
            }
            if content.votes_info.is_empty() {
                return Err(TransactionError::payload("vote content has no candidates"));
            }

            let mut candidates = HashSet::new();
            for votes in &content.votes_info {
                if !candidates.insert(&votes.candidate) {
                    return Err(TransactionError::payload("duplicate candidate"));
                }
                positive_votes(votes)?;
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
        let Payload::Voting(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };
        let program = single_program(tx)?;
        let rights = ctx
            .state
            .vote_rights(&ela_script::stake_address(&program.code));

        if tx.payload_version >= RENEWAL_VOTE_VERSION {
            let votes: Vec<_> = payload
                .renewal_contents
                .iter()
                .map(|renewal| &renewal.votes_info)
                .collect();
            within_rights(votes.iter().map(|votes| votes.votes), rights)?;

            for votes in votes {
                vote::candidates_of(VoteType::DposV2, &[votes.candidate.as_slice()], ctx)?;
                lock_time(votes, ctx)?;
            }
        } else {
            for content in &payload.contents {
                let kind = VoteType::from_u8(content.vote_type)
                    .ok_or_else(|| TransactionError::payload("invalid vote type"))?;
                within_rights(content.votes_info.iter().map(|votes| votes.votes), rights)?;

                let candidates: Vec<&[u8]> = content
                    .votes_info
                    .iter()
                    .map(|votes| votes.candidate.as_slice())
                    .collect();
                vote::candidates_of(kind, &candidates, ctx)?;

                if kind == VoteType::DposV2 {
                    for votes in &content.votes_info {
                        lock_time(votes, ctx)?;
                    }
                }
            }
        }

        ela_script::check_standard_signature(program, &tx.unsigned_bytes())?;

        Ok(ContextFlow::End)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}

fn positive_votes(votes: &VotesWithLockTime) -> Result<(), TransactionError> {
    if votes.votes <= Amount::ZERO {
        return Err(TransactionError::payload("invalid vote amount"));
    }

    Ok(())
}

/// Rejects votes of one type that add up to more than the voter's rights.
fn within_rights(
    votes: impl IntoIterator<Item = Amount>,
    rights: Amount,
) -> Result<(), TransactionError> {
    if Amount::try_sum(votes)? > rights {
        return Err(TransactionError::balance("votes larger than vote rights"));
    }

    Ok(())
}

/// DPoS v2 votes must stay locked within the allowed window.
fn lock_time(votes: &VotesWithLockTime, ctx: &ValidationContext<'_>) -> Result<(), TransactionError> {
    let params = ctx.params;
    let earliest = ctx.height.saturating_add(params.dpos_v2_min_votes_lock_time);
    let latest = ctx.height.saturating_add(params.dpos_v2_max_votes_lock_time);

    if !(earliest..=latest).contains(&votes.lock_time) {
        return Err(TransactionError::payload("invalid DPoS v2 vote lock time"));
    }

    Ok(())
}
