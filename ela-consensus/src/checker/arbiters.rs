//! Arbitrator schedule and consensus mode transactions.
//!
//! These are produced by the arbitrators themselves and carry no value.

use ela_chain::transaction::{payload::RevertType, Payload, Transaction};
use ela_state::{ConsensusAlgorithm, References};

use super::{activated_at, signer_set_signature, ContextFlow, TransactionChecker};
use crate::{context::ValidationContext, error::TransactionError, transaction::check};

/// Marks arbitrators that missed too many rounds as inactive.
///
/// Sponsored by a CRC arbitrator and signed by a majority of them.
pub struct InactiveArbitrators;

impl TransactionChecker for InactiveArbitrators {
    no_cost_hooks!(single_program);

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let Payload::InactiveArbitrators(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        if payload.arbitrators.is_empty() {
            return Err(TransactionError::payload(
                "inactive arbitrators should not be empty",
            ));
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
        let Payload::InactiveArbitrators(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        if !ctx.state.is_crc_arbitrator(&payload.sponsor) {
            return Err(TransactionError::payload(
                "sponsor is not belong to arbitrators",
            ));
        }
        for arbitrator in &payload.arbitrators {
            if !ctx.state.is_arbitrator(arbitrator) || ctx.state.is_crc_arbitrator(arbitrator) {
                return Err(TransactionError::payload(
                    "inactive arbitrator is not belong to arbitrators",
                ));
            }
        }

        signer_set_signature(tx, &ctx.state.crc_arbiters())?;

        Ok(ContextFlow::End)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}

/// Announces the height window of a protocol upgrade.
pub struct UpdateVersion;

impl TransactionChecker for UpdateVersion {
    no_cost_hooks!(single_program);

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let Payload::UpdateVersion(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        if payload.start_height >= payload.end_height {
            return Err(TransactionError::payload(
                "invalid update version height",
            ));
        }

        Ok(())
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        signer_set_signature(tx, &ctx.state.crc_arbiters())?;

        Ok(ContextFlow::End)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}

/// Records the arbitrators of the next DPoS turn.
///
/// Every node computes the same schedule, so the payload must match the
/// local one exactly.
pub struct NextTurnDposInfo;

impl TransactionChecker for NextTurnDposInfo {
    no_cost_hooks!(no_programs);

    fn is_allowed_in_pow_consensus(&self, _tx: &Transaction, _references: &References) -> bool {
        false
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::NextTurnDPOSInfo(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        match ctx.state.next_turn_dpos_info() {
            Some(expected) if expected == *payload => Ok(ContextFlow::End),
            Some(_) => Err(TransactionError::payload(
                "next turn DPOS info does not match the local schedule",
            )),
            None => Err(TransactionError::payload("no next turn DPOS info")),
        }
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}

/// Switches consensus to proof of work when DPoS stalls.
pub struct RevertToPow;

impl TransactionChecker for RevertToPow {
    no_cost_hooks!(no_programs);

    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        activated_at(tx, ctx, ctx.params.revert_to_pow_start_height)
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
        let Payload::RevertToPOW(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        if ctx.state.consensus_algorithm() != ConsensusAlgorithm::Dpos {
            return Err(TransactionError::payload("invalid consensus algorithm"));
        }
        if payload.working_height != ctx.height {
            return Err(TransactionError::payload("invalid working height"));
        }

        match payload.revert_type {
            RevertType::NoBlock => {
                let idle = ctx.timestamp.saturating_sub(ctx.state.best_block_timestamp());
                if idle < ctx.params.revert_to_pow_no_block_time {
                    return Err(TransactionError::payload(
                        "invalid block time for revert to POW",
                    ));
                }
            }
            RevertType::NoProducers => {
                if ctx.state.active_producer_count() >= ctx.params.general_arbiters {
                    return Err(TransactionError::payload(
                        "enough producers are active",
                    ));
                }
            }
            RevertType::NoClaimDposNode => {
                if !ctx.state.has_unclaimed_members() {
                    return Err(TransactionError::payload(
                        "every council member claimed a DPoS node",
                    ));
                }
            }
        }

        Ok(ContextFlow::End)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}

/// Switches consensus back to DPoS.
///
/// Accepted only while blocks are mined with proof of work, and signed by
/// a majority of the CRC arbitrators.
pub struct RevertToDpos;

impl TransactionChecker for RevertToDpos {
    no_cost_hooks!(single_program);

    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        activated_at(tx, ctx, ctx.params.revert_to_pow_start_height)
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::RevertToDPOS(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        if ctx.state.consensus_algorithm() != ConsensusAlgorithm::Pow {
            return Err(TransactionError::payload(
                "invalid consensus algorithm, must be in POW",
            ));
        }
        if payload.work_height_interval == 0 {
            return Err(TransactionError::payload("invalid work height interval"));
        }

        signer_set_signature(tx, &ctx.state.crc_arbiters())?;

        Ok(ContextFlow::End)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}
