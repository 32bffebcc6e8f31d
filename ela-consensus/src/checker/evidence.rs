//! Evidence of arbitrator misbehaviour.
//!
//! Each evidence payload carries two conflicting signed messages from the
//! same arbitrator. The pair must be ordered by hash, so the same offence
//! has exactly one valid encoding.
//!
//! The shape of the evidence and its signatures are checked without chain
//! state. The offender's membership in the arbitrator set is checked in
//! context, against the snapshots taken at the evidence height.

use ela_chain::{
    block::Header,
    serialization::ElaDeserialize,
    transaction::{
        payload::{
            BlockEvidence, DposConfirm, DposProposal, DposProposalVote, ProposalEvidence,
            VoteEvidence,
        },
        Payload, Transaction,
    },
};
use ela_state::References;

use super::{ContextFlow, TransactionChecker};
use crate::{context::ValidationContext, error::TransactionError, transaction::check};

/// The hooks shared by every evidence type.
macro_rules! evidence_hooks {
    () => {
        no_cost_hooks!(no_programs);

        fn is_allowed_in_pow_consensus(&self, _tx: &Transaction, _references: &References) -> bool {
            false
        }

        fn requires_signature(&self, _tx: &Transaction) -> bool {
            false
        }
    };
}

/// Returns the arbitrators at `height`.
///
/// Falls back to the current arbitrators when no snapshot was taken at that
/// height.
fn arbitrators_at(ctx: &ValidationContext<'_>, height: u32) -> Vec<Vec<u8>> {
    let snapshots = ctx.state.snapshot(height);
    if snapshots.is_empty() {
        return ctx.state.arbitrators();
    }

    let mut keys: Vec<Vec<u8>> = Vec::new();
    for snapshot in snapshots {
        for key in snapshot.arbitrators {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys
}

fn is_arbitrator_at(ctx: &ValidationContext<'_>, height: u32, public_key: &[u8]) -> bool {
    arbitrators_at(ctx, height)
        .iter()
        .any(|key| key.as_slice() == public_key)
}

/// Checks that the evidence header is the proposed block at the claimed
/// height.
fn proposal_evidence(evidence: &ProposalEvidence) -> Result<(), TransactionError> {
    let header = Header::ela_deserialize(evidence.block_header.as_slice())?;

    if header.hash() != evidence.proposal.block_hash {
        return Err(TransactionError::payload(
            "proposal hash and block should match",
        ));
    }
    if header.height != evidence.block_height {
        return Err(TransactionError::payload(
            "block header height should be same",
        ));
    }

    Ok(())
}

fn proposal_signature(proposal: &DposProposal) -> Result<(), TransactionError> {
    let data = check::unsigned_bytes(|w| proposal.serialize_unsigned(w));
    check::key_signature(&proposal.sponsor, &data, &proposal.sign, "proposal sponsor")
}

/// Checks two proposals for the same height signed by the same sponsor.
fn illegal_proposals(
    evidence: &ProposalEvidence,
    compare: &ProposalEvidence,
) -> Result<(), TransactionError> {
    let (first, second) = (&evidence.proposal, &compare.proposal);

    if first.hash() == second.hash() {
        return Err(TransactionError::payload("proposals can not be same"));
    }
    if first.hash() > second.hash() {
        return Err(TransactionError::payload("evidence order error"));
    }
    if evidence.block_height != compare.block_height {
        return Err(TransactionError::payload("should be in same height"));
    }

    proposal_evidence(evidence)?;
    proposal_evidence(compare)?;

    if first.sponsor != second.sponsor {
        return Err(TransactionError::payload("should be same sponsor"));
    }
    if first.view_offset != second.view_offset {
        return Err(TransactionError::payload("should in same view"));
    }

    proposal_signature(first)?;
    proposal_signature(second)
}

/// Two different proposals from one sponsor in one view.
pub struct IllegalProposals;

impl TransactionChecker for IllegalProposals {
    evidence_hooks!();

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let Payload::IllegalProposalEvidence(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        illegal_proposals(&payload.evidence, &payload.compare_evidence)
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::IllegalProposalEvidence(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        let evidence = &payload.evidence;
        if !is_arbitrator_at(ctx, evidence.block_height, &evidence.proposal.sponsor) {
            return Err(TransactionError::payload(
                "sponsor is not an arbitrator at the evidence height",
            ));
        }

        Ok(ContextFlow::End)
    }
}

/// Checks one vote evidence against its own proposal.
fn vote_evidence(evidence: &VoteEvidence) -> Result<(), TransactionError> {
    if evidence.vote.proposal_hash != evidence.proposal_evidence.proposal.hash() {
        return Err(TransactionError::payload(
            "vote and proposal should match",
        ));
    }

    proposal_evidence(&evidence.proposal_evidence)?;
    proposal_signature(&evidence.proposal_evidence.proposal)?;
    vote_signature(&evidence.vote)
}

fn vote_signature(vote: &DposProposalVote) -> Result<(), TransactionError> {
    let data = check::unsigned_bytes(|w| vote.serialize_unsigned(w));
    check::key_signature(&vote.signer, &data, &vote.sign, "vote signer")
}

/// Two different votes from one arbitrator in one view.
pub struct IllegalVotes;

impl TransactionChecker for IllegalVotes {
    evidence_hooks!();

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let Payload::IllegalVoteEvidence(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };
        let (evidence, compare) = (&payload.evidence, &payload.compare_evidence);

        if evidence.vote.hash() == compare.vote.hash() {
            return Err(TransactionError::payload("votes can not be same"));
        }
        if evidence.vote.hash() > compare.vote.hash() {
            return Err(TransactionError::payload("evidence order error"));
        }
        if evidence.proposal_evidence.block_height != compare.proposal_evidence.block_height {
            return Err(TransactionError::payload("should be in same height"));
        }
        if evidence.vote.signer != compare.vote.signer {
            return Err(TransactionError::payload("should be same signer"));
        }

        let (first, second) = (
            &evidence.proposal_evidence.proposal,
            &compare.proposal_evidence.proposal,
        );
        if first.sponsor != second.sponsor {
            return Err(TransactionError::payload("should be same sponsor"));
        }
        if first.view_offset != second.view_offset {
            return Err(TransactionError::payload("should in same view"));
        }

        vote_evidence(evidence)?;
        vote_evidence(compare)
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::IllegalVoteEvidence(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        let evidence = &payload.evidence;
        let height = evidence.proposal_evidence.block_height;
        if !is_arbitrator_at(ctx, height, &evidence.vote.signer) {
            return Err(TransactionError::payload(
                "signer is not an arbitrator at the evidence height",
            ));
        }
        if !is_arbitrator_at(ctx, height, &evidence.proposal_evidence.proposal.sponsor) {
            return Err(TransactionError::payload(
                "sponsor is not an arbitrator at the evidence height",
            ));
        }

        Ok(ContextFlow::End)
    }
}

/// Decodes an evidence header and checks its height.
fn block_header(evidence: &BlockEvidence, height: u32) -> Result<Header, TransactionError> {
    let header = Header::ela_deserialize(evidence.header.as_slice())?;
    if header.height != height {
        return Err(TransactionError::payload(
            "block header height should be same",
        ));
    }
    if evidence.signers.is_empty() {
        return Err(TransactionError::payload("block evidence has no signers"));
    }

    Ok(header)
}

/// Checks that the confirm of `evidence` is a signed proposal of `header`,
/// accepted by exactly the listed signers.
fn block_confirm(evidence: &BlockEvidence, header: &Header) -> Result<(), TransactionError> {
    let confirm = DposConfirm::ela_deserialize(evidence.block_confirm.as_slice())
        .map_err(|error| TransactionError::payload(format!("invalid block confirm: {error}")))?;

    let proposal = &confirm.proposal;
    if proposal.block_hash != header.hash() {
        return Err(TransactionError::payload(
            "block and related confirm do not match",
        ));
    }
    proposal_signature(proposal)?;

    let proposal_hash = proposal.hash();
    let mut voters: Vec<&[u8]> = Vec::with_capacity(confirm.votes.len());
    for vote in &confirm.votes {
        if vote.proposal_hash != proposal_hash {
            return Err(TransactionError::payload("vote and proposal should match"));
        }
        if !vote.accept {
            return Err(TransactionError::payload(
                "confirm votes should accept the proposal",
            ));
        }
        vote_signature(vote)?;
        voters.push(&vote.signer);
    }

    let mut signers: Vec<&[u8]> = evidence.signers.iter().map(Vec::as_slice).collect();
    signers.sort_unstable();
    signers.dedup();
    if signers.len() != evidence.signers.len() {
        return Err(TransactionError::payload("duplicated block signers"));
    }

    voters.sort_unstable();
    voters.dedup();
    if voters != signers {
        return Err(TransactionError::payload(
            "signers and confirm votes do not match",
        ));
    }

    Ok(())
}

/// Two different blocks confirmed at the same height.
pub struct IllegalBlocks;

impl TransactionChecker for IllegalBlocks {
    evidence_hooks!();

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let Payload::IllegalBlockEvidence(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        let header = block_header(&payload.evidence, payload.block_height)?;
        let compare = block_header(&payload.compare_evidence, payload.block_height)?;

        if header.hash() == compare.hash() {
            return Err(TransactionError::payload("blocks can not be same"));
        }
        if header.hash() > compare.hash() {
            return Err(TransactionError::payload("evidence order error"));
        }

        block_confirm(&payload.evidence, &header)?;
        block_confirm(&payload.compare_evidence, &compare)
    }

    /// Each block must be confirmed by a majority of the arbitrators at the
    /// evidence height.
    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::IllegalBlockEvidence(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        let arbitrators = arbitrators_at(ctx, payload.block_height);
        for evidence in [&payload.evidence, &payload.compare_evidence] {
            if evidence
                .signers
                .iter()
                .any(|signer| !arbitrators.contains(signer))
            {
                return Err(TransactionError::payload(
                    "block signer is not an arbitrator at the evidence height",
                ));
            }
            if evidence.signers.len() < check::majority(arbitrators.len()) {
                return Err(TransactionError::signature(
                    "block is not confirmed by a majority of arbitrators",
                ));
            }
        }

        Ok(ContextFlow::End)
    }
}

/// An arbitrator signing conflicting side-chain data.
pub struct IllegalSidechainData;

impl TransactionChecker for IllegalSidechainData {
    evidence_hooks!();

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let Payload::IllegalSidechainEvidence(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        if payload.evidence == payload.compare_evidence {
            return Err(TransactionError::payload("evidences can not be same"));
        }
        if payload.evidence > payload.compare_evidence {
            return Err(TransactionError::payload("evidence order error"));
        }
        if payload.signs.is_empty() {
            return Err(TransactionError::payload(
                "illegal sidechain data has no signatures",
            ));
        }

        Ok(())
    }

    /// The data must be confirmed by a majority of the arbitrators at its
    /// height, each counted once.
    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::IllegalSidechainEvidence(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        let arbitrators = arbitrators_at(ctx, payload.height);
        if !arbitrators.contains(&payload.illegal_signer) {
            return Err(TransactionError::payload(
                "illegal signer is not an arbitrator",
            ));
        }

        let data = check::unsigned_bytes(|w| payload.serialize_unsigned(w));
        let mut confirmed = vec![false; arbitrators.len()];
        for sign in &payload.signs {
            let signer = arbitrators.iter().enumerate().position(|(index, key)| {
                !confirmed[index] && ela_script::verify_signature(key, &data, sign).is_ok()
            });
            if let Some(index) = signer {
                confirmed[index] = true;
            }
        }

        let count = confirmed.iter().filter(|confirmed| **confirmed).count();
        if count < check::majority(arbitrators.len()) {
            return Err(TransactionError::signature(
                "illegal sidechain data is not confirmed by a majority of arbitrators",
            ));
        }

        Ok(ContextFlow::End)
    }
}
