//! Vote output checks.
//!
//! Voters may only vote with outputs paying back to an address they spend
//! from. Each content block of a vote output names its candidates, and from
//! vote version 1 onwards also their weights.

use std::collections::HashSet;

use ela_chain::{
    transaction::{
        output_payload::{OutputPayload, VoteOutput, VoteType, VOTE_PRODUCER_VERSION},
        Output, Transaction,
    },
    Hash, ProgramHash,
};
use ela_state::{MemberStatus, ProposalStatus, References};

use crate::{context::ValidationContext, error::TransactionError};

/// Checks every vote output of `tx` against the spent outputs and the
/// current candidate sets.
pub fn vote_outputs(
    tx: &Transaction,
    ctx: &ValidationContext<'_>,
    references: &References,
) -> Result<(), TransactionError> {
    let input_hashes: HashSet<&ProgramHash> = references
        .iter()
        .map(|(_, output)| &output.program_hash)
        .collect();

    for output in &tx.outputs {
        let OutputPayload::Vote(vote) = &output.payload else {
            continue;
        };

        if !input_hashes.contains(&output.program_hash) {
            return Err(TransactionError::output(
                "the output address of vote tx should exist in its input",
            ));
        }

        vote_output(output, vote, ctx)?;
    }

    Ok(())
}

/// Checks the content blocks of one vote output.
fn vote_output(
    output: &Output,
    vote: &VoteOutput,
    ctx: &ValidationContext<'_>,
) -> Result<(), TransactionError> {
    for content in &vote.contents {
        if vote.version > VOTE_PRODUCER_VERSION {
            let total = content.total_votes()?;
            if total > output.value {
                return Err(TransactionError::output("votes larger than output amount"));
            }
        }

        let kind = content
            .kind()
            .ok_or_else(|| TransactionError::output("invalid vote type"))?;
        let candidates: Vec<&[u8]> = content
            .candidate_votes
            .iter()
            .map(|votes| votes.candidate.as_slice())
            .collect();

        candidates_of(kind, &candidates, ctx)?;
    }

    Ok(())
}

/// Checks that every candidate can receive votes of `kind` right now.
///
/// Shared by vote outputs and DPoS v2 voting payloads.
pub fn candidates_of(
    kind: VoteType,
    candidates: &[&[u8]],
    ctx: &ValidationContext<'_>,
) -> Result<(), TransactionError> {
    match kind {
        VoteType::Delegate => {
            let producers = ctx.state.active_producer_keys();
            if candidates
                .iter()
                .any(|candidate| !producers.iter().any(|key| key.as_slice() == *candidate))
            {
                return Err(TransactionError::output(
                    "invalid vote output payload producer candidate",
                ));
            }
        }

        VoteType::Crc => {
            if !ctx.state.is_in_voting_period(ctx.height) {
                return Err(TransactionError::output(
                    "cr vote tx must during voting period",
                ));
            }

            let active = ctx.state.active_candidate_cids();
            for candidate in candidates {
                match ProgramHash::from_slice(candidate) {
                    Some(cid) if active.contains(&cid) => {}
                    _ => {
                        return Err(TransactionError::output(
                            "invalid vote output payload CR candidate",
                        ))
                    }
                }
            }
        }

        VoteType::CrcProposal => {
            for candidate in candidates {
                let hash = <[u8; 32]>::try_from(*candidate)
                    .map(Hash)
                    .map_err(|_| TransactionError::output("invalid CRC proposal hash"))?;

                match ctx.state.proposal(&hash) {
                    Some(proposal) if proposal.status == ProposalStatus::CRAgreed => {}
                    _ => {
                        return Err(TransactionError::output(
                            "invalid CRCProposal: proposal is not in CRAgreed status",
                        ))
                    }
                }
            }
        }

        VoteType::CrcImpeachment => {
            for candidate in candidates {
                let member = ProgramHash::from_slice(candidate)
                    .and_then(|cid| ctx.state.member_by_cid(&cid));

                match member {
                    Some(member) if member.status == MemberStatus::Elected => {}
                    _ => {
                        return Err(TransactionError::output(
                            "invalid CRC impeachment candidate",
                        ))
                    }
                }
            }
        }

        VoteType::DposV2 => {
            let producers = ctx.state.dpos_v2_candidates();
            if candidates
                .iter()
                .any(|candidate| !producers.iter().any(|key| key.as_slice() == *candidate))
            {
                return Err(TransactionError::output(
                    "invalid vote output payload DPoS v2 candidate",
                ));
            }
        }
    }

    Ok(())
}
