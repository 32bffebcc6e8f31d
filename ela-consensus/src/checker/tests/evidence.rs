use color_eyre::eyre::Result;

use ela_chain::{
    block::Header,
    serialization::{ElaDeserialize, ElaSerialize},
    transaction::{
        payload::{
            BlockEvidence, DposConfirm, DposIllegalBlocks, DposIllegalProposals,
            DposIllegalVotes, DposProposal, DposProposalVote, ProposalEvidence,
            SidechainIllegalData, VoteEvidence,
        },
        Payload, Transaction,
    },
    Hash,
};
use ela_script::testing::{signers, TestSigner};
use ela_state::{ArbitratorSnapshot, ConsensusAlgorithm};

use crate::{
    error::ErrorKind,
    tests::{tx_with, TestChain, HEIGHT},
    transaction::check,
};

const EVIDENCE_HEIGHT: u32 = HEIGHT - 10;

fn arbiters() -> Vec<TestSigner> {
    signers(20, 4)
}

fn evidence_tx(payload: Payload) -> Transaction {
    tx_with(payload, Vec::new(), Vec::new())
}

/// Returns `(a, b)` with the lower `key` first.
fn ordered<T>(a: T, b: T, key: impl Fn(&T) -> Hash) -> (T, T) {
    if key(&a) > key(&b) {
        (b, a)
    } else {
        (a, b)
    }
}

/// Returns two headers at `height`, lowest hash first.
fn conflicting_headers(height: u32) -> (Header, Header) {
    let [first, second] = [1, 2].map(|nonce| Header {
        height,
        nonce,
        ..Header::default()
    });
    ordered(first, second, Header::hash)
}

fn signed_proposal(sponsor: &TestSigner, block_hash: Hash, view_offset: u32) -> DposProposal {
    let mut proposal = DposProposal {
        sponsor: sponsor.public_key(),
        block_hash,
        view_offset,
        ..DposProposal::default()
    };
    proposal.sign = sponsor.sign(&check::unsigned_bytes(|w| proposal.serialize_unsigned(w)));
    proposal
}

fn signed_vote(signer: &TestSigner, proposal: &DposProposal) -> DposProposalVote {
    let mut vote = DposProposalVote {
        proposal_hash: proposal.hash(),
        signer: signer.public_key(),
        accept: true,
        ..DposProposalVote::default()
    };
    vote.sign = signer.sign(&check::unsigned_bytes(|w| vote.serialize_unsigned(w)));
    vote
}

/// Returns `header` confirmed by `voters` on a proposal from `sponsor`.
fn confirmed(
    header: &Header,
    sponsor: &TestSigner,
    voters: &[TestSigner],
) -> Result<BlockEvidence> {
    let proposal = signed_proposal(sponsor, header.hash(), 0);
    let confirm = DposConfirm {
        votes: voters
            .iter()
            .map(|voter| signed_vote(voter, &proposal))
            .collect(),
        proposal,
    };

    Ok(BlockEvidence {
        header: header.ela_serialize_to_vec()?,
        block_confirm: confirm.ela_serialize_to_vec()?,
        signers: voters.iter().map(TestSigner::public_key).collect(),
    })
}

fn illegal_blocks(evidence: BlockEvidence, compare_evidence: BlockEvidence) -> Transaction {
    evidence_tx(Payload::IllegalBlockEvidence(DposIllegalBlocks {
        block_height: EVIDENCE_HEIGHT,
        evidence,
        compare_evidence,
        ..DposIllegalBlocks::default()
    }))
}

#[test]
fn block_evidence_is_ordered_by_hash() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let arbiter = &arbiters()[0];
    let voters = std::slice::from_ref(arbiter);
    chain.state.arbitrators = vec![arbiter.public_key()];
    let (low, high) = conflicting_headers(EVIDENCE_HEIGHT);

    let tx = illegal_blocks(
        confirmed(&low, arbiter, voters)?,
        confirmed(&high, arbiter, voters)?,
    );
    let outcome = chain.check(&tx, HEIGHT)?;
    assert!(outcome.references.is_empty());

    let ctx = chain.ctx(HEIGHT);
    let reversed = illegal_blocks(
        confirmed(&high, arbiter, voters)?,
        confirmed(&low, arbiter, voters)?,
    );
    let error = crate::sanity_check(&reversed, &ctx).expect_err("reversed pair");
    assert_eq!(error.detail(), "evidence order error");

    let same = illegal_blocks(
        confirmed(&low, arbiter, voters)?,
        confirmed(&low, arbiter, voters)?,
    );
    let error = crate::sanity_check(&same, &ctx).expect_err("same block");
    assert_eq!(error.detail(), "blocks can not be same");

    let (other_low, other_high) = conflicting_headers(EVIDENCE_HEIGHT + 1);
    let elsewhere = illegal_blocks(
        confirmed(&other_low, arbiter, voters)?,
        confirmed(&other_high, arbiter, voters)?,
    );
    let error = crate::sanity_check(&elsewhere, &ctx).expect_err("wrong height");
    assert_eq!(error.detail(), "block header height should be same");

    Ok(())
}

#[test]
fn block_evidence_needs_signed_confirms() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let arbiters = arbiters();
    let (victim, accuser) = (&arbiters[0], &arbiters[1]);
    chain.state.arbitrators = vec![victim.public_key()];
    let (low, high) = conflicting_headers(EVIDENCE_HEIGHT);
    let honest = confirmed(&high, victim, std::slice::from_ref(victim))?;

    // unsigned headers that only name the victim
    let bare = |header: &Header| -> Result<BlockEvidence> {
        Ok(BlockEvidence {
            header: header.ela_serialize_to_vec()?,
            signers: vec![victim.public_key()],
            ..BlockEvidence::default()
        })
    };
    let tx = illegal_blocks(bare(&low)?, bare(&high)?);
    let error = chain.check(&tx, HEIGHT).expect_err("no confirms");
    assert_eq!(error.kind(), ErrorKind::Payload);
    assert!(error.detail().starts_with("invalid block confirm"));

    let mut misplaced = confirmed(&low, victim, std::slice::from_ref(victim))?;
    misplaced.block_confirm = honest.block_confirm.clone();
    let tx = illegal_blocks(misplaced, honest.clone());
    let error = chain.check(&tx, HEIGHT).expect_err("confirm of the other block");
    assert_eq!(error.detail(), "block and related confirm do not match");

    let mut forged = confirmed(&low, victim, std::slice::from_ref(victim))?;
    let mut confirm = DposConfirm::ela_deserialize(forged.block_confirm.as_slice())?;
    confirm.votes[0].sign = accuser.sign(b"not the vote");
    forged.block_confirm = confirm.ela_serialize_to_vec()?;
    let tx = illegal_blocks(forged, honest.clone());
    let error = chain.check(&tx, HEIGHT).expect_err("forged vote");
    assert_eq!(error.kind(), ErrorKind::Signature);

    let mut renamed = confirmed(&low, accuser, std::slice::from_ref(accuser))?;
    renamed.signers = vec![victim.public_key()];
    let tx = illegal_blocks(renamed, honest);
    let error = chain.check(&tx, HEIGHT).expect_err("votes from someone else");
    assert_eq!(error.detail(), "signers and confirm votes do not match");

    Ok(())
}

#[test]
fn block_signers_are_a_majority_at_the_evidence_height() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let arbiters = arbiters();
    let (low, high) = conflicting_headers(EVIDENCE_HEIGHT);
    let tx = illegal_blocks(
        confirmed(&low, &arbiters[1], &arbiters[1..2])?,
        confirmed(&high, &arbiters[1], &arbiters[1..2])?,
    );

    chain.state.arbitrators = vec![arbiters[0].public_key()];
    let error = chain.check(&tx, HEIGHT).expect_err("not a current arbitrator");
    assert_eq!(
        error.detail(),
        "block signer is not an arbitrator at the evidence height"
    );

    // a snapshot at the evidence height replaces the current set
    chain.state.snapshots.insert(
        EVIDENCE_HEIGHT,
        vec![ArbitratorSnapshot {
            height: EVIDENCE_HEIGHT,
            arbitrators: vec![arbiters[1].public_key()],
            ..ArbitratorSnapshot::default()
        }],
    );
    chain.check(&tx, HEIGHT)?;

    // four arbitrators need three confirmations of each block
    chain.state.snapshots.clear();
    chain.state.arbitrators = arbiters.iter().map(TestSigner::public_key).collect();
    let minority = illegal_blocks(
        confirmed(&low, &arbiters[0], &arbiters[..2])?,
        confirmed(&high, &arbiters[0], &arbiters[..3])?,
    );
    let error = chain.check(&minority, HEIGHT).expect_err("two of four");
    assert_eq!(error.kind(), ErrorKind::Signature);

    let majority = illegal_blocks(
        confirmed(&low, &arbiters[0], &arbiters[..3])?,
        confirmed(&high, &arbiters[0], &arbiters[1..])?,
    );
    chain.check(&majority, HEIGHT)?;

    chain.state.consensus = ConsensusAlgorithm::Pow;
    assert!(chain.check(&majority, HEIGHT).is_err());

    Ok(())
}

#[test]
fn evidence_carries_no_programs() -> Result<()> {
    ela_test::init();

    let chain = TestChain::new();
    let arbiter = &arbiters()[0];
    let voters = std::slice::from_ref(arbiter);
    let (low, high) = conflicting_headers(EVIDENCE_HEIGHT);

    let mut tx = illegal_blocks(
        confirmed(&low, arbiter, voters)?,
        confirmed(&high, arbiter, voters)?,
    );
    tx.programs = vec![arbiter.program(b"evidence")];
    let error = crate::sanity_check(&tx, &chain.ctx(HEIGHT)).expect_err("signed evidence");
    assert_eq!(error.kind(), ErrorKind::AttributeProgram);

    Ok(())
}

/// Returns a signed proposal of `header` in `view_offset`.
fn proposed(
    sponsor: &TestSigner,
    header: &Header,
    view_offset: u32,
) -> Result<ProposalEvidence> {
    Ok(ProposalEvidence {
        proposal: signed_proposal(sponsor, header.hash(), view_offset),
        block_header: header.ela_serialize_to_vec()?,
        block_height: header.height,
    })
}

fn illegal_proposals(first: ProposalEvidence, second: ProposalEvidence) -> Transaction {
    let (evidence, compare_evidence) =
        ordered(first, second, |evidence| evidence.proposal.hash());
    evidence_tx(Payload::IllegalProposalEvidence(DposIllegalProposals {
        evidence,
        compare_evidence,
    }))
}

#[test]
fn proposal_evidence_needs_one_sponsor_in_one_view() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let arbiters = arbiters();
    let sponsor = &arbiters[0];
    chain.state.arbitrators = vec![sponsor.public_key()];
    let ctx = chain.ctx(HEIGHT);
    let (low, high) = conflicting_headers(EVIDENCE_HEIGHT);

    let tx = illegal_proposals(proposed(sponsor, &low, 0)?, proposed(sponsor, &high, 0)?);
    chain.check(&tx, HEIGHT)?;

    let Payload::IllegalProposalEvidence(payload) = &tx.payload else {
        unreachable!("built as proposal evidence");
    };
    let reversed = evidence_tx(Payload::IllegalProposalEvidence(DposIllegalProposals {
        evidence: payload.compare_evidence.clone(),
        compare_evidence: payload.evidence.clone(),
    }));
    let error = crate::sanity_check(&reversed, &ctx).expect_err("reversed pair");
    assert_eq!(error.detail(), "evidence order error");

    let same = evidence_tx(Payload::IllegalProposalEvidence(DposIllegalProposals {
        evidence: payload.evidence.clone(),
        compare_evidence: payload.evidence.clone(),
    }));
    let error = crate::sanity_check(&same, &ctx).expect_err("same proposal");
    assert_eq!(error.detail(), "proposals can not be same");

    let tx = illegal_proposals(
        proposed(sponsor, &low, 0)?,
        proposed(&arbiters[1], &high, 0)?,
    );
    let error = crate::sanity_check(&tx, &ctx).expect_err("two sponsors");
    assert_eq!(error.detail(), "should be same sponsor");

    let tx = illegal_proposals(proposed(sponsor, &low, 0)?, proposed(sponsor, &high, 1)?);
    let error = crate::sanity_check(&tx, &ctx).expect_err("two views");
    assert_eq!(error.detail(), "should in same view");

    let mut forged = proposed(sponsor, &low, 0)?;
    forged.proposal.sign = arbiters[1].sign(b"not the proposal");
    let tx = illegal_proposals(forged, proposed(sponsor, &high, 0)?);
    let error = crate::sanity_check(&tx, &ctx).expect_err("forged sponsor signature");
    assert_eq!(error.kind(), ErrorKind::Signature);

    let outsider = TestSigner::new(30);
    let tx = illegal_proposals(proposed(&outsider, &low, 0)?, proposed(&outsider, &high, 0)?);
    let error = chain.check(&tx, HEIGHT).expect_err("sponsor never arbitrated");
    assert_eq!(
        error.detail(),
        "sponsor is not an arbitrator at the evidence height"
    );

    Ok(())
}

/// Returns `signer`'s vote on a proposal of `header` from `sponsor`.
fn voted(
    signer: &TestSigner,
    sponsor: &TestSigner,
    header: &Header,
    view_offset: u32,
) -> Result<VoteEvidence> {
    let proposal_evidence = proposed(sponsor, header, view_offset)?;
    Ok(VoteEvidence {
        vote: signed_vote(signer, &proposal_evidence.proposal),
        proposal_evidence,
    })
}

fn illegal_votes(evidence: VoteEvidence, compare_evidence: VoteEvidence) -> Transaction {
    evidence_tx(Payload::IllegalVoteEvidence(DposIllegalVotes {
        evidence,
        compare_evidence,
    }))
}

#[test]
fn vote_evidence_is_ordered_by_vote_hash() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let arbiters = arbiters();
    let (signer, sponsor) = (&arbiters[0], &arbiters[1]);
    chain.state.arbitrators = vec![signer.public_key(), sponsor.public_key()];
    let ctx = chain.ctx(HEIGHT);
    let (low, high) = conflicting_headers(EVIDENCE_HEIGHT);

    let (first, second) = ordered(
        voted(signer, sponsor, &low, 0)?,
        voted(signer, sponsor, &high, 0)?,
        |evidence| evidence.vote.hash(),
    );

    let error = crate::sanity_check(&illegal_votes(first.clone(), first.clone()), &ctx)
        .expect_err("same vote");
    assert_eq!(error.detail(), "votes can not be same");

    let error = crate::sanity_check(&illegal_votes(second.clone(), first.clone()), &ctx)
        .expect_err("reversed pair");
    assert_eq!(error.detail(), "evidence order error");

    let outcome = chain.check(&illegal_votes(first, second), HEIGHT)?;
    assert!(outcome.references.is_empty());

    Ok(())
}

#[test]
fn vote_evidence_needs_one_signer_sponsor_and_view() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let arbiters = arbiters();
    let (signer, sponsor) = (&arbiters[0], &arbiters[1]);
    chain.state.arbitrators = vec![signer.public_key(), sponsor.public_key()];
    let ctx = chain.ctx(HEIGHT);
    let (low, high) = conflicting_headers(EVIDENCE_HEIGHT);
    let pair = |first: VoteEvidence, second: VoteEvidence| {
        let (evidence, compare) = ordered(first, second, |evidence| evidence.vote.hash());
        illegal_votes(evidence, compare)
    };

    let tx = pair(
        voted(signer, sponsor, &low, 0)?,
        voted(&arbiters[2], sponsor, &high, 0)?,
    );
    let error = crate::sanity_check(&tx, &ctx).expect_err("two signers");
    assert_eq!(error.detail(), "should be same signer");

    let tx = pair(
        voted(signer, sponsor, &low, 0)?,
        voted(signer, &arbiters[2], &high, 0)?,
    );
    let error = crate::sanity_check(&tx, &ctx).expect_err("two sponsors");
    assert_eq!(error.detail(), "should be same sponsor");

    let tx = pair(
        voted(signer, sponsor, &low, 0)?,
        voted(signer, sponsor, &high, 1)?,
    );
    let error = crate::sanity_check(&tx, &ctx).expect_err("two views");
    assert_eq!(error.detail(), "should in same view");

    let mut forged = voted(signer, sponsor, &low, 0)?;
    forged.vote.sign = sponsor.sign(b"not the vote");
    let tx = pair(forged, voted(signer, sponsor, &high, 0)?);
    let error = crate::sanity_check(&tx, &ctx).expect_err("forged vote");
    assert_eq!(error.kind(), ErrorKind::Signature);

    // only the sponsor was an arbitrator at the evidence height
    let tx = pair(
        voted(signer, sponsor, &low, 0)?,
        voted(signer, sponsor, &high, 0)?,
    );
    chain.state.snapshots.insert(
        EVIDENCE_HEIGHT,
        vec![ArbitratorSnapshot {
            height: EVIDENCE_HEIGHT,
            arbitrators: vec![sponsor.public_key()],
            ..ArbitratorSnapshot::default()
        }],
    );
    let error = chain.check(&tx, HEIGHT).expect_err("signer outside the snapshot");
    assert_eq!(
        error.detail(),
        "signer is not an arbitrator at the evidence height"
    );

    Ok(())
}

/// Returns side-chain evidence against `illegal`, signed by `signers`.
fn sidechain_evidence(illegal: &TestSigner, signers: &[TestSigner]) -> SidechainIllegalData {
    let mut payload = SidechainIllegalData {
        height: EVIDENCE_HEIGHT,
        illegal_signer: illegal.public_key(),
        evidence: Hash([1; 32]),
        compare_evidence: Hash([2; 32]),
        genesis_block_address: "XKUh4GLhFJiqAMTF6HyWQrV9pK9HcGUdfJ".to_string(),
        ..SidechainIllegalData::default()
    };
    let data = check::unsigned_bytes(|w| payload.serialize_unsigned(w));
    payload.signs = signers.iter().map(|signer| signer.sign(&data)).collect();
    payload
}

#[test]
fn sidechain_evidence_needs_a_majority_of_arbitrators() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let arbiters = arbiters();
    chain.state.arbitrators = arbiters.iter().map(TestSigner::public_key).collect();

    // four arbitrators need three signatures
    let payload = sidechain_evidence(&arbiters[0], &arbiters[..3]);
    chain.check(&evidence_tx(Payload::IllegalSidechainEvidence(payload)), HEIGHT)?;

    let payload = sidechain_evidence(&arbiters[0], &arbiters[..2]);
    let error = chain
        .check(&evidence_tx(Payload::IllegalSidechainEvidence(payload)), HEIGHT)
        .expect_err("two of four");
    assert_eq!(error.kind(), ErrorKind::Signature);

    // repeated signatures count once
    let mut payload = sidechain_evidence(&arbiters[0], &arbiters[..2]);
    payload.signs.push(payload.signs[0].clone());
    let error = chain
        .check(&evidence_tx(Payload::IllegalSidechainEvidence(payload)), HEIGHT)
        .expect_err("a signature repeated");
    assert_eq!(error.kind(), ErrorKind::Signature);

    let outsider = TestSigner::new(30);
    let payload = sidechain_evidence(&outsider, &arbiters[..3]);
    let error = chain
        .check(&evidence_tx(Payload::IllegalSidechainEvidence(payload)), HEIGHT)
        .expect_err("outsider accused");
    assert_eq!(error.detail(), "illegal signer is not an arbitrator");

    Ok(())
}

#[test]
fn sidechain_evidence_is_ordered() {
    ela_test::init();

    let chain = TestChain::new();
    let arbiters = arbiters();
    let ctx = chain.ctx(HEIGHT);

    let mut reversed = sidechain_evidence(&arbiters[0], &arbiters[..3]);
    std::mem::swap(&mut reversed.evidence, &mut reversed.compare_evidence);
    let error = crate::sanity_check(
        &evidence_tx(Payload::IllegalSidechainEvidence(reversed)),
        &ctx,
    )
    .expect_err("reversed pair");
    assert_eq!(error.detail(), "evidence order error");

    let mut same = sidechain_evidence(&arbiters[0], &arbiters[..3]);
    same.compare_evidence = same.evidence;
    let error = crate::sanity_check(&evidence_tx(Payload::IllegalSidechainEvidence(same)), &ctx)
        .expect_err("same data");
    assert_eq!(error.detail(), "evidences can not be same");

    let unsigned = sidechain_evidence(&arbiters[0], &[]);
    let error = crate::sanity_check(
        &evidence_tx(Payload::IllegalSidechainEvidence(unsigned)),
        &ctx,
    )
    .expect_err("no signatures");
    assert_eq!(error.detail(), "illegal sidechain data has no signatures");
}
