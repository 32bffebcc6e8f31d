use color_eyre::eyre::Result;

use ela_chain::{
    transaction::{
        payload::{
            InactiveArbitrators, NextTurnDposInfo, RevertToDpos, RevertToPow, RevertType,
            UpdateVersion,
        },
        Payload, Transaction,
    },
    Amount,
};
use ela_script::testing::{multisig_program, signers, TestSigner};
use ela_state::ConsensusAlgorithm;

use crate::{
    error::ErrorKind,
    tests::{tx_with, TestChain, HEIGHT, TIMESTAMP},
};

/// Returns a chain with four CRC arbiters and two elected arbitrators.
fn scheduled() -> (TestChain, Vec<TestSigner>, Vec<TestSigner>) {
    let mut chain = TestChain::new();
    let crc = signers(60, 4);
    let elected = signers(70, 2);

    chain.state.crc_arbiters = crc.iter().map(TestSigner::public_key).collect();
    chain.state.arbitrators = crc
        .iter()
        .chain(&elected)
        .map(TestSigner::public_key)
        .collect();

    (chain, crc, elected)
}

/// Attaches a program signed by the first `count` CRC arbiters.
fn signed_by(mut tx: Transaction, crc: &[TestSigner], count: usize) -> Transaction {
    let m = crc.len() * 2 / 3 + 1;
    tx.programs = vec![multisig_program(m, crc, count, &tx.unsigned_bytes())];
    tx
}

fn unfunded(payload: Payload) -> Transaction {
    tx_with(payload, Vec::new(), Vec::new())
}

#[test]
fn inactive_arbitrators_are_reported_by_the_crc() -> Result<()> {
    ela_test::init();

    let (chain, crc, elected) = scheduled();
    let report = |sponsor: &TestSigner, arbitrators: &[TestSigner], count: usize| {
        let payload = InactiveArbitrators {
            sponsor: sponsor.public_key(),
            arbitrators: arbitrators.iter().map(TestSigner::public_key).collect(),
            block_height: HEIGHT,
        };
        signed_by(unfunded(Payload::InactiveArbitrators(payload)), &crc, count)
    };

    let outcome = chain.check(&report(&crc[0], &elected, 3), HEIGHT)?;
    assert_eq!(outcome.fee, Amount::ZERO);

    let error = chain
        .check(&report(&elected[0], &elected[1..], 3), HEIGHT)
        .expect_err("elected sponsor");
    assert_eq!(error.detail(), "sponsor is not belong to arbitrators");

    let error = chain
        .check(&report(&crc[0], &crc[1..2], 3), HEIGHT)
        .expect_err("reports a CRC arbiter");
    assert_eq!(
        error.detail(),
        "inactive arbitrator is not belong to arbitrators"
    );

    let error = chain
        .check(&report(&crc[0], &elected, 2), HEIGHT)
        .expect_err("minority");
    assert_eq!(error.kind(), ErrorKind::Signature);

    let error = crate::sanity_check(&report(&crc[0], &[], 3), &chain.ctx(HEIGHT))
        .expect_err("empty report");
    assert_eq!(error.detail(), "inactive arbitrators should not be empty");

    Ok(())
}

#[test]
fn update_version_windows_are_ordered() -> Result<()> {
    ela_test::init();

    let (chain, crc, _) = scheduled();
    let update = |start_height, end_height| {
        signed_by(
            unfunded(Payload::UpdateVersion(UpdateVersion {
                start_height,
                end_height,
            })),
            &crc,
            3,
        )
    };

    chain.check(&update(HEIGHT, HEIGHT + 100), HEIGHT)?;

    let error = crate::sanity_check(&update(HEIGHT, HEIGHT), &chain.ctx(HEIGHT))
        .expect_err("empty window");
    assert_eq!(error.detail(), "invalid update version height");

    Ok(())
}

#[test]
fn next_turn_info_matches_the_local_schedule() -> Result<()> {
    ela_test::init();

    let (mut chain, crc, elected) = scheduled();
    let info = NextTurnDposInfo {
        working_height: HEIGHT + 1,
        cr_public_keys: crc.iter().map(TestSigner::public_key).collect(),
        dpos_public_keys: elected.iter().map(TestSigner::public_key).collect(),
        ..NextTurnDposInfo::default()
    };
    let tx = unfunded(Payload::NextTurnDPOSInfo(info.clone()));

    let error = chain.check(&tx, HEIGHT).expect_err("nothing scheduled");
    assert_eq!(error.detail(), "no next turn DPOS info");

    chain.state.next_turn_dpos_info = Some(NextTurnDposInfo {
        working_height: HEIGHT + 2,
        ..info.clone()
    });
    let error = chain.check(&tx, HEIGHT).expect_err("another turn");
    assert_eq!(
        error.detail(),
        "next turn DPOS info does not match the local schedule"
    );

    chain.state.next_turn_dpos_info = Some(info);
    chain.check(&tx, HEIGHT)?;

    chain.state.consensus = ConsensusAlgorithm::Pow;
    let error = chain.check(&tx, HEIGHT).expect_err("mined with POW");
    assert_eq!(error.kind(), ErrorKind::Validation);

    Ok(())
}

#[test]
fn reverts_to_pow_after_blocks_stop() -> Result<()> {
    ela_test::init();

    let (mut chain, _, _) = scheduled();
    let revert = |revert_type, working_height| {
        unfunded(Payload::RevertToPOW(RevertToPow {
            revert_type,
            working_height,
        }))
    };
    let no_block_time = chain.params.revert_to_pow_no_block_time;

    chain.state.best_block_timestamp = TIMESTAMP - no_block_time;
    chain.check(&revert(RevertType::NoBlock, HEIGHT), HEIGHT)?;

    let error = chain
        .check(&revert(RevertType::NoBlock, HEIGHT + 1), HEIGHT)
        .expect_err("another height");
    assert_eq!(error.detail(), "invalid working height");

    chain.state.best_block_timestamp = TIMESTAMP - no_block_time + 1;
    let error = chain
        .check(&revert(RevertType::NoBlock, HEIGHT), HEIGHT)
        .expect_err("a block arrived recently");
    assert_eq!(error.detail(), "invalid block time for revert to POW");

    // no producers are registered
    chain.check(&revert(RevertType::NoProducers, HEIGHT), HEIGHT)?;

    let early = chain.params.revert_to_pow_start_height - 1;
    let error = chain
        .check(&revert(RevertType::NoProducers, early), early)
        .expect_err("before reverting was allowed");
    assert_eq!(error.kind(), ErrorKind::HeightVersion);

    Ok(())
}

#[test]
fn reverts_to_dpos_only_from_pow() -> Result<()> {
    ela_test::init();

    let (mut chain, crc, _) = scheduled();
    let revert = |work_height_interval, count| {
        signed_by(
            unfunded(Payload::RevertToDPOS(RevertToDpos {
                work_height_interval,
                revert_to_pow_block_height: HEIGHT - 100,
            })),
            &crc,
            count,
        )
    };

    let error = chain.check(&revert(10, 3), HEIGHT).expect_err("still DPoS");
    assert_eq!(
        error.detail(),
        "invalid consensus algorithm, must be in POW"
    );

    chain.state.consensus = ConsensusAlgorithm::Pow;
    chain.check(&revert(10, 3), HEIGHT)?;

    let error = chain.check(&revert(0, 3), HEIGHT).expect_err("no interval");
    assert_eq!(error.detail(), "invalid work height interval");

    let error = chain.check(&revert(10, 2), HEIGHT).expect_err("minority");
    assert_eq!(error.kind(), ErrorKind::Signature);

    Ok(())
}
