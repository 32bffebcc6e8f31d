use color_eyre::eyre::Result;

use ela_chain::{
    transaction::{
        output_payload::{OutputPayload, OutputType, StakeOutput, VoteType},
        payload::{
            RenewalVotesContent, VotesContent, VotesWithLockTime, Voting, RENEWAL_VOTE_VERSION,
        },
        Payload, Transaction,
    },
    Amount, Hash,
};
use ela_script::testing::TestSigner;
use ela_state::{Producer, ProducerIdentity, ProducerStatus};

use crate::{
    error::ErrorKind,
    tests::{ela, sign, tx_with, TestChain, HEIGHT},
};

/// Returns a stake of `value` from a 100 ELA input, crediting `stake_to`.
fn exchange(
    chain: &mut TestChain,
    staker: &TestSigner,
    stake_to: &TestSigner,
    value: Amount,
) -> Transaction {
    let input = chain.fund(staker.program_hash(), ela(100));
    let mut stake = chain.output(chain.params.stake_pool_address, value);
    stake.output_type = OutputType::Stake;
    stake.payload = OutputPayload::Stake(StakeOutput {
        version: 0,
        stake_address: ela_script::stake_address(&stake_to.code()),
    });

    sign(
        tx_with(
            Payload::ExchangeVotes,
            vec![input],
            vec![stake, chain.output(staker.program_hash(), ela(49))],
        ),
        &[staker],
    )
}

#[test]
fn stakes_credit_the_signer() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let staker = TestSigner::new(1);

    let tx = exchange(&mut chain, &staker, &staker, ela(50));
    let outcome = chain.check(&tx, HEIGHT)?;
    assert_eq!(outcome.fee, ela(1));

    let tx = exchange(&mut chain, &staker, &TestSigner::new(2), ela(50));
    let error = chain.check(&tx, HEIGHT).expect_err("credits someone else");
    assert_eq!(
        error.detail(),
        "stake address does not match the program code"
    );

    let early = chain.params.dpos_v2_start_height - 1;
    let error = chain.check(&tx, early).expect_err("before DPoS v2");
    assert_eq!(error.kind(), ErrorKind::HeightVersion);

    let mut tx = exchange(&mut chain, &staker, &staker, ela(50));
    tx.outputs.swap(0, 1);
    let tx = sign(tx, &[&staker]);
    let error = crate::sanity_check(&tx, &chain.ctx(HEIGHT)).expect_err("stake output second");
    assert_eq!(error.detail(), "invalid output type");

    Ok(())
}

/// A voter with 100 ELA of rights and a DPoS v2 producer to vote for.
fn voter() -> (TestChain, TestSigner, TestSigner) {
    let mut chain = TestChain::new();
    let voter = TestSigner::new(1);
    let producer = TestSigner::new(2);

    chain
        .state
        .vote_rights
        .insert(ela_script::stake_address(&voter.code()), ela(100));
    let mut registered = Producer {
        status: ProducerStatus::Active,
        identity: ProducerIdentity::DposV2,
        ..Producer::default()
    };
    registered.info.owner_public_key = producer.public_key();
    registered.info.node_public_key = producer.public_key();
    registered.info.nickname = "v2".to_string();
    chain.state.add_producer(registered);

    (chain, voter, producer)
}

fn votes(candidate: &TestSigner, votes: Amount, lock_time: u32) -> VotesWithLockTime {
    VotesWithLockTime {
        candidate: candidate.public_key(),
        votes,
        lock_time,
    }
}

fn voting_tx(voter: &TestSigner, votes_info: Vec<VotesWithLockTime>) -> Transaction {
    let payload = Voting {
        contents: vec![VotesContent {
            vote_type: VoteType::DposV2 as u8,
            votes_info,
        }],
        ..Voting::default()
    };

    sign(tx_with(Payload::Voting(payload), Vec::new(), Vec::new()), &[voter])
}

#[test]
fn votes_spend_rights_on_v2_producers() -> Result<()> {
    ela_test::init();

    let (mut chain, voter, producer) = voter();
    let lock_time = HEIGHT + chain.params.dpos_v2_min_votes_lock_time;

    let tx = voting_tx(&voter, vec![votes(&producer, ela(100), lock_time)]);
    let outcome = chain.check(&tx, HEIGHT)?;
    assert_eq!(outcome.fee, Amount::ZERO);

    let tx = voting_tx(&voter, vec![votes(&producer, ela(101), lock_time)]);
    let error = chain.check(&tx, HEIGHT).expect_err("over the rights");
    assert_eq!(error.to_string(), "[Balance] votes larger than vote rights");

    let tx = voting_tx(&voter, vec![votes(&voter, ela(10), lock_time)]);
    assert!(chain.check(&tx, HEIGHT).is_err());

    for producer in chain.state.producers.values_mut() {
        producer.identity = ProducerIdentity::DposV1;
    }
    let tx = voting_tx(&voter, vec![votes(&producer, ela(10), lock_time)]);
    assert!(chain.check(&tx, HEIGHT).is_err());

    Ok(())
}

#[test]
fn vote_lock_times_stay_in_the_window() {
    ela_test::init();

    let (chain, voter, producer) = voter();
    let params = &chain.params;
    let earliest = HEIGHT + params.dpos_v2_min_votes_lock_time;
    let latest = HEIGHT + params.dpos_v2_max_votes_lock_time;

    for lock_time in [earliest, latest] {
        let tx = voting_tx(&voter, vec![votes(&producer, ela(10), lock_time)]);
        assert!(chain.check(&tx, HEIGHT).is_ok(), "lock time {lock_time}");
    }
    for lock_time in [earliest - 1, latest + 1] {
        let tx = voting_tx(&voter, vec![votes(&producer, ela(10), lock_time)]);
        let error = chain.check(&tx, HEIGHT).expect_err("outside the window");
        assert_eq!(error.detail(), "invalid DPoS v2 vote lock time");
    }
}

#[test]
fn voting_payloads_are_checked_without_state() {
    ela_test::init();

    let (chain, voter, producer) = voter();
    let ctx = chain.ctx(HEIGHT);
    let lock_time = HEIGHT + chain.params.dpos_v2_min_votes_lock_time;

    let delegate = Voting {
        contents: vec![VotesContent {
            vote_type: VoteType::Delegate as u8,
            votes_info: vec![votes(&producer, ela(1), lock_time)],
        }],
        ..Voting::default()
    };
    let tx = sign(tx_with(Payload::Voting(delegate), Vec::new(), Vec::new()), &[&voter]);
    let error = crate::sanity_check(&tx, &ctx).expect_err("delegate votes");
    assert_eq!(
        error.detail(),
        "delegate votes are not supported by voting transactions"
    );

    let tx = voting_tx(&voter, vec![votes(&producer, Amount::ZERO, lock_time)]);
    let error = crate::sanity_check(&tx, &ctx).expect_err("zero votes");
    assert_eq!(error.detail(), "invalid vote amount");

    let renewal = RenewalVotesContent {
        refer_key: Hash([3; 32]),
        votes_info: votes(&producer, ela(1), lock_time),
    };
    let mut tx = tx_with(
        Payload::Voting(Voting {
            renewal_contents: vec![renewal.clone(), renewal],
            ..Voting::default()
        }),
        Vec::new(),
        Vec::new(),
    );
    tx.payload_version = RENEWAL_VOTE_VERSION;
    let tx = sign(tx, &[&voter]);
    let error = crate::sanity_check(&tx, &ctx).expect_err("refer key repeated");
    assert_eq!(error.detail(), "invalid renewal refer key");

    let unsigned = tx_with(Payload::Voting(Voting::default()), Vec::new(), Vec::new());
    let error = crate::sanity_check(&unsigned, &ctx).expect_err("no program");
    assert_eq!(error.kind(), ErrorKind::AttributeProgram);
}
