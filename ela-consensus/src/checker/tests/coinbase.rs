use ela_chain::{
    transaction::{payload::CoinBase, Input, Payload, Transaction},
    Amount, ProgramHash,
};
use ela_script::testing::TestSigner;
use ela_state::ConsensusAlgorithm;

use crate::{
    error::ErrorKind,
    tests::{ela, tx_with, TestChain, HEIGHT},
};

/// Returns a coinbase paying `first` to `to`, and `miner` to a miner.
fn coinbase(chain: &TestChain, to: ProgramHash, first: Amount, miner: Amount) -> Transaction {
    let miner_address = TestSigner::new(9).program_hash();

    Transaction {
        inputs: vec![Input::coinbase()],
        outputs: vec![chain.output(to, first), chain.output(miner_address, miner)],
        ..tx_with(Payload::CoinBase(CoinBase::default()), Vec::new(), Vec::new())
    }
}

#[test]
fn first_output_follows_the_height_and_consensus() {
    ela_test::init();

    let mut chain = TestChain::new();
    let params = chain.params.clone();
    let before_committee = params.cr_committee_start_height - 1;

    let foundation = coinbase(&chain, params.foundation_address, ela(3), ela(7));
    let assets = coinbase(&chain, params.cr_assets_address, ela(3), ela(7));
    let destroy = coinbase(&chain, params.destroy_address, ela(3), ela(7));

    assert!(chain.check(&foundation, before_committee).is_ok());
    let error = chain.check(&assets, before_committee).expect_err("pays CR assets early");
    assert_eq!(
        error.detail(),
        "first output address should be foundation address"
    );

    assert!(chain.check(&assets, HEIGHT).is_ok());
    let error = chain.check(&foundation, HEIGHT).expect_err("pays the foundation late");
    assert_eq!(
        error.detail(),
        "first output address should be CR assets address"
    );

    chain.state.consensus = ConsensusAlgorithm::Pow;
    assert!(chain.check(&destroy, HEIGHT).is_ok());
    let error = chain.check(&assets, HEIGHT).expect_err("pays CR assets under POW");
    assert_eq!(
        error.detail(),
        "first output address should be DestroyAddress in POW consensus algorithm"
    );
}

#[test]
fn first_output_takes_at_least_thirty_percent() {
    ela_test::init();

    let chain = TestChain::new();
    let assets = chain.params.cr_assets_address;

    let outcome = chain
        .check(&coinbase(&chain, assets, ela(3), ela(7)), HEIGHT)
        .expect("exactly 30%");
    assert_eq!(outcome.fee, Amount::ZERO);
    assert!(outcome.references.is_empty());

    let error = chain
        .check(
            &coinbase(&chain, assets, Amount::from_sela(299_999_999), ela(7)),
            HEIGHT,
        )
        .expect_err("just under 30%");
    assert_eq!(
        error.to_string(),
        "[Balance] reward to the first output in coinbase < 30%"
    );
}

#[test]
fn coinbase_shape_is_checked_before_context() {
    ela_test::init();

    let chain = TestChain::new();
    let assets = chain.params.cr_assets_address;
    let ctx = chain.ctx(HEIGHT);

    let mut two_inputs = coinbase(&chain, assets, ela(3), ela(7));
    two_inputs.inputs.push(Input::coinbase());
    let error = crate::sanity_check(&two_inputs, &ctx).expect_err("two inputs");
    assert_eq!(error.detail(), "coinbase must has only one input");

    let mut one_output = coinbase(&chain, assets, ela(3), ela(7));
    one_output.outputs.pop();
    let error = crate::sanity_check(&one_output, &ctx).expect_err("one output");
    assert_eq!(error.detail(), "coinbase output is not enough, at least 2");

    let mut signed = coinbase(&chain, assets, ela(3), ela(7));
    signed.programs = vec![TestSigner::new(9).program(b"coinbase")];
    let error = crate::sanity_check(&signed, &ctx).expect_err("signed coinbase");
    assert_eq!(error.kind(), ErrorKind::AttributeProgram);
    assert_eq!(
        error.detail(),
        "CoinBase transactions should have no programs"
    );
}
