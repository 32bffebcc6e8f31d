//! Tests for the validation pipeline, using ordinary transfers.

use color_eyre::eyre::Result;

use ela_chain::{
    transaction::{
        output_payload::{CandidateVotes, OutputPayload, VoteContent, VoteOutput, VoteType},
        payload::{CoinBase, Record},
        Input, Output, Payload, Transaction, LOCKED_SEQUENCE,
    },
    Amount, ProgramHash,
};
use ela_script::testing::{multisig_program, signers, TestSigner};
use ela_state::{ConsensusAlgorithm, Producer, ProducerStatus};

use crate::{
    error::ErrorKind,
    tests::{ela, sign, tx_with, TestChain, HEIGHT},
};


/// Returns a signed transfer of `value` back to `signer`, spending `inputs`.
fn transfer(
    chain: &TestChain,
    signer: &TestSigner,
    inputs: Vec<Input>,
    value: Amount,
) -> Transaction {
    let outputs = vec![chain.output(signer.program_hash(), value)];
    let tx = tx_with(Payload::TransferAsset, inputs, outputs);
    sign(tx, &[signer])
}

#[test]
fn transfer_passes_both_phases() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    let input = chain.fund(signer.program_hash(), ela(10));
    let value = ela(10).checked_sub(Amount::from_sela(10_000))?;
    let tx = transfer(&chain, &signer, vec![input], value);

    let outcome = chain.check(&tx, HEIGHT)?;

    assert_eq!(outcome.fee, Amount::from_sela(10_000));
    assert!(outcome.fee_per_kb > outcome.fee);
    assert_eq!(outcome.references.len(), 1);
    assert_eq!(outcome.references[0].0, input);

    Ok(())
}

#[test]
fn sanity_rejections_use_the_documented_texts() {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    let input = chain.fund(signer.program_hash(), ela(10));

    let no_inputs = transfer(&chain, &signer, Vec::new(), ela(1));
    let duplicated = transfer(&chain, &signer, vec![input, input], ela(1));
    let coinbase_input = transfer(&chain, &signer, vec![Input::coinbase()], ela(1));
    let negative = transfer(&chain, &signer, vec![input], Amount::from_sela(-1));
    let unsigned = Transaction {
        programs: Vec::new(),
        ..transfer(&chain, &signer, vec![input], ela(1))
    };

    let mut no_outputs = transfer(&chain, &signer, vec![input], ela(1));
    no_outputs.outputs.clear();

    let mut bad_asset = transfer(&chain, &signer, vec![input], ela(1));
    bad_asset.outputs[0].asset_id = ela_chain::Hash([7; 32]);

    let mut bad_prefix = transfer(&chain, &signer, vec![input], ela(1));
    bad_prefix.outputs[0].program_hash = ProgramHash([0x99; 21]);

    let mut mismatched = transfer(&chain, &signer, vec![input], ela(1));
    mismatched.payload = Payload::Record(Record::default());

    let ctx = chain.ctx(HEIGHT);
    let cases = [
        (no_inputs, "[InvalidInput] transaction has no inputs"),
        (duplicated, "[InvalidInput] duplicated transaction inputs"),
        (coinbase_input, "[InvalidInput] invalid transaction input"),
        (no_outputs, "[InvalidOutput] transaction has no outputs"),
        (bad_asset, "[InvalidOutput] asset ID in output is invalid"),
        (negative, "[InvalidOutput] invalid transaction UTXO output"),
        (bad_prefix, "[InvalidOutput] invalid program hash prefix"),
        (unsigned, "[AttributeProgram] no programs found in transaction"),
        (
            mismatched,
            "[Payload] transaction payload type does not match the transaction type",
        ),
    ];

    for (tx, expected) in cases {
        let error = super::sanity_check(&tx, &ctx).expect_err("transaction is invalid");
        assert_eq!(error.to_string(), expected);
    }
}

#[test]
fn special_outputs_are_limited_after_activation() {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    let input = chain.fund(signer.program_hash(), ela(10));

    let vote = OutputPayload::Vote(VoteOutput {
        version: 0,
        contents: vec![VoteContent {
            vote_type: VoteType::Delegate as u8,
            candidate_votes: vec![CandidateVotes {
                candidate: signer.public_key(),
                votes: Amount::ZERO,
            }],
        }],
    });
    let output = Output::with_payload(
        chain.params.ela_asset_id,
        ela(1),
        signer.program_hash(),
        vote,
    );
    let tx = sign(
        tx_with(Payload::TransferAsset, vec![input], vec![output.clone(), output]),
        &[&signer],
    );

    let before = chain.ctx(chain.params.special_output_count_height - 1);
    assert_eq!(super::sanity_check(&tx, &before), Ok(()));

    let error = super::sanity_check(&tx, &chain.ctx(HEIGHT)).expect_err("two special outputs");
    assert_eq!(
        error.to_string(),
        "[InvalidOutput] special output count should less equal than 1"
    );
}

#[test]
fn confirmed_and_double_spent_transactions_are_rejected() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    let input = chain.fund(signer.program_hash(), ela(10));
    let tx = transfer(&chain, &signer, vec![input], ela(9));

    let mut spent = chain.state.clone();
    spent.spent.insert(input.previous);
    let ctx = crate::context::ValidationContext::new(HEIGHT, 0, &chain.params, &spent);
    let error = super::context_check(&tx, &ctx).expect_err("input is spent");
    assert_eq!(error.kind(), ErrorKind::DoubleSpend);
    assert_eq!(error.detail(), "double spent transaction");

    chain.state.add_transaction(tx.clone(), HEIGHT - 1);
    let error = chain.check(&tx, HEIGHT).expect_err("already confirmed");
    assert_eq!(
        error.to_string(),
        "[DuplicateTransaction] transaction already exists"
    );

    Ok(())
}

#[test]
fn unknown_references_are_rejected() {
    ela_test::init();

    let chain = TestChain::new();
    let signer = TestSigner::new(1);
    let input = Input::new(ela_chain::Hash([3; 32]), 0, u32::MAX);
    let tx = transfer(&chain, &signer, vec![input], ela(1));

    let error = chain.check(&tx, HEIGHT).expect_err("nothing to spend");
    assert_eq!(error.kind(), ErrorKind::UnknownReferencedTx);
}

#[test]
fn locked_outputs_need_the_locked_sequence_and_lock_time() {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    let mut locked = chain.output(signer.program_hash(), ela(10));
    locked.output_lock = 2000;
    let input = chain.fund_output(locked);

    let tx = transfer(&chain, &signer, vec![input], ela(9));
    let error = chain.check(&tx, HEIGHT).expect_err("plain sequence");
    assert_eq!(error.to_string(), "[UtxoLocked] invalid input sequence");

    let locked_input = Input {
        sequence: LOCKED_SEQUENCE,
        ..input
    };
    let tx = transfer(&chain, &signer, vec![locked_input], ela(9));
    let error = chain.check(&tx, HEIGHT).expect_err("lock time too early");
    assert_eq!(error.to_string(), "[UtxoLocked] UTXO output locked");

    let mut tx = tx_with(
        Payload::TransferAsset,
        vec![locked_input],
        vec![chain.output(signer.program_hash(), ela(9))],
    );
    tx.lock_time = 2000;
    let tx = sign(tx, &[&signer]);
    assert!(chain.check(&tx, HEIGHT).is_ok());
}

#[test]
fn fees_below_the_minimum_are_rejected() {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    let input = chain.fund(signer.program_hash(), ela(10));
    let tx = transfer(&chain, &signer, vec![input], ela(10));

    let error = chain.check(&tx, HEIGHT).expect_err("zero fee");
    assert_eq!(error.to_string(), "[Balance] transaction fee not enough");
}

#[test]
fn destroyed_coins_cannot_be_spent() {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    let destroy = chain.params.destroy_address;
    let input = chain.fund(destroy, ela(10));
    let tx = transfer(&chain, &signer, vec![input], ela(9));

    let error = chain.check(&tx, HEIGHT).expect_err("destroyed coins");
    assert_eq!(
        error.to_string(),
        "[InvalidInput] cannot use utxo from the destruction address"
    );
}

#[test]
fn deposits_are_only_spent_by_deposit_returns() {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    let deposit = ela_script::deposit_address(&signer.code());

    let input = chain.fund(deposit, ela(10));
    let tx = transfer(&chain, &signer, vec![input], ela(9));
    let error = chain.check(&tx, HEIGHT).expect_err("spends a deposit");
    assert_eq!(
        error.detail(),
        "only the ReturnDepositCoin and ReturnCRDepositCoin transaction can use the deposit UTXO"
    );

    let input = chain.fund(signer.program_hash(), ela(10));
    let tx = sign(
        tx_with(
            Payload::TransferAsset,
            vec![input],
            vec![chain.output(deposit, ela(9))],
        ),
        &[&signer],
    );
    let error = chain.check(&tx, HEIGHT).expect_err("pays an unknown deposit");
    assert_eq!(
        error.detail(),
        "only the address that CR or Producer registered can have the deposit UTXO"
    );

    chain.state.add_producer(Producer {
        deposit_hash: deposit,
        ..Producer::default()
    });
    assert!(chain.check(&tx, HEIGHT).is_ok());
}

#[test]
fn signatures_cover_the_unsigned_transaction() {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    let input = chain.fund(signer.program_hash(), ela(10));

    let mut tx = transfer(&chain, &signer, vec![input], ela(9));
    tx.outputs[0].value = ela(8);
    let error = chain.check(&tx, HEIGHT).expect_err("signed a different value");
    assert_eq!(error.kind(), ErrorKind::Signature);

    let stranger = TestSigner::new(2);
    let tx = sign(
        tx_with(
            Payload::TransferAsset,
            vec![input],
            vec![chain.output(signer.program_hash(), ela(9))],
        ),
        &[&stranger],
    );
    let error = chain.check(&tx, HEIGHT).expect_err("signed by a stranger");
    assert_eq!(error.kind(), ErrorKind::Signature);
}

#[test]
fn multisig_outputs_need_m_signatures() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let keys = signers(20, 3);
    let public_keys: Vec<Vec<u8>> = keys.iter().map(TestSigner::public_key).collect();
    let code = ela_script::multisig_code(2, &public_keys)?;
    let address = ela_script::program_hash(&code)?;
    let input = chain.fund(address, ela(10));

    let mut tx = tx_with(
        Payload::TransferAsset,
        vec![input],
        vec![chain.output(address, ela(9))],
    );
    let data = tx.unsigned_bytes();

    tx.programs = vec![multisig_program(2, &keys, 1, &data)];
    let error = chain.check(&tx, HEIGHT).expect_err("one of two signatures");
    assert_eq!(error.to_string(), "[Signature] matched signatures not enough");

    tx.programs = vec![multisig_program(2, &keys, 2, &data)];
    chain.check(&tx, HEIGHT)?;

    Ok(())
}

#[test]
fn coinbase_outputs_mature_before_they_are_spent() {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);

    let coinbase = Transaction {
        inputs: vec![Input::coinbase()],
        outputs: vec![chain.output(signer.program_hash(), ela(10))],
        ..tx_with(Payload::CoinBase(CoinBase::default()), Vec::new(), Vec::new())
    };
    let coinbase = chain.state.add_transaction(coinbase, HEIGHT - 10);
    let input = Input::new(coinbase.hash(), 0, u32::MAX);
    let tx = transfer(&chain, &signer, vec![input], ela(9));

    let error = chain.check(&tx, HEIGHT).expect_err("immature coinbase");
    assert_eq!(
        error.to_string(),
        "[IneffectiveCoinbase] the utxo of coinbase is locking"
    );

    let maturity = HEIGHT - 10 + chain.params.coinbase_maturity;
    assert!(chain.check(&tx, maturity).is_ok());
}

/// Returns a delegate vote output for `candidate`, paid to `owner`.
fn delegate_vote(chain: &TestChain, owner: ProgramHash, candidate: Vec<u8>) -> Output {
    let vote = VoteOutput {
        version: 0,
        contents: vec![VoteContent {
            vote_type: VoteType::Delegate as u8,
            candidate_votes: vec![CandidateVotes {
                candidate,
                votes: Amount::ZERO,
            }],
        }],
    };

    Output::with_payload(
        chain.params.ela_asset_id,
        ela(9),
        owner,
        OutputPayload::Vote(vote),
    )
}

#[test]
fn votes_are_paid_back_to_the_voter() {
    ela_test::init();

    let mut chain = TestChain::new();
    let voter = TestSigner::new(1);
    let producer = TestSigner::new(2);
    chain.state.add_producer(Producer {
        info: ela_chain::transaction::payload::ProducerInfo {
            owner_public_key: producer.public_key(),
            node_public_key: producer.public_key(),
            ..Default::default()
        },
        status: ProducerStatus::Active,
        ..Producer::default()
    });
    let input = chain.fund(voter.program_hash(), ela(10));

    let vote = |owner: ProgramHash, candidate: Vec<u8>| {
        sign(
            tx_with(
                Payload::TransferAsset,
                vec![input],
                vec![delegate_vote(&chain, owner, candidate)],
            ),
            &[&voter],
        )
    };

    let tx = vote(producer.program_hash(), producer.public_key());
    let error = chain.check(&tx, HEIGHT).expect_err("vote paid to someone else");
    assert_eq!(
        error.detail(),
        "the output address of vote tx should exist in its input"
    );

    let tx = vote(voter.program_hash(), voter.public_key());
    let error = chain.check(&tx, HEIGHT).expect_err("voter is not a producer");
    assert_eq!(
        error.detail(),
        "invalid vote output payload producer candidate"
    );

    let tx = vote(voter.program_hash(), producer.public_key());
    assert!(chain.check(&tx, HEIGHT).is_ok());
}

#[test]
fn pow_consensus_only_accepts_allowed_types() {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    chain.state.consensus = ConsensusAlgorithm::Pow;
    let input = chain.fund(signer.program_hash(), ela(10));

    let record = sign(
        tx_with(
            Payload::Record(Record::default()),
            vec![input],
            vec![chain.output(signer.program_hash(), ela(9))],
        ),
        &[&signer],
    );
    let error = chain.check(&record, HEIGHT).expect_err("records need DPoS");
    assert_eq!(error.to_string(), "[Validation] not allow in POW consensus");

    let plain = transfer(&chain, &signer, vec![input], ela(9));
    let error = chain.check(&plain, HEIGHT).expect_err("plain transfers need DPoS");
    assert_eq!(error.kind(), ErrorKind::Validation);

    let mut producer = Producer::default();
    producer.info.owner_public_key = signer.public_key();
    producer.status = ProducerStatus::Active;
    chain.state.add_producer(producer);

    let vote = sign(
        tx_with(
            Payload::TransferAsset,
            vec![input],
            vec![delegate_vote(&chain, signer.program_hash(), signer.public_key())],
        ),
        &[&signer],
    );
    assert!(chain.check(&vote, HEIGHT).is_ok());
}
