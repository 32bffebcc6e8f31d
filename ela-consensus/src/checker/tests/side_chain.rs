use color_eyre::eyre::Result;

use ela_chain::{
    transaction::{
        output_payload::{CrossChainOutput, OutputPayload, OutputType},
        payload::{
            CrossChainTransfer, TransferCrossChainAsset, WithdrawFromSideChain,
            SIDE_CHAIN_PAYLOAD_V1,
        },
        Output, Payload, Transaction,
    },
    Amount, Hash, Prefix, ProgramHash,
};
use ela_script::testing::{multisig_program, signers, TestSigner};

use crate::{
    error::ErrorKind,
    tests::{ela, sign, tx_with, TestChain, HEIGHT},
};

fn side_chain_address() -> ProgramHash {
    ProgramHash::new(Prefix::CrossChain, &TestSigner::new(50).code())
}

/// Returns `amount` plus the cross-chain fee.
fn with_fee(chain: &TestChain, amount: Amount) -> Result<Amount> {
    Ok(amount.checked_add(chain.params.min_cross_chain_tx_fee)?)
}

fn transfer(index: u64, amount: Amount) -> CrossChainTransfer {
    CrossChainTransfer {
        address: "EKn3UGyEoN1ZrZ2BRbFfGTbLmcrZCe5bbm".to_string(),
        output_index: index,
        amount,
    }
}

/// Returns a version 0 transfer moving `outputs` out of a 10 ELA input.
fn transfer_tx(
    chain: &mut TestChain,
    signer: &TestSigner,
    transfers: Vec<CrossChainTransfer>,
    mut outputs: Vec<Output>,
) -> Transaction {
    let input = chain.fund(signer.program_hash(), ela(10));
    outputs.push(chain.output(signer.program_hash(), ela(8)));

    sign(
        tx_with(
            Payload::TransferCrossChainAsset(TransferCrossChainAsset { transfers }),
            vec![input],
            outputs,
        ),
        &[signer],
    )
}

#[test]
fn listed_transfers_pay_the_cross_chain_fee() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    let x = side_chain_address();

    let paid = chain.output(x, with_fee(&chain, ela(1))?);
    let tx = transfer_tx(&mut chain, &signer, vec![transfer(0, ela(1))], vec![paid.clone()]);
    chain.check(&tx, HEIGHT)?;

    let short = chain.output(x, ela(1));
    let tx = transfer_tx(&mut chain, &signer, vec![transfer(0, ela(1))], vec![short]);
    let error = chain.check(&tx, HEIGHT).expect_err("no cross-chain fee");
    assert_eq!(
        error.to_string(),
        "[InvalidOutput] invalid transaction cross chain output amount"
    );

    let tx = transfer_tx(
        &mut chain,
        &signer,
        vec![transfer(0, ela(1))],
        vec![paid.clone(), paid.clone()],
    );
    let error = chain.check(&tx, HEIGHT).expect_err("second output unlisted");
    assert_eq!(
        error.detail(),
        "cross chain output is not listed in the payload"
    );

    let tx = transfer_tx(
        &mut chain,
        &signer,
        vec![transfer(0, ela(1)), transfer(0, ela(1))],
        vec![paid.clone()],
    );
    let error = chain.check(&tx, HEIGHT).expect_err("index listed twice");
    assert_eq!(error.detail(), "duplicated cross chain output index");

    let tx = transfer_tx(&mut chain, &signer, vec![transfer(5, ela(1))], vec![paid]);
    let error = chain.check(&tx, HEIGHT).expect_err("index out of range");
    assert_eq!(
        error.detail(),
        "invalid transaction payload cross chain index"
    );

    let to_standard = chain.output(signer.program_hash(), with_fee(&chain, ela(1))?);
    let tx = transfer_tx(&mut chain, &signer, vec![transfer(0, ela(1))], vec![to_standard]);
    let error = chain.check(&tx, HEIGHT).expect_err("main chain address");
    assert_eq!(
        error.detail(),
        "invalid transaction output address, without \"X\" at beginning"
    );

    Ok(())
}

#[test]
fn cross_chain_outputs_carry_their_target_from_version_1() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);

    let mut output = chain.output(side_chain_address(), with_fee(&chain, ela(1))?);
    output.output_type = OutputType::CrossChain;
    output.payload = OutputPayload::CrossChain(CrossChainOutput {
        target_address: "EKn3UGyEoN1ZrZ2BRbFfGTbLmcrZCe5bbm".to_string(),
        target_amount: ela(1),
        ..CrossChainOutput::default()
    });

    let mut tx = transfer_tx(&mut chain, &signer, Vec::new(), vec![output]);
    tx.payload_version = SIDE_CHAIN_PAYLOAD_V1;
    let tx = sign(tx, &[&signer]);

    chain.check(&tx, HEIGHT)?;

    let early = chain.params.new_cross_chain_start_height - 1;
    let error = chain.check(&tx, early).expect_err("version 1 too early");
    assert_eq!(error.kind(), ErrorKind::HeightVersion);

    let bare = chain.output(side_chain_address(), with_fee(&chain, ela(1))?);
    let mut tx = transfer_tx(&mut chain, &signer, Vec::new(), vec![bare]);
    tx.payload_version = SIDE_CHAIN_PAYLOAD_V1;
    let tx = sign(tx, &[&signer]);
    let error = chain.check(&tx, HEIGHT).expect_err("no target");
    assert_eq!(
        error.detail(),
        "cross chain output must carry a cross chain payload"
    );

    Ok(())
}

#[test]
fn withdrawals_are_signed_by_the_cross_chain_arbiters() {
    ela_test::init();

    let mut chain = TestChain::new();
    let arbiters = signers(40, 4);
    chain.state.crc_arbiters = arbiters.iter().map(TestSigner::public_key).collect();
    let height = chain.params.new_cross_chain_start_height - 1;

    let input = chain.fund(side_chain_address(), ela(10));
    let hash = Hash([7; 32]);
    let unsigned = tx_with(
        Payload::WithdrawFromSideChain(WithdrawFromSideChain {
            side_chain_transaction_hashes: vec![hash],
            ..WithdrawFromSideChain::default()
        }),
        vec![input],
        vec![chain.output(TestSigner::new(1).program_hash(), ela(9))],
    );
    let signed_by = |count: usize| {
        let mut tx = unsigned.clone();
        tx.programs = vec![multisig_program(3, &arbiters, count, &tx.unsigned_bytes())];
        tx
    };

    assert!(chain.check(&signed_by(3), height).is_ok());

    let error = chain.check(&signed_by(2), height).expect_err("two of four");
    assert_eq!(error.kind(), ErrorKind::Signature);

    let error = chain
        .check(&signed_by(3), chain.params.new_cross_chain_start_height)
        .expect_err("version 0 after the new cross chain height");
    assert_eq!(error.kind(), ErrorKind::HeightVersion);

    chain.state.withdrawn_side_chain_txs.insert(hash);
    let error = chain.check(&signed_by(3), height).expect_err("already withdrawn");
    assert_eq!(error.kind(), ErrorKind::SidechainDuplicate);
}
