use color_eyre::eyre::Result;

use ela_chain::{
    transaction::{
        payload::{CrCouncilMemberClaimNode, CrInfo, UnregisterCr, CR_INFO_DID_VERSION},
        Payload, Transaction,
    },
    Amount,
};
use ela_script::testing::TestSigner;
use ela_state::{Candidate, CandidateStatus, CrMember, MemberStatus, Producer};

use crate::{
    error::ErrorKind,
    tests::{ela, sign, tx_with, TestChain, HEIGHT},
    transaction::check,
};

/// Returns the DID version of `signer`'s registration.
fn cr_info(signer: &TestSigner, nickname: &str) -> CrInfo {
    let code = signer.code();
    let mut info = CrInfo {
        cid: ela_script::cid(&code),
        did: ela_script::did(&code),
        code,
        nickname: nickname.to_string(),
        url: "https://cr.example".to_string(),
        location: 86,
        signature: Vec::new(),
    };
    info.signature = signer.sign(&check::unsigned_bytes(|w| {
        info.serialize_unsigned(w, CR_INFO_DID_VERSION)
    }));
    info
}

fn register(
    chain: &mut TestChain,
    signer: &TestSigner,
    info: CrInfo,
    deposit: Amount,
) -> Result<Transaction> {
    let input = chain.fund(signer.program_hash(), ela(6000));
    let outputs = vec![
        chain.output(ela_script::deposit_address(&signer.code()), deposit),
        chain.output(signer.program_hash(), ela(5999).checked_sub(deposit)?),
    ];

    let mut tx = tx_with(Payload::RegisterCR(info), vec![input], outputs);
    tx.payload_version = CR_INFO_DID_VERSION;
    Ok(sign(tx, &[signer]))
}

#[test]
fn candidates_register_during_the_voting_period() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    let tx = register(&mut chain, &signer, cr_info(&signer, "alice"), ela(5000))?;

    let error = chain.check(&tx, HEIGHT).expect_err("voting is closed");
    assert_eq!(error.detail(), "should create tx during voting period");

    chain.state.voting_period = 0..HEIGHT + 1;
    chain.check(&tx, HEIGHT)?;

    let early = chain.params.cr_voting_start_height - 1;
    let error = chain.check(&tx, early).expect_err("before CR voting");
    assert_eq!(error.kind(), ErrorKind::HeightVersion);

    let small = register(&mut chain, &signer, cr_info(&signer, "alice"), ela(4000))?;
    let error = chain.check(&small, HEIGHT).expect_err("small deposit");
    assert_eq!(error.to_string(), "[Balance] CR deposit amount is insufficient");

    Ok(())
}

#[test]
fn candidate_identifiers_derive_from_the_code() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    chain.state.voting_period = 0..HEIGHT + 1;
    let signer = TestSigner::new(1);
    let other = TestSigner::new(2);

    let mut info = cr_info(&signer, "alice");
    info.did = cr_info(&other, "alice").did;
    let tx = register(&mut chain, &signer, info, ela(5000))?;
    let error = chain.check(&tx, HEIGHT).expect_err("someone else's DID");
    assert_eq!(error.detail(), "invalid did address");

    let mut info = cr_info(&signer, "alice");
    info.signature = cr_info(&other, "alice").signature;
    let tx = register(&mut chain, &signer, info, ela(5000))?;
    let error = chain.check(&tx, HEIGHT).expect_err("someone else's signature");
    assert_eq!(error.kind(), ErrorKind::Signature);

    chain.state.add_candidate(Candidate {
        info: cr_info(&other, "alice"),
        status: CandidateStatus::Active,
        ..Candidate::default()
    });
    let tx = register(&mut chain, &signer, cr_info(&signer, "alice"), ela(5000))?;
    let error = chain.check(&tx, HEIGHT).expect_err("nickname in use");
    assert_eq!(error.detail(), "nick name alice already inuse");

    Ok(())
}

#[test]
fn only_active_candidates_unregister() {
    ela_test::init();

    let mut chain = TestChain::new();
    chain.state.voting_period = 0..HEIGHT + 1;
    let signer = TestSigner::new(1);
    let info = cr_info(&signer, "alice");

    let mut payload = UnregisterCr {
        cid: info.cid,
        signature: Vec::new(),
    };
    payload.signature = signer.sign(&check::unsigned_bytes(|w| payload.serialize_unsigned(w)));

    let input = chain.fund(signer.program_hash(), ela(10));
    let tx = sign(
        tx_with(
            Payload::UnregisterCR(payload),
            vec![input],
            vec![chain.output(signer.program_hash(), ela(9))],
        ),
        &[&signer],
    );

    let error = chain.check(&tx, HEIGHT).expect_err("unknown candidate");
    assert_eq!(error.detail(), "unregister unknown CR");

    let mut candidate = Candidate {
        info,
        status: CandidateStatus::Canceled,
        ..Candidate::default()
    };
    chain.state.add_candidate(candidate.clone());
    let error = chain.check(&tx, HEIGHT).expect_err("already canceled");
    assert_eq!(error.detail(), "unregister canceled or returned CR");

    candidate.status = CandidateStatus::Active;
    chain.state.add_candidate(candidate);
    assert!(chain.check(&tx, HEIGHT).is_ok());
}

#[test]
fn cr_deposit_returns_need_a_canceled_candidate() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    let info = cr_info(&signer, "alice");
    let deposit = ela_script::deposit_address(&signer.code());
    let unlocked = chain.params.cr_deposit_lockup_blocks + 1;

    chain.state.cr_deposits.insert(info.cid, ela(4000));
    chain.state.add_member(CrMember {
        info: info.clone(),
        status: MemberStatus::Elected,
        deposit_hash: deposit,
        ..CrMember::default()
    });
    let input = chain.fund(deposit, ela(5000));

    let refund = |chain: &TestChain, value: Amount, change: Amount| {
        sign(
            tx_with(
                Payload::ReturnCRDepositCoin,
                vec![input],
                vec![
                    chain.output(signer.program_hash(), value),
                    chain.output(deposit, change),
                ],
            ),
            &[&signer],
        )
    };

    let error = chain
        .check(&refund(&chain, ela(3999), ela(1000)), unlocked)
        .expect_err("member in office");
    assert_eq!(
        error.detail(),
        "an elected member can not return its deposit"
    );

    chain.state.members.clear();
    chain.state.add_candidate(Candidate {
        info,
        status: CandidateStatus::Canceled,
        deposit_hash: deposit,
        cancel_height: 0,
    });

    let error = chain
        .check(&refund(&chain, ela(4499), ela(500)), unlocked)
        .expect_err("more than the available deposit");
    assert_eq!(error.to_string(), "[Balance] overspend deposit");

    chain.check(&refund(&chain, ela(3999), ela(1000)), unlocked)?;

    Ok(())
}

#[test]
fn cr_deposit_returns_spend_one_deposit_address() -> Result<()> {
    ela_test::init();

    let mut chain = TestChain::new();
    let unlocked = chain.params.cr_deposit_lockup_blocks + 1;
    let (alice, bob) = (TestSigner::new(1), TestSigner::new(2));

    let mut deposits = Vec::new();
    for (signer, nickname) in [(&alice, "alice"), (&bob, "bob")] {
        let info = cr_info(signer, nickname);
        let deposit = ela_script::deposit_address(&signer.code());
        chain.state.cr_deposits.insert(info.cid, ela(5000));
        chain.state.add_candidate(Candidate {
            info,
            status: CandidateStatus::Canceled,
            deposit_hash: deposit,
            cancel_height: 0,
        });
        deposits.push(chain.fund(deposit, ela(5000)));
    }

    let both = sign(
        tx_with(
            Payload::ReturnCRDepositCoin,
            deposits.clone(),
            vec![chain.output(alice.program_hash(), ela(9999))],
        ),
        &[&alice, &bob],
    );
    let error = chain.check(&both, unlocked).expect_err("two deposits pooled");
    assert_eq!(error.detail(), "inputs must come from one deposit address");

    let borrowed = sign(
        tx_with(
            Payload::ReturnCRDepositCoin,
            vec![deposits[1]],
            vec![chain.output(alice.program_hash(), ela(4999))],
        ),
        &[&alice],
    );
    let error = chain
        .check(&borrowed, unlocked)
        .expect_err("someone else's deposit");
    assert_eq!(
        error.detail(),
        "the deposit address does not belong to any signer"
    );

    let own = sign(
        tx_with(
            Payload::ReturnCRDepositCoin,
            vec![deposits[0]],
            vec![chain.output(alice.program_hash(), ela(4999))],
        ),
        &[&alice],
    );
    chain.check(&own, unlocked)?;

    Ok(())
}

#[test]
fn council_members_claim_unused_node_keys() {
    ela_test::init();

    let mut chain = TestChain::new();
    let signer = TestSigner::new(1);
    let node = TestSigner::new(2);
    let info = cr_info(&signer, "alice");

    let mut payload = CrCouncilMemberClaimNode {
        node_public_key: node.public_key(),
        cr_council_member_did: info.did,
        signature: Vec::new(),
    };
    payload.signature = signer.sign(&check::unsigned_bytes(|w| payload.serialize_unsigned(w)));
    let tx = tx_with(
        Payload::CRCouncilMemberClaimNode(payload),
        Vec::new(),
        Vec::new(),
    );

    let error = chain.check(&tx, HEIGHT).expect_err("not a member");
    assert_eq!(error.detail(), "the originator must be members");

    chain.state.add_member(CrMember {
        info,
        status: MemberStatus::Elected,
        ..CrMember::default()
    });
    let outcome = chain.check(&tx, HEIGHT).expect("elected member");
    assert_eq!(outcome.fee, Amount::ZERO);

    let mut producer = Producer::default();
    producer.info.owner_public_key = node.public_key();
    chain.state.add_producer(producer);
    let error = chain.check(&tx, HEIGHT).expect_err("key owned by a producer");
    assert_eq!(
        error.detail(),
        "producer already registered this node public key"
    );
}
