//! Payload layouts and signed-data buffers.

use color_eyre::eyre::Result;

use super::*;
use crate::{serialization::WriteElaExt, Amount, Hash, ProgramHash};

fn reserialize(payload: &Payload, version: u8) -> Result<Payload> {
    let mut bytes = Vec::new();
    payload.serialize(&mut bytes, version)?;
    let mut reader = bytes.as_slice();
    let parsed = Payload::deserialize(&mut reader, payload.tx_type(), version)?;
    assert!(reader.is_empty(), "payload must consume every byte");
    Ok(parsed)
}

fn change_owner_proposal() -> CrcProposal {
    CrcProposal {
        proposal_type: ProposalType::CHANGE_PROPOSAL_OWNER,
        category_data: "owner".to_string(),
        owner_key: vec![2; 33],
        draft_hash: Hash([7; 32]),
        draft_data: b"draft".to_vec(),
        target_proposal_hash: Hash([9; 32]),
        new_recipient: ProgramHash([0x21; 21]),
        new_owner_key: vec![3; 33],
        signature: vec![0xaa; 64],
        new_owner_signature: vec![0xbb; 64],
        cr_council_member_did: ProgramHash([0x67; 21]),
        cr_council_member_signature: vec![0xcc; 64],
        ..CrcProposal::default()
    }
}

#[test]
fn every_type_has_a_matching_default_payload() {
    ela_test::init();

    for tx_type in TxType::ALL {
        assert_eq!(Payload::default_for(*tx_type).tx_type(), *tx_type);
    }
}

#[test]
fn proposal_only_writes_fields_of_its_type() -> Result<()> {
    ela_test::init();

    let proposal = change_owner_proposal();
    let mut with_budget = proposal.clone();
    with_budget.budgets.push(Budget {
        budget_type: BudgetType::FinalPayment,
        stage: 1,
        amount: Amount::from_ela(1),
    });

    // budgets are not part of an owner change
    assert_eq!(
        proposal.owner_signed_data(CRC_PROPOSAL_DATA_VERSION),
        with_budget.owner_signed_data(CRC_PROPOSAL_DATA_VERSION)
    );

    let parsed = reserialize(
        &Payload::CRCProposal(Box::new(proposal.clone())),
        CRC_PROPOSAL_DATA_VERSION,
    )?;
    assert_eq!(parsed, Payload::CRCProposal(Box::new(proposal.clone())));

    // version 0 drops the draft data
    let parsed = reserialize(&Payload::CRCProposal(Box::new(proposal.clone())), 0)?;
    let Payload::CRCProposal(parsed) = parsed else {
        panic!("parsed payload has the wrong type");
    };
    assert!(parsed.draft_data.is_empty());
    assert_eq!(parsed.new_owner_key, proposal.new_owner_key);

    Ok(())
}

#[test]
fn proposal_signing_chain_replays_earlier_signatures() -> Result<()> {
    ela_test::init();

    let proposal = change_owner_proposal();
    let version = CRC_PROPOSAL_DATA_VERSION;

    let owner = proposal.owner_signed_data(version);

    let mut second = owner.clone();
    second.write_var_bytes(&proposal.signature)?;
    assert_eq!(proposal.second_signed_data(version), second);

    let mut member = second.clone();
    member.write_var_bytes(&proposal.new_owner_signature)?;
    member.extend_from_slice(&proposal.cr_council_member_did.0);
    assert_eq!(proposal.council_member_signed_data(version), member);

    // a normal proposal has no second signer
    let normal = CrcProposal {
        proposal_type: ProposalType::NORMAL,
        ..proposal
    };
    let mut member = normal.owner_signed_data(version);
    member.write_var_bytes(&normal.signature)?;
    member.extend_from_slice(&normal.cr_council_member_did.0);
    assert_eq!(normal.council_member_signed_data(version), member);

    Ok(())
}

#[test]
fn proposal_types_are_classified() {
    ela_test::init();

    assert!(ProposalType::NORMAL.is_normal_like());
    assert!(ProposalType::ELIP.is_normal_like());
    assert!(ProposalType(0x0301).is_normal_like());
    assert!(!ProposalType::CLOSE_PROPOSAL.is_normal_like());
    assert!(ProposalType::CHANGE_CUSTOM_ID_FEE.is_known());
    assert!(!ProposalType(0x0999).is_known());
}

#[test]
fn tracking_secretary_general_buffer_extends_owner_buffers() {
    ela_test::init();

    let tracking = CrcProposalTracking {
        tracking_type: ProposalTrackingType::Progress,
        proposal_hash: Hash([1; 32]),
        message_hash: Hash([2; 32]),
        stage: 1,
        owner_key: vec![2; 33],
        owner_signature: vec![0xaa; 64],
        secretary_general_opinion_hash: Hash([3; 32]),
        ..CrcProposalTracking::default()
    };

    let owner = tracking.owner_signed_data(0);
    let new_owner = tracking.new_owner_signed_data(0);
    let secretary = tracking.secretary_general_signed_data(0);

    assert!(new_owner.starts_with(&owner));
    assert!(secretary.starts_with(&new_owner));
    assert!(secretary.ends_with(&[3; 32]));
}

#[test]
fn side_chain_payload_versions() -> Result<()> {
    ela_test::init();

    let withdraw = Payload::WithdrawFromSideChain(WithdrawFromSideChain {
        block_height: 10,
        genesis_block_address: "genesis".to_string(),
        side_chain_transaction_hashes: vec![Hash([1; 32]), Hash([2; 32])],
    });
    assert_eq!(reserialize(&withdraw, SIDE_CHAIN_PAYLOAD_V0)?, withdraw);

    // version 1 carries nothing
    let mut bytes = Vec::new();
    withdraw.serialize(&mut bytes, SIDE_CHAIN_PAYLOAD_V1)?;
    assert!(bytes.is_empty());

    let pow = SideChainPow {
        side_block_hash: Hash([4; 32]),
        side_genesis_hash: Hash([5; 32]),
        block_height: 6,
        signature: vec![1; 64],
    };
    assert_eq!(pow.unsigned_bytes().len(), 68);

    Ok(())
}

#[test]
fn voting_payload_versions() -> Result<()> {
    ela_test::init();

    let votes = VotesWithLockTime {
        candidate: vec![2; 33],
        votes: Amount::from_ela(5),
        lock_time: 1000,
    };
    let voting = Payload::Voting(Voting {
        contents: vec![VotesContent {
            vote_type: 4,
            votes_info: vec![votes.clone()],
        }],
        renewal_contents: Vec::new(),
    });
    assert_eq!(reserialize(&voting, 0)?, voting);

    let renewal = Payload::Voting(Voting {
        contents: Vec::new(),
        renewal_contents: vec![RenewalVotesContent {
            refer_key: Hash([8; 32]),
            votes_info: votes,
        }],
    });
    assert_eq!(reserialize(&renewal, RENEWAL_VOTE_VERSION)?, renewal);

    Ok(())
}

#[test]
fn producer_info_stake_height_is_versioned() -> Result<()> {
    ela_test::init();

    let info = ProducerInfo {
        owner_public_key: vec![2; 33],
        node_public_key: vec![3; 33],
        nickname: "producer".to_string(),
        url: "https://example.org".to_string(),
        location: 86,
        net_address: "127.0.0.1:20338".to_string(),
        stake_until: 5000,
        signature: vec![9; 64],
    };

    let mut v0 = Vec::new();
    info.serialize_unsigned(&mut v0, 0)?;
    let mut v1 = Vec::new();
    info.serialize_unsigned(&mut v1, PRODUCER_INFO_DPOS_V2_VERSION)?;
    assert_eq!(v1.len(), v0.len() + 4);

    let payload = Payload::RegisterProducer(info);
    assert_eq!(reserialize(&payload, PRODUCER_INFO_DPOS_V2_VERSION)?, payload);

    Ok(())
}
