//! CR proposal payloads.
//!
//! Proposals are signed by up to three parties in a fixed order. Each later
//! signer signs the unsigned payload followed by every earlier signature, so
//! the signed buffers below must be replayed exactly in that order.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    serialization::{
        max_items_for_size, ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError,
        TrustedPreallocate, WriteElaExt,
    },
    Amount, Hash, ProgramHash,
};

/// Payload version that carries draft, opinion and message data inline.
pub const CRC_PROPOSAL_DATA_VERSION: u8 = 0x01;

/// Payload version of proposal withdrawals that name recipient and amount.
pub const CRC_PROPOSAL_WITHDRAW_V1: u8 = 0x01;

/// The sub-type of a CR proposal.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ProposalType(pub u16);

impl ProposalType {
    /// A budgeted proposal.
    pub const NORMAL: ProposalType = ProposalType(0x0000);
    /// An Elastos improvement proposal.
    pub const ELIP: ProposalType = ProposalType(0x0100);
    /// A feature lifecycle improvement proposal.
    pub const FLIP: ProposalType = ProposalType(0x0101);
    /// A proposal that sets up an ELIP process.
    pub const SET_ELIP: ProposalType = ProposalType(0x0102);
    /// A main chain code upgrade.
    pub const MAIN_CHAIN_UPGRADE_CODE: ProposalType = ProposalType(0x0200);
    /// The first side-chain code upgrade type.
    pub const SIDE_CHAIN_UPGRADE_CODE: ProposalType = ProposalType(0x0300);
    /// The last side-chain code upgrade type.
    pub const SIDE_CHAIN_UPGRADE_CODE_END: ProposalType = ProposalType(0x03ff);
    /// Hands a proposal to a new owner or recipient.
    pub const CHANGE_PROPOSAL_OWNER: ProposalType = ProposalType(0x0400);
    /// Terminates a proposal.
    pub const CLOSE_PROPOSAL: ProposalType = ProposalType(0x0401);
    /// Appoints a new secretary general.
    pub const SECRETARY_GENERAL: ProposalType = ProposalType(0x0402);
    /// Registers a side chain.
    pub const REGISTER_SIDE_CHAIN: ProposalType = ProposalType(0x0410);
    /// Reserves custom DID names.
    pub const RESERVE_CUSTOM_ID: ProposalType = ProposalType(0x0500);
    /// Hands reserved custom DID names to a receiver.
    pub const RECEIVE_CUSTOM_ID: ProposalType = ProposalType(0x0501);
    /// Changes the custom DID fee rate.
    pub const CHANGE_CUSTOM_ID_FEE: ProposalType = ProposalType(0x0502);

    /// Returns `true` for the budgeted proposal types.
    pub fn is_normal_like(&self) -> bool {
        matches!(
            *self,
            Self::NORMAL | Self::ELIP | Self::FLIP | Self::SET_ELIP | Self::MAIN_CHAIN_UPGRADE_CODE
        ) || (Self::SIDE_CHAIN_UPGRADE_CODE..=Self::SIDE_CHAIN_UPGRADE_CODE_END).contains(self)
    }

    /// Returns `true` if this type is one of the known sub-types.
    pub fn is_known(&self) -> bool {
        self.is_normal_like()
            || matches!(
                *self,
                Self::CHANGE_PROPOSAL_OWNER
                    | Self::CLOSE_PROPOSAL
                    | Self::SECRETARY_GENERAL
                    | Self::REGISTER_SIDE_CHAIN
                    | Self::RESERVE_CUSTOM_ID
                    | Self::RECEIVE_CUSTOM_ID
                    | Self::CHANGE_CUSTOM_ID_FEE
            )
    }
}

/// The kind of a budget payment.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum BudgetType {
    /// An advance paid at stage zero.
    Imprest = 0x00,
    /// An ordinary stage payment.
    #[default]
    NormalPayment = 0x01,
    /// The last payment.
    FinalPayment = 0x02,
}

/// One payment stage of a proposal budget.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Budget {
    /// The kind of payment.
    pub budget_type: BudgetType,
    /// The stage number.
    pub stage: u8,
    /// The amount paid at this stage.
    pub amount: Amount,
}

impl ElaSerialize for Budget {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u8(self.budget_type as u8)?;
        writer.write_u8(self.stage)?;
        self.amount.ela_serialize(&mut writer)
    }
}

impl ElaDeserialize for Budget {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let budget_type = match reader.read_u8()? {
            0x00 => BudgetType::Imprest,
            0x01 => BudgetType::NormalPayment,
            0x02 => BudgetType::FinalPayment,
            _ => return Err(SerializationError::Parse("invalid budget type")),
        };
        Ok(Budget {
            budget_type,
            stage: reader.read_u8()?,
            amount: Amount::ela_deserialize(&mut reader)?,
        })
    }
}

impl TrustedPreallocate for Budget {
    fn max_allocation() -> u64 {
        max_items_for_size(10)
    }
}

/// The side chain a RegisterSideChain proposal registers.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct SideChainInfo {
    /// The unique side-chain name.
    pub side_chain_name: String,
    /// The side chain's network magic.
    pub magic_number: u32,
    /// The side chain's genesis block.
    pub genesis_hash: Hash,
    /// The ELA exchange rate, in ELA.
    pub exchange_rate: Amount,
    /// The height the side chain becomes effective at.
    pub effective_height: u32,
    /// Where to download the side chain's node.
    pub resource_path: String,
}

impl ElaSerialize for SideChainInfo {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_var_string(&self.side_chain_name)?;
        writer.write_u32::<LittleEndian>(self.magic_number)?;
        self.genesis_hash.ela_serialize(&mut writer)?;
        self.exchange_rate.ela_serialize(&mut writer)?;
        writer.write_u32::<LittleEndian>(self.effective_height)?;
        writer.write_var_string(&self.resource_path)
    }
}

impl ElaDeserialize for SideChainInfo {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(SideChainInfo {
            side_chain_name: reader.read_var_string()?,
            magic_number: reader.read_u32::<LittleEndian>()?,
            genesis_hash: Hash::ela_deserialize(&mut reader)?,
            exchange_rate: Amount::ela_deserialize(&mut reader)?,
            effective_height: reader.read_u32::<LittleEndian>()?,
            resource_path: reader.read_var_string()?,
        })
    }
}

/// The payload of a CRCProposal transaction.
///
/// Only the fields of the proposal's sub-type are serialized; the others
/// keep their default values.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CrcProposal {
    /// The proposal sub-type.
    pub proposal_type: ProposalType,
    /// Free-form category data.
    pub category_data: String,
    /// The proposal owner's public key.
    pub owner_key: Vec<u8>,
    /// The hash of the proposal draft.
    pub draft_hash: Hash,
    /// The draft itself, in version 1 payloads.
    pub draft_data: Vec<u8>,
    /// Payment stages of budgeted proposals.
    pub budgets: Vec<Budget>,
    /// Receives the budget of budgeted proposals.
    pub recipient: ProgramHash,
    /// The proposal changed or closed by this one.
    pub target_proposal_hash: Hash,
    /// Custom DID names to reserve.
    pub reserved_custom_id_list: Vec<String>,
    /// Reserved custom DID names to hand over.
    pub received_custom_id_list: Vec<String>,
    /// The receiver of the custom DID names.
    pub receiver_did: ProgramHash,
    /// The new custom DID fee rate.
    pub rate_of_custom_id_fee: Amount,
    /// The height the new fee rate applies from.
    pub eid_effective_height: u32,
    /// The new recipient of a changed proposal.
    pub new_recipient: ProgramHash,
    /// The new owner of a changed proposal.
    pub new_owner_key: Vec<u8>,
    /// The public key of the new secretary general.
    pub secretary_general_public_key: Vec<u8>,
    /// The DID of the new secretary general.
    pub secretary_general_did: ProgramHash,
    /// The side chain being registered.
    pub side_chain_info: SideChainInfo,
    /// The owner's signature.
    pub signature: Vec<u8>,
    /// The new owner's signature, for owner changes.
    pub new_owner_signature: Vec<u8>,
    /// The new secretary general's signature, for appointments.
    pub secretary_general_signature: Vec<u8>,
    /// The council member submitting the proposal.
    pub cr_council_member_did: ProgramHash,
    /// The council member's signature.
    pub cr_council_member_signature: Vec<u8>,
}

impl CrcProposal {
    /// Writes the fields signed by the owner.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(self.proposal_type.0)?;
        writer.write_var_string(&self.category_data)?;
        writer.write_var_bytes(&self.owner_key)?;
        self.draft_hash.ela_serialize(&mut writer)?;
        if version >= CRC_PROPOSAL_DATA_VERSION {
            writer.write_var_bytes(&self.draft_data)?;
        }

        match self.proposal_type {
            ProposalType::CHANGE_PROPOSAL_OWNER => {
                self.target_proposal_hash.ela_serialize(&mut writer)?;
                self.new_recipient.ela_serialize(&mut writer)?;
                writer.write_var_bytes(&self.new_owner_key)
            }
            ProposalType::CLOSE_PROPOSAL => self.target_proposal_hash.ela_serialize(&mut writer),
            ProposalType::SECRETARY_GENERAL => {
                writer.write_var_bytes(&self.secretary_general_public_key)?;
                self.secretary_general_did.ela_serialize(&mut writer)
            }
            ProposalType::RESERVE_CUSTOM_ID => {
                write_string_list(&mut writer, &self.reserved_custom_id_list)
            }
            ProposalType::RECEIVE_CUSTOM_ID => {
                write_string_list(&mut writer, &self.received_custom_id_list)?;
                self.receiver_did.ela_serialize(&mut writer)
            }
            ProposalType::CHANGE_CUSTOM_ID_FEE => {
                self.rate_of_custom_id_fee.ela_serialize(&mut writer)?;
                writer.write_u32::<LittleEndian>(self.eid_effective_height)
            }
            ProposalType::REGISTER_SIDE_CHAIN => self.side_chain_info.ela_serialize(&mut writer),
            _ => {
                self.budgets.ela_serialize(&mut writer)?;
                self.recipient.ela_serialize(&mut writer)
            }
        }
    }

    /// Returns the second signer's signature, for the sub-types that have
    /// one.
    pub fn second_signature(&self) -> Option<&[u8]> {
        match self.proposal_type {
            ProposalType::CHANGE_PROPOSAL_OWNER => Some(&self.new_owner_signature),
            ProposalType::SECRETARY_GENERAL => Some(&self.secretary_general_signature),
            _ => None,
        }
    }

    /// Returns the buffer the owner signs.
    pub fn owner_signed_data(&self, version: u8) -> Vec<u8> {
        let mut data = Vec::new();
        self.serialize_unsigned(&mut data, version)
            .expect("writing to a Vec never fails");
        data
    }

    /// Returns the buffer the new owner or secretary general signs: the
    /// unsigned payload followed by the owner's signature.
    pub fn second_signed_data(&self, version: u8) -> Vec<u8> {
        let mut data = self.owner_signed_data(version);
        data.write_var_bytes(&self.signature)
            .expect("writing to a Vec never fails");
        data
    }

    /// Returns the buffer the council member signs: every earlier signature
    /// in order, then the member's DID.
    pub fn council_member_signed_data(&self, version: u8) -> Vec<u8> {
        let mut data = self.owner_signed_data(version);
        let mut write = || -> io::Result<()> {
            data.write_var_bytes(&self.signature)?;
            if let Some(second) = self.second_signature() {
                data.write_var_bytes(second)?;
            }
            self.cr_council_member_did.ela_serialize(&mut data)
        };
        write().expect("writing to a Vec never fails");
        data
    }

    /// Returns the proposal hash: the double-SHA256 of the full payload.
    pub fn hash(&self, version: u8) -> Hash {
        let mut writer = crate::serialization::sha256d::Writer::default();
        self.serialize(&mut writer, version)
            .expect("Sha256dWriter is infallible");
        Hash(writer.finish())
    }

    /// Writes the payload for `version`.
    pub fn serialize<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        self.serialize_unsigned(&mut writer, version)?;
        writer.write_var_bytes(&self.signature)?;
        if let Some(second) = self.second_signature() {
            writer.write_var_bytes(second)?;
        }
        self.cr_council_member_did.ela_serialize(&mut writer)?;
        writer.write_var_bytes(&self.cr_council_member_signature)
    }

    /// Reads a payload of `version`.
    pub fn deserialize<R: io::Read>(mut reader: R, version: u8) -> Result<Self, SerializationError> {
        let mut proposal = CrcProposal {
            proposal_type: ProposalType(reader.read_u16::<LittleEndian>()?),
            category_data: reader.read_var_string()?,
            owner_key: reader.read_var_bytes()?,
            draft_hash: Hash::ela_deserialize(&mut reader)?,
            ..CrcProposal::default()
        };
        if version >= CRC_PROPOSAL_DATA_VERSION {
            proposal.draft_data = reader.read_var_bytes()?;
        }

        match proposal.proposal_type {
            ProposalType::CHANGE_PROPOSAL_OWNER => {
                proposal.target_proposal_hash = Hash::ela_deserialize(&mut reader)?;
                proposal.new_recipient = ProgramHash::ela_deserialize(&mut reader)?;
                proposal.new_owner_key = reader.read_var_bytes()?;
            }
            ProposalType::CLOSE_PROPOSAL => {
                proposal.target_proposal_hash = Hash::ela_deserialize(&mut reader)?;
            }
            ProposalType::SECRETARY_GENERAL => {
                proposal.secretary_general_public_key = reader.read_var_bytes()?;
                proposal.secretary_general_did = ProgramHash::ela_deserialize(&mut reader)?;
            }
            ProposalType::RESERVE_CUSTOM_ID => {
                proposal.reserved_custom_id_list = read_string_list(&mut reader)?;
            }
            ProposalType::RECEIVE_CUSTOM_ID => {
                proposal.received_custom_id_list = read_string_list(&mut reader)?;
                proposal.receiver_did = ProgramHash::ela_deserialize(&mut reader)?;
            }
            ProposalType::CHANGE_CUSTOM_ID_FEE => {
                proposal.rate_of_custom_id_fee = Amount::ela_deserialize(&mut reader)?;
                proposal.eid_effective_height = reader.read_u32::<LittleEndian>()?;
            }
            ProposalType::REGISTER_SIDE_CHAIN => {
                proposal.side_chain_info = SideChainInfo::ela_deserialize(&mut reader)?;
            }
            _ => {
                proposal.budgets = Vec::ela_deserialize(&mut reader)?;
                proposal.recipient = ProgramHash::ela_deserialize(&mut reader)?;
            }
        }

        proposal.signature = reader.read_var_bytes()?;
        match proposal.proposal_type {
            ProposalType::CHANGE_PROPOSAL_OWNER => {
                proposal.new_owner_signature = reader.read_var_bytes()?;
            }
            ProposalType::SECRETARY_GENERAL => {
                proposal.secretary_general_signature = reader.read_var_bytes()?;
            }
            _ => {}
        }
        proposal.cr_council_member_did = ProgramHash::ela_deserialize(&mut reader)?;
        proposal.cr_council_member_signature = reader.read_var_bytes()?;

        Ok(proposal)
    }
}

/// A council member's review result.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum VoteResult {
    /// The member approves.
    #[default]
    Approve = 0x00,
    /// The member rejects.
    Reject = 0x01,
    /// The member abstains.
    Abstain = 0x02,
}

/// The payload of a CRCProposalReview transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CrcProposalReview {
    /// The reviewed proposal.
    pub proposal_hash: Hash,
    /// The member's decision.
    pub vote_result: VoteResult,
    /// The hash of the member's opinion.
    pub opinion_hash: Hash,
    /// The opinion itself, in version 1 payloads.
    pub opinion_data: Vec<u8>,
    /// The reviewing member.
    pub did: ProgramHash,
    /// The member's signature.
    pub signature: Vec<u8>,
}

impl CrcProposalReview {
    /// Writes the signed fields for `version`.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        self.proposal_hash.ela_serialize(&mut writer)?;
        writer.write_u8(self.vote_result as u8)?;
        self.opinion_hash.ela_serialize(&mut writer)?;
        if version >= CRC_PROPOSAL_DATA_VERSION {
            writer.write_var_bytes(&self.opinion_data)?;
        }
        self.did.ela_serialize(&mut writer)
    }

    /// Writes the payload for `version`.
    pub fn serialize<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        self.serialize_unsigned(&mut writer, version)?;
        writer.write_var_bytes(&self.signature)
    }

    /// Reads a payload of `version`.
    pub fn deserialize<R: io::Read>(mut reader: R, version: u8) -> Result<Self, SerializationError> {
        let proposal_hash = Hash::ela_deserialize(&mut reader)?;
        let vote_result = match reader.read_u8()? {
            0x00 => VoteResult::Approve,
            0x01 => VoteResult::Reject,
            0x02 => VoteResult::Abstain,
            _ => return Err(SerializationError::Parse("invalid proposal vote result")),
        };
        let opinion_hash = Hash::ela_deserialize(&mut reader)?;
        let opinion_data = if version >= CRC_PROPOSAL_DATA_VERSION {
            reader.read_var_bytes()?
        } else {
            Vec::new()
        };
        Ok(CrcProposalReview {
            proposal_hash,
            vote_result,
            opinion_hash,
            opinion_data,
            did: ProgramHash::ela_deserialize(&mut reader)?,
            signature: reader.read_var_bytes()?,
        })
    }
}

/// The kind of a proposal tracking transaction.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum ProposalTrackingType {
    /// A progress message without payment.
    #[default]
    Common = 0x00,
    /// Finishes a payment stage.
    Progress = 0x01,
    /// The secretary general rejects a stage.
    Rejected = 0x02,
    /// The proposal is terminated.
    Terminated = 0x03,
    /// The owner hands the proposal over.
    ChangeOwner = 0x04,
    /// The final stage is finished.
    Finalized = 0x05,
}

impl ProposalTrackingType {
    /// Returns the tracking type with the given tag.
    pub fn from_u8(tag: u8) -> Option<ProposalTrackingType> {
        use ProposalTrackingType::*;

        [Common, Progress, Rejected, Terminated, ChangeOwner, Finalized]
            .into_iter()
            .find(|kind| *kind as u8 == tag)
    }
}

/// The payload of a CRCProposalTracking transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CrcProposalTracking {
    /// The kind of tracking.
    pub tracking_type: ProposalTrackingType,
    /// The tracked proposal.
    pub proposal_hash: Hash,
    /// The hash of the owner's message.
    pub message_hash: Hash,
    /// The message itself, in version 1 payloads.
    pub message_data: Vec<u8>,
    /// The stage being tracked.
    pub stage: u8,
    /// The proposal owner's key.
    pub owner_key: Vec<u8>,
    /// The new owner's key, for owner changes.
    pub new_owner_key: Vec<u8>,
    /// The owner's signature.
    pub owner_signature: Vec<u8>,
    /// The new owner's signature, for owner changes.
    pub new_owner_signature: Vec<u8>,
    /// The hash of the secretary general's opinion.
    pub secretary_general_opinion_hash: Hash,
    /// The opinion itself, in version 1 payloads.
    pub secretary_general_opinion_data: Vec<u8>,
    /// The secretary general's signature.
    pub secretary_general_signature: Vec<u8>,
}

impl CrcProposalTracking {
    /// Writes the fields signed by the owner.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        self.proposal_hash.ela_serialize(&mut writer)?;
        self.message_hash.ela_serialize(&mut writer)?;
        if version >= CRC_PROPOSAL_DATA_VERSION {
            writer.write_var_bytes(&self.message_data)?;
        }
        writer.write_u8(self.stage)?;
        writer.write_var_bytes(&self.owner_key)?;
        writer.write_var_bytes(&self.new_owner_key)
    }

    /// Returns the buffer the owner signs.
    pub fn owner_signed_data(&self, version: u8) -> Vec<u8> {
        let mut data = Vec::new();
        self.serialize_unsigned(&mut data, version)
            .expect("writing to a Vec never fails");
        data
    }

    /// Returns the buffer the new owner signs.
    pub fn new_owner_signed_data(&self, version: u8) -> Vec<u8> {
        let mut data = self.owner_signed_data(version);
        data.write_var_bytes(&self.owner_signature)
            .expect("writing to a Vec never fails");
        data
    }

    /// Returns the buffer the secretary general signs.
    pub fn secretary_general_signed_data(&self, version: u8) -> Vec<u8> {
        let mut data = self.new_owner_signed_data(version);
        self.write_secretary_general_fields(&mut data, version)
            .expect("writing to a Vec never fails");
        data
    }

    fn write_secretary_general_fields<W: io::Write>(
        &self,
        mut writer: W,
        version: u8,
    ) -> io::Result<()> {
        writer.write_var_bytes(&self.new_owner_signature)?;
        writer.write_u8(self.tracking_type as u8)?;
        self.secretary_general_opinion_hash
            .ela_serialize(&mut writer)?;
        if version >= CRC_PROPOSAL_DATA_VERSION {
            writer.write_var_bytes(&self.secretary_general_opinion_data)?;
        }
        Ok(())
    }

    /// Writes the payload for `version`.
    pub fn serialize<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        self.serialize_unsigned(&mut writer, version)?;
        writer.write_var_bytes(&self.owner_signature)?;
        self.write_secretary_general_fields(&mut writer, version)?;
        writer.write_var_bytes(&self.secretary_general_signature)
    }

    /// Reads a payload of `version`.
    pub fn deserialize<R: io::Read>(mut reader: R, version: u8) -> Result<Self, SerializationError> {
        let proposal_hash = Hash::ela_deserialize(&mut reader)?;
        let message_hash = Hash::ela_deserialize(&mut reader)?;
        let message_data = if version >= CRC_PROPOSAL_DATA_VERSION {
            reader.read_var_bytes()?
        } else {
            Vec::new()
        };
        let stage = reader.read_u8()?;
        let owner_key = reader.read_var_bytes()?;
        let new_owner_key = reader.read_var_bytes()?;
        let owner_signature = reader.read_var_bytes()?;
        let new_owner_signature = reader.read_var_bytes()?;
        let tracking_type = ProposalTrackingType::from_u8(reader.read_u8()?)
            .ok_or(SerializationError::Parse("invalid proposal tracking type"))?;
        let secretary_general_opinion_hash = Hash::ela_deserialize(&mut reader)?;
        let secretary_general_opinion_data = if version >= CRC_PROPOSAL_DATA_VERSION {
            reader.read_var_bytes()?
        } else {
            Vec::new()
        };

        Ok(CrcProposalTracking {
            tracking_type,
            proposal_hash,
            message_hash,
            message_data,
            stage,
            owner_key,
            new_owner_key,
            owner_signature,
            new_owner_signature,
            secretary_general_opinion_hash,
            secretary_general_opinion_data,
            secretary_general_signature: reader.read_var_bytes()?,
        })
    }
}

/// The payload of a CRCProposalWithdraw transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CrcProposalWithdraw {
    /// The proposal whose budget is withdrawn.
    pub proposal_hash: Hash,
    /// The proposal owner's key.
    pub owner_key: Vec<u8>,
    /// The recipient, in version 1 payloads.
    pub recipient: ProgramHash,
    /// The amount, in version 1 payloads.
    pub amount: Amount,
    /// The owner's signature.
    pub signature: Vec<u8>,
}

impl CrcProposalWithdraw {
    /// Writes the signed fields for `version`.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        self.proposal_hash.ela_serialize(&mut writer)?;
        writer.write_var_bytes(&self.owner_key)?;
        if version >= CRC_PROPOSAL_WITHDRAW_V1 {
            self.recipient.ela_serialize(&mut writer)?;
            self.amount.ela_serialize(&mut writer)?;
        }
        Ok(())
    }

    /// Writes the payload for `version`.
    pub fn serialize<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        self.serialize_unsigned(&mut writer, version)?;
        writer.write_var_bytes(&self.signature)
    }

    /// Reads a payload of `version`.
    pub fn deserialize<R: io::Read>(mut reader: R, version: u8) -> Result<Self, SerializationError> {
        let proposal_hash = Hash::ela_deserialize(&mut reader)?;
        let owner_key = reader.read_var_bytes()?;
        let (recipient, amount) = if version >= CRC_PROPOSAL_WITHDRAW_V1 {
            (
                ProgramHash::ela_deserialize(&mut reader)?,
                Amount::ela_deserialize(&mut reader)?,
            )
        } else {
            (ProgramHash::ZERO, Amount::ZERO)
        };
        Ok(CrcProposalWithdraw {
            proposal_hash,
            owner_key,
            recipient,
            amount,
            signature: reader.read_var_bytes()?,
        })
    }
}

/// The payload of a CRCProposalRealWithdraw transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CrcProposalRealWithdraw {
    /// The withdraw transactions being paid out, in output order.
    pub withdraw_transaction_hashes: Vec<Hash>,
}

impl ElaSerialize for CrcProposalRealWithdraw {
    fn ela_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error> {
        self.withdraw_transaction_hashes.ela_serialize(writer)
    }
}

impl ElaDeserialize for CrcProposalRealWithdraw {
    fn ela_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError> {
        Ok(CrcProposalRealWithdraw {
            withdraw_transaction_hashes: Vec::ela_deserialize(reader)?,
        })
    }
}

fn write_string_list<W: io::Write>(mut writer: W, list: &[String]) -> io::Result<()> {
    writer.write_var_uint(list.len() as u64)?;
    for item in list {
        writer.write_var_string(item)?;
    }
    Ok(())
}

fn read_string_list<R: io::Read>(mut reader: R) -> Result<Vec<String>, SerializationError> {
    let count = reader.read_var_uint()?;
    if count > max_items_for_size(1) {
        return Err(SerializationError::Parse("too many strings"));
    }
    let mut list = Vec::with_capacity(count as usize);
    for _ in 0..count {
        list.push(reader.read_var_string()?);
    }
    Ok(list)
}
