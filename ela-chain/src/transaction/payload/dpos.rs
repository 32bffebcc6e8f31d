//! DPoS consensus payloads: misbehaviour evidence and arbitrator management.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{read_var_bytes_list, write_var_bytes_list};
use crate::{
    serialization::{
        max_items_for_size, ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError,
        TrustedPreallocate, WriteElaExt,
    },
    Hash,
};

/// A sponsor's block proposal.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DposProposal {
    /// The proposing arbitrator.
    pub sponsor: Vec<u8>,
    /// The proposed block.
    pub block_hash: Hash,
    /// The view the proposal was made in.
    pub view_offset: u32,
    /// The sponsor's signature.
    pub sign: Vec<u8>,
}

impl DposProposal {
    /// Writes the signed fields.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_var_bytes(&self.sponsor)?;
        self.block_hash.ela_serialize(&mut writer)?;
        writer.write_u32::<LittleEndian>(self.view_offset)
    }

    /// Returns the hash of the signed fields.
    pub fn hash(&self) -> Hash {
        let mut writer = crate::serialization::sha256d::Writer::default();
        self.serialize_unsigned(&mut writer)
            .expect("Sha256dWriter is infallible");
        Hash(writer.finish())
    }
}

impl ElaSerialize for DposProposal {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.serialize_unsigned(&mut writer)?;
        writer.write_var_bytes(&self.sign)
    }
}

impl ElaDeserialize for DposProposal {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(DposProposal {
            sponsor: reader.read_var_bytes()?,
            block_hash: Hash::ela_deserialize(&mut reader)?,
            view_offset: reader.read_u32::<LittleEndian>()?,
            sign: reader.read_var_bytes()?,
        })
    }
}

/// An arbitrator's vote on a proposal.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DposProposalVote {
    /// The proposal voted on.
    pub proposal_hash: Hash,
    /// The voting arbitrator.
    pub signer: Vec<u8>,
    /// Whether the arbitrator accepts the proposal.
    pub accept: bool,
    /// The signer's signature.
    pub sign: Vec<u8>,
}

impl DposProposalVote {
    /// Writes the signed fields.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        self.proposal_hash.ela_serialize(&mut writer)?;
        writer.write_var_bytes(&self.signer)?;
        writer.write_u8(u8::from(self.accept))
    }

    /// Returns the hash of the signed fields.
    pub fn hash(&self) -> Hash {
        let mut writer = crate::serialization::sha256d::Writer::default();
        self.serialize_unsigned(&mut writer)
            .expect("Sha256dWriter is infallible");
        Hash(writer.finish())
    }
}

impl ElaSerialize for DposProposalVote {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.serialize_unsigned(&mut writer)?;
        writer.write_var_bytes(&self.sign)
    }
}

impl ElaDeserialize for DposProposalVote {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let proposal_hash = Hash::ela_deserialize(&mut reader)?;
        let signer = reader.read_var_bytes()?;
        let accept = match reader.read_u8()? {
            0 => false,
            1 => true,
            _ => return Err(SerializationError::Parse("invalid bool")),
        };
        Ok(DposProposalVote {
            proposal_hash,
            signer,
            accept,
            sign: reader.read_var_bytes()?,
        })
    }
}

impl TrustedPreallocate for DposProposalVote {
    fn max_allocation() -> u64 {
        // proposal hash, empty signer, accept flag and empty signature
        max_items_for_size(35)
    }
}

/// A proposal and the votes that confirmed its block.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DposConfirm {
    /// The confirmed proposal.
    pub proposal: DposProposal,
    /// The accepting votes.
    pub votes: Vec<DposProposalVote>,
}

impl ElaSerialize for DposConfirm {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.proposal.ela_serialize(&mut writer)?;
        self.votes.ela_serialize(&mut writer)
    }
}

impl ElaDeserialize for DposConfirm {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(DposConfirm {
            proposal: DposProposal::ela_deserialize(&mut reader)?,
            votes: Vec::ela_deserialize(&mut reader)?,
        })
    }
}

/// A proposal together with the header it proposed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ProposalEvidence {
    /// The proposal.
    pub proposal: DposProposal,
    /// The serialized block header.
    pub block_header: Vec<u8>,
    /// The height of the proposed block.
    pub block_height: u32,
}

impl ElaSerialize for ProposalEvidence {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.proposal.ela_serialize(&mut writer)?;
        writer.write_var_bytes(&self.block_header)?;
        writer.write_u32::<LittleEndian>(self.block_height)
    }
}

impl ElaDeserialize for ProposalEvidence {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(ProposalEvidence {
            proposal: DposProposal::ela_deserialize(&mut reader)?,
            block_header: reader.read_var_bytes()?,
            block_height: reader.read_u32::<LittleEndian>()?,
        })
    }
}

/// A vote together with the proposal it voted on.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct VoteEvidence {
    /// The proposal voted on.
    pub proposal_evidence: ProposalEvidence,
    /// The vote.
    pub vote: DposProposalVote,
}

impl ElaSerialize for VoteEvidence {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.proposal_evidence.ela_serialize(&mut writer)?;
        self.vote.ela_serialize(&mut writer)
    }
}

impl ElaDeserialize for VoteEvidence {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(VoteEvidence {
            proposal_evidence: ProposalEvidence::ela_deserialize(&mut reader)?,
            vote: DposProposalVote::ela_deserialize(&mut reader)?,
        })
    }
}

/// The payload of an IllegalProposalEvidence transaction: two different
/// proposals from one sponsor at one height.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DposIllegalProposals {
    /// The proposal with the lower hash.
    pub evidence: ProposalEvidence,
    /// The proposal with the higher hash.
    pub compare_evidence: ProposalEvidence,
}

impl ElaSerialize for DposIllegalProposals {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.evidence.ela_serialize(&mut writer)?;
        self.compare_evidence.ela_serialize(&mut writer)
    }
}

impl ElaDeserialize for DposIllegalProposals {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(DposIllegalProposals {
            evidence: ProposalEvidence::ela_deserialize(&mut reader)?,
            compare_evidence: ProposalEvidence::ela_deserialize(&mut reader)?,
        })
    }
}

/// The payload of an IllegalVoteEvidence transaction: two different votes
/// from one signer at one height.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DposIllegalVotes {
    /// The vote with the lower hash.
    pub evidence: VoteEvidence,
    /// The vote with the higher hash.
    pub compare_evidence: VoteEvidence,
}

impl ElaSerialize for DposIllegalVotes {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.evidence.ela_serialize(&mut writer)?;
        self.compare_evidence.ela_serialize(&mut writer)
    }
}

impl ElaDeserialize for DposIllegalVotes {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(DposIllegalVotes {
            evidence: VoteEvidence::ela_deserialize(&mut reader)?,
            compare_evidence: VoteEvidence::ela_deserialize(&mut reader)?,
        })
    }
}

/// A confirmed block header and the arbitrators that signed it.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct BlockEvidence {
    /// The serialized block header.
    pub header: Vec<u8>,
    /// The serialized confirmation.
    pub block_confirm: Vec<u8>,
    /// The public keys that confirmed the block.
    pub signers: Vec<Vec<u8>>,
}

impl ElaSerialize for BlockEvidence {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_var_bytes(&self.header)?;
        writer.write_var_bytes(&self.block_confirm)?;
        write_var_bytes_list(&mut writer, &self.signers)
    }
}

impl ElaDeserialize for BlockEvidence {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(BlockEvidence {
            header: reader.read_var_bytes()?,
            block_confirm: reader.read_var_bytes()?,
            signers: read_var_bytes_list(&mut reader)?,
        })
    }
}

/// The payload of an IllegalBlockEvidence transaction: two confirmed blocks
/// at one height.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DposIllegalBlocks {
    /// The chain the blocks belong to.
    pub coin_type: u32,
    /// The height of both blocks.
    pub block_height: u32,
    /// The block with the lower hash.
    pub evidence: BlockEvidence,
    /// The block with the higher hash.
    pub compare_evidence: BlockEvidence,
}

impl ElaSerialize for DposIllegalBlocks {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u32::<LittleEndian>(self.coin_type)?;
        writer.write_u32::<LittleEndian>(self.block_height)?;
        self.evidence.ela_serialize(&mut writer)?;
        self.compare_evidence.ela_serialize(&mut writer)
    }
}

impl ElaDeserialize for DposIllegalBlocks {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(DposIllegalBlocks {
            coin_type: reader.read_u32::<LittleEndian>()?,
            block_height: reader.read_u32::<LittleEndian>()?,
            evidence: BlockEvidence::ela_deserialize(&mut reader)?,
            compare_evidence: BlockEvidence::ela_deserialize(&mut reader)?,
        })
    }
}

/// The payload of an IllegalSidechainEvidence transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct SidechainIllegalData {
    /// The kind of misbehaviour.
    pub illegal_type: u8,
    /// The side-chain height.
    pub height: u32,
    /// The misbehaving arbitrator.
    pub illegal_signer: Vec<u8>,
    /// The hash of the first piece of data.
    pub evidence: Hash,
    /// The hash of the conflicting data.
    pub compare_evidence: Hash,
    /// The side chain's genesis block address.
    pub genesis_block_address: String,
    /// Arbitrator signatures over the unsigned payload.
    pub signs: Vec<Vec<u8>>,
}

impl SidechainIllegalData {
    /// Writes the signed fields.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u8(self.illegal_type)?;
        writer.write_u32::<LittleEndian>(self.height)?;
        writer.write_var_bytes(&self.illegal_signer)?;
        self.evidence.ela_serialize(&mut writer)?;
        self.compare_evidence.ela_serialize(&mut writer)?;
        writer.write_var_string(&self.genesis_block_address)
    }
}

impl ElaSerialize for SidechainIllegalData {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.serialize_unsigned(&mut writer)?;
        write_var_bytes_list(&mut writer, &self.signs)
    }
}

impl ElaDeserialize for SidechainIllegalData {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(SidechainIllegalData {
            illegal_type: reader.read_u8()?,
            height: reader.read_u32::<LittleEndian>()?,
            illegal_signer: reader.read_var_bytes()?,
            evidence: Hash::ela_deserialize(&mut reader)?,
            compare_evidence: Hash::ela_deserialize(&mut reader)?,
            genesis_block_address: reader.read_var_string()?,
            signs: read_var_bytes_list(&mut reader)?,
        })
    }
}

/// The payload of an InactiveArbitrators transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct InactiveArbitrators {
    /// The CRC arbitrator reporting the inactivity.
    pub sponsor: Vec<u8>,
    /// The inactive arbitrators.
    pub arbitrators: Vec<Vec<u8>>,
    /// The height of the report.
    pub block_height: u32,
}

impl ElaSerialize for InactiveArbitrators {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_var_bytes(&self.sponsor)?;
        write_var_bytes_list(&mut writer, &self.arbitrators)?;
        writer.write_u32::<LittleEndian>(self.block_height)
    }
}

impl ElaDeserialize for InactiveArbitrators {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(InactiveArbitrators {
            sponsor: reader.read_var_bytes()?,
            arbitrators: read_var_bytes_list(&mut reader)?,
            block_height: reader.read_u32::<LittleEndian>()?,
        })
    }
}

/// Why consensus reverts to proof of work.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum RevertType {
    /// No block was produced for too long.
    #[default]
    NoBlock = 0x00,
    /// Too few producers are active.
    NoProducers = 0x01,
    /// Council members did not claim their DPoS nodes.
    NoClaimDposNode = 0x02,
}

/// The payload of a RevertToPOW transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct RevertToPow {
    /// The reason for the revert.
    pub revert_type: RevertType,
    /// The height proof of work resumes at.
    pub working_height: u32,
}

impl ElaSerialize for RevertToPow {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u8(self.revert_type as u8)?;
        writer.write_u32::<LittleEndian>(self.working_height)
    }
}

impl ElaDeserialize for RevertToPow {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let revert_type = match reader.read_u8()? {
            0x00 => RevertType::NoBlock,
            0x01 => RevertType::NoProducers,
            0x02 => RevertType::NoClaimDposNode,
            _ => return Err(SerializationError::Parse("invalid revert to pow type")),
        };
        Ok(RevertToPow {
            revert_type,
            working_height: reader.read_u32::<LittleEndian>()?,
        })
    }
}

/// The payload of a RevertToDPOS transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct RevertToDpos {
    /// Blocks between the transaction and the DPoS restart.
    pub work_height_interval: u32,
    /// The height consensus reverted to proof of work at.
    pub revert_to_pow_block_height: u32,
}

impl ElaSerialize for RevertToDpos {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u32::<LittleEndian>(self.work_height_interval)?;
        writer.write_u32::<LittleEndian>(self.revert_to_pow_block_height)
    }
}

impl ElaDeserialize for RevertToDpos {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(RevertToDpos {
            work_height_interval: reader.read_u32::<LittleEndian>()?,
            revert_to_pow_block_height: reader.read_u32::<LittleEndian>()?,
        })
    }
}

/// Payload version that adds the complete CR key list.
pub const NEXT_TURN_DPOS_INFO_V1: u8 = 0x01;

/// The payload of a NextTurnDPOSInfo transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct NextTurnDposInfo {
    /// The height the next turn starts at.
    pub working_height: u32,
    /// The CR arbitrators of the next turn.
    pub cr_public_keys: Vec<Vec<u8>>,
    /// The elected producers of the next turn.
    pub dpos_public_keys: Vec<Vec<u8>>,
    /// Every CR member key, including members without a node.
    pub complete_cr_public_keys: Vec<Vec<u8>>,
}

impl NextTurnDposInfo {
    /// Writes the payload for `version`.
    pub fn serialize<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.working_height)?;
        write_var_bytes_list(&mut writer, &self.cr_public_keys)?;
        write_var_bytes_list(&mut writer, &self.dpos_public_keys)?;
        if version >= NEXT_TURN_DPOS_INFO_V1 {
            write_var_bytes_list(&mut writer, &self.complete_cr_public_keys)?;
        }
        Ok(())
    }

    /// Reads a payload of `version`.
    pub fn deserialize<R: io::Read>(mut reader: R, version: u8) -> Result<Self, SerializationError> {
        let working_height = reader.read_u32::<LittleEndian>()?;
        let cr_public_keys = read_var_bytes_list(&mut reader)?;
        let dpos_public_keys = read_var_bytes_list(&mut reader)?;
        let complete_cr_public_keys = if version >= NEXT_TURN_DPOS_INFO_V1 {
            read_var_bytes_list(&mut reader)?
        } else {
            Vec::new()
        };
        Ok(NextTurnDposInfo {
            working_height,
            cr_public_keys,
            dpos_public_keys,
            complete_cr_public_keys,
        })
    }
}

/// The payload of an UpdateVersion transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct UpdateVersion {
    /// The first height of the window.
    pub start_height: u32,
    /// The last height of the window.
    pub end_height: u32,
}

impl ElaSerialize for UpdateVersion {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u32::<LittleEndian>(self.start_height)?;
        writer.write_u32::<LittleEndian>(self.end_height)
    }
}

impl ElaDeserialize for UpdateVersion {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(UpdateVersion {
            start_height: reader.read_u32::<LittleEndian>()?,
            end_height: reader.read_u32::<LittleEndian>()?,
        })
    }
}
