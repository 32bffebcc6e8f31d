//! Typed output payloads, carried by outputs of version 0x09 transactions.

use std::io;

use thiserror::Error;

use crate::serialization::{ElaDeserialize, ElaSerialize, SerializationError};

mod cross_chain;
mod stake;
mod vote;


pub use cross_chain::{
    CrossChainOutput, MappingOutput, ReturnSideChainDepositOutput, WithdrawFromSideChainOutput,
    MAX_TARGET_DATA_LEN,
};
pub use stake::StakeOutput;
pub use vote::{
    CandidateVotes, VoteContent, VoteOutput, VoteType, MAX_VOTE_PRODUCERS_PER_CONTENT,
    VOTE_DPOS_V2_VERSION, VOTE_PRODUCER_AND_CR_VERSION, VOTE_PRODUCER_VERSION,
};

/// The type tag of an output.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum OutputType {
    /// An ordinary output.
    #[default]
    None = 0x00,
    /// Carries votes.
    Vote = 0x01,
    /// Maps a producer to a side-chain id.
    Mapping = 0x02,
    /// A cross-chain transfer.
    CrossChain = 0x03,
    /// A side-chain withdrawal payout.
    Withdraw = 0x04,
    /// A returned side-chain deposit.
    ReturnSideChainDeposit = 0x05,
    /// A DPoS v2 stake.
    Stake = 0x07,
}

impl OutputType {
    /// Returns the output type with the given tag.
    pub fn from_u8(tag: u8) -> Option<OutputType> {
        match tag {
            0x00 => Some(OutputType::None),
            0x01 => Some(OutputType::Vote),
            0x02 => Some(OutputType::Mapping),
            0x03 => Some(OutputType::CrossChain),
            0x04 => Some(OutputType::Withdraw),
            0x05 => Some(OutputType::ReturnSideChainDeposit),
            0x07 => Some(OutputType::Stake),
            _ => None,
        }
    }
}

/// The type-specific payload of an output.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum OutputPayload {
    /// No payload.
    #[default]
    Default,
    /// Votes.
    Vote(VoteOutput),
    /// A producer mapping.
    Mapping(MappingOutput),
    /// A cross-chain transfer.
    CrossChain(CrossChainOutput),
    /// A side-chain withdrawal payout.
    Withdraw(WithdrawFromSideChainOutput),
    /// A returned side-chain deposit.
    ReturnSideChainDeposit(ReturnSideChainDepositOutput),
    /// A DPoS v2 stake.
    Stake(StakeOutput),
}

impl OutputPayload {
    /// Returns the output type this payload belongs to.
    pub fn output_type(&self) -> OutputType {
        match self {
            OutputPayload::Default => OutputType::None,
            OutputPayload::Vote(_) => OutputType::Vote,
            OutputPayload::Mapping(_) => OutputType::Mapping,
            OutputPayload::CrossChain(_) => OutputType::CrossChain,
            OutputPayload::Withdraw(_) => OutputType::Withdraw,
            OutputPayload::ReturnSideChainDeposit(_) => OutputType::ReturnSideChainDeposit,
            OutputPayload::Stake(_) => OutputType::Stake,
        }
    }

    /// Checks the structure of the payload, without chain state.
    pub fn validate(&self) -> Result<(), OutputPayloadError> {
        match self {
            OutputPayload::Default => Ok(()),
            OutputPayload::Vote(vote) => vote.validate(),
            OutputPayload::Mapping(mapping) => mapping.validate(),
            OutputPayload::CrossChain(cross_chain) => cross_chain.validate(),
            OutputPayload::Withdraw(withdraw) => withdraw.validate(),
            OutputPayload::ReturnSideChainDeposit(deposit) => deposit.validate(),
            OutputPayload::Stake(stake) => stake.validate(),
        }
    }

    /// Reads the payload of an output of type `output_type`.
    pub fn deserialize<R: io::Read>(
        reader: R,
        output_type: OutputType,
    ) -> Result<Self, SerializationError> {
        Ok(match output_type {
            OutputType::None => OutputPayload::Default,
            OutputType::Vote => OutputPayload::Vote(VoteOutput::ela_deserialize(reader)?),
            OutputType::Mapping => OutputPayload::Mapping(MappingOutput::ela_deserialize(reader)?),
            OutputType::CrossChain => {
                OutputPayload::CrossChain(CrossChainOutput::ela_deserialize(reader)?)
            }
            OutputType::Withdraw => {
                OutputPayload::Withdraw(WithdrawFromSideChainOutput::ela_deserialize(reader)?)
            }
            OutputType::ReturnSideChainDeposit => OutputPayload::ReturnSideChainDeposit(
                ReturnSideChainDepositOutput::ela_deserialize(reader)?,
            ),
            OutputType::Stake => OutputPayload::Stake(StakeOutput::ela_deserialize(reader)?),
        })
    }
}

impl ElaSerialize for OutputPayload {
    fn ela_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error> {
        match self {
            OutputPayload::Default => Ok(()),
            OutputPayload::Vote(vote) => vote.ela_serialize(writer),
            OutputPayload::Mapping(mapping) => mapping.ela_serialize(writer),
            OutputPayload::CrossChain(cross_chain) => cross_chain.ela_serialize(writer),
            OutputPayload::Withdraw(withdraw) => withdraw.ela_serialize(writer),
            OutputPayload::ReturnSideChainDeposit(deposit) => deposit.ela_serialize(writer),
            OutputPayload::Stake(stake) => stake.ela_serialize(writer),
        }
    }
}

/// A structural error in an output payload.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum OutputPayloadError {
    #[error("invalid vote version {0}")]
    VoteVersion(u8),

    #[error("invalid vote type {0}")]
    VoteType(u8),

    #[error("duplicate vote type")]
    DuplicateVoteType,

    #[error("invalid public key count")]
    CandidateCount,

    #[error("duplicate candidate")]
    DuplicateCandidate,

    #[error("invalid candidate votes")]
    CandidateVotes,

    #[error("invalid target address")]
    TargetAddress,

    #[error("invalid target amount")]
    TargetAmount,

    #[error("target data too long")]
    TargetData,

    #[error("invalid genesis block address")]
    GenesisAddress,

    #[error("invalid stake address")]
    StakeAddress,

    #[error("invalid owner public key")]
    PublicKey,

    #[error("invalid side producer id")]
    SideProducerId,

    #[error("invalid signature length")]
    Signature,
}
