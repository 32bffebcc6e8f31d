//! Vote output payloads.

use std::{collections::HashSet, io};

use byteorder::{ReadBytesExt, WriteBytesExt};

use super::OutputPayloadError;
use crate::{
    serialization::{
        max_items_for_size, ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError,
        TrustedPreallocate, WriteElaExt,
    },
    Amount,
};

/// Candidates in version 0 vote outputs carry no weights.
pub const VOTE_PRODUCER_VERSION: u8 = 0x00;

/// Version 1 adds per-candidate weights and CR, proposal and impeachment
/// votes.
pub const VOTE_PRODUCER_AND_CR_VERSION: u8 = 0x01;

/// Version 2 adds DPoS v2 votes.
pub const VOTE_DPOS_V2_VERSION: u8 = 0x02;

/// The maximum number of producers one content block can vote for.
pub const MAX_VOTE_PRODUCERS_PER_CONTENT: usize = 36;

/// What a block of votes is cast for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum VoteType {
    /// Votes for DPoS producers, keyed by owner public key.
    Delegate = 0x00,
    /// Votes for CR candidates, keyed by CID.
    Crc = 0x01,
    /// Votes against CR proposals, keyed by proposal hash.
    CrcProposal = 0x02,
    /// Votes to impeach CR members, keyed by CID.
    CrcImpeachment = 0x03,
    /// DPoS v2 votes for producers, keyed by owner public key.
    DposV2 = 0x04,
}

impl VoteType {
    /// Returns the vote type with the given tag.
    pub fn from_u8(tag: u8) -> Option<VoteType> {
        match tag {
            0x00 => Some(VoteType::Delegate),
            0x01 => Some(VoteType::Crc),
            0x02 => Some(VoteType::CrcProposal),
            0x03 => Some(VoteType::CrcImpeachment),
            0x04 => Some(VoteType::DposV2),
            _ => None,
        }
    }

    /// Returns the lowest vote output version that may carry this type.
    pub fn min_version(&self) -> u8 {
        match self {
            VoteType::Delegate => VOTE_PRODUCER_VERSION,
            VoteType::Crc | VoteType::CrcProposal | VoteType::CrcImpeachment => {
                VOTE_PRODUCER_AND_CR_VERSION
            }
            VoteType::DposV2 => VOTE_DPOS_V2_VERSION,
        }
    }
}

/// One candidate and the weight voted for it.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CandidateVotes {
    /// A public key, CID or proposal hash, depending on the vote type.
    pub candidate: Vec<u8>,
    /// The weight. Always zero in version 0 outputs.
    pub votes: Amount,
}

/// A block of votes of one type.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct VoteContent {
    /// The raw vote type tag.
    pub vote_type: u8,
    /// The candidates voted for.
    pub candidate_votes: Vec<CandidateVotes>,
}

impl VoteContent {
    /// Returns the parsed vote type, if the tag is known.
    pub fn kind(&self) -> Option<VoteType> {
        VoteType::from_u8(self.vote_type)
    }

    /// Returns the sum of all candidate weights.
    pub fn total_votes(&self) -> Result<Amount, crate::amount::Error> {
        self.candidate_votes.iter().map(|cv| &cv.votes).sum()
    }

    fn serialize<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        writer.write_u8(self.vote_type)?;
        writer.write_var_uint(self.candidate_votes.len() as u64)?;
        for cv in &self.candidate_votes {
            writer.write_var_bytes(&cv.candidate)?;
            if version >= VOTE_PRODUCER_AND_CR_VERSION {
                cv.votes.ela_serialize(&mut writer)?;
            }
        }
        Ok(())
    }

    fn deserialize<R: io::Read>(mut reader: R, version: u8) -> Result<Self, SerializationError> {
        let vote_type = reader.read_u8()?;
        let count = reader.read_var_uint()?;
        if count > max_items_for_size(2) {
            return Err(SerializationError::Parse("too many vote candidates"));
        }

        let mut candidate_votes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let candidate = reader.read_var_bytes()?;
            let votes = if version >= VOTE_PRODUCER_AND_CR_VERSION {
                Amount::ela_deserialize(&mut reader)?
            } else {
                Amount::ZERO
            };
            candidate_votes.push(CandidateVotes { candidate, votes });
        }

        Ok(VoteContent {
            vote_type,
            candidate_votes,
        })
    }
}

/// The payload of a vote output.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct VoteOutput {
    /// The vote output version, which gates the allowed vote types.
    pub version: u8,
    /// One block per vote type.
    pub contents: Vec<VoteContent>,
}

impl VoteOutput {
    /// Checks the structure of the vote payload, without chain state.
    pub fn validate(&self) -> Result<(), OutputPayloadError> {
        if self.version > VOTE_DPOS_V2_VERSION {
            return Err(OutputPayloadError::VoteVersion(self.version));
        }

        let mut seen_types = HashSet::new();
        for content in &self.contents {
            let kind = content
                .kind()
                .ok_or(OutputPayloadError::VoteType(content.vote_type))?;
            if self.version < kind.min_version() {
                return Err(OutputPayloadError::VoteType(content.vote_type));
            }
            if !seen_types.insert(kind) {
                return Err(OutputPayloadError::DuplicateVoteType);
            }

            if content.candidate_votes.is_empty()
                || (kind == VoteType::Delegate
                    && content.candidate_votes.len() > MAX_VOTE_PRODUCERS_PER_CONTENT)
            {
                return Err(OutputPayloadError::CandidateCount);
            }

            let mut seen_candidates = HashSet::new();
            for cv in &content.candidate_votes {
                if !seen_candidates.insert(&cv.candidate) {
                    return Err(OutputPayloadError::DuplicateCandidate);
                }
                if self.version >= VOTE_PRODUCER_AND_CR_VERSION && cv.votes <= Amount::ZERO {
                    return Err(OutputPayloadError::CandidateVotes);
                }
            }
        }

        Ok(())
    }
}

impl ElaSerialize for VoteOutput {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u8(self.version)?;
        writer.write_var_uint(self.contents.len() as u64)?;
        for content in &self.contents {
            content.serialize(&mut writer, self.version)?;
        }
        Ok(())
    }
}

impl ElaDeserialize for VoteOutput {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let version = reader.read_u8()?;
        let count = reader.read_var_uint()?;
        if count > VoteContent::max_allocation() {
            return Err(SerializationError::Parse("too many vote contents"));
        }

        let mut contents = Vec::with_capacity(count as usize);
        for _ in 0..count {
            contents.push(VoteContent::deserialize(&mut reader, version)?);
        }
        Ok(VoteOutput { version, contents })
    }
}

impl TrustedPreallocate for VoteContent {
    fn max_allocation() -> u64 {
        max_items_for_size(2)
    }
}
