//! DPoS v2 stake voting payloads.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    serialization::{
        max_items_for_size, ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError,
        TrustedPreallocate, WriteElaExt,
    },
    Amount, Hash,
};

/// Voting payloads of this version renew existing votes instead of casting
/// new ones.
pub const RENEWAL_VOTE_VERSION: u8 = 0x01;

/// Votes for one candidate, locked until a height.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct VotesWithLockTime {
    /// The candidate's key or CID bytes.
    pub candidate: Vec<u8>,
    /// The vote weight.
    pub votes: Amount,
    /// The height the votes are locked until.
    pub lock_time: u32,
}

impl ElaSerialize for VotesWithLockTime {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_var_bytes(&self.candidate)?;
        self.votes.ela_serialize(&mut writer)?;
        writer.write_u32::<LittleEndian>(self.lock_time)
    }
}

impl ElaDeserialize for VotesWithLockTime {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(VotesWithLockTime {
            candidate: reader.read_var_bytes()?,
            votes: Amount::ela_deserialize(&mut reader)?,
            lock_time: reader.read_u32::<LittleEndian>()?,
        })
    }
}

impl TrustedPreallocate for VotesWithLockTime {
    fn max_allocation() -> u64 {
        // empty candidate, amount and lock time
        max_items_for_size(13)
    }
}

/// Votes of one vote type.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct VotesContent {
    /// The raw vote type tag.
    pub vote_type: u8,
    /// The votes.
    pub votes_info: Vec<VotesWithLockTime>,
}

impl ElaSerialize for VotesContent {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u8(self.vote_type)?;
        self.votes_info.ela_serialize(&mut writer)
    }
}

impl ElaDeserialize for VotesContent {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(VotesContent {
            vote_type: reader.read_u8()?,
            votes_info: Vec::ela_deserialize(&mut reader)?,
        })
    }
}

impl TrustedPreallocate for VotesContent {
    fn max_allocation() -> u64 {
        max_items_for_size(2)
    }
}

/// Renews the votes cast by an earlier voting transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct RenewalVotesContent {
    /// The key of the votes being renewed.
    pub refer_key: Hash,
    /// The renewed votes.
    pub votes_info: VotesWithLockTime,
}

impl ElaSerialize for RenewalVotesContent {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.refer_key.ela_serialize(&mut writer)?;
        self.votes_info.ela_serialize(&mut writer)
    }
}

impl ElaDeserialize for RenewalVotesContent {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(RenewalVotesContent {
            refer_key: Hash::ela_deserialize(&mut reader)?,
            votes_info: VotesWithLockTime::ela_deserialize(&mut reader)?,
        })
    }
}

impl TrustedPreallocate for RenewalVotesContent {
    fn max_allocation() -> u64 {
        max_items_for_size(45)
    }
}

/// The payload of a Voting transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Voting {
    /// New votes, in version 0 payloads.
    pub contents: Vec<VotesContent>,
    /// Renewed votes, in version 1 payloads.
    pub renewal_contents: Vec<RenewalVotesContent>,
}

impl Voting {
    /// Writes the payload for `version`.
    pub fn serialize<W: io::Write>(&self, writer: W, version: u8) -> io::Result<()> {
        if version == RENEWAL_VOTE_VERSION {
            self.renewal_contents.ela_serialize(writer)
        } else {
            self.contents.ela_serialize(writer)
        }
    }

    /// Reads a payload of `version`.
    pub fn deserialize<R: io::Read>(reader: R, version: u8) -> Result<Self, SerializationError> {
        if version == RENEWAL_VOTE_VERSION {
            Ok(Voting {
                renewal_contents: Vec::ela_deserialize(reader)?,
                ..Voting::default()
            })
        } else {
            Ok(Voting {
                contents: Vec::ela_deserialize(reader)?,
                ..Voting::default()
            })
        }
    }
}
