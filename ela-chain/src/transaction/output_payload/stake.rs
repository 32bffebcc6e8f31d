use std::io;

use byteorder::{ReadBytesExt, WriteBytesExt};

use super::OutputPayloadError;
use crate::{
    address::Prefix,
    serialization::{ElaDeserialize, ElaSerialize, SerializationError},
    ProgramHash,
};

/// Locks the output value in the stake pool on behalf of a stake address.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct StakeOutput {
    /// The payload version.
    pub version: u8,
    /// The DPoS v2 address that receives the vote rights.
    pub stake_address: ProgramHash,
}

impl StakeOutput {
    /// Checks the structure of the payload.
    pub fn validate(&self) -> Result<(), OutputPayloadError> {
        if !self.stake_address.has_prefix(Prefix::DposV2) {
            return Err(OutputPayloadError::StakeAddress);
        }
        Ok(())
    }
}

impl ElaSerialize for StakeOutput {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u8(self.version)?;
        self.stake_address.ela_serialize(&mut writer)
    }
}

impl ElaDeserialize for StakeOutput {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(StakeOutput {
            version: reader.read_u8()?,
            stake_address: ProgramHash::ela_deserialize(&mut reader)?,
        })
    }
}
