//! Side-chain related output payloads.

use std::io;

use byteorder::{ReadBytesExt, WriteBytesExt};

use super::OutputPayloadError;
use crate::{
    serialization::{ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError, WriteElaExt},
    Amount, Hash,
};

/// The maximum size of cross-chain target data.
pub const MAX_TARGET_DATA_LEN: usize = 1024 * 1024;

/// Sends the output value to an address on a side chain.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CrossChainOutput {
    /// The payload version.
    pub version: u8,
    /// The destination address on the side chain.
    pub target_address: String,
    /// The amount credited on the side chain.
    pub target_amount: Amount,
    /// Data passed to the side chain.
    pub target_data: Vec<u8>,
}

impl CrossChainOutput {
    /// Checks the structure of the payload.
    pub fn validate(&self) -> Result<(), OutputPayloadError> {
        if self.target_address.is_empty() {
            return Err(OutputPayloadError::TargetAddress);
        }
        if self.target_amount.is_negative() {
            return Err(OutputPayloadError::TargetAmount);
        }
        if self.target_data.len() > MAX_TARGET_DATA_LEN {
            return Err(OutputPayloadError::TargetData);
        }
        Ok(())
    }
}

impl ElaSerialize for CrossChainOutput {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u8(self.version)?;
        writer.write_var_string(&self.target_address)?;
        self.target_amount.ela_serialize(&mut writer)?;
        writer.write_var_bytes(&self.target_data)
    }
}

impl ElaDeserialize for CrossChainOutput {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(CrossChainOutput {
            version: reader.read_u8()?,
            target_address: reader.read_var_string()?,
            target_amount: Amount::ela_deserialize(&mut reader)?,
            target_data: reader.read_var_bytes()?,
        })
    }
}

/// Pays a side-chain withdrawal on the main chain.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct WithdrawFromSideChainOutput {
    /// The payload version.
    pub version: u8,
    /// The side chain's genesis block address.
    pub genesis_block_address: String,
    /// The side-chain transaction being withdrawn.
    pub side_chain_transaction_hash: Hash,
}

impl WithdrawFromSideChainOutput {
    /// Checks the structure of the payload.
    pub fn validate(&self) -> Result<(), OutputPayloadError> {
        if self.genesis_block_address.is_empty() {
            return Err(OutputPayloadError::GenesisAddress);
        }
        Ok(())
    }
}

impl ElaSerialize for WithdrawFromSideChainOutput {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u8(self.version)?;
        writer.write_var_string(&self.genesis_block_address)?;
        self.side_chain_transaction_hash.ela_serialize(&mut writer)
    }
}

impl ElaDeserialize for WithdrawFromSideChainOutput {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(WithdrawFromSideChainOutput {
            version: reader.read_u8()?,
            genesis_block_address: reader.read_var_string()?,
            side_chain_transaction_hash: Hash::ela_deserialize(&mut reader)?,
        })
    }
}

/// Returns a deposit that a side chain refused.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ReturnSideChainDepositOutput {
    /// The payload version.
    pub version: u8,
    /// The side chain's genesis block address.
    pub genesis_block_address: String,
    /// The main-chain transaction that made the deposit.
    pub deposit_transaction_hash: Hash,
    /// The amount originally deposited.
    pub deposit_amount: Amount,
}

impl ReturnSideChainDepositOutput {
    /// Checks the structure of the payload.
    pub fn validate(&self) -> Result<(), OutputPayloadError> {
        if self.genesis_block_address.is_empty() {
            return Err(OutputPayloadError::GenesisAddress);
        }
        if self.deposit_amount <= Amount::ZERO {
            return Err(OutputPayloadError::TargetAmount);
        }
        Ok(())
    }
}

impl ElaSerialize for ReturnSideChainDepositOutput {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u8(self.version)?;
        writer.write_var_string(&self.genesis_block_address)?;
        self.deposit_transaction_hash.ela_serialize(&mut writer)?;
        self.deposit_amount.ela_serialize(&mut writer)
    }
}

impl ElaDeserialize for ReturnSideChainDepositOutput {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(ReturnSideChainDepositOutput {
            version: reader.read_u8()?,
            genesis_block_address: reader.read_var_string()?,
            deposit_transaction_hash: Hash::ela_deserialize(&mut reader)?,
            deposit_amount: Amount::ela_deserialize(&mut reader)?,
        })
    }
}

/// Maps a main-chain producer to a side-chain producer id.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct MappingOutput {
    /// The payload version.
    pub version: u8,
    /// The producer's owner public key.
    pub owner_public_key: Vec<u8>,
    /// The side-chain producer id.
    pub side_producer_id: Vec<u8>,
    /// The owner's signature over the fields above.
    pub signature: Vec<u8>,
}

impl MappingOutput {
    /// Checks the structure of the payload.
    pub fn validate(&self) -> Result<(), OutputPayloadError> {
        if self.owner_public_key.len() != 33 {
            return Err(OutputPayloadError::PublicKey);
        }
        if self.side_producer_id.is_empty() {
            return Err(OutputPayloadError::SideProducerId);
        }
        if self.signature.len() != 64 {
            return Err(OutputPayloadError::Signature);
        }
        Ok(())
    }
}

impl ElaSerialize for MappingOutput {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u8(self.version)?;
        writer.write_var_bytes(&self.owner_public_key)?;
        writer.write_var_bytes(&self.side_producer_id)?;
        writer.write_var_bytes(&self.signature)
    }
}

impl ElaDeserialize for MappingOutput {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(MappingOutput {
            version: reader.read_u8()?,
            owner_public_key: reader.read_var_bytes()?,
            side_producer_id: reader.read_var_bytes()?,
            signature: reader.read_var_bytes()?,
        })
    }
}
