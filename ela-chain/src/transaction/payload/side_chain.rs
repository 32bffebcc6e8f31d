//! Side-chain payloads.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    serialization::{
        max_items_for_size, ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError,
        WriteElaExt,
    },
    Amount, Hash,
};

/// The payload version that lists side-chain data explicitly.
pub const SIDE_CHAIN_PAYLOAD_V0: u8 = 0x00;

/// The payload version that moves side-chain data into typed outputs.
pub const SIDE_CHAIN_PAYLOAD_V1: u8 = 0x01;

/// The payload of a SideChainPow transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct SideChainPow {
    /// The side-chain block being anchored.
    pub side_block_hash: Hash,
    /// The side chain's genesis block.
    pub side_genesis_hash: Hash,
    /// The main-chain height the block was mined at.
    pub block_height: u32,
    /// The on-duty arbitrator's signature over the other fields.
    pub signature: Vec<u8>,
}

impl SideChainPow {
    /// Writes the signed fields.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        self.side_block_hash.ela_serialize(&mut writer)?;
        self.side_genesis_hash.ela_serialize(&mut writer)?;
        writer.write_u32::<LittleEndian>(self.block_height)
    }

    /// Returns the 68 bytes the arbitrator signs.
    pub fn unsigned_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(68);
        self.serialize_unsigned(&mut data)
            .expect("writing to a Vec never fails");
        data
    }
}

impl ElaSerialize for SideChainPow {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.serialize_unsigned(&mut writer)?;
        writer.write_var_bytes(&self.signature)
    }
}

impl ElaDeserialize for SideChainPow {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(SideChainPow {
            side_block_hash: Hash::ela_deserialize(&mut reader)?,
            side_genesis_hash: Hash::ela_deserialize(&mut reader)?,
            block_height: reader.read_u32::<LittleEndian>()?,
            signature: reader.read_var_bytes()?,
        })
    }
}

/// The payload of a WithdrawFromSideChain transaction.
///
/// Version 1 payloads are empty; the withdrawn hashes live in the outputs.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct WithdrawFromSideChain {
    /// The side-chain height of the withdrawals.
    pub block_height: u32,
    /// The side chain's genesis block address.
    pub genesis_block_address: String,
    /// The side-chain transactions being paid out.
    pub side_chain_transaction_hashes: Vec<Hash>,
}

impl WithdrawFromSideChain {
    /// Writes the payload for `version`.
    pub fn serialize<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        if version >= SIDE_CHAIN_PAYLOAD_V1 {
            return Ok(());
        }
        writer.write_u32::<LittleEndian>(self.block_height)?;
        writer.write_var_string(&self.genesis_block_address)?;
        self.side_chain_transaction_hashes.ela_serialize(&mut writer)
    }

    /// Reads a payload of `version`.
    pub fn deserialize<R: io::Read>(mut reader: R, version: u8) -> Result<Self, SerializationError> {
        if version >= SIDE_CHAIN_PAYLOAD_V1 {
            return Ok(WithdrawFromSideChain::default());
        }
        Ok(WithdrawFromSideChain {
            block_height: reader.read_u32::<LittleEndian>()?,
            genesis_block_address: reader.read_var_string()?,
            side_chain_transaction_hashes: Vec::ela_deserialize(&mut reader)?,
        })
    }
}

/// One cross-chain transfer of a version 0 TransferCrossChainAsset payload.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CrossChainTransfer {
    /// The destination address on the side chain.
    pub address: String,
    /// The index of the output paying for this transfer.
    pub output_index: u64,
    /// The amount credited on the side chain.
    pub amount: Amount,
}

/// The payload of a TransferCrossChainAsset transaction.
///
/// Version 1 payloads are empty; transfers are carried by cross-chain
/// outputs.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct TransferCrossChainAsset {
    /// The transfers.
    pub transfers: Vec<CrossChainTransfer>,
}

impl TransferCrossChainAsset {
    /// Writes the payload for `version`.
    pub fn serialize<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        if version >= SIDE_CHAIN_PAYLOAD_V1 {
            return Ok(());
        }
        writer.write_var_uint(self.transfers.len() as u64)?;
        for transfer in &self.transfers {
            writer.write_var_string(&transfer.address)?;
            writer.write_var_uint(transfer.output_index)?;
            transfer.amount.ela_serialize(&mut writer)?;
        }
        Ok(())
    }

    /// Reads a payload of `version`.
    pub fn deserialize<R: io::Read>(mut reader: R, version: u8) -> Result<Self, SerializationError> {
        if version >= SIDE_CHAIN_PAYLOAD_V1 {
            return Ok(TransferCrossChainAsset::default());
        }

        let count = reader.read_var_uint()?;
        // empty address, one-byte index and amount
        if count > max_items_for_size(10) {
            return Err(SerializationError::Parse("too many cross-chain transfers"));
        }

        let mut transfers = Vec::with_capacity(count as usize);
        for _ in 0..count {
            transfers.push(CrossChainTransfer {
                address: reader.read_var_string()?,
                output_index: reader.read_var_uint()?,
                amount: Amount::ela_deserialize(&mut reader)?,
            });
        }
        Ok(TransferCrossChainAsset { transfers })
    }
}
