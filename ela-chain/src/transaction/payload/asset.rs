//! Coinbase, asset and record payloads.

use std::io;

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::{
    serialization::{ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError, WriteElaExt},
    Amount, ProgramHash,
};

/// The payload of a coinbase transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CoinBase {
    /// Arbitrary miner data.
    pub content: Vec<u8>,
}

impl ElaSerialize for CoinBase {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_var_bytes(&self.content)
    }
}

impl ElaDeserialize for CoinBase {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(CoinBase {
            content: reader.read_var_bytes()?,
        })
    }
}

/// The description of a registered asset.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Asset {
    /// The asset name.
    pub name: String,
    /// A free-form description.
    pub description: String,
    /// The number of decimal places, at most eight.
    pub precision: u8,
    /// The asset type tag.
    pub asset_type: u8,
    /// The record type tag.
    pub record_type: u8,
}

/// The payload of a RegisterAsset transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct RegisterAsset {
    /// The new asset.
    pub asset: Asset,
    /// The amount issued.
    pub amount: Amount,
    /// The controller of the asset.
    pub controller: ProgramHash,
}

impl ElaSerialize for RegisterAsset {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_var_string(&self.asset.name)?;
        writer.write_var_string(&self.asset.description)?;
        writer.write_u8(self.asset.precision)?;
        writer.write_u8(self.asset.asset_type)?;
        writer.write_u8(self.asset.record_type)?;
        self.amount.ela_serialize(&mut writer)?;
        self.controller.ela_serialize(&mut writer)
    }
}

impl ElaDeserialize for RegisterAsset {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let asset = Asset {
            name: reader.read_var_string()?,
            description: reader.read_var_string()?,
            precision: reader.read_u8()?,
            asset_type: reader.read_u8()?,
            record_type: reader.read_u8()?,
        };
        Ok(RegisterAsset {
            asset,
            amount: Amount::ela_deserialize(&mut reader)?,
            controller: ProgramHash::ela_deserialize(&mut reader)?,
        })
    }
}

/// The payload of a Record transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Record {
    /// The record type.
    pub record_type: String,
    /// The recorded data.
    pub content: Vec<u8>,
}

impl ElaSerialize for Record {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_var_string(&self.record_type)?;
        writer.write_var_bytes(&self.content)
    }
}

impl ElaDeserialize for Record {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Record {
            record_type: reader.read_var_string()?,
            content: reader.read_var_bytes()?,
        })
    }
}
