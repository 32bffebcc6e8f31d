//! Block producer payloads.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::serialization::{ReadElaExt, SerializationError, WriteElaExt};

/// Producer info payloads of this version carry a DPoS v2 stake height.
pub const PRODUCER_INFO_DPOS_V2_VERSION: u8 = 0x01;

/// The payload of RegisterProducer and UpdateProducer transactions.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ProducerInfo {
    /// The key that controls the producer and its deposit.
    pub owner_public_key: Vec<u8>,
    /// The key the producer signs blocks with.
    pub node_public_key: Vec<u8>,
    /// A unique display name.
    pub nickname: String,
    /// The producer's web site.
    pub url: String,
    /// A location code.
    pub location: u64,
    /// The producer's network address.
    pub net_address: String,
    /// The height until which a DPoS v2 producer is staked.
    pub stake_until: u32,
    /// The owner's signature over the unsigned payload.
    pub signature: Vec<u8>,
}

impl ProducerInfo {
    /// Writes the signed fields for `version`.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        writer.write_var_bytes(&self.owner_public_key)?;
        writer.write_var_bytes(&self.node_public_key)?;
        writer.write_var_string(&self.nickname)?;
        writer.write_var_string(&self.url)?;
        writer.write_u64::<LittleEndian>(self.location)?;
        writer.write_var_string(&self.net_address)?;
        if version >= PRODUCER_INFO_DPOS_V2_VERSION {
            writer.write_u32::<LittleEndian>(self.stake_until)?;
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
        let owner_public_key = reader.read_var_bytes()?;
        let node_public_key = reader.read_var_bytes()?;
        let nickname = reader.read_var_string()?;
        let url = reader.read_var_string()?;
        let location = reader.read_u64::<LittleEndian>()?;
        let net_address = reader.read_var_string()?;
        let stake_until = if version >= PRODUCER_INFO_DPOS_V2_VERSION {
            reader.read_u32::<LittleEndian>()?
        } else {
            0
        };
        let signature = reader.read_var_bytes()?;

        Ok(ProducerInfo {
            owner_public_key,
            node_public_key,
            nickname,
            url,
            location,
            net_address,
            stake_until,
            signature,
        })
    }
}

/// The payload of a CancelProducer transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ProcessProducer {
    /// The owner key of the producer.
    pub owner_public_key: Vec<u8>,
    /// The owner's signature over the key.
    pub signature: Vec<u8>,
}

impl ProcessProducer {
    /// Writes the signed fields.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_var_bytes(&self.owner_public_key)
    }
}

/// The payload of an ActivateProducer transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ActivateProducer {
    /// The node key of the producer.
    pub node_public_key: Vec<u8>,
    /// The node key's signature over the key.
    pub signature: Vec<u8>,
}

impl ActivateProducer {
    /// Writes the signed fields.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_var_bytes(&self.node_public_key)
    }
}

macro_rules! key_and_signature_codec {
    ($payload:ident, $key:ident) => {
        impl crate::serialization::ElaSerialize for $payload {
            fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
                self.serialize_unsigned(&mut writer)?;
                writer.write_var_bytes(&self.signature)
            }
        }

        impl crate::serialization::ElaDeserialize for $payload {
            fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
                Ok($payload {
                    $key: reader.read_var_bytes()?,
                    signature: reader.read_var_bytes()?,
                })
            }
        }
    };
}

key_and_signature_codec!(ProcessProducer, owner_public_key);
key_and_signature_codec!(ActivateProducer, node_public_key);
