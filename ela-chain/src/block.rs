//! Block headers, as far as evidence transactions need them.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    serialization::{ElaDeserialize, ElaSerialize, SerializationError},
    Hash,
};

/// A block header without auxiliary proof-of-work data.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Header {
    /// The block version.
    pub version: u32,
    /// The hash of the previous block.
    pub previous: Hash,
    /// The merkle root of the block's transactions.
    pub merkle_root: Hash,
    /// Seconds since the Unix epoch.
    pub timestamp: u32,
    /// The encoded difficulty target.
    pub bits: u32,
    /// The block height.
    pub height: u32,
    /// The proof-of-work nonce.
    pub nonce: u32,
}

impl Header {
    /// Returns the double-SHA256 hash of the serialized header.
    pub fn hash(&self) -> Hash {
        let mut writer = crate::serialization::sha256d::Writer::default();
        self.ela_serialize(&mut writer)
            .expect("Sha256dWriter is infallible");
        Hash(writer.finish())
    }
}

impl ElaSerialize for Header {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u32::<LittleEndian>(self.version)?;
        self.previous.ela_serialize(&mut writer)?;
        self.merkle_root.ela_serialize(&mut writer)?;
        writer.write_u32::<LittleEndian>(self.timestamp)?;
        writer.write_u32::<LittleEndian>(self.bits)?;
        writer.write_u32::<LittleEndian>(self.height)?;
        writer.write_u32::<LittleEndian>(self.nonce)?;
        Ok(())
    }
}

impl ElaDeserialize for Header {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Header {
            version: reader.read_u32::<LittleEndian>()?,
            previous: Hash::ela_deserialize(&mut reader)?,
            merkle_root: Hash::ela_deserialize(&mut reader)?,
            timestamp: reader.read_u32::<LittleEndian>()?,
            bits: reader.read_u32::<LittleEndian>()?,
            height: reader.read_u32::<LittleEndian>()?,
            nonce: reader.read_u32::<LittleEndian>()?,
        })
    }
}
