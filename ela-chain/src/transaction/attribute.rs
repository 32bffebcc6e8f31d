use std::io;

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::serialization::{
    max_items_for_size, ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError,
    TrustedPreallocate, WriteElaExt,
};

/// The usage tag of an [`Attribute`].
///
/// Any byte is accepted when parsing, so that sanity checks can classify
/// unknown usages instead of failing deserialization.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct AttributeUsage(pub u8);

impl AttributeUsage {
    /// A random nonce that makes otherwise identical transactions unique.
    pub const NONCE: AttributeUsage = AttributeUsage(0x00);
    /// An explicit 21-byte program hash that must sign the transaction.
    pub const SCRIPT: AttributeUsage = AttributeUsage(0x20);
    /// A URL describing the transaction.
    pub const DESCRIPTION_URL: AttributeUsage = AttributeUsage(0x81);
    /// A free-form description.
    pub const DESCRIPTION: AttributeUsage = AttributeUsage(0x90);
    /// A free-form memo.
    pub const MEMO: AttributeUsage = AttributeUsage(0x91);
    /// A confirmation count hint.
    pub const CONFIRMATIONS: AttributeUsage = AttributeUsage(0x92);

    /// Returns `true` if this usage is one of the defined tags.
    pub fn is_valid(&self) -> bool {
        matches!(self.0, 0x00 | 0x20 | 0x81 | 0x90 | 0x91 | 0x92)
    }
}

/// A typed side-channel datum attached to a transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Attribute {
    /// What the data means.
    pub usage: AttributeUsage,
    /// The attribute data.
    pub data: Vec<u8>,
}

impl Attribute {
    /// Creates an attribute.
    pub fn new(usage: AttributeUsage, data: Vec<u8>) -> Attribute {
        Attribute { usage, data }
    }
}

impl ElaSerialize for Attribute {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u8(self.usage.0)?;
        writer.write_var_bytes(&self.data)
    }
}

impl ElaDeserialize for Attribute {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let usage = AttributeUsage(reader.read_u8()?);
        let data = reader.read_var_bytes()?;
        Ok(Attribute { usage, data })
    }
}

impl TrustedPreallocate for Attribute {
    fn max_allocation() -> u64 {
        // usage byte and an empty data length
        max_items_for_size(2)
    }
}
