use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    serialization::{
        max_items_for_size, ElaDeserialize, ElaSerialize, SerializationError, TrustedPreallocate,
    },
    Hash,
};

/// The sequence number of inputs spending a locked output.
pub const LOCKED_SEQUENCE: u32 = 0xffff_fffe;

/// The previous-output index of the coinbase sentinel input.
pub const COINBASE_INDEX: u16 = 0xffff;

/// A reference to an output of a previous transaction.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct OutPoint {
    /// The id of the transaction holding the output.
    pub tx_id: Hash,
    /// The position of the output in that transaction.
    pub index: u16,
}

/// A transaction input.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Input {
    /// The output being spent.
    pub previous: OutPoint,
    /// Set to [`LOCKED_SEQUENCE`] when spending a locked output.
    pub sequence: u32,
}

impl Input {
    /// Creates an input spending output `index` of `tx_id`.
    pub fn new(tx_id: Hash, index: u16, sequence: u32) -> Input {
        Input {
            previous: OutPoint { tx_id, index },
            sequence,
        }
    }

    /// The single input of a coinbase transaction.
    pub fn coinbase() -> Input {
        Input::new(Hash::ZERO, COINBASE_INDEX, u32::MAX)
    }

    /// Returns `true` if this input has the shape of a coinbase input.
    pub fn is_coinbase_sentinel(&self) -> bool {
        self.previous.tx_id.is_zero() && self.previous.index == COINBASE_INDEX
    }
}

impl ElaSerialize for Input {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.previous.tx_id.ela_serialize(&mut writer)?;
        writer.write_u16::<LittleEndian>(self.previous.index)?;
        writer.write_u32::<LittleEndian>(self.sequence)
    }
}

impl ElaDeserialize for Input {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let tx_id = Hash::ela_deserialize(&mut reader)?;
        let index = reader.read_u16::<LittleEndian>()?;
        let sequence = reader.read_u32::<LittleEndian>()?;
        Ok(Input::new(tx_id, index, sequence))
    }
}

impl TrustedPreallocate for Input {
    fn max_allocation() -> u64 {
        // hash, index and sequence
        max_items_for_size(32 + 2 + 4)
    }
}
