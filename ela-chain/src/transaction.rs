//! Transactions and transaction-related structures.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

mod attribute;
mod input;
mod output;
mod program;
mod types;

pub mod output_payload;
pub mod payload;


pub use attribute::{Attribute, AttributeUsage};
pub use input::{Input, OutPoint, COINBASE_INDEX, LOCKED_SEQUENCE};
pub use output::Output;
pub use payload::Payload;
pub use program::Program;
pub use types::{TxType, TxVersion, VERSIONED_FLAG};

use crate::{
    serialization::{
        sha256d, ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError, WriteElaExt,
    },
    Hash,
};

/// A transaction.
///
/// The transaction id is the double-SHA256 of the unsigned serialization,
/// which excludes the programs. It is recomputed from the fields on demand,
/// so changing any field other than the programs changes the id.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Transaction {
    /// The serialization version.
    pub version: TxVersion,
    /// The type tag selecting the payload and the validation rules.
    pub tx_type: TxType,
    /// The payload layout version.
    pub payload_version: u8,
    /// The type-specific payload.
    pub payload: Payload,
    /// Side-channel data.
    pub attributes: Vec<Attribute>,
    /// The outputs being spent.
    pub inputs: Vec<Input>,
    /// The new outputs.
    pub outputs: Vec<Output>,
    /// The earliest height the transaction can be included at.
    pub lock_time: u32,
    /// The witnesses.
    pub programs: Vec<Program>,
}

impl Transaction {
    /// Creates a transaction from its fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: TxVersion,
        tx_type: TxType,
        payload_version: u8,
        payload: Payload,
        attributes: Vec<Attribute>,
        inputs: Vec<Input>,
        outputs: Vec<Output>,
        lock_time: u32,
        programs: Vec<Program>,
    ) -> Transaction {
        Transaction {
            version,
            tx_type,
            payload_version,
            payload,
            attributes,
            inputs,
            outputs,
            lock_time,
            programs,
        }
    }

    /// Returns a zero-valued transaction of `tx_type`.
    pub fn by_type(tx_type: TxType) -> Transaction {
        Transaction {
            tx_type,
            payload: Payload::default_for(tx_type),
            ..Transaction::default()
        }
    }

    /// Returns the transaction id.
    pub fn hash(&self) -> Hash {
        let mut writer = sha256d::Writer::default();
        self.serialize_unsigned(&mut writer)
            .expect("Sha256dWriter is infallible");
        Hash(writer.finish())
    }

    /// Writes everything except the programs.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        if self.version >= TxVersion::V09 {
            writer.write_u8(VERSIONED_FLAG | self.version as u8)?;
        }
        writer.write_u8(self.tx_type as u8)?;
        writer.write_u8(self.payload_version)?;
        self.payload.serialize(&mut writer, self.payload_version)?;

        self.attributes.ela_serialize(&mut writer)?;
        self.inputs.ela_serialize(&mut writer)?;
        writer.write_var_uint(self.outputs.len() as u64)?;
        for output in &self.outputs {
            output.serialize(&mut writer, self.version)?;
        }
        writer.write_u32::<LittleEndian>(self.lock_time)
    }

    /// Returns the buffer the transaction's signers sign.
    pub fn unsigned_bytes(&self) -> Vec<u8> {
        let mut data = Vec::new();
        self.serialize_unsigned(&mut data)
            .expect("writing to a Vec never fails");
        data
    }

    /// Returns the full serialized size, in bytes.
    pub fn size(&self) -> usize {
        self.ela_serialized_size()
    }

    /// Returns `true` for coinbase transactions.
    pub fn is_coinbase(&self) -> bool {
        self.tx_type == TxType::CoinBase
    }

    /// Returns `true` for side-chain proof-of-work transactions that have not
    /// been confirmed by a block yet.
    pub fn is_new_side_chain_pow_tx(&self) -> bool {
        self.tx_type == TxType::SideChainPow
            && self
                .inputs
                .first()
                .map_or(false, |input| input.sequence == u32::MAX)
    }

    /// Returns `true` if the payload variant matches the type tag.
    pub fn payload_matches_type(&self) -> bool {
        self.payload.tx_type() == self.tx_type
    }
}

/// Reads the version and type tag at the start of a serialized transaction.
///
/// A leading byte with [`VERSIONED_FLAG`] set carries the version in its low
/// bits and is followed by the type tag. Any other leading byte is the type
/// tag of a legacy transaction.
pub fn deserialize_transaction_header<R: io::Read>(
    mut reader: R,
) -> Result<(TxVersion, TxType), SerializationError> {
    let flag = reader.read_u8()?;

    let (version, tag) = if flag & VERSIONED_FLAG == VERSIONED_FLAG {
        let Some(version) = TxVersion::from_u8(flag & !VERSIONED_FLAG) else {
            tracing::trace!(?flag, "rejecting unknown transaction version");
            return Err(SerializationError::Parse("invalid transaction version"));
        };
        (version, reader.read_u8()?)
    } else {
        (TxVersion::Default, flag)
    };

    let Some(tx_type) = TxType::from_u8(tag) else {
        tracing::trace!(?tag, ?version, "rejecting unknown transaction type");
        return Err(SerializationError::Parse("invalid transaction type"));
    };
    Ok((version, tx_type))
}

impl ElaSerialize for Transaction {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.serialize_unsigned(&mut writer)?;
        self.programs.ela_serialize(&mut writer)
    }
}

impl ElaDeserialize for Transaction {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let (version, tx_type) = deserialize_transaction_header(&mut reader)?;
        let payload_version = reader.read_u8()?;
        let payload = Payload::deserialize(&mut reader, tx_type, payload_version)?;

        let attributes = Vec::ela_deserialize(&mut reader)?;
        let inputs = Vec::ela_deserialize(&mut reader)?;

        let output_count = reader.read_var_uint()?;
        // asset id, value, lock and program hash
        if output_count > crate::serialization::max_items_for_size(65) {
            return Err(SerializationError::Parse("too many transaction outputs"));
        }
        let mut outputs = Vec::with_capacity(output_count as usize);
        for _ in 0..output_count {
            outputs.push(Output::deserialize(&mut reader, version)?);
        }

        let lock_time = reader.read_u32::<LittleEndian>()?;
        let programs = Vec::ela_deserialize(&mut reader)?;

        Ok(Transaction {
            version,
            tx_type,
            payload_version,
            payload,
            attributes,
            inputs,
            outputs,
            lock_time,
            programs,
        })
    }
}
