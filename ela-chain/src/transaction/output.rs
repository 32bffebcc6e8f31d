use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{
    output_payload::{OutputPayload, OutputType},
    TxVersion,
};
use crate::{
    serialization::{ElaDeserialize, ElaSerialize, SerializationError},
    Amount, Hash, ProgramHash,
};

/// A transaction output.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Output {
    /// The asset this output carries.
    pub asset_id: Hash,
    /// The output value.
    pub value: Amount,
    /// The height until which the output is locked, or zero.
    pub output_lock: u32,
    /// The destination.
    pub program_hash: ProgramHash,
    /// The output type. Only serialized by version 0x09 transactions.
    pub output_type: OutputType,
    /// The type-specific payload. Only serialized by version 0x09
    /// transactions.
    pub payload: OutputPayload,
}

impl Output {
    /// Creates an untyped output.
    pub fn new(asset_id: Hash, value: Amount, program_hash: ProgramHash) -> Output {
        Output {
            asset_id,
            value,
            program_hash,
            ..Output::default()
        }
    }

    /// Creates a typed output carrying `payload`.
    pub fn with_payload(
        asset_id: Hash,
        value: Amount,
        program_hash: ProgramHash,
        payload: OutputPayload,
    ) -> Output {
        Output {
            asset_id,
            value,
            output_lock: 0,
            program_hash,
            output_type: payload.output_type(),
            payload,
        }
    }

    /// Writes the output in the format of a `version` transaction.
    pub fn serialize<W: io::Write>(&self, mut writer: W, version: TxVersion) -> io::Result<()> {
        self.asset_id.ela_serialize(&mut writer)?;
        self.value.ela_serialize(&mut writer)?;
        writer.write_u32::<LittleEndian>(self.output_lock)?;
        self.program_hash.ela_serialize(&mut writer)?;

        if version.has_output_types() {
            writer.write_u8(self.output_type as u8)?;
            self.payload.ela_serialize(&mut writer)?;
        }
        Ok(())
    }

    /// Reads an output in the format of a `version` transaction.
    pub fn deserialize<R: io::Read>(
        mut reader: R,
        version: TxVersion,
    ) -> Result<Output, SerializationError> {
        let asset_id = Hash::ela_deserialize(&mut reader)?;
        let value = Amount::ela_deserialize(&mut reader)?;
        let output_lock = reader.read_u32::<LittleEndian>()?;
        let program_hash = ProgramHash::ela_deserialize(&mut reader)?;

        let (output_type, payload) = if version.has_output_types() {
            let output_type = OutputType::from_u8(reader.read_u8()?)
                .ok_or(SerializationError::Parse("invalid output type"))?;
            let payload = OutputPayload::deserialize(&mut reader, output_type)?;
            (output_type, payload)
        } else {
            (OutputType::None, OutputPayload::Default)
        };

        Ok(Output {
            asset_id,
            value,
            output_lock,
            program_hash,
            output_type,
            payload,
        })
    }
}
