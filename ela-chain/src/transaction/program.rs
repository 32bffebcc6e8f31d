use std::io;

use crate::serialization::{
    max_items_for_size, ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError,
    TrustedPreallocate, WriteElaExt,
};

/// A witness: a redeem script and the signatures that satisfy it.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Program {
    /// The redeem script.
    pub code: Vec<u8>,
    /// The concatenated signature pushes.
    pub parameter: Vec<u8>,
}

impl ElaSerialize for Program {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_var_bytes(&self.parameter)?;
        writer.write_var_bytes(&self.code)
    }
}

impl ElaDeserialize for Program {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let parameter = reader.read_var_bytes()?;
        let code = reader.read_var_bytes()?;
        Ok(Program { code, parameter })
    }
}

impl TrustedPreallocate for Program {
    fn max_allocation() -> u64 {
        max_items_for_size(2)
    }
}
