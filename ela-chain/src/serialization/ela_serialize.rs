use std::io;

use super::WriteElaExt;

/// The maximum length of a protocol message, in bytes.
///
/// This value is used to calculate safe preallocation limits for some types.
pub const MAX_PROTOCOL_MESSAGE_LEN: usize = 8 * 1024 * 1024;

/// Consensus-critical serialization.
///
/// This trait provides a generic serialization for consensus-critical
/// formats, such as transactions, payloads and signed-data buffers. It is
/// intended for use only in consensus-critical contexts; in other contexts,
/// such as internal storage, it would be preferable to use Serde.
pub trait ElaSerialize: Sized {
    /// Write `self` to the given `writer` using the canonical format.
    ///
    /// This function has an `ela_` prefix to alert the reader that the
    /// serialization in use is consensus-critical serialization, rather than
    /// some other kind of serialization.
    ///
    /// Notice that the error type is [`std::io::Error`]; this indicates that
    /// serialization MUST be infallible up to errors in the underlying writer.
    fn ela_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error>;

    /// Helper function to construct a vec to serialize the current struct into
    fn ela_serialize_to_vec(&self) -> Result<Vec<u8>, io::Error> {
        let mut data = Vec::new();
        self.ela_serialize(&mut data)?;
        Ok(data)
    }

    /// Get the size of `self` by using a fake writer.
    fn ela_serialized_size(&self) -> usize {
        let mut writer = FakeWriter(0);
        self.ela_serialize(&mut writer)
            .expect("writing to FakeWriter should never fail");
        writer.0
    }
}

/// Serialize a `Vec` as a varint number of items, then the items.
impl<T: ElaSerialize> ElaSerialize for Vec<T> {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_var_uint(self.len() as u64)?;
        for x in self {
            x.ela_serialize(&mut writer)?;
        }
        Ok(())
    }
}

/// A fake writer helper used to get object lengths without allocating RAM.
pub struct FakeWriter(pub usize);

impl io::Write for FakeWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize, io::Error> {
        self.0 += buf.len();

        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
