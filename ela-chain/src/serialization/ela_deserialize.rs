use std::{convert::TryInto, io};

use super::{ReadElaExt, SerializationError, MAX_PROTOCOL_MESSAGE_LEN};

/// Consensus-critical deserialization.
///
/// This trait provides a generic deserialization for consensus-critical
/// formats, such as transactions and payloads.
pub trait ElaDeserialize: Sized {
    /// Try to read `self` from the given `reader`.
    ///
    /// This function has an `ela_` prefix to alert the reader that the
    /// serialization in use is consensus-critical serialization, rather than
    /// some other kind of serialization.
    fn ela_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError>;
}

/// Deserialize a `Vec`, where the number of items is set by a varint
/// prefix in the data.
impl<T: ElaDeserialize + TrustedPreallocate> ElaDeserialize for Vec<T> {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let len: usize = reader.read_var_uint()?.try_into()?;
        if len as u64 > T::max_allocation() {
            return Err(SerializationError::Parse(
                "Vector longer than max_allocation",
            ));
        }
        let mut vec = Vec::with_capacity(len);
        for _ in 0..len {
            vec.push(T::ela_deserialize(&mut reader)?);
        }
        Ok(vec)
    }
}

/// Helper for deserializing more succinctly via type inference
pub trait ElaDeserializeInto {
    /// Deserialize based on type inference
    fn ela_deserialize_into<T>(self) -> Result<T, SerializationError>
    where
        T: ElaDeserialize;
}

impl<R: io::Read> ElaDeserializeInto for R {
    fn ela_deserialize_into<T>(self) -> Result<T, SerializationError>
    where
        T: ElaDeserialize,
    {
        T::ela_deserialize(self)
    }
}

/// Blind preallocation of a `Vec<T: TrustedPreallocate>` is based on a bounded
/// length. This is in contrast to blind preallocation of a generic `Vec<T>`,
/// which is a DOS vector.
///
/// The max_allocation() function provides a loose upper bound on the size of
/// the `Vec<T: TrustedPreallocate>` which can possibly be received from an
/// honest peer. If this limit is too low, honest transactions may be rejected.
/// If this limit is too high, attackers may be able to force a preallocation
/// of up to max_allocation() items.
pub trait TrustedPreallocate {
    /// Provides a ***loose upper bound*** on the size of the `Vec<T: TrustedPreallocate>`
    /// which can possibly be received from an honest peer.
    fn max_allocation() -> u64;
}

/// Returns the preallocation bound for items of at least `min_size` bytes.
pub(crate) const fn max_items_for_size(min_size: u64) -> u64 {
    MAX_PROTOCOL_MESSAGE_LEN as u64 / min_size
}
