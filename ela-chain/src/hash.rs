//! 256-bit hashes used as transaction ids, block hashes and asset ids.

use std::{cmp::Ordering, fmt, io, str::FromStr};

use hex::{FromHex, ToHex};

use crate::serialization::{
    sha256d, ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError, TrustedPreallocate,
    MAX_PROTOCOL_MESSAGE_LEN,
};

#[cfg(test)]
mod tests;

/// A double-SHA256 hash.
///
/// Hashes are serialized in internal byte order, but displayed and parsed
/// in reversed byte order, so that the hex strings match block explorers.
/// Ordering compares from the most significant (last) byte down.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(proptest_derive::Arbitrary))]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The all-zero hash.
    pub const ZERO: Hash = Hash([0; 32]);

    /// Returns the double-SHA256 hash of `data`.
    pub fn sha256d(data: &[u8]) -> Hash {
        Hash(sha256d::digest(data))
    }

    /// Returns the single SHA256 hash of `data`.
    pub fn sha256(data: &[u8]) -> Hash {
        Hash(sha256d::single(data))
    }

    /// Returns `true` if every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 32]
    }

    /// Returns the bytes in the reversed order used for display.
    pub fn bytes_in_display_order(&self) -> [u8; 32] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }

    /// Builds a hash from bytes in display order.
    pub fn from_bytes_in_display_order(bytes: &[u8; 32]) -> Hash {
        let mut internal = *bytes;
        internal.reverse();
        Hash(internal)
    }
}

impl Ord for Hash {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.iter().rev().cmp(other.0.iter().rev())
    }
}

impl PartialOrd for Hash {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl ToHex for Hash {
    fn encode_hex<T: FromIterator<char>>(&self) -> T {
        self.bytes_in_display_order().encode_hex()
    }

    fn encode_hex_upper<T: FromIterator<char>>(&self) -> T {
        self.bytes_in_display_order().encode_hex_upper()
    }
}

impl FromHex for Hash {
    type Error = <[u8; 32] as FromHex>::Error;

    fn from_hex<T: AsRef<[u8]>>(hex: T) -> Result<Self, Self::Error> {
        let hash = <[u8; 32]>::from_hex(hex)?;

        Ok(Self::from_bytes_in_display_order(&hash))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode_hex::<String>())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hash")
            .field(&self.encode_hex::<String>())
            .finish()
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Hash {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).map_err(|_| SerializationError::Parse("invalid hex hash"))
    }
}

impl serde::Serialize for Hash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Hash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = <String as serde::Deserialize>::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}

impl ElaSerialize for Hash {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_all(&self.0)
    }
}

impl ElaDeserialize for Hash {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Hash(reader.read_32_bytes()?))
    }
}

impl TrustedPreallocate for Hash {
    fn max_allocation() -> u64 {
        (MAX_PROTOCOL_MESSAGE_LEN / 32) as u64
    }
}
