//! Program hashes, code hashes and Base58Check addresses.
//!
//! A program hash is the 21-byte destination of an output: a one-byte
//! [`Prefix`] followed by `RIPEMD160(SHA256(code))` of the redeem script that
//! controls it.

use std::{cmp::Ordering, fmt, io, str::FromStr};

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::serialization::{
    sha256d, ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError, TrustedPreallocate,
    MAX_PROTOCOL_MESSAGE_LEN,
};

#[cfg(test)]
mod tests;

/// The length of a serialized program hash.
pub const PROGRAM_HASH_LEN: usize = 21;

/// Address prefixes, stored in the first byte of a [`ProgramHash`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Prefix {
    /// A single-key standard address.
    Standard = 0x21,
    /// An M-of-N multi-signature address.
    MultiSig = 0x12,
    /// A cross-chain transfer destination.
    CrossChain = 0x4b,
    /// A producer or CR deposit address.
    Deposit = 0x1f,
    /// An identity-chain address, also used for CIDs and DIDs.
    IdChain = 0x67,
    /// CR expense and CR assets addresses.
    CrExpenses = 0x1c,
    /// A DPoS v2 stake address.
    DposV2 = 0x3f,
}

impl Prefix {
    /// Returns the prefix matching `byte`, if any.
    pub fn from_byte(byte: u8) -> Option<Prefix> {
        use Prefix::*;

        [
            Standard, MultiSig, CrossChain, Deposit, IdChain, CrExpenses, DposV2,
        ]
        .into_iter()
        .find(|prefix| *prefix as u8 == byte)
    }
}

/// The 20-byte `RIPEMD160(SHA256(code))` digest of a redeem script.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct CodeHash(pub [u8; 20]);

impl CodeHash {
    /// Hashes a redeem script.
    pub fn from_code(code: &[u8]) -> CodeHash {
        let sha = Sha256::digest(code);
        let ripe = Ripemd160::digest(sha);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&ripe);
        CodeHash(bytes)
    }
}

impl Ord for CodeHash {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.iter().rev().cmp(other.0.iter().rev())
    }
}

impl PartialOrd for CodeHash {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for CodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CodeHash").field(&hex::encode(self.0)).finish()
    }
}

/// A prefixed code hash identifying an output destination.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(proptest_derive::Arbitrary))]
pub struct ProgramHash(pub [u8; PROGRAM_HASH_LEN]);

impl ProgramHash {
    /// The all-zero program hash.
    pub const ZERO: ProgramHash = ProgramHash([0; PROGRAM_HASH_LEN]);

    /// Derives the program hash of `code` with an explicit prefix.
    pub fn new(prefix: Prefix, code: &[u8]) -> ProgramHash {
        Self::from_code_hash(prefix, CodeHash::from_code(code))
    }

    /// Prepends `prefix` to a code hash.
    pub fn from_code_hash(prefix: Prefix, code_hash: CodeHash) -> ProgramHash {
        let mut bytes = [0u8; PROGRAM_HASH_LEN];
        bytes[0] = prefix as u8;
        bytes[1..].copy_from_slice(&code_hash.0);
        ProgramHash(bytes)
    }

    /// Builds a program hash from a byte slice of exactly 21 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<ProgramHash> {
        <[u8; PROGRAM_HASH_LEN]>::try_from(bytes)
            .ok()
            .map(ProgramHash)
    }

    /// Returns the raw prefix byte.
    pub fn prefix_byte(&self) -> u8 {
        self.0[0]
    }

    /// Returns the prefix, if the first byte is a known one.
    pub fn prefix(&self) -> Option<Prefix> {
        Prefix::from_byte(self.0[0])
    }

    /// Returns `true` if this hash has the given prefix.
    pub fn has_prefix(&self, prefix: Prefix) -> bool {
        self.0[0] == prefix as u8
    }

    /// Returns the code hash part, without the prefix.
    pub fn code_hash(&self) -> CodeHash {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&self.0[1..]);
        CodeHash(bytes)
    }

    /// Returns `true` if every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; PROGRAM_HASH_LEN]
    }

    /// Encodes this hash as a Base58Check address.
    pub fn to_address(&self) -> String {
        let checksum = sha256d::Checksum::from(&self.0[..]);
        let mut data = Vec::with_capacity(PROGRAM_HASH_LEN + 4);
        data.extend_from_slice(&self.0);
        data.extend_from_slice(&checksum.0);
        bs58::encode(data).into_string()
    }

    /// Decodes a Base58Check address.
    pub fn from_address(address: &str) -> Result<ProgramHash, AddressError> {
        let data = bs58::decode(address)
            .into_vec()
            .map_err(|_| AddressError::Base58)?;
        if data.len() != PROGRAM_HASH_LEN + 4 {
            return Err(AddressError::Length(data.len()));
        }

        let (payload, checksum) = data.split_at(PROGRAM_HASH_LEN);
        if sha256d::Checksum::from(payload).0 != checksum {
            return Err(AddressError::Checksum);
        }

        ProgramHash::from_slice(payload).ok_or(AddressError::Length(data.len()))
    }
}

impl fmt::Display for ProgramHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

impl fmt::Debug for ProgramHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProgramHash")
            .field(&hex::encode(self.0))
            .finish()
    }
}

impl FromStr for ProgramHash {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProgramHash::from_address(s)
    }
}

impl serde::Serialize for ProgramHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_address())
    }
}

impl<'de> serde::Deserialize<'de> for ProgramHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let address = <String as serde::Deserialize>::deserialize(deserializer)?;
        address.parse().map_err(serde::de::Error::custom)
    }
}

impl ElaSerialize for ProgramHash {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_all(&self.0)
    }
}

impl ElaDeserialize for ProgramHash {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(ProgramHash(reader.read_21_bytes()?))
    }
}

impl TrustedPreallocate for ProgramHash {
    fn max_allocation() -> u64 {
        (MAX_PROTOCOL_MESSAGE_LEN / PROGRAM_HASH_LEN) as u64
    }
}

/// An error decoding a Base58Check address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The string is not valid Base58.
    #[error("address is not valid base58")]
    Base58,

    /// The decoded data has the wrong length.
    #[error("decoded address has length {0}, expected 25")]
    Length(usize),

    /// The checksum does not match.
    #[error("address checksum mismatch")]
    Checksum,
}
