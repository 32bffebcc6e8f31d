//! CR candidate and council member payloads.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    serialization::{ElaDeserialize, ElaSerialize, ReadElaExt, SerializationError, WriteElaExt},
    ProgramHash,
};

/// CR info payloads of this version carry a DID.
pub const CR_INFO_DID_VERSION: u8 = 0x01;

/// The payload of RegisterCR and UpdateCR transactions.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CrInfo {
    /// The candidate's redeem script.
    pub code: Vec<u8>,
    /// The candidate id derived from the code.
    pub cid: ProgramHash,
    /// The decentralized id derived from the code.
    pub did: ProgramHash,
    /// A unique display name.
    pub nickname: String,
    /// The candidate's web site.
    pub url: String,
    /// A location code.
    pub location: u64,
    /// The candidate's signature over the unsigned payload.
    pub signature: Vec<u8>,
}

impl CrInfo {
    /// Writes the signed fields for `version`.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        writer.write_var_bytes(&self.code)?;
        self.cid.ela_serialize(&mut writer)?;
        if version >= CR_INFO_DID_VERSION {
            self.did.ela_serialize(&mut writer)?;
        }
        writer.write_var_string(&self.nickname)?;
        writer.write_var_string(&self.url)?;
        writer.write_u64::<LittleEndian>(self.location)
    }

    /// Writes the payload for `version`.
    pub fn serialize<W: io::Write>(&self, mut writer: W, version: u8) -> io::Result<()> {
        self.serialize_unsigned(&mut writer, version)?;
        writer.write_var_bytes(&self.signature)
    }

    /// Reads a payload of `version`.
    pub fn deserialize<R: io::Read>(mut reader: R, version: u8) -> Result<Self, SerializationError> {
        let code = reader.read_var_bytes()?;
        let cid = ProgramHash::ela_deserialize(&mut reader)?;
        let did = if version >= CR_INFO_DID_VERSION {
            ProgramHash::ela_deserialize(&mut reader)?
        } else {
            ProgramHash::ZERO
        };
        Ok(CrInfo {
            code,
            cid,
            did,
            nickname: reader.read_var_string()?,
            url: reader.read_var_string()?,
            location: reader.read_u64::<LittleEndian>()?,
            signature: reader.read_var_bytes()?,
        })
    }
}

/// The payload of an UnregisterCR transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct UnregisterCr {
    /// The candidate leaving the election.
    pub cid: ProgramHash,
    /// The candidate's signature over the CID.
    pub signature: Vec<u8>,
}

impl UnregisterCr {
    /// Writes the signed fields.
    pub fn serialize_unsigned<W: io::Write>(&self, writer: W) -> io::Result<()> {
        self.cid.ela_serialize(writer)
    }
}

impl ElaSerialize for UnregisterCr {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.serialize_unsigned(&mut writer)?;
        writer.write_var_bytes(&self.signature)
    }
}

impl ElaDeserialize for UnregisterCr {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(UnregisterCr {
            cid: ProgramHash::ela_deserialize(&mut reader)?,
            signature: reader.read_var_bytes()?,
        })
    }
}

/// The payload of a CRCouncilMemberClaimNode transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CrCouncilMemberClaimNode {
    /// The DPoS node key being claimed.
    pub node_public_key: Vec<u8>,
    /// The claiming council member.
    pub cr_council_member_did: ProgramHash,
    /// The member's signature over the unsigned payload.
    pub signature: Vec<u8>,
}

impl CrCouncilMemberClaimNode {
    /// Writes the signed fields.
    pub fn serialize_unsigned<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_var_bytes(&self.node_public_key)?;
        self.cr_council_member_did.ela_serialize(&mut writer)
    }
}

impl ElaSerialize for CrCouncilMemberClaimNode {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.serialize_unsigned(&mut writer)?;
        writer.write_var_bytes(&self.signature)
    }
}

impl ElaDeserialize for CrCouncilMemberClaimNode {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(CrCouncilMemberClaimNode {
            node_public_key: reader.read_var_bytes()?,
            cr_council_member_did: ProgramHash::ela_deserialize(&mut reader)?,
            signature: reader.read_var_bytes()?,
        })
    }
}
