//! Redeem script parsing and signature verification for transaction programs.
//!
//! A program pairs a redeem script (`code`) with the signatures that satisfy
//! it (`parameter`). Two script shapes exist:
//!
//! - standard: `0x21 || public key (33) || CHECKSIG`
//! - multi-signature: `PUSH_M || (0x21 || public key)×N || PUSH_N || CHECKMULTISIG`
//!
//! Each signature in a parameter is pushed as `0x40 || signature (64)`.
//! Signatures are P-256 ECDSA over the SHA-256 of the signed data.

#![deny(missing_docs)]
#![allow(clippy::try_err)]

use std::collections::HashSet;

use p256::ecdsa::{signature::Verifier, Signature, VerifyingKey};
use thiserror::Error;

use ela_chain::{transaction::Program, CodeHash, Prefix, ProgramHash};

#[cfg(any(test, feature = "proptest-impl"))]
pub mod testing;

#[cfg(test)]
mod tests;

/// Pushes the number one. `PUSH1 + n - 1` pushes `n`, up to sixteen.
pub const PUSH1: u8 = 0x51;
/// Pushes the next 33 bytes.
pub const PUSH_PUBLIC_KEY: u8 = 0x21;
/// Pushes the next 64 bytes.
pub const PUSH_SIGNATURE: u8 = 0x40;
/// Checks one signature against one key.
pub const CHECKSIG: u8 = 0xac;
/// Checks M signatures against N keys.
pub const CHECKMULTISIG: u8 = 0xae;
/// Replaces `CHECKSIG` in the code a DID is derived from.
pub const DID_OPCODE: u8 = 0xad;

/// The length of a compressed public key.
pub const PUBLIC_KEY_LEN: usize = 33;
/// The length of a raw `r || s` signature.
pub const SIGNATURE_LEN: usize = 64;
/// The length of a pushed signature.
pub const SIGNATURE_SCRIPT_LEN: usize = SIGNATURE_LEN + 1;
/// The length of a standard redeem script.
pub const STANDARD_CODE_LEN: usize = PUBLIC_KEY_LEN + 2;

/// A script verification error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// M or N is out of range, or does not match the expected signer set.
    #[error("invalid multi sign script code")]
    InvalidMultiSigCode,

    /// The key pushes of a multi-signature script do not add up to N.
    #[error("invalid multi sign public key script count")]
    PublicKeyCount,

    /// Fewer or more than M signatures verified.
    #[error("matched signatures not enough")]
    NotEnoughSignatures,

    /// The same signature was pushed twice.
    #[error("duplicated signatures")]
    DuplicatedSignatures,

    /// A multi-signature script uses a key outside the expected signer set.
    #[error("invalid multi sign public key")]
    UnexpectedPublicKey,

    /// The code is not a standard single-key script.
    #[error("invalid standard script code")]
    InvalidStandardCode,

    /// A parameter is not a sequence of pushed signatures.
    #[error("invalid signature length")]
    SignatureLength,

    /// The public key is not a valid compressed P-256 point.
    #[error("invalid public key")]
    PublicKey,

    /// The signature does not verify.
    #[error("signature verification failed")]
    Verify,

    /// The program hash prefix has no signature scheme.
    #[error("unknown signature type")]
    UnknownSignatureType,

    /// The code is neither a standard nor a multi-signature script.
    #[error("invalid redeem script code")]
    UnknownCode,

    /// There are not exactly as many programs as required signers.
    #[error("the number of data hashes is different with number of programs")]
    ProgramCount,

    /// A program's code does not hash to the signer it is paired with.
    #[error("the data hashes is different with corresponding program code")]
    ProgramHashMismatch,
}

/// The shape of a redeem script.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CodeType {
    /// A single-key script.
    Standard,
    /// An M-of-N script.
    MultiSig,
}

/// Classifies a redeem script by its shape.
pub fn code_type(code: &[u8]) -> Option<CodeType> {
    match code.last() {
        Some(&CHECKSIG) if code.len() == STANDARD_CODE_LEN && code[0] == PUSH_PUBLIC_KEY => {
            Some(CodeType::Standard)
        }
        Some(&CHECKMULTISIG) => Some(CodeType::MultiSig),
        _ => None,
    }
}

/// Builds the standard redeem script of `public_key`.
pub fn standard_code(public_key: &[u8]) -> Vec<u8> {
    let mut code = Vec::with_capacity(STANDARD_CODE_LEN);
    code.push(PUSH_PUBLIC_KEY);
    code.extend_from_slice(public_key);
    code.push(CHECKSIG);
    code
}

/// Builds an `m`-of-`public_keys.len()` redeem script.
pub fn multisig_code(m: usize, public_keys: &[Vec<u8>]) -> Result<Vec<u8>, Error> {
    let n = public_keys.len();
    if m < 1 || m > n || n > 16 {
        return Err(Error::InvalidMultiSigCode);
    }

    let mut code = Vec::with_capacity(3 + n * (PUBLIC_KEY_LEN + 1));
    code.push(PUSH1 + m as u8 - 1);
    for key in public_keys {
        code.push(PUSH_PUBLIC_KEY);
        code.extend_from_slice(key);
    }
    code.push(PUSH1 + n as u8 - 1);
    code.push(CHECKMULTISIG);
    Ok(code)
}

/// Recovers M and N from the push opcodes at both ends of a multi-signature
/// script, rejecting scripts where `1 <= M <= N` does not hold.
pub fn parse_multisig_m_n(code: &[u8]) -> Result<(usize, usize), Error> {
    if code.len() < 3 {
        return Err(Error::InvalidMultiSigCode);
    }

    let m = code[0].checked_sub(PUSH1).map(|m| m as usize + 1);
    let n = code[code.len() - 2]
        .checked_sub(PUSH1)
        .map(|n| n as usize + 1);

    match (m, n) {
        (Some(m), Some(n)) if m >= 1 && m <= n => Ok((m, n)),
        _ => Err(Error::InvalidMultiSigCode),
    }
}

/// Returns the public keys pushed by a multi-signature script.
pub fn public_keys_from_multisig(code: &[u8]) -> Result<Vec<&[u8]>, Error> {
    let (_, n) = parse_multisig_m_n(code)?;

    let pushes = &code[1..code.len() - 2];
    let mut keys = Vec::with_capacity(n);
    for push in pushes.chunks(PUBLIC_KEY_LEN + 1) {
        if push.len() != PUBLIC_KEY_LEN + 1 || push[0] != PUSH_PUBLIC_KEY {
            return Err(Error::PublicKeyCount);
        }
        keys.push(&push[1..]);
    }

    if keys.len() != n {
        return Err(Error::PublicKeyCount);
    }
    Ok(keys)
}

/// Returns the public key of a standard script.
pub fn public_key_from_standard(code: &[u8]) -> Result<&[u8], Error> {
    match code_type(code) {
        Some(CodeType::Standard) => Ok(&code[1..STANDARD_CODE_LEN - 1]),
        _ => Err(Error::InvalidStandardCode),
    }
}

/// Verifies a raw 64-byte signature by a compressed public key over `data`.
pub fn verify_signature(public_key: &[u8], data: &[u8], signature: &[u8]) -> Result<(), Error> {
    let key = VerifyingKey::from_sec1_bytes(public_key).map_err(|_| Error::PublicKey)?;
    let signature = Signature::from_slice(signature).map_err(|_| Error::SignatureLength)?;
    key.verify(data, &signature).map_err(|_| Error::Verify)
}

/// Checks a standard program: one pushed signature by the script's key.
pub fn check_standard_signature(program: &Program, data: &[u8]) -> Result<(), Error> {
    let public_key = public_key_from_standard(&program.code)?;

    if program.parameter.len() != SIGNATURE_SCRIPT_LEN || program.parameter[0] != PUSH_SIGNATURE
    {
        return Err(Error::SignatureLength);
    }

    verify_signature(public_key, data, &program.parameter[1..])
}

/// Checks a multi-signature program: exactly M distinct pushed signatures,
/// each by a different key of the script.
pub fn check_multi_signature(program: &Program, data: &[u8]) -> Result<(), Error> {
    let (m, _) = parse_multisig_m_n(&program.code)?;
    let keys = public_keys_from_multisig(&program.code)?;
    let signatures = split_signatures(&program.parameter)?;

    let mut seen = HashSet::new();
    let mut used_keys = vec![false; keys.len()];
    let mut verified = 0;

    for signature in signatures {
        if !seen.insert(signature) {
            return Err(Error::DuplicatedSignatures);
        }

        let signer = keys.iter().enumerate().find(|(index, key)| {
            !used_keys[*index] && verify_signature(key, data, signature).is_ok()
        });
        if let Some((index, _)) = signer {
            used_keys[index] = true;
            verified += 1;
        }
    }

    if verified != m {
        tracing::debug!(verified, m, "multi-signature program has the wrong signature count");
        return Err(Error::NotEnoughSignatures);
    }
    Ok(())
}

/// Checks a multi-signature program signed by a fixed signer set, such as
/// the CRC arbitrators.
///
/// N must equal the size of `signers`, M must be at least `min_m`, and every
/// key of the script must belong to `signers`.
pub fn check_signer_set_signature(
    program: &Program,
    data: &[u8],
    signers: &[Vec<u8>],
    min_m: usize,
) -> Result<(), Error> {
    let (m, n) = parse_multisig_m_n(&program.code)?;
    if n != signers.len() || m < min_m {
        return Err(Error::InvalidMultiSigCode);
    }

    for key in public_keys_from_multisig(&program.code)? {
        if !signers.iter().any(|signer| signer.as_slice() == key) {
            return Err(Error::UnexpectedPublicKey);
        }
    }

    check_multi_signature(program, data)
}

/// Splits a parameter into its raw signatures.
fn split_signatures(parameter: &[u8]) -> Result<Vec<&[u8]>, Error> {
    if parameter.is_empty() || parameter.len() % SIGNATURE_SCRIPT_LEN != 0 {
        return Err(Error::SignatureLength);
    }

    parameter
        .chunks(SIGNATURE_SCRIPT_LEN)
        .map(|push| match push[0] {
            PUSH_SIGNATURE => Ok(&push[1..]),
            _ => Err(Error::SignatureLength),
        })
        .collect()
}

/// Verifies `programs` against the program hashes that must sign `data`.
///
/// Both lists are sorted by code hash and paired up, so the order in which
/// the programs were attached does not matter.
pub fn run_programs(
    data: &[u8],
    hashes: &[ProgramHash],
    programs: &[Program],
) -> Result<(), Error> {
    if hashes.len() != programs.len() {
        return Err(Error::ProgramCount);
    }

    let mut hashes = hashes.to_vec();
    hashes.sort_by_key(ProgramHash::code_hash);

    let mut programs: Vec<(CodeHash, &Program)> = programs
        .iter()
        .map(|program| (CodeHash::from_code(&program.code), program))
        .collect();
    programs.sort_by_key(|(code_hash, _)| *code_hash);

    for (hash, (code_hash, program)) in hashes.iter().zip(programs) {
        if hash.code_hash() != code_hash {
            return Err(Error::ProgramHashMismatch);
        }

        match hash.prefix() {
            Some(Prefix::Standard | Prefix::Deposit | Prefix::DposV2) => {
                check_standard_signature(program, data)?
            }
            Some(Prefix::MultiSig) => check_multi_signature(program, data)?,
            _ => return Err(Error::UnknownSignatureType),
        }
    }

    Ok(())
}

/// Returns the address controlled by `code`.
pub fn program_hash(code: &[u8]) -> Result<ProgramHash, Error> {
    match code_type(code) {
        Some(CodeType::Standard) => Ok(ProgramHash::new(Prefix::Standard, code)),
        Some(CodeType::MultiSig) => Ok(ProgramHash::new(Prefix::MultiSig, code)),
        None => Err(Error::UnknownCode),
    }
}

/// Returns the deposit address of a producer or CR candidate.
pub fn deposit_address(code: &[u8]) -> ProgramHash {
    ProgramHash::new(Prefix::Deposit, code)
}

/// Returns the DPoS v2 stake address of `code`.
pub fn stake_address(code: &[u8]) -> ProgramHash {
    ProgramHash::new(Prefix::DposV2, code)
}

/// Returns the candidate id of `code`.
pub fn cid(code: &[u8]) -> ProgramHash {
    ProgramHash::new(Prefix::IdChain, code)
}

/// Returns the decentralized id of a standard `code`.
///
/// The DID hashes the code with its final `CHECKSIG` replaced.
pub fn did(code: &[u8]) -> ProgramHash {
    let mut did_code = code.to_vec();
    if let Some(last) = did_code.last_mut() {
        *last = DID_OPCODE;
    }
    ProgramHash::new(Prefix::IdChain, &did_code)
}
