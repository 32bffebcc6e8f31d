//! Deterministic P-256 keys for building signed programs in tests.

use p256::ecdsa::{signature::Signer, Signature, SigningKey, VerifyingKey};

use ela_chain::{transaction::Program, ProgramHash};

use crate::{multisig_code, program_hash, standard_code, PUSH_SIGNATURE};

/// A signing key derived from a one-byte seed.
#[derive(Clone, Debug)]
pub struct TestSigner {
    key: SigningKey,
}

impl TestSigner {
    /// Creates the signer for `seed`. Seeds must be between 1 and 200, so
    /// that the repeated byte is a valid scalar.
    pub fn new(seed: u8) -> TestSigner {
        assert!((1..=200).contains(&seed), "seed out of range");
        let key = SigningKey::from_slice(&[seed; 32])
            .expect("repeated seed bytes below the curve order are a valid scalar");
        TestSigner { key }
    }

    /// Returns the compressed public key.
    pub fn public_key(&self) -> Vec<u8> {
        VerifyingKey::from(&self.key)
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    /// Returns the standard redeem script.
    pub fn code(&self) -> Vec<u8> {
        standard_code(&self.public_key())
    }

    /// Returns the standard address.
    pub fn program_hash(&self) -> ProgramHash {
        program_hash(&self.code()).expect("standard code has a program hash")
    }

    /// Returns the raw signature of `data`.
    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        let signature: Signature = self.key.sign(data);
        signature.to_bytes().to_vec()
    }

    /// Returns the pushed signature of `data`.
    pub fn parameter(&self, data: &[u8]) -> Vec<u8> {
        let mut parameter = vec![PUSH_SIGNATURE];
        parameter.extend(self.sign(data));
        parameter
    }

    /// Returns a standard program signing `data`.
    pub fn program(&self, data: &[u8]) -> Program {
        Program {
            code: self.code(),
            parameter: self.parameter(data),
        }
    }
}

/// Returns an `m`-of-`signers.len()` program over `data`, signed by the
/// first `sign_count` signers.
pub fn multisig_program(
    m: usize,
    signers: &[TestSigner],
    sign_count: usize,
    data: &[u8],
) -> Program {
    let keys: Vec<Vec<u8>> = signers.iter().map(TestSigner::public_key).collect();
    let code = multisig_code(m, &keys).expect("test multisig parameters are valid");
    let parameter = signers
        .iter()
        .take(sign_count)
        .flat_map(|signer| signer.parameter(data))
        .collect();
    Program { code, parameter }
}

/// Returns `count` signers with consecutive seeds starting at `first_seed`.
pub fn signers(first_seed: u8, count: u8) -> Vec<TestSigner> {
    (first_seed..first_seed + count).map(TestSigner::new).collect()
}
