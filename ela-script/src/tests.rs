use color_eyre::eyre::Result;
use proptest::prelude::*;

use super::*;
use crate::testing::{multisig_program, signers, TestSigner};

const DATA: &[u8] = b"unsigned transaction bytes";

#[test]
fn standard_program_round_trip() -> Result<()> {
    ela_test::init();

    let signer = TestSigner::new(1);
    let program = signer.program(DATA);

    assert_eq!(code_type(&program.code), Some(CodeType::Standard));
    check_standard_signature(&program, DATA)?;
    run_programs(DATA, &[signer.program_hash()], &[program.clone()])?;

    assert_eq!(
        check_standard_signature(&program, b"other data"),
        Err(Error::Verify)
    );

    Ok(())
}

proptest! {
    #[test]
    fn single_byte_tamper_fails(index in 0..SIGNATURE_LEN, flip in 1u8..=255) {
        ela_test::init();

        let signer = TestSigner::new(2);
        let mut program = signer.program(DATA);
        program.parameter[1 + index] ^= flip;

        prop_assert!(check_standard_signature(&program, DATA).is_err());
    }
}

#[test]
fn multisig_m_n_bounds() {
    ela_test::init();

    let keys: Vec<Vec<u8>> = signers(10, 3).iter().map(TestSigner::public_key).collect();
    let code = multisig_code(2, &keys).expect("valid parameters");
    assert_eq!(parse_multisig_m_n(&code), Ok((2, 3)));
    assert_eq!(public_keys_from_multisig(&code).map(|keys| keys.len()), Ok(3));

    // M = 0
    let mut zero = code.clone();
    zero[0] = PUSH1 - 1;
    assert_eq!(parse_multisig_m_n(&zero), Err(Error::InvalidMultiSigCode));

    // M > N
    let mut too_many = code.clone();
    too_many[0] = PUSH1 + 3;
    assert_eq!(parse_multisig_m_n(&too_many), Err(Error::InvalidMultiSigCode));

    // N larger than the pushed keys
    let mut short = code.clone();
    let n_index = short.len() - 2;
    short[n_index] = PUSH1 + 3;
    assert_eq!(public_keys_from_multisig(&short), Err(Error::PublicKeyCount));

    assert_eq!(multisig_code(0, &keys), Err(Error::InvalidMultiSigCode));
    assert_eq!(multisig_code(4, &keys), Err(Error::InvalidMultiSigCode));
}

#[test]
fn multisig_requires_exactly_m_signatures() -> Result<()> {
    ela_test::init();

    let signers = signers(20, 3);

    check_multi_signature(&multisig_program(2, &signers, 2, DATA), DATA)?;

    let one = multisig_program(2, &signers, 1, DATA);
    assert_eq!(
        check_multi_signature(&one, DATA),
        Err(Error::NotEnoughSignatures)
    );

    let three = multisig_program(2, &signers, 3, DATA);
    assert_eq!(
        check_multi_signature(&three, DATA),
        Err(Error::NotEnoughSignatures)
    );

    let mut duplicated = multisig_program(2, &signers, 1, DATA);
    let first = duplicated.parameter.clone();
    duplicated.parameter.extend(first);
    assert_eq!(
        check_multi_signature(&duplicated, DATA),
        Err(Error::DuplicatedSignatures)
    );

    let hash = program_hash(&one.code)?;
    assert!(hash.has_prefix(Prefix::MultiSig));

    Ok(())
}

#[test]
fn signer_set_rules() -> Result<()> {
    ela_test::init();

    let crc = signers(30, 4);
    let crc_keys: Vec<Vec<u8>> = crc.iter().map(TestSigner::public_key).collect();
    let majority = crc.len() * 2 / 3 + 1;

    let program = multisig_program(3, &crc, 3, DATA);
    check_signer_set_signature(&program, DATA, &crc_keys, majority)?;

    // M below the majority
    let weak = multisig_program(2, &crc, 2, DATA);
    assert_eq!(
        check_signer_set_signature(&weak, DATA, &crc_keys, majority),
        Err(Error::InvalidMultiSigCode)
    );

    // N does not match the signer set
    let partial = multisig_program(3, &crc[..3], 3, DATA);
    assert_eq!(
        check_signer_set_signature(&partial, DATA, &crc_keys, majority),
        Err(Error::InvalidMultiSigCode)
    );

    // a key outside the set
    let mut outsiders = crc[..3].to_vec();
    outsiders.push(TestSigner::new(99));
    let outsider = multisig_program(3, &outsiders, 3, DATA);
    assert_eq!(
        check_signer_set_signature(&outsider, DATA, &crc_keys, majority),
        Err(Error::UnexpectedPublicKey)
    );

    Ok(())
}

#[test]
fn run_programs_pairs_by_code_hash() -> Result<()> {
    ela_test::init();

    let first = TestSigner::new(40);
    let second = TestSigner::new(41);
    let hashes = [first.program_hash(), second.program_hash()];

    // program order does not matter
    let programs = [second.program(DATA), first.program(DATA)];
    run_programs(DATA, &hashes, &programs)?;

    assert_eq!(
        run_programs(DATA, &hashes, &programs[..1]),
        Err(Error::ProgramCount)
    );

    let stranger = TestSigner::new(42);
    assert_eq!(
        run_programs(DATA, &hashes, &[first.program(DATA), stranger.program(DATA)]),
        Err(Error::ProgramHashMismatch)
    );

    // deposit addresses are checked as standard signatures
    let deposit = deposit_address(&first.code());
    run_programs(DATA, &[deposit], &[first.program(DATA)])?;

    // identity addresses have no signature scheme
    assert_eq!(
        run_programs(DATA, &[cid(&first.code())], &[first.program(DATA)]),
        Err(Error::UnknownSignatureType)
    );

    Ok(())
}

#[test]
fn identity_addresses() {
    ela_test::init();

    let code = TestSigner::new(50).code();

    let cid = cid(&code);
    let did = did(&code);
    assert!(cid.has_prefix(Prefix::IdChain));
    assert!(did.has_prefix(Prefix::IdChain));
    assert_ne!(cid, did);
    assert_eq!(cid.code_hash(), CodeHash::from_code(&code));

    assert!(stake_address(&code).has_prefix(Prefix::DposV2));
}

#[test]
fn redeem_script_layout() -> Result<()> {
    ela_test::init();

    // compressed P-256 generator and its double
    let g = "036b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296";
    let g2 = "037cf27b188d034f7e8a52380304b51ac3c08969e277f21b35a60b48fc47669978";
    let keys = vec![hex::decode(g)?, hex::decode(g2)?];

    let standard = standard_code(&keys[0]);
    assert_eq!(hex::encode(&standard), format!("21{g}ac"));
    assert_eq!(code_type(&standard), Some(CodeType::Standard));
    assert_eq!(public_key_from_standard(&standard)?, keys[0].as_slice());

    let multisig = multisig_code(2, &keys)?;
    assert_eq!(hex::encode(&multisig), format!("5221{g}21{g2}52ae"));
    assert_eq!(parse_multisig_m_n(&multisig)?, (2, 2));
    assert_eq!(public_keys_from_multisig(&multisig)?, vec![&keys[0][..], &keys[1][..]]);

    // claims two keys but pushes one
    let miscounted = hex::decode(format!("5121{g}52ae"))?;
    assert_eq!(
        public_keys_from_multisig(&miscounted),
        Err(Error::PublicKeyCount)
    );

    Ok(())
}
