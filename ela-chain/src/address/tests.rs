use color_eyre::eyre::Result;

use super::*;

#[test]
fn well_known_addresses_decode() -> Result<()> {
    ela_test::init();

    let destroy: ProgramHash = "ELANULLXXXXXXXXXXXXXXXXXXXXXYvs3rr".parse()?;
    assert!(destroy.has_prefix(Prefix::Standard));
    assert_eq!(
        hex::encode(destroy.0),
        "2120fee5d7eb3e5c7d3197fecf6c0de30f889acef7"
    );
    assert_eq!(destroy.to_address(), "ELANULLXXXXXXXXXXXXXXXXXXXXXYvs3rr");

    let stake_pool: ProgramHash = "STAKEPooLXXXXXXXXXXXXXXXXXXXpP1PQ2".parse()?;
    assert_eq!(stake_pool.prefix(), Some(Prefix::DposV2));

    let assets: ProgramHash = "CRASSETSXXXXXXXXXXXXXXXXXXXX2qDX5J".parse()?;
    assert_eq!(assets.prefix(), Some(Prefix::CrExpenses));

    Ok(())
}

#[test]
fn bad_addresses_are_rejected() {
    ela_test::init();

    // last character changed
    assert_eq!(
        "ELANULLXXXXXXXXXXXXXXXXXXXXXYvs3rs".parse::<ProgramHash>(),
        Err(AddressError::Checksum)
    );
    assert_eq!("0OIl".parse::<ProgramHash>(), Err(AddressError::Base58));
    assert!(matches!(
        "ELANULL".parse::<ProgramHash>(),
        Err(AddressError::Length(_))
    ));
}

#[test]
fn prefix_is_kept_separately_from_code_hash() {
    ela_test::init();

    let code = [0x21u8; 35];
    let standard = ProgramHash::new(Prefix::Standard, &code);
    let deposit = ProgramHash::new(Prefix::Deposit, &code);

    assert_ne!(standard, deposit);
    assert_eq!(standard.code_hash(), deposit.code_hash());
    assert_eq!(deposit.prefix(), Some(Prefix::Deposit));
    assert_eq!(Prefix::from_byte(0x00), None);
}
