use color_eyre::eyre::Result;

use super::*;

#[test]
fn display_is_reversed_hex() -> Result<()> {
    ela_test::init();

    let mut bytes = [0u8; 32];
    bytes[0] = 0xb0;
    bytes[31] = 0xa3;
    let hash = Hash(bytes);

    let shown = hash.to_string();
    assert!(shown.starts_with("a3"));
    assert!(shown.ends_with("b0"));
    assert_eq!(shown.parse::<Hash>()?, hash);

    assert!("not a hash".parse::<Hash>().is_err());

    Ok(())
}

#[test]
fn ordering_starts_from_the_last_byte() {
    ela_test::init();

    let mut low = [0u8; 32];
    low[0] = 0xff;
    let mut high = [0u8; 32];
    high[31] = 0x01;

    assert!(Hash(low) < Hash(high));
    assert!(Hash::ZERO < Hash(low));
}

#[test]
fn sha256d_of_empty_input() {
    ela_test::init();

    // Double SHA256 of the empty string, in display order.
    let expected: Hash = "56944c5d3f98413ef45cf54545538103cc9f298e0575820ad3591376e2e0f65d"
        .parse()
        .expect("hard-coded hash is valid");
    assert_eq!(Hash::sha256d(&[]), expected);
}
