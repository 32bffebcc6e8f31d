//! Consensus parameter tests.

use color_eyre::eyre::Result;

use super::*;
use crate::address::Prefix;

#[test]
fn presets_have_ordered_heights() {
    ela_test::init();

    for network in [Network::Mainnet, Network::Testnet, Network::Regtest] {
        let params = ChainParams::for_network(network);

        assert_eq!(params.network, network);
        assert!(params.cr_voting_start_height <= params.cr_committee_start_height);
        assert!(params.cr_committee_start_height <= params.cr_claim_dpos_node_start_height);
        assert!(params.public_dpos_height <= params.cr_voting_start_height);
        assert!(params.foundation_address.has_prefix(Prefix::MultiSig));
        assert!(params.stake_pool_address.has_prefix(Prefix::DposV2));
    }
}

#[test]
fn well_known_addresses() {
    ela_test::init();

    let params = ChainParams::default();

    assert!(params.is_well_known_address(&params.destroy_address));
    assert!(params.is_well_known_address(&params.cr_expenses_address));
    assert!(!params.is_well_known_address(&ProgramHash::ZERO));
}

#[test]
fn params_deserialize_with_overrides() -> Result<()> {
    ela_test::init();

    let json = r#"{ "network": "Regtest", "min_transaction_fee": 500, "coinbase_maturity": 5 }"#;
    let params: ChainParams = serde_json::from_str(json)?;

    assert_eq!(params.network, Network::Regtest);
    assert_eq!(params.min_transaction_fee, Amount::from_sela(500));
    assert_eq!(params.coinbase_maturity, 5);
    // unlisted fields fall back to the defaults
    assert_eq!(params.max_tx_size, 8_000_000);

    let unknown = r#"{ "no_such_field": 1 }"#;
    assert!(serde_json::from_str::<ChainParams>(unknown).is_err());

    let round_trip: ChainParams = serde_json::from_str(&serde_json::to_string(&params)?)?;
    assert_eq!(round_trip, params);

    Ok(())
}

#[test]
fn network_names_parse() -> Result<()> {
    ela_test::init();

    assert_eq!("testnet".parse::<Network>()?, Network::Testnet);
    assert_eq!("RegTest".parse::<Network>()?, Network::Regtest);
    assert!("devnet".parse::<Network>().is_err());

    Ok(())
}
