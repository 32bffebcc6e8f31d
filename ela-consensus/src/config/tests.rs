use color_eyre::eyre::Result;

use ela_chain::{
    parameters::{ChainParams, Network},
    Amount,
};

use super::Config;

#[test]
fn default_config_uses_mainnet_parameters() -> Result<()> {
    ela_test::init();

    let config: Config = serde_json::from_str("{}")?;
    assert_eq!(config.network, Network::Mainnet);
    assert_eq!(
        config.chain_params(),
        ChainParams::for_network(Network::Mainnet)
    );

    let json = serde_json::to_string(&Config::default())?;
    let parsed: Config = serde_json::from_str(&json)?;
    assert_eq!(parsed.chain_params(), config.chain_params());

    Ok(())
}

#[test]
fn network_selects_the_parameters() -> Result<()> {
    ela_test::init();

    let config: Config = serde_json::from_str(r#"{ "network": "Regtest" }"#)?;
    assert_eq!(
        config.chain_params(),
        ChainParams::for_network(Network::Regtest)
    );

    Ok(())
}

#[test]
fn parameter_overrides_replace_the_network_parameters() -> Result<()> {
    ela_test::init();

    let config: Config = serde_json::from_str(
        r#"{ "network": "Regtest", "chain_params": { "min_transaction_fee": 1000 } }"#,
    )?;
    let params = config.chain_params();

    assert_eq!(params.min_transaction_fee, Amount::from_sela(1000));
    // missing fields come from mainnet, not from the selected network
    let mainnet = ChainParams::for_network(Network::Mainnet);
    assert_eq!(params.cr_committee_start_height, mainnet.cr_committee_start_height);

    Ok(())
}

#[test]
fn unknown_fields_are_rejected() {
    ela_test::init();

    assert!(serde_json::from_str::<Config>(r#"{ "netwrok": "Regtest" }"#).is_err());
    assert!(serde_json::from_str::<Config>(r#"{ "chain_params": { "fee": 1 } }"#).is_err());
}
