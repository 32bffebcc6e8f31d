//! The networks a node can follow.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// An enum describing the possible network choices.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Network {
    /// The production mainnet.
    #[default]
    Mainnet,

    /// The public test network.
    Testnet,

    /// A local regression-test network where every upgrade is active early.
    Regtest,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Network::Mainnet => "Mainnet",
            Network::Testnet => "Testnet",
            Network::Regtest => "Regtest",
        })
    }
}

impl FromStr for Network {
    type Err = InvalidNetworkError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(InvalidNetworkError(string.to_owned())),
        }
    }
}

/// An error parsing a network name.
#[derive(Clone, Debug, Error)]
#[error("Invalid network: {0}")]
pub struct InvalidNetworkError(String);

/// Activation heights that differ between networks.
pub(super) struct Heights {
    pub check_address: u32,
    pub public_dpos: u32,
    pub cr_voting_start: u32,
    pub register_cr_by_did: u32,
    pub cr_committee_start: u32,
    pub cr_claim_dpos_node_start: u32,
    pub crc_proposal_withdraw_payload_v1: u32,
    pub cr_assets_rectify: u32,
    pub revert_to_pow_start: u32,
    pub custom_id_proposal_start: u32,
    pub crc_proposal_draft_data_start: u32,
    pub new_cross_chain_start: u32,
    pub return_cross_chain_coin_start: u32,
    pub special_output_count: u32,
    pub dpos_v2_start: u32,
}

impl Network {
    pub(super) fn heights(&self) -> Heights {
        match self {
            Network::Mainnet => Heights {
                check_address: 88_812,
                public_dpos: 402_680,
                cr_voting_start: 537_670,
                register_cr_by_did: 598_000,
                cr_committee_start: 658_930,
                cr_claim_dpos_node_start: 751_400,
                crc_proposal_withdraw_payload_v1: 751_400,
                cr_assets_rectify: 751_400,
                revert_to_pow_start: 751_400,
                custom_id_proposal_start: 932_530,
                crc_proposal_draft_data_start: 1_056_600,
                new_cross_chain_start: 1_032_840,
                return_cross_chain_coin_start: 1_032_840,
                special_output_count: 1_405_000,
                dpos_v2_start: 1_405_000,
            },
            Network::Testnet => Heights {
                check_address: 0,
                public_dpos: 231_500,
                cr_voting_start: 292_000,
                register_cr_by_did: 483_500,
                cr_committee_start: 315_580,
                cr_claim_dpos_node_start: 646_700,
                crc_proposal_withdraw_payload_v1: 646_700,
                cr_assets_rectify: 646_700,
                revert_to_pow_start: 646_700,
                custom_id_proposal_start: 815_060,
                crc_proposal_draft_data_start: 1_008_000,
                new_cross_chain_start: 807_000,
                return_cross_chain_coin_start: 807_000,
                special_output_count: 1_163_000,
                dpos_v2_start: 1_163_000,
            },
            Network::Regtest => Heights {
                check_address: 0,
                public_dpos: 100,
                cr_voting_start: 200,
                register_cr_by_did: 200,
                cr_committee_start: 300,
                cr_claim_dpos_node_start: 300,
                crc_proposal_withdraw_payload_v1: 300,
                cr_assets_rectify: 300,
                revert_to_pow_start: 300,
                custom_id_proposal_start: 300,
                crc_proposal_draft_data_start: 300,
                new_cross_chain_start: 300,
                return_cross_chain_coin_start: 300,
                special_output_count: 400,
                dpos_v2_start: 400,
            },
        }
    }

    /// Returns the Base58 foundation address of this network.
    pub(super) fn foundation_address(&self) -> &'static str {
        match self {
            Network::Mainnet => "8VYXVxKKSAxkmRrfmGpQR2Kc66XhG6m3ta",
            Network::Testnet | Network::Regtest => "8ZZLWQUDSbjWUn8sEdxEFJsZiRFpzg53rJ",
        }
    }
}
