//! Configuration for transaction verification.

use serde::{Deserialize, Serialize};

use ela_chain::parameters::{ChainParams, Network};

#[cfg(test)]
mod tests;

/// Configuration for transaction verification.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The network whose consensus parameters are used.
    pub network: Network,

    /// Replaces the network's consensus parameters.
    ///
    /// This is a developer-only option, for test networks with their own
    /// activation heights. Fields missing from the table take their mainnet
    /// values.
    pub chain_params: Option<ChainParams>,
}

impl Config {
    /// Returns the consensus parameters verification runs with.
    pub fn chain_params(&self) -> ChainParams {
        match &self.chain_params {
            Some(params) => params.clone(),
            None => ChainParams::for_network(self.network),
        }
    }
}

// we like our default configs to be explicit
#[allow(unknown_lints)]
#[allow(clippy::derivable_impls)]
impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            chain_params: None,
        }
    }
}
