//! Consensus parameters for each network.
//!
//! Most transaction rules are gated on an activation height. [`ChainParams`]
//! collects those heights together with the fees, deposit amounts, committee
//! constants and well-known addresses the transaction checks need.
//!
//! Parameters are plain data: they are selected per [`Network`], and can be
//! overridden from a config file, because every field is `serde`-aware.

mod network;

#[cfg(test)]
mod tests;

pub use network::{InvalidNetworkError, Network};

use crate::{Amount, Hash, ProgramHash};

/// The native ELA asset id, in display order.
pub const ELA_ASSET_ID: &str = "a3d0eaa466df74983b5d7c543de6904f4c9418ead5ffd6d25814234a96db37b0";

/// The address that burns every output sent to it.
pub const DESTROY_ADDRESS: &str = "ELANULLXXXXXXXXXXXXXXXXXXXXXYvs3rr";

/// The address holding the CR committee's assets.
pub const CR_ASSETS_ADDRESS: &str = "CRASSETSXXXXXXXXXXXXXXXXXXXX2qDX5J";

/// The address CR expenses are paid from.
pub const CR_EXPENSES_ADDRESS: &str = "CREXPENSESXXXXXXXXXXXXXXXXXX4UdT6b";

/// The address DPoS v2 stakes are locked at.
pub const STAKE_POOL_ADDRESS: &str = "STAKEPooLXXXXXXXXXXXXXXXXXXXpP1PQ2";

/// The address DPoS v2 rewards accumulate at.
pub const STAKE_REWARD_ADDRESS: &str = "STAKEREWARDXXXXXXXXXXXXXXXXXFD5SHU";

/// The consensus parameters used by transaction validation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ChainParams {
    /// The network these parameters were derived from.
    pub network: Network,

    /// The native asset id every output must carry.
    pub ela_asset_id: Hash,

    /// Receives the foundation share of coinbase rewards before the CR
    /// committee starts.
    pub foundation_address: ProgramHash,

    /// Receives the CR share of coinbase rewards once the committee starts.
    pub cr_assets_address: ProgramHash,

    /// Pays CR proposal budgets.
    pub cr_expenses_address: ProgramHash,

    /// Burns every output sent to it; its outputs can't be spent.
    pub destroy_address: ProgramHash,

    /// Holds DPoS v2 stakes.
    pub stake_pool_address: ProgramHash,

    /// Holds DPoS v2 rewards.
    pub stake_reward_address: ProgramHash,

    /// The minimum fee of an ordinary transaction.
    pub min_transaction_fee: Amount,

    /// The maximum serialized size of a transaction, in bytes.
    pub max_tx_size: usize,

    /// The number of blocks before coinbase outputs can be spent.
    pub coinbase_maturity: u32,

    /// Output program hash prefixes are checked from this height.
    pub check_address_height: u32,

    /// Public DPoS consensus starts at this height.
    pub public_dpos_height: u32,

    /// CR registration and voting start at this height.
    pub cr_voting_start_height: u32,

    /// CRs can register with a DID from this height.
    pub register_cr_by_did_height: u32,

    /// The first CR committee takes office at this height.
    pub cr_committee_start_height: u32,

    /// CR council members can claim DPoS nodes from this height.
    pub cr_claim_dpos_node_start_height: u32,

    /// Proposal withdrawals use the versioned payload from this height.
    pub crc_proposal_withdraw_payload_v1_height: u32,

    /// CR assets rectify transactions are accepted from this height.
    pub cr_assets_rectify_transaction_height: u32,

    /// Reverting to proof-of-work is possible from this height.
    pub revert_to_pow_start_height: u32,

    /// Custom ID proposals are accepted from this height.
    pub custom_id_proposal_start_height: u32,

    /// Proposal draft data is carried in the payload from this height.
    pub crc_proposal_draft_data_start_height: u32,

    /// Output-type driven cross-chain transfers start at this height.
    pub new_cross_chain_start_height: u32,

    /// Side-chain deposits can be returned from this height.
    pub return_cross_chain_coin_start_height: u32,

    /// At most one special output per transaction from this height.
    pub special_output_count_height: u32,

    /// DPoS v2 staking starts at this height.
    pub dpos_v2_start_height: u32,

    /// The minimum producer deposit.
    pub min_deposit_amount: Amount,

    /// The minimum CR candidate deposit.
    pub min_cr_deposit_amount: Amount,

    /// Blocks a canceled producer waits before its deposit is returned.
    pub deposit_lockup_blocks: u32,

    /// Blocks a canceled CR candidate waits before its deposit is returned.
    pub cr_deposit_lockup_blocks: u32,

    /// The maximum number of open proposals per council member.
    pub max_committee_proposal_count: usize,

    /// The maximum number of tracking transactions per proposal.
    pub max_proposal_tracking_count: u8,

    /// The share of the current stage balance one proposal can request, in
    /// percent.
    pub crc_proposal_budgets_percentage: i64,

    /// The maximum length of a proposal's category data.
    pub max_category_data_len: usize,

    /// The maximum size of proposal draft, opinion and message data.
    pub max_proposal_data_len: usize,

    /// The maximum length of producer and CR nicknames and URLs.
    pub max_nickname_len: usize,

    /// The maximum length of a reserved custom ID.
    pub max_reserved_custom_id_len: usize,

    /// The fee of each real withdrawal output.
    pub real_withdraw_single_fee: Amount,

    /// The fee of a CR assets rectify transaction.
    pub rectify_tx_fee: Amount,

    /// A rectify transaction needs at least this many CR assets inputs.
    pub min_cr_assets_utxo_count: usize,

    /// A rectify transaction spends at most this many CR assets inputs.
    pub max_cr_assets_utxo_count: usize,

    /// The minimum fee of a cross-chain transfer.
    pub min_cross_chain_tx_fee: Amount,

    /// Seconds without a block before a revert to proof-of-work is valid.
    pub revert_to_pow_no_block_time: u32,

    /// The number of elected, non-CRC arbitrators per round.
    pub general_arbiters: usize,

    /// The shortest DPoS v2 vote lock, in blocks.
    pub dpos_v2_min_votes_lock_time: u32,

    /// The longest DPoS v2 vote lock, in blocks.
    pub dpos_v2_max_votes_lock_time: u32,
}

impl ChainParams {
    /// Returns the parameters of `network`.
    pub fn for_network(network: Network) -> ChainParams {
        let heights = network.heights();
        let address = |address: &str| -> ProgramHash {
            address
                .parse()
                .expect("hard-coded well-known addresses are valid")
        };

        ChainParams {
            network,
            ela_asset_id: ELA_ASSET_ID
                .parse()
                .expect("hard-coded asset id is valid"),
            foundation_address: address(network.foundation_address()),
            cr_assets_address: address(CR_ASSETS_ADDRESS),
            cr_expenses_address: address(CR_EXPENSES_ADDRESS),
            destroy_address: address(DESTROY_ADDRESS),
            stake_pool_address: address(STAKE_POOL_ADDRESS),
            stake_reward_address: address(STAKE_REWARD_ADDRESS),
            min_transaction_fee: Amount::from_sela(100),
            max_tx_size: 8_000_000,
            coinbase_maturity: 100,
            check_address_height: heights.check_address,
            public_dpos_height: heights.public_dpos,
            cr_voting_start_height: heights.cr_voting_start,
            register_cr_by_did_height: heights.register_cr_by_did,
            cr_committee_start_height: heights.cr_committee_start,
            cr_claim_dpos_node_start_height: heights.cr_claim_dpos_node_start,
            crc_proposal_withdraw_payload_v1_height: heights.crc_proposal_withdraw_payload_v1,
            cr_assets_rectify_transaction_height: heights.cr_assets_rectify,
            revert_to_pow_start_height: heights.revert_to_pow_start,
            custom_id_proposal_start_height: heights.custom_id_proposal_start,
            crc_proposal_draft_data_start_height: heights.crc_proposal_draft_data_start,
            new_cross_chain_start_height: heights.new_cross_chain_start,
            return_cross_chain_coin_start_height: heights.return_cross_chain_coin_start,
            special_output_count_height: heights.special_output_count,
            dpos_v2_start_height: heights.dpos_v2_start,
            min_deposit_amount: Amount::from_ela(5000),
            min_cr_deposit_amount: Amount::from_ela(5000),
            deposit_lockup_blocks: 2160,
            cr_deposit_lockup_blocks: 2160,
            max_committee_proposal_count: 128,
            max_proposal_tracking_count: 128,
            crc_proposal_budgets_percentage: 10,
            max_category_data_len: 4096,
            max_proposal_data_len: 1024 * 1024,
            max_nickname_len: 100,
            max_reserved_custom_id_len: 255,
            real_withdraw_single_fee: Amount::from_sela(10_000),
            rectify_tx_fee: Amount::from_sela(10_000),
            min_cr_assets_utxo_count: 720,
            max_cr_assets_utxo_count: 800,
            min_cross_chain_tx_fee: Amount::from_sela(10_000),
            revert_to_pow_no_block_time: 12 * 3600,
            general_arbiters: 24,
            dpos_v2_min_votes_lock_time: 7200,
            dpos_v2_max_votes_lock_time: 720_000,
        }
    }

    /// Returns `true` if `program_hash` is one of the well-known system
    /// addresses that outputs may pay to regardless of prefix rules.
    pub fn is_well_known_address(&self, program_hash: &ProgramHash) -> bool {
        [
            &self.foundation_address,
            &self.cr_assets_address,
            &self.cr_expenses_address,
            &self.destroy_address,
            &self.stake_pool_address,
            &self.stake_reward_address,
        ]
        .into_iter()
        .any(|address| address == program_hash)
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        ChainParams::for_network(Network::default())
    }
}
