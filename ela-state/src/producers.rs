//! Registered producers and the consensus mode.

use ela_chain::{transaction::payload::ProducerInfo, Amount, ProgramHash};

/// How blocks are currently confirmed.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ConsensusAlgorithm {
    /// Arbitrators confirm blocks.
    #[default]
    Dpos,
    /// Blocks are merge-mined without confirmation.
    Pow,
}

/// The lifecycle of a registered producer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ProducerStatus {
    /// Registered, waiting for confirmations.
    #[default]
    Pending,
    /// Eligible for election.
    Active,
    /// Missed too many rounds.
    Inactive,
    /// Cancelled by its owner.
    Canceled,
    /// Punished for misbehaviour.
    Illegal,
    /// Its deposit was returned.
    Returned,
}

/// Which DPoS generations a producer takes part in.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ProducerIdentity {
    /// Registered before DPoS v2.
    #[default]
    DposV1,
    /// Registered for DPoS v2 only.
    DposV2,
    /// Registered before DPoS v2 and staked afterwards.
    DposV1V2,
}

/// A registered producer.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Producer {
    /// The registration payload, as last updated.
    pub info: ProducerInfo,
    /// The producer's status.
    pub status: ProducerStatus,
    /// The DPoS generations the producer takes part in.
    pub identity: ProducerIdentity,
    /// The deposit address.
    pub deposit_hash: ProgramHash,
    /// The total deposit paid.
    pub deposit_amount: Amount,
    /// Penalties deducted from the deposit.
    pub penalty: Amount,
    /// The height the producer was cancelled at.
    pub cancel_height: u32,
}

impl Producer {
    /// Returns the part of the deposit that can still be returned.
    pub fn available_amount(&self) -> Amount {
        self.deposit_amount
            .checked_sub(self.penalty)
            .unwrap_or(Amount::ZERO)
    }
}

/// Read access to the producer registry.
pub trait ProducerState {
    /// Returns the current consensus mode.
    fn consensus_algorithm(&self) -> ConsensusAlgorithm;

    /// Returns the producer registered with `owner_public_key`.
    fn producer_by_owner(&self, owner_public_key: &[u8]) -> Option<Producer>;

    /// Returns the producer using `node_public_key`.
    fn producer_by_node(&self, node_public_key: &[u8]) -> Option<Producer>;

    /// Returns the producer whose deposit is held at `deposit_hash`.
    fn producer_by_deposit_hash(&self, deposit_hash: &ProgramHash) -> Option<Producer>;

    /// Returns `true` if a producer already uses `nickname`.
    fn is_producer_nickname_used(&self, nickname: &str) -> bool;

    /// Returns the owner keys of producers that can receive delegate votes.
    fn active_producer_keys(&self) -> Vec<Vec<u8>>;

    /// Returns the owner keys of producers that can receive DPoS v2 votes.
    fn dpos_v2_candidates(&self) -> Vec<Vec<u8>>;

    /// Returns the DPoS v2 voting rights staked by `stake_address`.
    fn vote_rights(&self, stake_address: &ProgramHash) -> Amount;

    /// Returns the number of active producers.
    fn active_producer_count(&self) -> usize;
}
