//! The DPoS arbitrator schedule.

use ela_chain::transaction::payload::NextTurnDposInfo;

/// The arbitrator set in force at a block height.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ArbitratorSnapshot {
    /// The height the snapshot was taken at.
    pub height: u32,
    /// Node public keys of every arbitrator, CRC arbitrators included.
    pub arbitrators: Vec<Vec<u8>>,
    /// Node public keys of the CRC arbitrators.
    pub crc_arbitrators: Vec<Vec<u8>>,
}

impl ArbitratorSnapshot {
    /// Returns `true` if `public_key` was an arbitrator in this snapshot.
    pub fn contains(&self, public_key: &[u8]) -> bool {
        self.arbitrators.iter().any(|key| key.as_slice() == public_key)
    }
}

/// Read access to the arbitrators of the current and past DPoS rounds.
pub trait ArbitratorState {
    /// Returns the snapshots recorded at `height`, oldest first.
    ///
    /// The list is empty if no round changed at that height.
    fn snapshot(&self, height: u32) -> Vec<ArbitratorSnapshot>;

    /// Returns `true` if `public_key` is a current arbitrator.
    fn is_arbitrator(&self, public_key: &[u8]) -> bool;

    /// Returns `true` if `public_key` is a current CRC arbitrator.
    fn is_crc_arbitrator(&self, public_key: &[u8]) -> bool;

    /// Returns the current CRC arbitrators.
    fn crc_arbiters(&self) -> Vec<Vec<u8>>;

    /// Returns every current arbitrator.
    fn arbitrators(&self) -> Vec<Vec<u8>>;

    /// Returns the arbitrator signing side-chain proofs of work this round.
    fn on_duty_cross_chain_arbitrator(&self) -> Option<Vec<u8>>;

    /// Returns the arbitrators of the next round, once they are known.
    fn next_turn_dpos_info(&self) -> Option<NextTurnDposInfo>;

    /// Returns `true` if the node key belongs to an active producer.
    fn is_active_producer(&self, public_key: &[u8]) -> bool;

    /// Returns `true` if the node key belongs to an inactive or illegal
    /// producer.
    fn is_disabled_producer(&self, public_key: &[u8]) -> bool;
}
