//! The per-call bundle every check reads from.

use ela_chain::{parameters::ChainParams, Amount};
use ela_state::{ChainState, References};

/// The height, time, parameters and chain state a transaction is checked
/// against.
///
/// A context is built for one validation call and borrows everything it
/// needs, so it can't outlive the state snapshot it reads.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    /// The height of the block that would include the transaction.
    pub height: u32,
    /// The timestamp of that block.
    pub timestamp: u32,
    /// The consensus parameters.
    pub params: &'a ChainParams,
    /// The chain state as of the previous block.
    pub state: &'a dyn ChainState,
}

impl<'a> ValidationContext<'a> {
    /// Creates a context at `height` and `timestamp`.
    pub fn new(
        height: u32,
        timestamp: u32,
        params: &'a ChainParams,
        state: &'a dyn ChainState,
    ) -> Self {
        ValidationContext {
            height,
            timestamp,
            params,
            state,
        }
    }
}

impl std::fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("height", &self.height)
            .field("timestamp", &self.timestamp)
            .field("network", &self.params.network)
            .finish_non_exhaustive()
    }
}

/// What a successful context check learned about the transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContextOutcome {
    /// The outputs spent by each input, in input order.
    pub references: References,
    /// Inputs minus outputs, or zero for transactions that pay no fee.
    pub fee: Amount,
    /// The fee per 1000 serialized bytes.
    pub fee_per_kb: Amount,
}
