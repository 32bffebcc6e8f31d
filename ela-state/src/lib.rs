//! Chain state consulted by transaction validation.
//!
//! Transaction checks never reach into a process-wide ledger. Instead, every
//! check receives a [`ChainState`]: a read-only view combining
//! - the UTXO and transaction store ([`ChainStore`]),
//! - the DPoS arbitrator schedule ([`ArbitratorState`]),
//! - the CR committee, its candidates and proposals ([`CommitteeState`]), and
//! - the registered producers and the consensus mode ([`ProducerState`]).
//!
//! Keeping those views consistent while blocks are connected is the
//! caller's job: validation takes no locks.
//!
//! [`MemoryState`] is a plain in-memory implementation for tests and tools.

#![deny(missing_docs)]
#![allow(clippy::try_err)]

mod arbitrators;
mod chain;
mod committee;
mod error;
mod memory_state;
mod producers;

pub use arbitrators::{ArbitratorSnapshot, ArbitratorState};
pub use chain::{ChainStore, References};
pub use committee::{
    Candidate, CandidateStatus, CommitteeState, CrMember, MemberStatus, ProposalState,
    ProposalStatus, WithdrawalInfo,
};
pub use error::StateError;
pub use memory_state::MemoryState;
pub use producers::{ConsensusAlgorithm, Producer, ProducerIdentity, ProducerState, ProducerStatus};

/// Every view of the chain a transaction check may need.
///
/// Implemented for every type that implements the four component traits.
pub trait ChainState: ChainStore + ArbitratorState + CommitteeState + ProducerState {}

impl<T> ChainState for T where T: ChainStore + ArbitratorState + CommitteeState + ProducerState {}
