//! Errors returned by chain state lookups.

use thiserror::Error;

use ela_chain::{transaction::OutPoint, Hash};

/// An error describing why a state lookup failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// An input spends an output the store doesn't know about.
    #[error("unknown referenced output {index} of transaction {tx_id:?}")]
    MissingReference {
        /// The transaction holding the missing output.
        tx_id: Hash,
        /// The position of the missing output.
        index: u16,
    },

    /// A referenced transaction exists, but has fewer outputs.
    #[error("transaction {tx_id:?} has no output {index}")]
    OutputIndex {
        /// The referenced transaction.
        tx_id: Hash,
        /// The out-of-range index.
        index: u16,
    },
}

impl StateError {
    /// Returns the error for an unresolvable `outpoint`.
    pub fn missing(outpoint: OutPoint) -> StateError {
        StateError::MissingReference {
            tx_id: outpoint.tx_id,
            index: outpoint.index,
        }
    }
}
