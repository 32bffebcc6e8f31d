//! The UTXO and transaction store.

use std::sync::Arc;

use ela_chain::{
    transaction::{Input, Output, Transaction},
    Hash,
};

use crate::StateError;

/// The outputs spent by a transaction, paired with the inputs spending them,
/// in input order.
pub type References = Vec<(Input, Output)>;

/// Read access to confirmed transactions and the outputs they created.
pub trait ChainStore {
    /// Resolves every input of `tx` to the output it spends.
    ///
    /// Returns an error if any input can't be resolved.
    fn tx_references(&self, tx: &Transaction) -> Result<References, StateError>;

    /// Returns a confirmed transaction and the height of its block.
    fn transaction(&self, hash: &Hash) -> Option<(Arc<Transaction>, u32)>;

    /// Returns `true` if a transaction with `hash` is already in the chain.
    fn is_tx_hash_duplicate(&self, hash: &Hash) -> bool;

    /// Returns `true` if any input of `tx` was already spent.
    fn is_double_spend(&self, tx: &Transaction) -> bool;

    /// Returns `true` if the side-chain transaction `hash` was already
    /// withdrawn to the main chain.
    fn is_side_chain_tx_hash_duplicate(&self, hash: &Hash) -> bool;

    /// Returns `true` if the side-chain deposit made by transaction `hash`
    /// was already returned.
    fn is_side_chain_return_deposit_exist(&self, hash: &Hash) -> bool;

    /// Returns the timestamp of the best block.
    fn best_block_timestamp(&self) -> u32;
}
