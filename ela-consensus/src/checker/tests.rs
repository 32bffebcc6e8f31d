//! Tests for the rules of each transaction type.
//!
//! Most tests run both phases through [`TestChain::check`](crate::tests::TestChain::check),
//! so a type's rules are exercised in the order the pipeline applies them.

mod arbiters;
mod coinbase;
mod cr;
mod evidence;
mod side_chain;
mod stake;
