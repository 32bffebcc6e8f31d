//! Blockchain data structures for DPoS transaction validation.
//!
//! This crate defines the transaction entity graph (transactions, inputs,
//! outputs, attributes, programs and every payload variant), the
//! consensus-critical serialization used to recompute signed-data buffers,
//! program hashes and addresses, and the per-network chain parameters that
//! gate rule activation by height.
//!
//! *Structural validity* is enforced by the definitions of these data
//! structures. Semantic and contextual validity are enforced in
//! `ela-consensus`.

#![deny(missing_docs)]
#![allow(clippy::try_err)]

#[macro_use]
extern crate serde;

pub mod address;
pub mod amount;
pub mod block;
pub mod hash;
pub mod parameters;
pub mod serialization;
pub mod transaction;

pub use address::{CodeHash, Prefix, ProgramHash};
pub use amount::Amount;
pub use hash::Hash;
