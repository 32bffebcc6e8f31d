//! Validation of Elastos main chain transactions.
//!
//! ## Verification levels.
//!
//! Every transaction is checked at three telescoping levels:
//!
//! 1. *Structural validity*, or whether the bytes decode into a transaction
//!    at all. This is enforced by the serialization code in `ela-chain`.
//!
//! 2. *Sanity*, or whether the transaction could be valid at some chain
//!    state. For instance, inputs must not repeat, outputs must pay the
//!    native asset, and evidence must carry two different conflicting
//!    messages in canonical order.
//!
//! 3. *Context validity*, or whether the transaction is valid against the
//!    chain state of the block that would include it. For instance, its
//!    inputs must be unspent, a proposal's sponsor must be an elected
//!    council member, and the programs must sign for every spent output.
//!
//! [`sanity_check`] and [`context_check`] implement the last two levels,
//! and [`Verifier`] wraps both in a [`tower::Service`].
//!
//! Each of the transaction types shares the same pipeline, and supplies its
//! own rules through a [`checker::TransactionChecker`].

#![allow(clippy::try_err)]
// The actual lints we want to disable
#![allow(clippy::unnecessary_wraps)]

pub mod checker;

mod config;

pub mod context;
pub mod error;
pub mod factory;
pub mod transaction;


pub use config::Config;
pub use context::{ContextOutcome, ValidationContext};
pub use error::{ErrorKind, TransactionError};
pub use factory::{
    create_transaction, deserialize_transaction, deserialize_transaction_header,
    transaction_by_type,
};
pub use transaction::{context_check, sanity_check, Request, Response, Verifier};

/// A boxed [`std::error::Error`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
