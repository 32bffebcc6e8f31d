//! Transaction validation.
//!
//! Every transaction goes through two phases:
//!
//! 1. [`sanity_check`] looks only at the transaction and the consensus
//!    parameters at the context height.
//! 2. [`context_check`] looks up the spent outputs and the rest of the chain
//!    state, and returns what it learned as a [`ContextOutcome`].
//!
//! Both phases run their steps in a fixed order and stop at the first
//! violation. The steps that differ between transaction types are hooks of
//! the type's [`TransactionChecker`](crate::checker::TransactionChecker).
//!
//! The [`Verifier`] service runs both phases on the rayon thread pool, so
//! callers can verify many independent transactions in parallel.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::sync::oneshot;
use tower::Service;
use tracing::Instrument;

use ela_chain::{
    parameters::ChainParams,
    transaction::Transaction,
    Amount, Hash,
};
use ela_state::{ChainState, ConsensusAlgorithm, References};

use crate::{
    checker::{checker_for, ContextFlow},
    config::Config,
    context::{ContextOutcome, ValidationContext},
    error::TransactionError,
    BoxError,
};

pub mod check;
pub mod vote;

#[cfg(test)]
mod tests;

/// Checks `tx` without looking at the chain state.
pub fn sanity_check(tx: &Transaction, ctx: &ValidationContext<'_>) -> Result<(), TransactionError> {
    let checker = checker_for(tx.tx_type);

    checker.height_version_check(tx, ctx)?;
    checker.check_transaction_size(tx, ctx)?;
    checker.check_transaction_input(tx, ctx)?;
    checker.check_transaction_output(tx, ctx)?;
    check::asset_precision(tx)?;
    checker.check_attribute_program(tx, ctx)?;
    checker.check_transaction_payload(tx, ctx)?;
    check::duplicate_side_chain_txs(tx)?;

    Ok(())
}

/// Checks `tx` against the chain state.
///
/// Assumes [`sanity_check`] has passed. On success, returns the outputs `tx`
/// spends and the fee it pays.
pub fn context_check(
    tx: &Transaction,
    ctx: &ValidationContext<'_>,
) -> Result<ContextOutcome, TransactionError> {
    let checker = checker_for(tx.tx_type);
    checker.height_version_check(tx, ctx)?;

    if ctx.state.is_tx_hash_duplicate(&tx.hash()) {
        return Err(TransactionError::DuplicateTransaction(
            "transaction already exists".to_string(),
        ));
    }

    let references: References = if tx.is_coinbase() {
        Vec::new()
    } else {
        ctx.state.tx_references(tx)?
    };
    tracing::trace!(count = references.len(), "resolved references");

    if ctx.state.consensus_algorithm() == ConsensusAlgorithm::Pow
        && !checker.is_allowed_in_pow_consensus(tx, &references)
    {
        return Err(TransactionError::Validation(
            "not allow in POW consensus".to_string(),
        ));
    }

    if !tx.is_coinbase() && ctx.state.is_double_spend(tx) {
        return Err(TransactionError::DoubleSpend(
            "double spent transaction".to_string(),
        ));
    }

    check::utxo_lock(tx, &references)?;

    if checker.special_context_check(tx, ctx, &references)? == ContextFlow::End {
        tracing::trace!("type rules completed the context checks");
        return Ok(ContextOutcome {
            references,
            fee: Amount::ZERO,
            fee_per_kb: Amount::ZERO,
        });
    }

    let (fee, fee_per_kb) = if tx.is_coinbase() {
        (Amount::ZERO, Amount::ZERO)
    } else {
        let fee = check::transaction_fee(tx, ctx.params, &references)?;
        (fee, check::fee_per_kb(fee, tx.size()))
    };

    check::destruction_address(ctx.params, &references)?;
    check::deposit_utxo(tx, &references)?;
    check::deposit_outputs(tx, ctx.state)?;

    if checker.requires_signature(tx) {
        check::signatures(tx, &references)?;
    }

    check::invalid_utxo(ctx, &references)?;

    if checker.checks_vote_outputs(tx) {
        vote::vote_outputs(tx, ctx, &references)?;
    }

    Ok(ContextOutcome {
        references,
        fee,
        fee_per_kb,
    })
}

/// Runs both phases, logging the rejection if there is one.
pub fn verify(
    tx: &Transaction,
    ctx: &ValidationContext<'_>,
) -> Result<ContextOutcome, TransactionError> {
    let tx_hash = tx.hash();
    let span = tracing::debug_span!("tx", ?tx_hash, tx_type = tx.tx_type.name());
    let _entered = span.enter();

    let result = sanity_check(tx, ctx).and_then(|()| {
        tracing::trace!("passed sanity checks");
        context_check(tx, ctx)
    });

    match &result {
        Ok(outcome) => tracing::trace!(fee = ?outcome.fee, "passed context checks"),
        Err(error) => tracing::debug!(kind = %error.kind(), %error, "rejected transaction"),
    }

    result
}

/// Specifies whether a transaction should be verified as part of a block or
/// as part of the mempool.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Request {
    /// Verify the supplied transaction as part of a block.
    Block {
        /// The transaction itself.
        transaction: Arc<Transaction>,
        /// The height of the block containing this transaction.
        height: u32,
        /// The time that the block was mined.
        time: DateTime<Utc>,
    },
    /// Verify the supplied transaction as part of the mempool.
    ///
    /// Coinbase transactions are invalid in the mempool.
    Mempool {
        /// The transaction itself.
        transaction: Arc<Transaction>,
        /// The height of the next block.
        height: u32,
    },
}

impl Request {
    /// The transaction to verify that's in this request.
    pub fn transaction(&self) -> Arc<Transaction> {
        match self {
            Request::Block { transaction, .. } | Request::Mempool { transaction, .. } => {
                transaction.clone()
            }
        }
    }

    /// The height used to select the consensus rules for verifying this
    /// transaction.
    pub fn height(&self) -> u32 {
        match self {
            Request::Block { height, .. } | Request::Mempool { height, .. } => *height,
        }
    }

    /// The block time, if this is a block request.
    pub fn block_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Request::Block { time, .. } => Some(*time),
            Request::Mempool { .. } => None,
        }
    }

    /// Returns true if the request is a mempool request.
    pub fn is_mempool(&self) -> bool {
        matches!(self, Request::Mempool { .. })
    }
}

/// A verified transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    /// The transaction id.
    pub tx_id: Hash,
    /// The fee, zero for transactions that pay none.
    pub fee: Amount,
    /// The fee per 1000 serialized bytes.
    pub fee_per_kb: Amount,
    /// The outputs spent by each input, in input order.
    pub references: References,
}

/// Asynchronous transaction verification against a shared chain state.
///
/// Keeping the state consistent while blocks are connected is the caller's
/// job. The verifier only reads it.
pub struct Verifier<S> {
    params: Arc<ChainParams>,
    state: Arc<S>,
}

impl<S> Verifier<S>
where
    S: ChainState + Send + Sync + 'static,
{
    /// Creates a transaction verifier with `params`.
    pub fn new(params: ChainParams, state: Arc<S>) -> Self {
        Self {
            params: Arc::new(params),
            state,
        }
    }

    /// Creates a transaction verifier with the parameters of `config`.
    pub fn from_config(config: &Config, state: Arc<S>) -> Self {
        Self::new(config.chain_params(), state)
    }

    /// Returns the consensus parameters this verifier checks against.
    pub fn params(&self) -> &ChainParams {
        &self.params
    }
}

impl<S> Clone for Verifier<S> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            state: self.state.clone(),
        }
    }
}

impl<S> std::fmt::Debug for Verifier<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("network", &self.params.network)
            .finish_non_exhaustive()
    }
}

/// Runs the checks of `req` synchronously.
fn verify_request<S: ChainState>(
    params: &ChainParams,
    state: &S,
    req: &Request,
) -> Result<Response, TransactionError> {
    let tx = req.transaction();

    let timestamp = match req.block_time() {
        Some(time) => u32::try_from(time.timestamp())
            .map_err(|_| TransactionError::Validation("invalid block time".to_string()))?,
        None => state.best_block_timestamp(),
    };

    if req.is_mempool() && tx.is_coinbase() {
        return Err(TransactionError::Validation(
            "coinbase transactions are not allowed in the mempool".to_string(),
        ));
    }

    let ctx = ValidationContext::new(req.height(), timestamp, params, state);
    let outcome = verify(&tx, &ctx)?;

    Ok(Response {
        tx_id: tx.hash(),
        fee: outcome.fee,
        fee_per_kb: outcome.fee_per_kb,
        references: outcome.references,
    })
}

impl<S> Service<Request> for Verifier<S>
where
    S: ChainState + Send + Sync + 'static,
{
    type Response = Response;
    type Error = BoxError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let params = self.params.clone();
        let state = self.state.clone();
        let tx_id = req.transaction().hash();
        let span = tracing::debug_span!("tx", ?tx_id, mempool = req.is_mempool());

        async move {
            tracing::trace!(?req);

            let (tx, rx) = oneshot::channel();
            let verify_span = tracing::Span::current();
            // The checks are CPU-bound, so they run on a dedicated thread.
            rayon::spawn_fifo(move || {
                let _entered = verify_span.enter();
                let _ = tx.send(verify_request(&params, state.as_ref(), &req));
            });

            let result = rx.await?;
            match &result {
                Ok(_) => metrics::counter!("tx.verified.count").increment(1),
                Err(error) => {
                    metrics::counter!("tx.rejected.count", "kind" => error.kind().as_str())
                        .increment(1)
                }
            }

            Ok(result?)
        }
        .inspect(move |result| {
            tracing::trace!(?tx_id, result = ?result.as_ref().map(|_rsp| ()), "got tx verify result");
        })
        .instrument(span)
        .boxed()
    }
}
