//! Producer registration and lifecycle.

use ela_chain::transaction::{
    payload::{ProducerInfo, PRODUCER_INFO_DPOS_V2_VERSION},
    Payload, Transaction,
};
use ela_state::{Producer, ProducerIdentity, ProducerStatus, References};

use super::{
    nickname_and_url, payload_version_activated_at, ContextFlow, TransactionChecker,
};
use crate::{context::ValidationContext, error::TransactionError, transaction::check};

/// Returns the producer info payload of a register or update transaction.
fn producer_info(tx: &Transaction) -> Result<&ProducerInfo, TransactionError> {
    match &tx.payload {
        Payload::RegisterProducer(info) | Payload::UpdateProducer(info) => Ok(info),
        _ => Err(check::payload_mismatch()),
    }
}

/// Verifies the owner signature over the producer info.
fn owner_signature(tx: &Transaction, info: &ProducerInfo) -> Result<(), TransactionError> {
    let data = check::unsigned_bytes(|w| info.serialize_unsigned(w, tx.payload_version));
    check::key_signature(&info.owner_public_key, &data, &info.signature, "producer owner")
}

/// Rejects node keys that belong to another producer or a CRC arbitrator.
fn node_key_unused(ctx: &ValidationContext<'_>, node_public_key: &[u8]) -> Result<(), TransactionError> {
    if ctx.state.producer_by_node(node_public_key).is_some() {
        return Err(TransactionError::payload("producer node already registered"));
    }
    if ctx.state.is_crc_arbitrator(node_public_key) {
        return Err(TransactionError::payload(
            "node public key can't equal with CRC",
        ));
    }

    Ok(())
}

/// Producer info payloads share their activation and field rules.
fn producer_info_payload(tx: &Transaction, ctx: &ValidationContext<'_>) -> Result<(), TransactionError> {
    let info = producer_info(tx)?;
    nickname_and_url(&info.nickname, &info.url, ctx.params.max_nickname_len)
}

/// Registers a new producer and locks its deposit.
pub struct RegisterProducer;

impl TransactionChecker for RegisterProducer {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        payload_version_activated_at(
            tx,
            ctx,
            PRODUCER_INFO_DPOS_V2_VERSION,
            ctx.params.dpos_v2_start_height,
        )
    }

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        producer_info_payload(tx, ctx)
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let info = producer_info(tx)?;

        if ctx.state.producer_by_owner(&info.owner_public_key).is_some() {
            return Err(TransactionError::payload(
                "producer owner already registered",
            ));
        }
        node_key_unused(ctx, &info.node_public_key)?;
        if ctx.state.is_producer_nickname_used(&info.nickname) {
            return Err(TransactionError::payload(format!(
                "nick name {} already inuse",
                info.nickname
            )));
        }

        owner_signature(tx, info)?;

        if tx.payload_version >= PRODUCER_INFO_DPOS_V2_VERSION && info.stake_until <= ctx.height {
            return Err(TransactionError::payload(
                "stake until height should be later than the current height",
            ));
        }

        let deposit_address =
            ela_script::deposit_address(&ela_script::standard_code(&info.owner_public_key));
        let deposits: Vec<_> = tx
            .outputs
            .iter()
            .filter(|output| output.program_hash == deposit_address)
            .map(|output| output.value)
            .collect();
        if deposits.is_empty() {
            return Err(TransactionError::output(
                "deposit address does not match the public key in payload",
            ));
        }
        if check::total(&deposits)? < ctx.params.min_deposit_amount {
            return Err(TransactionError::balance(
                "producer deposit amount is insufficient",
            ));
        }

        Ok(ContextFlow::Continue)
    }
}

/// Updates a producer's node key, nickname or stake period.
pub struct UpdateProducer;

impl TransactionChecker for UpdateProducer {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        payload_version_activated_at(
            tx,
            ctx,
            PRODUCER_INFO_DPOS_V2_VERSION,
            ctx.params.dpos_v2_start_height,
        )
    }

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        producer_info_payload(tx, ctx)
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let info = producer_info(tx)?;

        let producer = ctx
            .state
            .producer_by_owner(&info.owner_public_key)
            .ok_or_else(|| TransactionError::payload("updating unknown producer"))?;
        if matches!(
            producer.status,
            ProducerStatus::Canceled | ProducerStatus::Returned
        ) {
            return Err(TransactionError::payload(
                "updating canceled or returned producer",
            ));
        }

        if producer.info.node_public_key != info.node_public_key {
            node_key_unused(ctx, &info.node_public_key)?;
        }
        if producer.info.nickname != info.nickname
            && ctx.state.is_producer_nickname_used(&info.nickname)
        {
            return Err(TransactionError::payload(format!(
                "nick name {} already inuse",
                info.nickname
            )));
        }

        owner_signature(tx, info)?;

        if tx.payload_version >= PRODUCER_INFO_DPOS_V2_VERSION
            && info.stake_until < producer.info.stake_until
        {
            return Err(TransactionError::payload(
                "stake time is smaller than before",
            ));
        }

        Ok(ContextFlow::Continue)
    }
}

/// Cancels a producer, starting its deposit lockup.
pub struct CancelProducer;

impl TransactionChecker for CancelProducer {
    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::CancelProducer(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        let producer = ctx
            .state
            .producer_by_owner(&payload.owner_public_key)
            .ok_or_else(|| TransactionError::payload("getting unknown producer"))?;

        if producer.identity == ProducerIdentity::DposV2 {
            return Err(TransactionError::payload(
                "can not cancel DPoS V2 producer",
            ));
        }
        if matches!(
            producer.status,
            ProducerStatus::Canceled | ProducerStatus::Returned
        ) {
            return Err(TransactionError::payload(
                "can not cancel this producer",
            ));
        }

        let data = check::unsigned_bytes(|w| payload.serialize_unsigned(w));
        check::key_signature(
            &payload.owner_public_key,
            &data,
            &payload.signature,
            "producer owner",
        )?;

        Ok(ContextFlow::Continue)
    }
}

/// Brings an inactive or illegal producer back.
///
/// Activation is free: it has no inputs, outputs or programs, and is
/// authorized by the node key.
pub struct ActivateProducer;

impl TransactionChecker for ActivateProducer {
    no_cost_hooks!(no_programs);

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::ActivateProducer(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        let producer = ctx
            .state
            .producer_by_node(&payload.node_public_key)
            .ok_or_else(|| TransactionError::payload("getting unknown producer"))?;

        if !matches!(
            producer.status,
            ProducerStatus::Inactive | ProducerStatus::Illegal
        ) {
            return Err(TransactionError::payload(
                "producer is not inactive or illegal",
            ));
        }
        if producer.available_amount() < ctx.params.min_deposit_amount {
            return Err(TransactionError::balance(
                "insufficient deposit to activate producer",
            ));
        }

        let data = check::unsigned_bytes(|w| payload.serialize_unsigned(w));
        check::key_signature(
            &payload.node_public_key,
            &data,
            &payload.signature,
            "producer node",
        )?;

        Ok(ContextFlow::End)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}

/// Returns a canceled producer's deposit after the lockup.
pub struct ReturnDepositCoin;

impl TransactionChecker for ReturnDepositCoin {
    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let mut available = Vec::with_capacity(tx.programs.len());
        for program in &tx.programs {
            let producer = signing_producer(ctx, &program.code)?;

            if producer.status != ProducerStatus::Canceled {
                return Err(TransactionError::payload(
                    "producer must be canceled before returning the deposit",
                ));
            }
            if ctx.height < producer.cancel_height.saturating_add(ctx.params.deposit_lockup_blocks)
            {
                return Err(TransactionError::payload(
                    "the deposit does not meet the lockup limit",
                ));
            }

            available.push(producer.available_amount());
        }

        // change paid back to a deposit address stays locked
        let deposit_hashes: Vec<_> = references
            .iter()
            .map(|(_, output)| output.program_hash)
            .collect();
        let change: Vec<_> = tx
            .outputs
            .iter()
            .filter(|output| deposit_hashes.contains(&output.program_hash))
            .map(|output| output.value)
            .collect();

        let returned = check::input_total(references)?.checked_sub(check::total(&change)?)?;
        if returned > check::total(&available)? {
            return Err(TransactionError::balance("overspend deposit"));
        }

        Ok(ContextFlow::Continue)
    }
}

/// Returns the producer owning the standard `code`.
fn signing_producer(ctx: &ValidationContext<'_>, code: &[u8]) -> Result<Producer, TransactionError> {
    let owner = ela_script::public_key_from_standard(code)
        .map_err(|_| TransactionError::payload("invalid producer owner code"))?;

    ctx.state
        .producer_by_owner(owner)
        .ok_or_else(|| TransactionError::payload("signer must be producer"))
}
