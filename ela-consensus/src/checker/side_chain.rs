//! Side-chain anchoring, deposits and withdrawals.
//!
//! Withdrawals and deposit returns spend the cross-chain address that holds
//! side-chain deposits, so they are signed by the cross-chain arbitrators
//! instead of an owner key. The CRC arbitrators act as cross-chain
//! arbitrators.

use std::collections::HashSet;

use ela_chain::{
    transaction::{
        output_payload::{OutputPayload, OutputType},
        payload::{SIDE_CHAIN_PAYLOAD_V0, SIDE_CHAIN_PAYLOAD_V1},
        Output, Payload, Transaction, TxType,
    },
    Amount, Prefix,
};
use ela_state::References;

use super::{activated_at, signer_set_signature, ContextFlow, TransactionChecker};
use crate::{context::ValidationContext, error::TransactionError, transaction::check};

const NO_X_PREFIX: &str = "invalid transaction output address, without \"X\" at beginning";

/// Anchors a side-chain block on the main chain.
pub struct SideChainPow;

impl TransactionChecker for SideChainPow {
    fn check_transaction_input(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::transaction_inputs(tx)?;
        if tx.inputs.len() != 1 {
            return Err(TransactionError::input(
                "sideChainPow transaction must has only one input",
            ));
        }

        Ok(())
    }

    fn check_transaction_output(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::transaction_outputs(tx, ctx)?;
        if tx.outputs.len() != 1 {
            return Err(TransactionError::output(
                "sideChainPow transaction must has only one output",
            ));
        }

        Ok(())
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        _references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let Payload::SideChainPow(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        if tx.is_new_side_chain_pow_tx() {
            if payload.signature.is_empty() {
                return Err(TransactionError::payload(
                    "side mining transaction has empty signature",
                ));
            }

            let arbitrator = ctx.state.on_duty_cross_chain_arbitrator().ok_or_else(|| {
                TransactionError::payload("no on duty cross chain arbitrator")
            })?;
            check::key_signature(
                &arbitrator,
                &payload.unsigned_bytes(),
                &payload.signature,
                "side mining arbitrator",
            )?;
        }

        Ok(ContextFlow::Continue)
    }
}

/// Pays out withdrawals from side chains, spending the cross-chain deposit
/// address.
pub struct WithdrawFromSideChain;

impl TransactionChecker for WithdrawFromSideChain {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let new_cross_chain = ctx.params.new_cross_chain_start_height;
        match tx.payload_version {
            SIDE_CHAIN_PAYLOAD_V0 if ctx.height >= new_cross_chain => {
                Err(TransactionError::height_version(format!(
                    "not support WithdrawFromSideChain payload version 0 after height {new_cross_chain}"
                )))
            }
            SIDE_CHAIN_PAYLOAD_V1 if ctx.height < new_cross_chain => {
                Err(TransactionError::height_version(format!(
                    "not support WithdrawFromSideChain payload version 1 before height {new_cross_chain}"
                )))
            }
            SIDE_CHAIN_PAYLOAD_V0 | SIDE_CHAIN_PAYLOAD_V1 => Ok(()),
            version => Err(TransactionError::height_version(format!(
                "invalid WithdrawFromSideChain payload version {version}"
            ))),
        }
    }

    fn check_attribute_program(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::single_program(tx)
    }

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let Payload::WithdrawFromSideChain(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        let withdraw_outputs = tx
            .outputs
            .iter()
            .filter(|output| output.output_type == OutputType::Withdraw)
            .count();

        if tx.payload_version == SIDE_CHAIN_PAYLOAD_V0
            && payload.side_chain_transaction_hashes.is_empty()
        {
            return Err(TransactionError::payload(
                "invalid withdraw from side chain payload",
            ));
        }
        if tx.payload_version == SIDE_CHAIN_PAYLOAD_V1 && withdraw_outputs == 0 {
            return Err(TransactionError::output(
                "withdraw transaction has no withdraw output",
            ));
        }

        Ok(())
    }

    fn is_allowed_in_pow_consensus(&self, _tx: &Transaction, _references: &References) -> bool {
        false
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let from_outputs = tx.outputs.iter().filter_map(|output| match &output.payload {
            OutputPayload::Withdraw(withdraw) => Some(&withdraw.side_chain_transaction_hash),
            _ => None,
        });

        for hash in tx
            .payload
            .side_chain_transaction_hashes()
            .iter()
            .chain(from_outputs)
        {
            if ctx.state.is_side_chain_tx_hash_duplicate(hash) {
                return Err(TransactionError::SidechainDuplicate(format!(
                    "found duplicate sidechain tx {hash:?}"
                )));
            }
        }

        if references
            .iter()
            .any(|(_, output)| !output.program_hash.has_prefix(Prefix::CrossChain))
        {
            return Err(TransactionError::input(
                "invalid transaction inputs address, without \"X\" at beginning",
            ));
        }

        signer_set_signature(tx, &ctx.state.crc_arbiters())?;

        Ok(ContextFlow::Continue)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}

/// Moves funds to a side chain.
///
/// Version 0 payloads list each transfer explicitly. From version 1, each
/// cross-chain output carries its own target.
pub struct TransferCrossChainAsset;

impl TransactionChecker for TransferCrossChainAsset {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        super::payload_version_activated_at(
            tx,
            ctx,
            SIDE_CHAIN_PAYLOAD_V1,
            ctx.params.new_cross_chain_start_height,
        )
    }

    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let Payload::TransferCrossChainAsset(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };
        let min_fee = ctx.params.min_cross_chain_tx_fee;

        if tx.payload_version >= SIDE_CHAIN_PAYLOAD_V1 {
            return cross_chain_outputs(tx, min_fee);
        }

        if payload.transfers.is_empty() {
            return Err(TransactionError::payload(
                "invalid transaction payload content",
            ));
        }

        let mut indexes = HashSet::new();
        for transfer in &payload.transfers {
            let output = usize::try_from(transfer.output_index)
                .ok()
                .and_then(|index| tx.outputs.get(index))
                .ok_or_else(|| {
                    TransactionError::payload("invalid transaction payload cross chain index")
                })?;

            if !indexes.insert(transfer.output_index) {
                return Err(TransactionError::payload(
                    "duplicated cross chain output index",
                ));
            }
            if transfer.address.is_empty() {
                return Err(TransactionError::payload(
                    "invalid transaction payload cross chain address",
                ));
            }
            if !output.program_hash.has_prefix(Prefix::CrossChain) {
                return Err(TransactionError::output(NO_X_PREFIX));
            }
            pays_target(output, transfer.amount, min_fee)?;
        }

        let unlisted = tx.outputs.iter().enumerate().any(|(index, output)| {
            output.program_hash.has_prefix(Prefix::CrossChain)
                && !indexes.contains(&(index as u64))
        });
        if unlisted {
            return Err(TransactionError::output(
                "cross chain output is not listed in the payload",
            ));
        }

        Ok(())
    }

    fn is_allowed_in_pow_consensus(&self, _tx: &Transaction, _references: &References) -> bool {
        false
    }
}

/// Checks the cross-chain outputs of a version 1 transfer.
fn cross_chain_outputs(tx: &Transaction, min_fee: Amount) -> Result<(), TransactionError> {
    let mut transfers = 0;

    for output in &tx.outputs {
        match &output.payload {
            OutputPayload::CrossChain(cross_chain) => {
                if !output.program_hash.has_prefix(Prefix::CrossChain) {
                    return Err(TransactionError::output(NO_X_PREFIX));
                }
                pays_target(output, cross_chain.target_amount, min_fee)?;
                transfers += 1;
            }
            _ if output.program_hash.has_prefix(Prefix::CrossChain) => {
                return Err(TransactionError::output(
                    "cross chain output must carry a cross chain payload",
                ));
            }
            _ => {}
        }
    }

    if transfers == 0 {
        return Err(TransactionError::output(
            "transfer cross chain transaction has no cross chain output",
        ));
    }

    Ok(())
}

/// Checks that `output` pays `amount` plus the cross-chain fee.
fn pays_target(output: &Output, amount: Amount, min_fee: Amount) -> Result<(), TransactionError> {
    let required = amount.checked_add(min_fee)?;
    if amount.is_negative() || output.value < required {
        return Err(TransactionError::output(
            "invalid transaction cross chain output amount",
        ));
    }

    Ok(())
}

/// Returns side-chain deposits that could not be credited on the side chain.
pub struct ReturnSideChainDepositCoin;

impl TransactionChecker for ReturnSideChainDepositCoin {
    fn height_version_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        activated_at(tx, ctx, ctx.params.return_cross_chain_coin_start_height)
    }

    fn check_attribute_program(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        check::single_program(tx)
    }

    fn is_allowed_in_pow_consensus(&self, _tx: &Transaction, _references: &References) -> bool {
        false
    }

    fn special_context_check(
        &self,
        tx: &Transaction,
        ctx: &ValidationContext<'_>,
        references: &References,
    ) -> Result<ContextFlow, TransactionError> {
        let deposit_address = match references.first() {
            Some((_, output)) if output.program_hash.has_prefix(Prefix::CrossChain) => {
                output.program_hash
            }
            _ => {
                return Err(TransactionError::input(
                    "input does not hold on any deposit",
                ))
            }
        };
        if references
            .iter()
            .any(|(_, output)| output.program_hash != deposit_address)
        {
            return Err(TransactionError::input(
                "inputs must come from one cross chain address",
            ));
        }

        let mut returned = HashSet::new();
        for output in &tx.outputs {
            let OutputPayload::ReturnSideChainDeposit(deposit) = &output.payload else {
                continue;
            };

            let hash = deposit.deposit_transaction_hash;
            if !returned.insert(hash) {
                return Err(TransactionError::output(
                    "duplicated deposit transaction hash",
                ));
            }

            match ctx.state.transaction(&hash) {
                Some((deposit_tx, _)) if deposit_tx.tx_type == TxType::TransferCrossChainAsset => {}
                _ => {
                    return Err(TransactionError::output(
                        "invalid deposit transaction hash",
                    ))
                }
            }
            if ctx.state.is_side_chain_return_deposit_exist(&hash) {
                return Err(TransactionError::output(
                    "the deposit transaction has been returned",
                ));
            }
            if output.value > deposit.deposit_amount {
                return Err(TransactionError::balance(
                    "return amount exceeds the deposit amount",
                ));
            }
        }

        signer_set_signature(tx, &ctx.state.crc_arbiters())?;

        Ok(ContextFlow::Continue)
    }

    fn requires_signature(&self, _tx: &Transaction) -> bool {
        false
    }
}
