//! Transaction checks shared by every transaction type.
//!
//! Code in this file can freely assume that no pre-V09 transaction carries
//! typed outputs, because the output deserializer never reads them.

use std::collections::HashSet;

use ela_chain::{
    amount::PRECISION,
    parameters::ChainParams,
    transaction::{
        output_payload::{OutputPayload, OutputType},
        AttributeUsage, Transaction, TxType, TxVersion, LOCKED_SEQUENCE,
    },
    Amount, Prefix, ProgramHash,
};
use ela_script::CodeType;
use ela_state::{ChainState, References};

use crate::{context::ValidationContext, error::TransactionError};

/// The error returned when the payload variant doesn't belong to the type.
pub fn payload_mismatch() -> TransactionError {
    TransactionError::payload("transaction payload type does not match the transaction type")
}

/// Checks that the serialized size is within the protocol limit.
pub fn transaction_size(tx: &Transaction, params: &ChainParams) -> Result<(), TransactionError> {
    let size = tx.size();
    if size == 0 || size > params.max_tx_size {
        return Err(TransactionError::Size(format!(
            "the size {size} of transaction is invalid"
        )));
    }

    Ok(())
}

/// Checks that the transaction spends something, and spends it only once.
pub fn transaction_inputs(tx: &Transaction) -> Result<(), TransactionError> {
    if tx.inputs.is_empty() {
        return Err(TransactionError::input("transaction has no inputs"));
    }

    unique_inputs(tx)
}

/// Checks that no input is the coinbase sentinel or repeats another input.
pub fn unique_inputs(tx: &Transaction) -> Result<(), TransactionError> {
    let mut seen = HashSet::new();
    for input in &tx.inputs {
        if input.is_coinbase_sentinel() {
            return Err(TransactionError::input("invalid transaction input"));
        }
        if !seen.insert(input.previous) {
            return Err(TransactionError::input("duplicated transaction inputs"));
        }
    }

    Ok(())
}

/// Checks that a transaction which pays no fee has no inputs.
pub fn no_inputs(tx: &Transaction) -> Result<(), TransactionError> {
    if !tx.inputs.is_empty() {
        return Err(TransactionError::input(
            "no cost transactions must has no input",
        ));
    }

    Ok(())
}

/// Checks that a transaction which pays no fee has no outputs.
pub fn no_outputs(tx: &Transaction) -> Result<(), TransactionError> {
    if !tx.outputs.is_empty() {
        return Err(TransactionError::output(
            "no cost transactions should have no output",
        ));
    }

    Ok(())
}

/// Checks the output count, then every output.
pub fn transaction_outputs(
    tx: &Transaction,
    ctx: &ValidationContext<'_>,
) -> Result<(), TransactionError> {
    output_count(tx)?;
    output_values(tx, ctx)
}

/// Checks that there is at least one output, and not too many.
pub fn output_count(tx: &Transaction) -> Result<(), TransactionError> {
    if tx.outputs.len() > usize::from(u16::MAX) {
        return Err(TransactionError::output(
            "output count should not be greater than 65535(MaxUint16)",
        ));
    }
    if tx.outputs.is_empty() {
        return Err(TransactionError::output("transaction has no outputs"));
    }

    Ok(())
}

/// Checks the asset, value, destination and payload of every output.
pub fn output_values(
    tx: &Transaction,
    ctx: &ValidationContext<'_>,
) -> Result<(), TransactionError> {
    let params = ctx.params;
    let mut special_outputs = 0;

    for output in &tx.outputs {
        if output.asset_id != params.ela_asset_id {
            return Err(TransactionError::output("asset ID in output is invalid"));
        }

        if output.value.is_negative() {
            return Err(TransactionError::output("invalid transaction UTXO output"));
        }

        if ctx.height >= params.check_address_height
            && !is_valid_output_address(&output.program_hash, params)
        {
            return Err(TransactionError::output("invalid program hash prefix"));
        }

        if tx.version >= TxVersion::V09 {
            if output.output_type != output.payload.output_type() {
                return Err(TransactionError::output(
                    "output type does not match the output payload",
                ));
            }
            output.payload.validate().map_err(|error| {
                TransactionError::output(format!("invalid output payload: {error}"))
            })?;

            if output.output_type != OutputType::None {
                special_outputs += 1;
            }
        }
    }

    if ctx.height >= params.special_output_count_height && special_outputs > 1 {
        return Err(TransactionError::output(
            "special output count should less equal than 1",
        ));
    }

    Ok(())
}

/// Returns `true` if outputs may pay to `program_hash`.
fn is_valid_output_address(program_hash: &ProgramHash, params: &ChainParams) -> bool {
    params.is_well_known_address(program_hash)
        || matches!(
            program_hash.prefix(),
            Some(Prefix::Standard | Prefix::MultiSig | Prefix::CrossChain | Prefix::Deposit)
        )
}

/// Checks that every output value is representable by the native asset.
pub fn asset_precision(tx: &Transaction) -> Result<(), TransactionError> {
    if tx
        .outputs
        .iter()
        .any(|output| !output.value.is_precise(PRECISION))
    {
        return Err(TransactionError::AssetPrecision(
            "the precision of asset is incorrect".to_string(),
        ));
    }

    Ok(())
}

/// Checks attribute usages, then that every program is complete.
pub fn attributes_and_programs(tx: &Transaction) -> Result<(), TransactionError> {
    attributes(tx)?;
    programs(tx)
}

/// Checks that every attribute usage is known.
pub fn attributes(tx: &Transaction) -> Result<(), TransactionError> {
    if tx.attributes.iter().any(|attr| !attr.usage.is_valid()) {
        return Err(TransactionError::attribute_program("invalid attribute usage"));
    }

    Ok(())
}

/// Checks that there is at least one program, and none is missing a part.
pub fn programs(tx: &Transaction) -> Result<(), TransactionError> {
    if tx.programs.is_empty() {
        return Err(TransactionError::attribute_program(
            "no programs found in transaction",
        ));
    }

    for program in &tx.programs {
        if program.code.is_empty() {
            return Err(TransactionError::attribute_program("invalid program code nil"));
        }
        if program.parameter.is_empty() {
            return Err(TransactionError::attribute_program(
                "invalid program parameter nil",
            ));
        }
    }

    Ok(())
}

/// Checks that a transaction which pays no fee carries no side data.
pub fn no_attributes_or_programs(tx: &Transaction) -> Result<(), TransactionError> {
    if !tx.attributes.is_empty() || !tx.programs.is_empty() {
        return Err(TransactionError::attribute_program(
            "zero cost tx should have no attributes and programs",
        ));
    }

    Ok(())
}

/// Checks attribute usages, and that exactly one complete program is
/// attached.
pub fn single_program(tx: &Transaction) -> Result<(), TransactionError> {
    attributes(tx)?;
    if tx.programs.len() != 1 {
        return Err(TransactionError::attribute_program(format!(
            "{} transactions should have one and only one program",
            tx.tx_type.name()
        )));
    }
    programs(tx)
}

/// Checks attribute usages, and that no program is attached.
///
/// System transactions are authorized by chain state, not by signers.
pub fn attributes_without_programs(tx: &Transaction) -> Result<(), TransactionError> {
    attributes(tx)?;
    if !tx.programs.is_empty() {
        return Err(TransactionError::attribute_program(format!(
            "{} transactions should have no programs",
            tx.tx_type.name()
        )));
    }

    Ok(())
}

/// Checks that the payload variant matches the type tag.
pub fn payload_type(tx: &Transaction) -> Result<(), TransactionError> {
    if !tx.payload_matches_type() {
        return Err(payload_mismatch());
    }

    Ok(())
}

/// Checks that no side-chain transaction is paid out twice by the same
/// transaction.
pub fn duplicate_side_chain_txs(tx: &Transaction) -> Result<(), TransactionError> {
    let from_outputs = tx.outputs.iter().filter_map(|output| match &output.payload {
        OutputPayload::Withdraw(withdraw) => Some(&withdraw.side_chain_transaction_hash),
        _ => None,
    });

    let mut seen = HashSet::new();
    for hash in tx.payload.side_chain_transaction_hashes().iter().chain(from_outputs) {
        if !seen.insert(hash) {
            return Err(TransactionError::SidechainDuplicate(
                "duplicate sidechain tx detected in a transaction".to_string(),
            ));
        }
    }

    Ok(())
}

/// Checks the output locks of the spent outputs.
///
/// Spending a locked output needs the locked sequence, and a lock time at
/// or after the output's lock height.
pub fn utxo_lock(tx: &Transaction, references: &References) -> Result<(), TransactionError> {
    for (input, output) in references {
        if output.output_lock == 0 {
            continue;
        }
        if input.sequence != LOCKED_SEQUENCE {
            return Err(TransactionError::UtxoLocked(
                "invalid input sequence".to_string(),
            ));
        }
        if tx.lock_time < output.output_lock {
            return Err(TransactionError::UtxoLocked("UTXO output locked".to_string()));
        }
    }

    Ok(())
}

/// Returns the total value of the spent outputs.
pub fn input_total(references: &References) -> Result<Amount, TransactionError> {
    Ok(Amount::try_sum(references.iter().map(|(_, output)| output.value))?)
}

/// Returns the sum of `values`.
pub fn total(values: &[Amount]) -> Result<Amount, TransactionError> {
    Ok(Amount::try_sum(values.iter().copied())?)
}

/// Returns the total value of the new outputs.
pub fn output_total(tx: &Transaction) -> Result<Amount, TransactionError> {
    Ok(Amount::try_sum(tx.outputs.iter().map(|output| output.value))?)
}

/// Returns inputs minus outputs.
pub fn fee(tx: &Transaction, references: &References) -> Result<Amount, TransactionError> {
    Ok(input_total(references)?.checked_sub(output_total(tx)?)?)
}

/// Returns the fee, after checking it pays at least the minimum.
pub fn transaction_fee(
    tx: &Transaction,
    params: &ChainParams,
    references: &References,
) -> Result<Amount, TransactionError> {
    let fee = fee(tx, references)?;
    if fee < params.min_transaction_fee {
        return Err(TransactionError::balance("transaction fee not enough"));
    }

    Ok(fee)
}

/// Returns `fee` per 1000 bytes of a transaction of `size` bytes.
pub fn fee_per_kb(fee: Amount, size: usize) -> Amount {
    i64::try_from(size)
        .ok()
        .and_then(|size| fee.ratio(1000, size).ok())
        .unwrap_or(Amount::ZERO)
}

/// Checks that nothing spends from the destroy address.
pub fn destruction_address(
    params: &ChainParams,
    references: &References,
) -> Result<(), TransactionError> {
    if references
        .iter()
        .any(|(_, output)| output.program_hash == params.destroy_address)
    {
        return Err(TransactionError::input(
            "cannot use utxo from the destruction address",
        ));
    }

    Ok(())
}

/// Returns `true` for the types that return a producer or CR deposit.
fn returns_deposit(tx: &Transaction) -> bool {
    matches!(
        tx.tx_type,
        TxType::ReturnDepositCoin | TxType::ReturnCRDepositCoin
    )
}

/// Checks that deposits are only spent by deposit returns, and that deposit
/// returns only spend deposits.
pub fn deposit_utxo(tx: &Transaction, references: &References) -> Result<(), TransactionError> {
    let returns_deposit = returns_deposit(tx);

    for (_, output) in references {
        let is_deposit = output.program_hash.has_prefix(Prefix::Deposit);
        if is_deposit && !returns_deposit {
            return Err(TransactionError::input(
                "only the ReturnDepositCoin and ReturnCRDepositCoin transaction can use the deposit UTXO",
            ));
        }
        if !is_deposit && returns_deposit {
            return Err(TransactionError::input(
                "the ReturnDepositCoin and ReturnCRDepositCoin transaction can only use the deposit UTXO",
            ));
        }
    }

    Ok(())
}

/// Checks that new deposit outputs go to a registration, a deposit return,
/// or a deposit address that is already known.
pub fn deposit_outputs(tx: &Transaction, state: &dyn ChainState) -> Result<(), TransactionError> {
    let registers = matches!(tx.tx_type, TxType::RegisterProducer | TxType::RegisterCR);

    for output in &tx.outputs {
        let hash = &output.program_hash;
        if !hash.has_prefix(Prefix::Deposit) || registers || returns_deposit(tx) {
            continue;
        }
        if state.producer_by_deposit_hash(hash).is_none() && !state.is_cr_deposit_hash(hash) {
            return Err(TransactionError::output(
                "only the address that CR or Producer registered can have the deposit UTXO",
            ));
        }
    }

    Ok(())
}

/// Returns the program hashes that must sign the transaction: the owners
/// of the spent outputs, then any script attributes, each listed once.
pub fn signer_hashes(
    tx: &Transaction,
    references: &References,
) -> Result<Vec<ProgramHash>, TransactionError> {
    let mut hashes: Vec<ProgramHash> = Vec::new();

    for (_, output) in references {
        if !hashes.contains(&output.program_hash) {
            hashes.push(output.program_hash);
        }
    }

    for attribute in &tx.attributes {
        if attribute.usage != AttributeUsage::SCRIPT {
            continue;
        }
        let hash = ProgramHash::from_slice(&attribute.data).ok_or_else(|| {
            TransactionError::signature("invalid program hash in script attribute")
        })?;
        if !hashes.contains(&hash) {
            hashes.push(hash);
        }
    }

    Ok(hashes)
}

/// Verifies every program against the unsigned transaction.
pub fn signatures(tx: &Transaction, references: &References) -> Result<(), TransactionError> {
    let hashes = signer_hashes(tx, references)?;
    ela_script::run_programs(&tx.unsigned_bytes(), &hashes, &tx.programs)?;

    Ok(())
}

/// Checks that no input spends an immature coinbase, or a side-chain
/// proof-of-work transaction that is still unconfirmed.
pub fn invalid_utxo(
    ctx: &ValidationContext<'_>,
    references: &References,
) -> Result<(), TransactionError> {
    for (input, _) in references {
        let Some((referenced, height)) = ctx.state.transaction(&input.previous.tx_id) else {
            continue;
        };

        if referenced.is_coinbase()
            && ctx.height < height.saturating_add(ctx.params.coinbase_maturity)
        {
            return Err(TransactionError::IneffectiveCoinbase(
                "the utxo of coinbase is locking".to_string(),
            ));
        }

        if referenced.is_new_side_chain_pow_tx() {
            return Err(TransactionError::IneffectiveCoinbase(
                "cannot spend the utxo from a new sideChainPow tx".to_string(),
            ));
        }
    }

    Ok(())
}

/// Verifies a payload signature made with the key of a standard `code`.
///
/// Payloads signed by candidates and council members carry the signer's
/// redeem script instead of a bare key; multi-signature scripts can't sign
/// them.
pub fn code_signature(
    code: &[u8],
    data: &[u8],
    signature: &[u8],
) -> Result<(), TransactionError> {
    match ela_script::code_type(code) {
        Some(CodeType::Standard) => {
            let public_key = ela_script::public_key_from_standard(code)?;
            ela_script::verify_signature(public_key, data, signature)?;
            Ok(())
        }
        Some(CodeType::MultiSig) => Err(TransactionError::payload(
            "CR not support multi sign code",
        )),
        None => Err(TransactionError::payload("invalid redeem script code")),
    }
}

/// Verifies a payload signature made with a bare public key, naming the
/// signer in the error.
pub fn key_signature(
    public_key: &[u8],
    data: &[u8],
    signature: &[u8],
    signer: &str,
) -> Result<(), TransactionError> {
    ela_script::verify_signature(public_key, data, signature).map_err(|error| {
        TransactionError::signature(format!("{signer} signature check failed: {error}"))
    })
}

/// Returns the number of signatures a majority of `count` signers needs.
pub fn majority(count: usize) -> usize {
    count * 2 / 3 + 1
}

/// Returns the unsigned serialization written by `serialize`.
pub fn unsigned_bytes<F>(serialize: F) -> Vec<u8>
where
    F: FnOnce(&mut Vec<u8>) -> std::io::Result<()>,
{
    let mut data = Vec::new();
    serialize(&mut data).expect("writing to a Vec never fails");
    data
}
