//! Building transactions from raw type tags.
//!
//! Callers that read type tags off the wire, or from tools, get the same
//! rejection for unknown tags that validation gives for malformed payloads.

use ela_chain::{
    serialization::ElaDeserialize,
    transaction::{self, Attribute, Input, Output, Payload, Program, Transaction, TxType, TxVersion},
};

use crate::error::TransactionError;

fn tx_type(tag: u8) -> Result<TxType, TransactionError> {
    TxType::from_u8(tag).ok_or_else(|| TransactionError::payload("invalid transaction type"))
}

/// Creates a transaction of the type tagged `tag` from its fields.
///
/// Rejects unknown tags, and payloads that belong to another type.
#[allow(clippy::too_many_arguments)]
pub fn create_transaction(
    version: TxVersion,
    tag: u8,
    payload_version: u8,
    payload: Payload,
    attributes: Vec<Attribute>,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    lock_time: u32,
    programs: Vec<Program>,
) -> Result<Transaction, TransactionError> {
    let tx_type = tx_type(tag)?;
    if payload.tx_type() != tx_type {
        return Err(TransactionError::payload(
            "transaction payload type does not match the transaction type",
        ));
    }

    Ok(Transaction::new(
        version,
        tx_type,
        payload_version,
        payload,
        attributes,
        inputs,
        outputs,
        lock_time,
        programs,
    ))
}

/// Returns a zero-valued transaction of the type tagged `tag`, with that
/// type's default payload.
pub fn transaction_by_type(tag: u8) -> Result<Transaction, TransactionError> {
    Ok(Transaction::by_type(tx_type(tag)?))
}

/// Reads the version and type at the start of a serialized transaction.
pub fn deserialize_transaction_header(bytes: &[u8]) -> Result<(TxVersion, TxType), TransactionError> {
    Ok(transaction::deserialize_transaction_header(bytes)?)
}

/// Reads a whole serialized transaction.
///
/// Trailing bytes are rejected.
pub fn deserialize_transaction(bytes: &[u8]) -> Result<Transaction, TransactionError> {
    let mut reader = bytes;
    let tx = Transaction::ela_deserialize(&mut reader)?;
    if !reader.is_empty() {
        return Err(TransactionError::payload(
            "unexpected trailing bytes after transaction",
        ));
    }

    Ok(tx)
}

#[cfg(test)]
mod tests {
    use ela_chain::{
        serialization::ElaSerialize,
        transaction::payload::Record,
    };

    use super::*;

    #[test]
    fn unknown_tags_are_rejected() {
        ela_test::init();

        let error = transaction_by_type(0xff).unwrap_err();
        assert_eq!(error.to_string(), "[Payload] invalid transaction type");

        let error = deserialize_transaction_header(&[0x80 | 0x09, 0xff]).unwrap_err();
        assert_eq!(error.to_string(), "[Payload] invalid transaction type");
    }

    #[test]
    fn every_type_has_a_default_transaction() {
        ela_test::init();

        for tx_type in TxType::ALL {
            let tx = transaction_by_type(*tx_type as u8).expect("known tag");
            assert_eq!(tx.tx_type, *tx_type);
            assert!(tx.payload_matches_type());
        }
    }

    #[test]
    fn mismatched_payloads_are_rejected() {
        ela_test::init();

        let error = create_transaction(
            TxVersion::V09,
            TxType::TransferAsset as u8,
            0,
            Payload::Record(Record::default()),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            0,
            Vec::new(),
        )
        .unwrap_err();

        assert_eq!(
            error.to_string(),
            "[Payload] transaction payload type does not match the transaction type"
        );
    }

    #[test]
    fn header_matches_serialized_transaction() -> color_eyre::eyre::Result<()> {
        ela_test::init();

        let tx = transaction_by_type(TxType::TransferAsset as u8)?;
        let tx = Transaction {
            version: TxVersion::V09,
            ..tx
        };
        let bytes = tx.ela_serialize_to_vec()?;

        assert_eq!(
            deserialize_transaction_header(&bytes)?,
            (TxVersion::V09, TxType::TransferAsset)
        );
        assert_eq!(deserialize_transaction(&bytes)?, tx);

        let mut trailing = bytes;
        trailing.push(0);
        assert!(deserialize_transaction(&trailing).is_err());

        Ok(())
    }
}
