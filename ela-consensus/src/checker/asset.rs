//! Asset registration, transfers and records.

use std::collections::HashSet;

use ela_chain::{
    amount::PRECISION,
    transaction::{
        output_payload::{OutputPayload, VoteType},
        Payload, Transaction, TxVersion,
    },
    ProgramHash,
};
use ela_state::References;

use super::TransactionChecker;
use crate::{context::ValidationContext, error::TransactionError, transaction::check};

/// Registers a new asset.
pub struct RegisterAsset;

impl TransactionChecker for RegisterAsset {
    fn check_transaction_payload(
        &self,
        tx: &Transaction,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), TransactionError> {
        let Payload::RegisterAsset(payload) = &tx.payload else {
            return Err(check::payload_mismatch());
        };

        if payload.asset.precision > PRECISION {
            return Err(TransactionError::payload("invalid asset precision"));
        }
        if payload.amount.is_negative() || !payload.amount.is_precise(payload.asset.precision) {
            return Err(TransactionError::payload(
                "invalid asset value, out of precise",
            ));
        }

        Ok(())
    }

    fn is_allowed_in_pow_consensus(&self, _tx: &Transaction, _references: &References) -> bool {
        false
    }
}

/// An ordinary transfer, which may also carry vote outputs.
pub struct TransferAsset;

impl TransactionChecker for TransferAsset {
    /// While blocks are mined with proof of work, only transfers that vote
    /// for producers with the voter's own funds are accepted, so that
    /// voters can bring DPoS back.
    fn is_allowed_in_pow_consensus(&self, tx: &Transaction, references: &References) -> bool {
        if tx.version < TxVersion::V09 {
            return false;
        }

        let input_hashes: HashSet<&ProgramHash> = references
            .iter()
            .map(|(_, output)| &output.program_hash)
            .collect();

        let mut votes = false;
        for output in &tx.outputs {
            if !input_hashes.contains(&output.program_hash) {
                return false;
            }

            match &output.payload {
                OutputPayload::Vote(vote) => {
                    if vote
                        .contents
                        .iter()
                        .any(|content| content.kind() != Some(VoteType::Delegate))
                    {
                        return false;
                    }
                    votes = true;
                }
                OutputPayload::Default => {}
                _ => return false,
            }
        }

        votes
    }
}

/// Records arbitrary data on chain.
pub struct Record;

impl TransactionChecker for Record {
    fn is_allowed_in_pow_consensus(&self, _tx: &Transaction, _references: &References) -> bool {
        false
    }
}
