//! Errors that can occur when checking transactions.
//!
//! Every rejection belongs to exactly one [`ErrorKind`]. The kind is what
//! callers dispatch on; the detail string says which rule was broken, and
//! is what operators see in logs.

use std::fmt;

use thiserror::Error;

use ela_chain::{amount, serialization::SerializationError};
use ela_state::StateError;

/// The category of a transaction rejection.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The transaction is already in the chain.
    DuplicateTransaction,
    /// An input is malformed or spends something it can't.
    InvalidInput,
    /// An output is malformed or pays somewhere it can't.
    InvalidOutput,
    /// An output value is finer than its asset allows.
    AssetPrecision,
    /// An attribute or program is malformed or missing.
    AttributeProgram,
    /// The payload breaks a type-specific rule.
    Payload,
    /// A side-chain transaction is referenced twice.
    SidechainDuplicate,
    /// The serialized transaction is too small or too large.
    Size,
    /// The type or payload version is not active at this height.
    HeightVersion,
    /// An input references an unknown output.
    UnknownReferencedTx,
    /// An input spends a locked output too early.
    UtxoLocked,
    /// An input is already spent.
    DoubleSpend,
    /// Fees or amounts don't add up.
    Balance,
    /// A program or payload signature doesn't verify.
    Signature,
    /// A coinbase output is spent before it matures.
    IneffectiveCoinbase,
    /// The transaction is not allowed under the current consensus mode.
    Validation,
}

impl ErrorKind {
    /// Returns the stable marker used in error messages and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DuplicateTransaction => "DuplicateTransaction",
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::InvalidOutput => "InvalidOutput",
            ErrorKind::AssetPrecision => "AssetPrecision",
            ErrorKind::AttributeProgram => "AttributeProgram",
            ErrorKind::Payload => "Payload",
            ErrorKind::SidechainDuplicate => "SidechainDuplicate",
            ErrorKind::Size => "Size",
            ErrorKind::HeightVersion => "HeightVersion",
            ErrorKind::UnknownReferencedTx => "UnknownReferencedTx",
            ErrorKind::UtxoLocked => "UtxoLocked",
            ErrorKind::DoubleSpend => "DoubleSpend",
            ErrorKind::Balance => "Balance",
            ErrorKind::Signature => "Signature",
            ErrorKind::IneffectiveCoinbase => "IneffectiveCoinbase",
            ErrorKind::Validation => "Validation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified transaction rejection.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum TransactionError {
    #[error("[DuplicateTransaction] {0}")]
    DuplicateTransaction(String),

    #[error("[InvalidInput] {0}")]
    InvalidInput(String),

    #[error("[InvalidOutput] {0}")]
    InvalidOutput(String),

    #[error("[AssetPrecision] {0}")]
    AssetPrecision(String),

    #[error("[AttributeProgram] {0}")]
    AttributeProgram(String),

    #[error("[Payload] {0}")]
    Payload(String),

    #[error("[SidechainDuplicate] {0}")]
    SidechainDuplicate(String),

    #[error("[Size] {0}")]
    Size(String),

    #[error("[HeightVersion] {0}")]
    HeightVersion(String),

    #[error("[UnknownReferencedTx] {0}")]
    UnknownReferencedTx(String),

    #[error("[UtxoLocked] {0}")]
    UtxoLocked(String),

    #[error("[DoubleSpend] {0}")]
    DoubleSpend(String),

    #[error("[Balance] {0}")]
    Balance(String),

    #[error("[Signature] {0}")]
    Signature(String),

    #[error("[IneffectiveCoinbase] {0}")]
    IneffectiveCoinbase(String),

    #[error("[Validation] {0}")]
    Validation(String),
}

impl TransactionError {
    /// Returns the category of this rejection.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransactionError::DuplicateTransaction(_) => ErrorKind::DuplicateTransaction,
            TransactionError::InvalidInput(_) => ErrorKind::InvalidInput,
            TransactionError::InvalidOutput(_) => ErrorKind::InvalidOutput,
            TransactionError::AssetPrecision(_) => ErrorKind::AssetPrecision,
            TransactionError::AttributeProgram(_) => ErrorKind::AttributeProgram,
            TransactionError::Payload(_) => ErrorKind::Payload,
            TransactionError::SidechainDuplicate(_) => ErrorKind::SidechainDuplicate,
            TransactionError::Size(_) => ErrorKind::Size,
            TransactionError::HeightVersion(_) => ErrorKind::HeightVersion,
            TransactionError::UnknownReferencedTx(_) => ErrorKind::UnknownReferencedTx,
            TransactionError::UtxoLocked(_) => ErrorKind::UtxoLocked,
            TransactionError::DoubleSpend(_) => ErrorKind::DoubleSpend,
            TransactionError::Balance(_) => ErrorKind::Balance,
            TransactionError::Signature(_) => ErrorKind::Signature,
            TransactionError::IneffectiveCoinbase(_) => ErrorKind::IneffectiveCoinbase,
            TransactionError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Returns the human-readable reason, without the kind marker.
    pub fn detail(&self) -> &str {
        match self {
            TransactionError::DuplicateTransaction(detail)
            | TransactionError::InvalidInput(detail)
            | TransactionError::InvalidOutput(detail)
            | TransactionError::AssetPrecision(detail)
            | TransactionError::AttributeProgram(detail)
            | TransactionError::Payload(detail)
            | TransactionError::SidechainDuplicate(detail)
            | TransactionError::Size(detail)
            | TransactionError::HeightVersion(detail)
            | TransactionError::UnknownReferencedTx(detail)
            | TransactionError::UtxoLocked(detail)
            | TransactionError::DoubleSpend(detail)
            | TransactionError::Balance(detail)
            | TransactionError::Signature(detail)
            | TransactionError::IneffectiveCoinbase(detail)
            | TransactionError::Validation(detail) => detail,
        }
    }

    /// A payload rule violation.
    pub fn payload(detail: impl Into<String>) -> Self {
        TransactionError::Payload(detail.into())
    }

    /// An input rule violation.
    pub fn input(detail: impl Into<String>) -> Self {
        TransactionError::InvalidInput(detail.into())
    }

    /// An output rule violation.
    pub fn output(detail: impl Into<String>) -> Self {
        TransactionError::InvalidOutput(detail.into())
    }

    /// An attribute or program rule violation.
    pub fn attribute_program(detail: impl Into<String>) -> Self {
        TransactionError::AttributeProgram(detail.into())
    }

    /// A fee or amount rule violation.
    pub fn balance(detail: impl Into<String>) -> Self {
        TransactionError::Balance(detail.into())
    }

    /// A signature failure.
    pub fn signature(detail: impl Into<String>) -> Self {
        TransactionError::Signature(detail.into())
    }

    /// An activation height violation.
    pub fn height_version(detail: impl Into<String>) -> Self {
        TransactionError::HeightVersion(detail.into())
    }
}

impl From<ela_script::Error> for TransactionError {
    fn from(error: ela_script::Error) -> Self {
        TransactionError::Signature(error.to_string())
    }
}

impl From<SerializationError> for TransactionError {
    fn from(error: SerializationError) -> Self {
        match error {
            SerializationError::Parse(reason) => TransactionError::Payload(reason.to_string()),
            error => TransactionError::Payload(error.to_string()),
        }
    }
}

impl From<StateError> for TransactionError {
    fn from(error: StateError) -> Self {
        TransactionError::UnknownReferencedTx(error.to_string())
    }
}

impl From<amount::Error> for TransactionError {
    fn from(error: amount::Error) -> Self {
        TransactionError::Balance(error.to_string())
    }
}
