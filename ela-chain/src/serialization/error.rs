use std::{io, num::TryFromIntError, string::FromUtf8Error};

use thiserror::Error;

/// Why a consensus encoding could not be read.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// The reader failed, or the data ended early.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The bytes were read but do not describe a valid value.
    #[error("parse error: {0}")]
    Parse(&'static str),

    /// A length prefix does not fit in a `usize`.
    #[error("length prefix too large: {0}")]
    TryFromIntError(#[from] TryFromIntError),

    /// A var-string field held invalid UTF-8.
    #[error("string field is not valid utf-8")]
    Utf8(#[from] FromUtf8Error),
}
