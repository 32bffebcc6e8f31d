//! Fixed-point ELA amounts, counted in sela.
//!
//! Arithmetic on [`Amount`]s is checked: operations return
//! [`Result`](std::result::Result)s instead of silently wrapping.

use std::{fmt, io, iter::Sum, str::FromStr};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::serialization::{ElaDeserialize, ElaSerialize, SerializationError};

#[cfg(any(test, feature = "proptest-impl"))]
pub mod arbitrary;


/// The result of an amount operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The number of sela in one ELA.
pub const COIN: i64 = 100_000_000;

/// The number of decimal places of an ELA amount.
pub const PRECISION: u8 = 8;

/// A signed fixed-point amount with eight decimal places.
///
/// Negative values are representable so that intermediate balances can be
/// computed; consensus rules reject negative output values explicitly.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Creates an amount from a number of sela.
    pub const fn from_sela(sela: i64) -> Self {
        Self(sela)
    }

    /// Creates an amount from a whole number of ELA.
    ///
    /// Panics if the value overflows, so only use this for constants.
    pub const fn from_ela(ela: i64) -> Self {
        match ela.checked_mul(COIN) {
            Some(sela) => Self(sela),
            None => panic!("ELA constant overflows an amount"),
        }
    }

    /// Returns the number of sela in this amount.
    pub const fn sela(&self) -> i64 {
        self.0
    }

    /// Returns `true` if this amount is below zero.
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checked addition.
    pub fn checked_add(self, rhs: Amount) -> Result<Amount> {
        self.0
            .checked_add(rhs.0)
            .map(Amount)
            .ok_or(Error::Overflow { lhs: self, rhs })
    }

    /// Checked subtraction.
    pub fn checked_sub(self, rhs: Amount) -> Result<Amount> {
        self.0
            .checked_sub(rhs.0)
            .map(Amount)
            .ok_or(Error::Overflow { lhs: self, rhs })
    }

    /// Returns `numerator / denominator` of this amount, rounding toward zero.
    ///
    /// The multiplication is done in 128 bits, so it can't overflow for
    /// ratios below one.
    pub fn ratio(self, numerator: i64, denominator: i64) -> Result<Amount> {
        if denominator == 0 {
            return Err(Error::DivideByZero);
        }
        let value = i128::from(self.0) * i128::from(numerator) / i128::from(denominator);
        i64::try_from(value)
            .map(Amount)
            .map_err(|_| Error::Overflow {
                lhs: self,
                rhs: Amount(numerator),
            })
    }

    /// Returns `true` if this amount can be expressed with `precision`
    /// decimal places.
    pub fn is_precise(&self, precision: u8) -> bool {
        if precision >= PRECISION {
            return true;
        }
        let unit = 10i64.pow(u32::from(PRECISION - precision));
        self.0 % unit == 0
    }

    /// Sums `amounts`, failing on overflow.
    pub fn try_sum<I>(amounts: I) -> Result<Amount>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let coin = COIN.unsigned_abs();
        write!(f, "{}{}.{:08}", sign, abs / coin, abs % coin)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Amount").field(&self.0).finish()
    }
}

impl From<i64> for Amount {
    fn from(sela: i64) -> Self {
        Amount(sela)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl<'a> Sum<&'a Amount> for Result<Amount> {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        Amount::try_sum(iter.copied())
    }
}

impl Sum<Amount> for Result<Amount> {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        Amount::try_sum(iter)
    }
}

impl FromStr for Amount {
    type Err = Error;

    /// Parses a decimal ELA string such as `"1.5"` or `"-0.00000001"`.
    fn from_str(s: &str) -> Result<Self> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty()
            || fraction.len() > usize::from(PRECISION)
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::Parse(s.to_owned()));
        }

        let whole: i64 = whole.parse().map_err(|_| Error::Parse(s.to_owned()))?;
        let mut fraction_sela: i64 = 0;
        for (i, b) in fraction.bytes().enumerate() {
            let digit = i64::from(b - b'0');
            fraction_sela += digit * 10i64.pow(u32::from(PRECISION) - 1 - i as u32);
        }

        let sela = whole
            .checked_mul(COIN)
            .and_then(|w| w.checked_add(fraction_sela))
            .ok_or_else(|| Error::Parse(s.to_owned()))?;

        Ok(Amount(if negative { -sela } else { sela }))
    }
}

impl ElaSerialize for Amount {
    fn ela_serialize<W: io::Write>(&self, mut writer: W) -> std::result::Result<(), io::Error> {
        writer.write_i64::<LittleEndian>(self.0)
    }
}

impl ElaDeserialize for Amount {
    fn ela_deserialize<R: io::Read>(mut reader: R) -> std::result::Result<Self, SerializationError> {
        Ok(Amount(reader.read_i64::<LittleEndian>()?))
    }
}

#[allow(missing_docs)]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors that can be returned when validating or combining `Amount`s
pub enum Error {
    /// input {lhs:?} + {rhs:?} would overflow
    #[error("amount arithmetic overflowed: {lhs:?} and {rhs:?}")]
    Overflow { lhs: Amount, rhs: Amount },

    #[error("amount ratio with a zero denominator")]
    DivideByZero,

    #[error("invalid amount string: {0:?}")]
    Parse(String),
}
