//! Exact, cent-precision money amounts.
//!
//! Every [`Amount`] is held as a [`Decimal`] rounded to two places, so sums of
//! entered amounts reconcile to the cent no matter how many wage entries are
//! folded together.
//!
//! Two parsers are provided:
//!
//! - [`Amount::parse`] is lenient and never fails. It is meant for live form
//!   input, where a half-typed value such as `"-"` or `"12.3."` must not
//!   interrupt the user. Anything it cannot read becomes zero.
//! - [`str::parse`] (via [`FromStr`]) is strict and reports an
//!   [`AmountParseError`]. File loaders use it, and so does deserialization.
//!
//! Entered amounts are bounded: anything at or beyond [`Amount::LIMIT`] in
//! magnitude is rejected by the strict parser and read as zero by the lenient
//! one. Arithmetic on amounts saturates instead of overflowing.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::Amount;
//!
//! let wages = Amount::parse("$105,622.21");
//! assert_eq!(wages.as_decimal(), dec!(105622.21));
//! assert_eq!(wages.format(), "105,622.21");
//! assert_eq!(Amount::parse("abc"), Amount::ZERO);
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Error returned by the strict [`FromStr`] parser.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid amount '{input}'")]
pub struct AmountParseError {
    input: String,
}

/// A money amount at cent precision.
///
/// Serializes as a decimal string. Deserializes from either a string, read by
/// the strict parser, or a bare number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Exclusive magnitude bound for entered amounts: one quadrillion.
    pub const LIMIT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

    /// Wraps a decimal, rounding half-up (away from zero) to the cent.
    pub fn new(value: Decimal) -> Self {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        // -0.00 compares equal to zero but would print a sign
        if rounded.is_zero() {
            Self(Decimal::ZERO)
        } else {
            Self(rounded)
        }
    }

    pub fn from_cents(cents: i64) -> Self {
        Self::new(Decimal::new(cents, 2))
    }

    /// Lenient parse for live input.
    ///
    /// Drops every character other than ASCII digits, `.` and `-`, then reads
    /// what is left as a decimal. An empty or unreadable remainder yields
    /// [`Amount::ZERO`].
    pub fn parse(text: &str) -> Self {
        let kept: String = text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();

        if kept.is_empty() {
            return Self::ZERO;
        }

        match kept.parse::<Decimal>() {
            Ok(value) if Self::within_limit(value) => Self::new(value),
            Ok(_) => {
                debug!(input = %text, "out of range amount treated as zero");
                Self::ZERO
            }
            Err(e) => {
                debug!(input = %text, "unreadable amount treated as zero: {}", e);
                Self::ZERO
            }
        }
    }

    /// Bounded construction for external values. Fails when the magnitude is
    /// at or beyond [`Amount::LIMIT`].
    pub fn try_new(value: Decimal) -> Result<Self, AmountParseError> {
        if Self::within_limit(value) {
            Ok(Self::new(value))
        } else {
            Err(AmountParseError {
                input: value.to_string(),
            })
        }
    }

    fn within_limit(value: Decimal) -> bool {
        value.abs() < Self::LIMIT
    }

    /// Clamps an overflowed result to the extreme of the expected sign.
    fn saturate(
        checked: Option<Decimal>,
        positive: bool,
    ) -> Self {
        match checked {
            Some(value) => Self::new(value),
            None => {
                warn!(positive, "amount arithmetic overflowed; saturating");
                if positive {
                    Self(Decimal::MAX)
                } else {
                    Self(Decimal::MIN)
                }
            }
        }
    }

    /// Renders with thousands separators and exactly two fractional digits.
    /// No currency symbol is added.
    pub fn format(&self) -> String {
        let digits = format!("{:.2}", self.0.abs());
        let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 4);
        if self.is_negative() {
            grouped.push('-');
        }
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        grouped.push('.');
        grouped.push_str(cents);
        grouped
    }

    /// Multiplies by `factor` and rounds the product half-up to the cent.
    pub fn scale(
        &self,
        factor: Decimal,
    ) -> Self {
        let positive = self.0.is_sign_negative() == factor.is_sign_negative();
        Self::saturate(self.0.checked_mul(factor), positive)
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Strict parse: tolerates `$`, `,` and whitespace, nothing else.
    /// Blank input is zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '$' && *c != ',')
            .collect();
        if normalized.is_empty() {
            return Ok(Self::ZERO);
        }
        match normalized.parse::<Decimal>() {
            Ok(value) if Self::within_limit(value) => Ok(Self::new(value)),
            _ => Err(AmountParseError {
                input: s.to_string(),
            }),
        }
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str("a money amount as a string or number")
    }

    fn visit_str<E: de::Error>(
        self,
        v: &str,
    ) -> Result<Amount, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(
        self,
        v: i64,
    ) -> Result<Amount, E> {
        Amount::try_new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(
        self,
        v: u64,
    ) -> Result<Amount, E> {
        Amount::try_new(Decimal::from(v)).map_err(E::custom)
    }

    // Shortest round-trip text keeps 244340.8 from picking up binary noise.
    fn visit_f64<E: de::Error>(
        self,
        v: f64,
    ) -> Result<Amount, E> {
        v.to_string().parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

impl fmt::Display for Amount {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.pad(&self.format())
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(
        self,
        rhs: Amount,
    ) -> Amount {
        Amount::saturate(self.0.checked_add(rhs.0), !rhs.is_negative())
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(
        self,
        rhs: Amount,
    ) -> Amount {
        Amount::saturate(self.0.checked_sub(rhs.0), rhs.is_negative())
    }
}

impl AddAssign for Amount {
    fn add_assign(
        &mut self,
        rhs: Amount,
    ) {
        *self = *self + rhs;
    }
}

impl SubAssign for Amount {
    fn sub_assign(
        &mut self,
        rhs: Amount,
    ) {
        *self = *self - rhs;
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount::new(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // parse
    // =========================================================================

    #[test]
    fn parse_strips_currency_symbols_and_separators() {
        assert_eq!(Amount::parse("$1,234.56").as_decimal(), dec!(1234.56));
        assert_eq!(Amount::parse(" 4 886.92 USD").as_decimal(), dec!(4886.92));
    }

    #[test]
    fn parse_keeps_sign() {
        assert_eq!(Amount::parse("-250.00").as_decimal(), dec!(-250.00));
    }

    #[test]
    fn parse_unreadable_input_is_zero() {
        assert_eq!(Amount::parse(""), Amount::ZERO);
        assert_eq!(Amount::parse("abc"), Amount::ZERO);
        assert_eq!(Amount::parse("-"), Amount::ZERO);
        assert_eq!(Amount::parse("1.2.3"), Amount::ZERO);
    }

    #[test]
    fn parse_rounds_to_the_cent() {
        assert_eq!(Amount::parse("10.005").as_decimal(), dec!(10.01));
        assert_eq!(Amount::parse("10.004").as_decimal(), dec!(10.00));
    }

    #[test]
    fn strict_parse_rejects_garbage() {
        assert!("12abc".parse::<Amount>().is_err());
        assert_eq!("$2,112.55".parse::<Amount>(), Ok(Amount::from_cents(211_255)));
        assert_eq!("  ".parse::<Amount>(), Ok(Amount::ZERO));
    }

    // =========================================================================
    // format
    // =========================================================================

    #[test]
    fn format_groups_thousands_with_two_decimals() {
        assert_eq!(Amount::from_cents(24_434_080).format(), "244,340.80");
        assert_eq!(Amount::from_cents(100_000_000).format(), "1,000,000.00");
        assert_eq!(Amount::from_cents(99_999).format(), "999.99");
    }

    #[test]
    fn format_pads_whole_numbers() {
        assert_eq!(Amount::new(dec!(7)).format(), "7.00");
        assert_eq!(Amount::ZERO.format(), "0.00");
    }

    #[test]
    fn format_negative_amounts() {
        assert_eq!(Amount::from_cents(-10).format(), "-0.10");
        assert_eq!(Amount::from_cents(-123_456).format(), "-1,234.56");
    }

    #[test]
    fn negative_zero_formats_unsigned() {
        assert_eq!(Amount::new(dec!(-0.001)).format(), "0.00");
    }

    // =========================================================================
    // arithmetic
    // =========================================================================

    #[test]
    fn repeated_addition_does_not_drift() {
        let total: Amount = std::iter::repeat_n(Amount::parse("0.10"), 1000).sum();

        assert_eq!(total, Amount::from_cents(10_000));
    }

    #[test]
    fn scale_rounds_half_up() {
        let tax = Amount::parse("244340.80").scale(dec!(0.02));

        assert_eq!(tax.as_decimal(), dec!(4886.82));
    }

    #[test]
    fn subtraction_can_go_negative() {
        let balance = Amount::parse("4886.82") - Amount::parse("4886.92");

        assert_eq!(balance, Amount::from_cents(-10));
        assert!(balance.is_negative());
        assert_eq!(balance.abs(), Amount::from_cents(10));
    }

    #[test]
    fn limit_is_one_quadrillion() {
        assert_eq!(Amount::LIMIT, dec!(1_000_000_000_000_000));
    }

    #[test]
    fn out_of_range_input_fails_closed() {
        let widest = "79228162514264337593543950335";

        assert_eq!(Amount::parse(widest), Amount::ZERO);
        assert_eq!(Amount::parse("1000000000000000"), Amount::ZERO);
        assert_eq!(Amount::parse("999999999999999.99").as_decimal(), dec!(999999999999999.99));
        assert!(widest.parse::<Amount>().is_err());
        assert!("-1,000,000,000,000,000".parse::<Amount>().is_err());
        assert!(Amount::try_new(Decimal::MAX).is_err());
    }

    #[test]
    fn arithmetic_saturates_instead_of_overflowing() {
        let top = Amount::new(Decimal::MAX);
        let bottom = Amount::new(Decimal::MIN);

        assert_eq!(top + top, top);
        assert_eq!(bottom - top, bottom);
        assert_eq!(top - Amount::from_cents(-100), top);
        assert_eq!(top.scale(dec!(2)), top);
        assert_eq!(top.scale(dec!(-2)), bottom);

        let mut running = top;
        running += top;
        running -= bottom;
        assert_eq!(running, top);
        assert_eq!([top, top, top].iter().sum::<Amount>(), top);
    }

    // =========================================================================
    // deserialize
    // =========================================================================

    fn from_text(text: &str) -> Result<Amount, de::value::Error> {
        let deserializer: de::value::StrDeserializer<'_, de::value::Error> =
            de::IntoDeserializer::into_deserializer(text);
        Amount::deserialize(deserializer)
    }

    #[test]
    fn deserialize_reads_strings_strictly() {
        assert_eq!(
            from_text("$1,000.00").expect("Failed to read amount"),
            Amount::from_cents(100_000)
        );
        assert_eq!(from_text("").expect("Failed to read amount"), Amount::ZERO);
        assert!(from_text("12abc").is_err());
        assert!(from_text("79228162514264337593543950335").is_err());
    }

    #[test]
    fn deserialize_reads_numbers() {
        let float: de::value::F64Deserializer<de::value::Error> =
            de::IntoDeserializer::into_deserializer(244340.8_f64);
        let whole: de::value::I64Deserializer<de::value::Error> =
            de::IntoDeserializer::into_deserializer(-250_i64);
        let huge: de::value::U64Deserializer<de::value::Error> =
            de::IntoDeserializer::into_deserializer(u64::MAX);

        assert_eq!(
            Amount::deserialize(float).expect("Failed to read float"),
            Amount::from_cents(24_434_080)
        );
        assert_eq!(
            Amount::deserialize(whole).expect("Failed to read integer"),
            Amount::from_cents(-25_000)
        );
        assert!(Amount::deserialize(huge).is_err());
    }

    proptest! {
        #[test]
        fn parse_inverts_format(cents in -100_000_000_000i64..100_000_000_000i64) {
            let amount = Amount::from_cents(cents);

            prop_assert_eq!(Amount::parse(&amount.format()), amount);
        }
    }
}
