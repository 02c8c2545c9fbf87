//! Fixed-precision token amount.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Fractional decimal digits carried by a [`TokenAmount`].
pub const FRACTIONAL_DIGITS: u32 = 8;
/// Maximum integer decimal digits (mirrors the DECIMAL(18,8) column).
pub const INTEGER_DIGITS: u32 = 18;

const UNITS_PER_TOKEN: i128 = 10i128.pow(FRACTIONAL_DIGITS);
const MAX_UNITS: i128 = 10i128.pow(INTEGER_DIGITS + FRACTIONAL_DIGITS);

/// A token amount with fixed 18.8 decimal precision.
///
/// Amount is stored as a count of 10^-8 token units to avoid floating-point
/// precision issues. Non-negative by construction; callers that require a
/// strictly positive amount check [`TokenAmount::is_zero`].
///
/// On the wire the amount is a decimal string (`"1.5"`); JSON numbers are
/// also accepted on input for convenience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(i128);

impl TokenAmount {
    /// The zero amount.
    pub const ZERO: TokenAmount = TokenAmount(0);

    /// Creates an amount from a raw count of 10^-8 token units.
    pub fn from_units(units: i128) -> Result<Self, DomainError> {
        if units < 0 {
            return Err(DomainError::InvalidAmount(
                "amount cannot be negative".into(),
            ));
        }
        if units >= MAX_UNITS {
            return Err(DomainError::InvalidAmount(format!(
                "amount exceeds {INTEGER_DIGITS} integer digits"
            )));
        }
        Ok(Self(units))
    }

    /// Returns the amount as a count of 10^-8 token units.
    pub fn units(&self) -> i128 {
        self.0
    }

    /// Returns true for the zero amount.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for TokenAmount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(int_part) || (s.contains('.') && !digits(frac_part)) {
            return Err(DomainError::InvalidAmount(format!(
                "not a decimal amount: {s:?}"
            )));
        }
        if int_part.trim_start_matches('0').len() > INTEGER_DIGITS as usize {
            return Err(DomainError::InvalidAmount(format!(
                "amount exceeds {INTEGER_DIGITS} integer digits"
            )));
        }
        if frac_part.len() > FRACTIONAL_DIGITS as usize {
            return Err(DomainError::InvalidAmount(format!(
                "amount exceeds {FRACTIONAL_DIGITS} fractional digits"
            )));
        }

        let mut units: i128 = 0;
        for b in int_part.bytes() {
            units = units * 10 + i128::from(b - b'0');
        }
        units *= UNITS_PER_TOKEN;

        let mut frac: i128 = 0;
        for b in frac_part.bytes() {
            frac = frac * 10 + i128::from(b - b'0');
        }
        frac *= 10i128.pow(FRACTIONAL_DIGITS - frac_part.len() as u32);

        Self::from_units(units + frac)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNITS_PER_TOKEN;
        let frac = self.0 % UNITS_PER_TOKEN;
        write!(f, "{whole}.{frac:08}")
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Number(n) => n.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let amount: TokenAmount = "1.5".parse().unwrap();
        assert_eq!(amount.units(), 150_000_000);
        assert_eq!(amount.to_string(), "1.50000000");
    }

    #[test]
    fn test_parse_integer() {
        let amount: TokenAmount = "42".parse().unwrap();
        assert_eq!(amount.units(), 4_200_000_000);
    }

    #[test]
    fn test_zero() {
        assert!(TokenAmount::ZERO.is_zero());
        assert_eq!("0".parse::<TokenAmount>().unwrap(), TokenAmount::ZERO);
        assert!(!"1.5".parse::<TokenAmount>().unwrap().is_zero());
    }

    #[test]
    fn test_parse_full_precision() {
        let amount: TokenAmount = "0.00000001".parse().unwrap();
        assert_eq!(amount.units(), 1);
        assert_eq!(amount.to_string(), "0.00000001");
    }

    #[test]
    fn test_round_trip_preserves_value() {
        for s in ["1.5", "0.1", "999999999999999999.99999999", "0"] {
            let amount: TokenAmount = s.parse().unwrap();
            let round_tripped: TokenAmount = amount.to_string().parse().unwrap();
            assert_eq!(amount, round_tripped, "round trip of {s}");
        }
    }

    #[test]
    fn test_negative_rejected() {
        assert!("-1".parse::<TokenAmount>().is_err());
        assert!(TokenAmount::from_units(-1).is_err());
    }

    #[test]
    fn test_too_many_fractional_digits_rejected() {
        assert!("0.000000001".parse::<TokenAmount>().is_err());
    }

    #[test]
    fn test_too_many_integer_digits_rejected() {
        assert!("1000000000000000000".parse::<TokenAmount>().is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        for s in ["", ".", "1.", ".5", "1.5.0", "abc", "1e3", "1,5"] {
            assert!(s.parse::<TokenAmount>().is_err(), "accepted {s:?}");
        }
    }

    #[test]
    fn test_json_string_and_number_accepted() {
        let from_string: TokenAmount = serde_json::from_str(r#""1.5""#).unwrap();
        let from_number: TokenAmount = serde_json::from_str("1.5").unwrap();
        assert_eq!(from_string, from_number);
        assert_eq!(serde_json::to_string(&from_string).unwrap(), r#""1.50000000""#);
    }
}
