/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Number of decimal digits carried by [`Price`].
const SCALE: u32 = 4;

/// A fixed-point price with exactly four decimal digits of precision.
///
/// Internally a price is stored as an `i64` scaled by `10^4`, so
/// `"10.01"` and `"10.0100"` compare and hash identically. Arithmetic on
/// the scaled representation is exact; there is no floating point
/// anywhere near order prices.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Price {
    unscaled: i64,
}

/// Error returned when a string does not parse as a valid [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid price: {0}")]
pub struct InvalidPrice(pub String);

impl Price {
    /// Constructs a `Price` directly from its scaled representation.
    pub fn from_unscaled(unscaled: i64) -> Self {
        Self { unscaled }
    }

    /// Returns the raw scaled integer (`price * 10^4`).
    pub fn unscaled(&self) -> i64 {
        self.unscaled
    }

    /// Zero price, used as a sentinel in a few call sites (never a valid
    /// resting price).
    pub fn zero() -> Self {
        Self { unscaled: 0 }
    }

    fn parse(s: &str) -> Result<Self, InvalidPrice> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidPrice(s.to_string()));
        }
        let negative = s.starts_with('-');
        let body = if negative { &s[1..] } else { s };

        let (int_part, dec_part) = match body.split_once('.') {
            Some((i, d)) => (i, d),
            None => (body, ""),
        };

        if int_part.is_empty() && dec_part.is_empty() {
            return Err(InvalidPrice(s.to_string()));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !dec_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(InvalidPrice(s.to_string()));
        }

        let mut dec_padded = dec_part.to_string();
        if dec_padded.len() > SCALE as usize {
            dec_padded.truncate(SCALE as usize);
        } else {
            while dec_padded.len() < SCALE as usize {
                dec_padded.push('0');
            }
        }

        let int_part = if int_part.is_empty() { "0" } else { int_part };
        let combined = format!("{int_part}{dec_padded}");
        let magnitude: i64 = combined
            .parse()
            .map_err(|_| InvalidPrice(s.to_string()))?;

        Ok(Self {
            unscaled: if negative { -magnitude } else { magnitude },
        })
    }

    /// Renders the price back to its canonical decimal string: no
    /// trailing zeros in the fractional part, and no trailing `.` when
    /// the value is a whole number.
    pub fn to_decimal_string(&self) -> String {
        let negative = self.unscaled < 0;
        let magnitude = self.unscaled.unsigned_abs();
        let divisor = 10i64.pow(SCALE) as u64;
        let int_part = magnitude / divisor;
        let frac_part = magnitude % divisor;

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&int_part.to_string());

        if frac_part != 0 {
            let frac_str = format!("{:0width$}", frac_part, width = SCALE as usize);
            let trimmed = frac_str.trim_end_matches('0');
            out.push('.');
            out.push_str(trimmed);
        }
        out
    }
}

impl FromStr for Price {
    type Err = InvalidPrice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Price::parse(s)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        self.unscaled.cmp(&other.unscaled)
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal price string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Price::parse(v).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(PriceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_number() {
        assert_eq!(Price::from_str("10").unwrap().unscaled(), 100_000);
    }

    #[test]
    fn parses_exact_scale() {
        assert_eq!(Price::from_str("10.0100").unwrap().unscaled(), 100_100);
    }

    #[test]
    fn pads_short_decimal() {
        assert_eq!(Price::from_str("10.01").unwrap().unscaled(), 100_100);
    }

    #[test]
    fn truncates_long_decimal() {
        assert_eq!(Price::from_str("10.012345").unwrap().unscaled(), 100_123);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Price::from_str("abc").is_err());
        assert!(Price::from_str("").is_err());
        assert!(Price::from_str("1.2.3").is_err());
    }

    #[test]
    fn renders_without_trailing_zeros() {
        assert_eq!(Price::from_str("10.0100").unwrap().to_decimal_string(), "10.01");
        assert_eq!(Price::from_str("10.00").unwrap().to_decimal_string(), "10");
        assert_eq!(Price::from_str("10.0001").unwrap().to_decimal_string(), "10.0001");
    }

    #[test]
    fn round_trips_through_decimal_string() {
        for s in ["10.01", "0.0001", "999", "10.015", "10.1"] {
            let p = Price::from_str(s).unwrap();
            let rendered = p.to_decimal_string();
            assert_eq!(Price::from_str(&rendered).unwrap().unscaled(), p.unscaled());
        }
    }

    #[test]
    fn orders_by_scaled_value() {
        let a = Price::from_str("10.01").unwrap();
        let b = Price::from_str("10.02").unwrap();
        assert!(a < b);
    }

    #[test]
    fn serializes_as_string() {
        let p = Price::from_str("10.01").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"10.01\"");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    proptest::proptest! {
        #[test]
        fn unscaled_round_trips_through_decimal_string(unscaled in 0i64..1_000_000_000) {
            let p = Price::from_unscaled(unscaled);
            let rendered = p.to_decimal_string();
            let parsed = Price::from_str(&rendered).unwrap();
            proptest::prop_assert_eq!(parsed.unscaled(), unscaled);
        }
    }
}
