use std::fmt::{self, Display, Formatter};
use std::ops::{Add, Mul};
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// The largest accepted amount: 999,999.99.
pub const MAX_MONEY: Money = Money(99_999_999);

/// An amount of money, stored in cents.
///
/// Money is transmitted as a string with two decimals (`"12.50"`). Parsing accepts the
/// looser formats users type into forms: `12`, `12.5`, `$12.50` and `1,234.50`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    #[inline]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("empty money string")]
    Empty,
    #[error("invalid money string")]
    Format,
    #[error("money amount too large")]
    Overflow,
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('$').unwrap_or(s);

        if s.is_empty() {
            return Err(MoneyError::Empty);
        }

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (s, None),
        };

        let whole = parse_whole(whole)?;

        let frac = match frac {
            None => 0,
            Some(frac) => match frac.as_bytes() {
                [a] if a.is_ascii_digit() => i64::from(a - b'0') * 10,
                [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
                    i64::from(a - b'0') * 10 + i64::from(b - b'0')
                }
                _ => return Err(MoneyError::Format),
            },
        };

        whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(frac))
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }
}

/// Parses the integer part, allowing `,` separators between groups of three digits.
fn parse_whole(s: &str) -> Result<i64, MoneyError> {
    if s.is_empty() {
        return Err(MoneyError::Format);
    }

    let mut groups = s.split(',');
    let mut value: i64 = 0;

    let first = groups.next().unwrap_or_default();
    let grouped = s.contains(',');
    if first.is_empty() || (grouped && first.len() > 3) {
        return Err(MoneyError::Format);
    }

    for (index, group) in std::iter::once(first).chain(groups).enumerate() {
        if index > 0 && group.len() != 3 {
            return Err(MoneyError::Format);
        }

        for byte in group.bytes() {
            if !byte.is_ascii_digit() {
                return Err(MoneyError::Format);
            }

            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(byte - b'0')))
                .ok_or(MoneyError::Overflow)?;
        }
    }

    Ok(value)
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MoneyVisitor;

        impl<'de> Visitor<'de> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("a money string or number")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(v)
                    .ok()
                    .and_then(|v| v.checked_mul(100))
                    .map(Money)
                    .ok_or_else(|| E::custom(MoneyError::Overflow))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if v < 0 {
                    return Err(E::custom(MoneyError::Format));
                }

                self.visit_u64(v as u64)
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if !v.is_finite() || v < 0.0 || v > i64::MAX as f64 / 100.0 {
                    return Err(E::custom(MoneyError::Format));
                }

                Ok(Money((v * 100.0).round() as i64))
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}
