//! Fixed-point monetary amounts.
//!
//! Amounts are stored as an unsigned number of cents. Totals in this domain are
//! never negative (discounts floor at zero), so every operation saturates
//! instead of wrapping or going below zero.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

/// A non-negative amount of money with two decimal places.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    /// `self × quantity` (line amount), saturating at `u64::MAX` cents.
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }

    pub fn saturating_add(self, other: Money) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtraction floored at zero.
    pub fn saturating_sub(self, other: Money) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Brazilian display format used on screens and documents: `R$ 1.234,56`.
    pub fn to_brl(self) -> String {
        let units = (self.0 / 100).to_string();
        let cents = self.0 % 100;

        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, ch) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        format!("R$ {grouped},{cents:02}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        self.saturating_add(rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Money {
    type Err = DomainError;

    /// Parse user input such as `10`, `10.5`, `10,50`, `1.234,56`, `1,234.56`
    /// or `R$ 22,00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("R$").map(str::trim).unwrap_or(s);

        if s.is_empty() {
            return Err(DomainError::validation("amount is required"));
        }
        if s.starts_with('-') {
            return Err(DomainError::validation("amount must not be negative"));
        }

        let (int_part, frac_part) = split_decimal(s);

        let int_digits: String = int_part.chars().filter(|c| *c != '.' && *c != ',').collect();
        if int_digits.is_empty() && frac_part.is_empty() {
            return Err(DomainError::validation(format!("invalid amount: {s}")));
        }
        if !int_digits.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(DomainError::validation(format!("invalid amount: {s}")));
        }
        if frac_part.len() > 2 {
            return Err(DomainError::validation(
                "amount must have at most two decimal places",
            ));
        }

        let units: u64 = if int_digits.is_empty() {
            0
        } else {
            int_digits
                .parse()
                .map_err(|_| DomainError::validation("amount is too large"))?
        };
        let cents: u64 = match frac_part.len() {
            0 => 0,
            1 => frac_part.parse::<u64>().unwrap_or(0) * 10,
            _ => frac_part.parse::<u64>().unwrap_or(0),
        };

        units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .map(Money)
            .ok_or_else(|| DomainError::validation("amount is too large"))
    }
}

/// Split into (integer part, fractional part) by locating the decimal separator.
///
/// When both `.` and `,` appear, the last one is the decimal separator. When a
/// single separator kind appears exactly once it is the decimal separator;
/// repeated occurrences are thousands separators.
fn split_decimal(s: &str) -> (&str, &str) {
    let last_dot = s.rfind('.');
    let last_comma = s.rfind(',');

    let sep = match (last_dot, last_comma) {
        (Some(d), Some(c)) => Some(d.max(c)),
        (Some(d), None) if s.matches('.').count() == 1 => Some(d),
        (None, Some(c)) if s.matches(',').count() == 1 => Some(c),
        _ => None,
    };

    match sep {
        Some(idx) => (&s[..idx], &s[idx + 1..]),
        None => (s, ""),
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn parses_common_input_forms() {
        assert_eq!(m("10"), Money::from_cents(1000));
        assert_eq!(m("10.5"), Money::from_cents(1050));
        assert_eq!(m("10.50"), Money::from_cents(1050));
        assert_eq!(m("10,50"), Money::from_cents(1050));
        assert_eq!(m("1.234,56"), Money::from_cents(123_456));
        assert_eq!(m("1,234.56"), Money::from_cents(123_456));
        assert_eq!(m("1.234.567"), Money::from_cents(123_456_700));
        assert_eq!(m("R$ 22,00"), Money::from_cents(2200));
        assert_eq!(m(" 0.05 "), Money::from_cents(5));
        assert_eq!(m(",5"), Money::from_cents(50));
    }

    #[test]
    fn rejects_bad_input() {
        for bad in ["", "   ", "-1", "abc", "1.234", "10.999", "1e3", "R$"] {
            assert!(bad.parse::<Money>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!("99999999999999999999".parse::<Money>().is_err());
    }

    #[test]
    fn display_is_plain_decimal() {
        assert_eq!(Money::from_cents(2200).to_string(), "22.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn brl_format_groups_thousands() {
        assert_eq!(Money::from_cents(0).to_brl(), "R$ 0,00");
        assert_eq!(Money::from_cents(99).to_brl(), "R$ 0,99");
        assert_eq!(Money::from_cents(123_456).to_brl(), "R$ 1.234,56");
        assert_eq!(Money::from_cents(123_456_789).to_brl(), "R$ 1.234.567,89");
        assert_eq!(Money::from_cents(100_000).to_brl(), "R$ 1.000,00");
    }

    #[test]
    fn subtraction_floors_at_zero() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(1500);
        assert_eq!(a.saturating_sub(b), Money::ZERO);
        assert_eq!(b.saturating_sub(a), Money::from_cents(500));
    }

    #[test]
    fn times_and_sum() {
        let line = Money::from_cents(1000).times(2);
        let total: Money = [line, Money::from_cents(500)].iter().sum();
        assert_eq!(total, Money::from_cents(2500));
    }

    #[test]
    fn serde_uses_decimal_strings() {
        let json = serde_json::to_string(&Money::from_cents(2200)).unwrap();
        assert_eq!(json, "\"22.00\"");
        let back: Money = serde_json::from_str("\"22,00\"").unwrap();
        assert_eq!(back, Money::from_cents(2200));
        assert!(serde_json::from_str::<Money>("\"-1\"").is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Display output always parses back to the same amount.
            #[test]
            fn display_parses_back(cents in 0u64..10_000_000_000) {
                let money = Money::from_cents(cents);
                prop_assert_eq!(money.to_string().parse::<Money>().unwrap(), money);
            }
        }
    }
}
