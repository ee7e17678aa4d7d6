//! Monetary amounts as reported by the provider.
//!
//! The provider identifies currencies by their ISO 4217 numeric code
//! (643 for roubles, 840 for dollars, 978 for euros). Amounts are kept as
//! `Decimal` so totals never pick up binary floating point noise.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO 4217 numeric currency code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(u16);

impl Currency {
    pub const RUB: Currency = Currency(643);
    pub const USD: Currency = Currency(840);
    pub const EUR: Currency = Currency(978);

    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    pub const fn code(self) -> u16 {
        self.0
    }

    /// Alphabetic code for the currencies the wallet knows about
    pub fn alpha(self) -> Option<&'static str> {
        match self {
            Currency::RUB => Some("RUB"),
            Currency::USD => Some("USD"),
            Currency::EUR => Some("EUR"),
            _ => None,
        }
    }

    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Currency::RUB => Some("₽"),
            Currency::USD => Some("$"),
            Currency::EUR => Some("€"),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(symbol) => f.write_str(symbol),
            None => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    /// Accepts either the numeric code ("643") or the alphabetic one ("RUB")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u16>() {
            return Ok(Currency(code));
        }
        match s.to_uppercase().as_str() {
            "RUB" => Ok(Currency::RUB),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            _ => Err(format!("Unknown currency: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Money { amount, currency }
    }

    pub fn rub(amount: Decimal) -> Self {
        Money::new(amount, Currency::RUB)
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_from_numeric_and_alpha() {
        assert_eq!("643".parse::<Currency>().unwrap(), Currency::RUB);
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!("398".parse::<Currency>().unwrap().code(), 398);
        assert!("XYZ".parse::<Currency>().is_err());
    }

    #[test]
    fn test_unknown_currency_displays_code() {
        assert_eq!(Currency::new(398).to_string(), "398");
        assert_eq!(Currency::EUR.to_string(), "€");
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::rub(dec!(99)).to_string(), "99.00 ₽");
        assert_eq!(Money::new(dec!(12.5), Currency::USD).to_string(), "12.50 $");
    }

    #[test]
    fn test_money_deserializes_provider_numbers() {
        let money: Money = serde_json::from_str(r#"{"amount": 199.0, "currency": 643}"#).unwrap();
        assert_eq!(money.amount, dec!(199));
        assert_eq!(money.currency, Currency::RUB);
    }
}
