//! Card products offered by the provider.
//!
//! Only two tiers can be ordered from the wallet; any other product alias the
//! provider reports on existing cards is carried through verbatim.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

pub const PREPAID_ALIAS: &str = "qvc-cpa";
pub const DEBIT_ALIAS: &str = "qvc-cpa-debit";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CardType {
    /// Prepaid virtual card, 99 RUB
    Prepaid,
    /// Debit virtual card, 199 RUB
    Debit,
    Other(String),
}

impl CardType {
    /// Provider alias used on the wire (`cardAlias`)
    pub fn alias(&self) -> &str {
        match self {
            CardType::Prepaid => PREPAID_ALIAS,
            CardType::Debit => DEBIT_ALIAS,
            CardType::Other(alias) => alias,
        }
    }

    /// Issue price of the tier, if the wallet knows it
    pub fn price(&self) -> Option<Money> {
        match self {
            CardType::Prepaid => Some(Money::rub(Decimal::from(99))),
            CardType::Debit => Some(Money::rub(Decimal::from(199))),
            CardType::Other(_) => None,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            CardType::Prepaid => "Master Prepaid",
            CardType::Debit => "Master Debit",
            CardType::Other(alias) => alias,
        }
    }

    /// Tiers that can be ordered
    pub fn orderable() -> [CardType; 2] {
        [CardType::Prepaid, CardType::Debit]
    }
}

impl From<String> for CardType {
    fn from(alias: String) -> Self {
        match alias.as_str() {
            PREPAID_ALIAS => CardType::Prepaid,
            DEBIT_ALIAS => CardType::Debit,
            _ => CardType::Other(alias),
        }
    }
}

impl From<&str> for CardType {
    fn from(alias: &str) -> Self {
        CardType::from(alias.to_string())
    }
}

impl From<CardType> for String {
    fn from(card_type: CardType) -> Self {
        card_type.alias().to_string()
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.price() {
            Some(price) => write!(f, "{} ({})", self.display_name(), price),
            None => f.write_str(self.display_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_alias_roundtrip() {
        assert_eq!(CardType::from("qvc-cpa"), CardType::Prepaid);
        assert_eq!(CardType::from("qvc-cpa-debit"), CardType::Debit);
        assert_eq!(CardType::Debit.alias(), "qvc-cpa-debit");
    }

    #[test]
    fn test_unknown_alias_kept() {
        let card_type: CardType = serde_json::from_str("\"qvc-master\"").unwrap();
        assert_eq!(card_type, CardType::Other("qvc-master".to_string()));
        assert_eq!(card_type.price(), None);
        assert_eq!(serde_json::to_string(&card_type).unwrap(), "\"qvc-master\"");
    }

    #[test]
    fn test_price_tiers() {
        assert_eq!(CardType::Prepaid.price().unwrap().amount, dec!(99));
        assert_eq!(CardType::Debit.price().unwrap().amount, dec!(199));
        assert_eq!(CardType::Prepaid.to_string(), "Master Prepaid (99.00 ₽)");
    }
}
