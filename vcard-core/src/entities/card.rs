use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::{CardStatus, CardType, Money};

pub type CardId = u64;

/// Card expiry as printed on the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardExpiry {
    pub month: u8,
    pub year: u16,
}

impl CardExpiry {
    /// Parse the provider's separate month/year strings ("07", "2027" or "27")
    pub fn parse(month: &str, year: &str) -> Option<Self> {
        let month: u8 = month.trim().parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        let year: u16 = year.trim().parse().ok()?;
        let year = if year < 100 { 2000 + year } else { year };
        Some(CardExpiry { month, year })
    }
}

impl fmt::Display for CardExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year % 100)
    }
}

/// A virtual card owned by the current person
///
/// Read-only projection of provider state. Renames and status transitions are
/// only observed by fetching the card list again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub masked_number: String,
    pub status: CardStatus,
    /// User-chosen card name
    pub alias: String,
    pub expiry: Option<CardExpiry>,
    /// Provider product id
    pub card_type_id: u64,
    pub card_type: CardType,
    pub product_name: String,
    pub price: Option<Money>,
    pub balance: Option<Money>,
    pub limit: Option<Money>,
    pub unblock_available: bool,
}

impl Card {
    /// Name to show in listings: the alias when set, the masked number otherwise
    pub fn title(&self) -> &str {
        if self.alias.trim().is_empty() {
            &self.masked_number
        } else {
            &self.alias
        }
    }
}

/// Keep only cards with the given status; `None` keeps everything
pub fn filter_by_status(cards: Vec<Card>, status: Option<CardStatus>) -> Vec<Card> {
    match status {
        Some(status) => cards.into_iter().filter(|c| c.status == status).collect(),
        None => cards,
    }
}

/// Full card number and CVV
///
/// Held in memory only. `Debug` is redacted so secrets never end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSecret {
    pub pan: String,
    pub cvv: String,
}

impl CardSecret {
    pub fn new(pan: impl Into<String>, cvv: impl Into<String>) -> Self {
        CardSecret {
            pan: pan.into(),
            cvv: cvv.into(),
        }
    }

    /// PAN split into groups of four for display
    pub fn formatted_pan(&self) -> String {
        let digits: Vec<char> = self.pan.chars().filter(|c| !c.is_whitespace()).collect();
        digits
            .chunks(4)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Debug for CardSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardSecret")
            .field("pan", &"<redacted>")
            .field("cvv", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: CardId, status: CardStatus) -> Card {
        Card {
            id,
            masked_number: format!("4444********{:04}", id),
            status,
            alias: String::new(),
            expiry: None,
            card_type_id: 1,
            card_type: CardType::Prepaid,
            product_name: "Master Prepaid".to_string(),
            price: None,
            balance: None,
            limit: None,
            unblock_available: true,
        }
    }

    #[test]
    fn test_expiry_parse() {
        assert_eq!(
            CardExpiry::parse("07", "2027"),
            Some(CardExpiry { month: 7, year: 2027 })
        );
        assert_eq!(CardExpiry::parse("7", "27").unwrap().year, 2027);
        assert_eq!(CardExpiry::parse("13", "2027"), None);
        assert_eq!(CardExpiry::parse("", "2027"), None);
        assert_eq!(CardExpiry { month: 3, year: 2029 }.to_string(), "03/29");
    }

    #[test]
    fn test_filter_by_status_is_client_side() {
        let cards = vec![
            card(1, CardStatus::Active),
            card(2, CardStatus::Blocked),
            card(3, CardStatus::Active),
        ];

        let active = filter_by_status(cards.clone(), Some(CardStatus::Active));
        assert_eq!(active.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 3]);

        let all = filter_by_status(cards, None);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_title_falls_back_to_masked_number() {
        let mut c = card(7, CardStatus::Active);
        assert_eq!(c.title(), "4444********0007");
        c.alias = "Subscriptions".to_string();
        assert_eq!(c.title(), "Subscriptions");
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = CardSecret::new("4444555566667777", "123");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("4444"));
        assert!(!debug.contains("123"));
        assert_eq!(secret.formatted_pan(), "4444 5555 6666 7777");
    }
}
