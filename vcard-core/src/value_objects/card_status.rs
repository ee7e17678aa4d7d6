use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a virtual card as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "SENDED_TO_BANK")]
    SentToBank,
    #[serde(rename = "SENDED_TO_USER")]
    SentToUser,
    #[serde(rename = "BLOCKED")]
    Blocked,
    #[serde(rename = "UNKNOWN")]
    #[serde(other)]
    Unknown,
}

impl CardStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, CardStatus::Active)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, CardStatus::Blocked)
    }

    /// Human readable label for listings
    pub fn label(&self) -> &'static str {
        match self {
            CardStatus::Active => "Active",
            CardStatus::SentToBank => "Sent to bank",
            CardStatus::SentToUser => "Sent to user",
            CardStatus::Blocked => "Blocked",
            CardStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CardStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "ACTIVE" => Ok(CardStatus::Active),
            "SENDED_TO_BANK" | "SENT_TO_BANK" => Ok(CardStatus::SentToBank),
            "SENDED_TO_USER" | "SENT_TO_USER" => Ok(CardStatus::SentToUser),
            "BLOCKED" => Ok(CardStatus::Blocked),
            "UNKNOWN" => Ok(CardStatus::Unknown),
            _ => Err(format!("Invalid card status: {}", s)),
        }
    }
}
