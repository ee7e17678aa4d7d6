use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::{CardType, Money};

pub type OrderId = String;

/// Order status as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    PaymentRequired,
    Completed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Draft => write!(f, "DRAFT"),
            OrderStatus::PaymentRequired => write!(f, "PAYMENT_REQUIRED"),
            OrderStatus::Completed => write!(f, "COMPLETED"),
            OrderStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A card order on the provider side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub card_type: CardType,
    pub status: OrderStatus,
    /// Known once the order has been submitted
    pub price: Option<Money>,
    /// Issued card, once the provider has one
    pub card_id: Option<String>,
}

/// Result of paying an order through the payment terminal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub id: String,
    pub terminal: String,
    pub account: String,
    pub amount: Money,
    pub transaction_id: Option<String>,
    pub state: Option<String>,
    pub comment: Option<String>,
}
