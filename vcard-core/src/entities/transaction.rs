//! Payment history records and pagination.
//!
//! The provider returns history newest first, in pages of at most 50 rows.
//! Each page carries a continuation cursor (date and id of the next
//! transaction); a page without a cursor is the last one.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::filters::OperationType;
use crate::value_objects::Money;

pub type TxnId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Success,
    Waiting,
    Error,
}

impl TransactionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "Success",
            TransactionStatus::Waiting => "Waiting",
            TransactionStatus::Error => "Error",
        }
    }
}

/// Immutable record of one wallet operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxnId,
    pub date: DateTime<FixedOffset>,
    pub amount: Money,
    /// Amount including commission
    pub total: Option<Money>,
    pub commission: Option<Money>,
    pub status: TransactionStatus,
    pub kind: OperationType,
    /// Who the money went to or came from
    pub counterpart: String,
    pub provider: Option<String>,
    pub comment: Option<String>,
}

/// Position to resume a paginated history query from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub date: DateTime<FixedOffset>,
    pub id: TxnId,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentPage {
    pub items: Vec<Transaction>,
    pub cursor: Option<Cursor>,
}

impl PaymentPage {
    pub fn is_last(&self) -> bool {
        self.cursor.is_none()
    }
}

/// Incoming and outgoing totals per currency for a date window
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentTotals {
    pub incoming: Vec<Money>,
    pub outgoing: Vec<Money>,
}

/// History accumulated across pages
///
/// The first page replaces whatever was loaded; following pages are appended
/// in the order the server returned them.
#[derive(Debug, Clone, Default)]
pub struct PaymentHistory {
    items: Vec<Transaction>,
    cursor: Option<Cursor>,
}

impl PaymentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_page(page: PaymentPage) -> Self {
        PaymentHistory {
            items: page.items,
            cursor: page.cursor,
        }
    }

    /// Start over from a freshly fetched first page
    pub fn replace(&mut self, page: PaymentPage) {
        self.items = page.items;
        self.cursor = page.cursor;
    }

    /// Append a continuation page and move the cursor forward
    pub fn append(&mut self, page: PaymentPage) {
        self.items.extend(page.items);
        self.cursor = page.cursor;
    }

    pub fn items(&self) -> &[Transaction] {
        &self.items
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Group transactions by calendar day (in each transaction's own offset),
/// newest day first, keeping the server order within a day
pub fn group_by_day(items: &[Transaction]) -> Vec<(NaiveDate, Vec<&Transaction>)> {
    let mut days: BTreeMap<NaiveDate, Vec<&Transaction>> = BTreeMap::new();
    for txn in items {
        days.entry(txn.date.date_naive()).or_default().push(txn);
    }
    days.into_iter().rev().collect()
}
