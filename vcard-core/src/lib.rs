//! Shared domain types for the virtual card wallet client.
//!
//! Everything in this crate is a plain value: cards, orders and the order
//! workflow state machine, transactions and history filters, balances and the
//! account profile. Network access lives in `vcard-client`.

pub mod entities;
pub mod filters;
pub mod value_objects;
pub mod workflow;

// Re-export value objects at crate root for convenience
pub use value_objects::{CardStatus, CardType, Currency, Money};

// Re-export entities at crate root
pub use entities::{
    Card, CardExpiry, CardId, CardSecret, Cursor, FundingAccount, Order, OrderId, OrderStatus,
    PaymentHistory, PaymentPage, PaymentReceipt, PaymentTotals, ProfileInfo, Transaction,
    TransactionStatus, TxnId, filter_by_status, group_by_day,
};

// Re-export filters and workflow at crate root
pub use filters::{
    DateWindow, FilterError, FundingSource, MAX_ROWS, OperationType, PaymentFilters, Period,
    format_provider_date,
};
pub use workflow::{CompletedOrder, FailureReason, OrderFailure, OrderState, OrderStep};
