mod balance;
mod card;
mod order;
mod profile;
mod transaction;

pub use balance::FundingAccount;
pub use card::{Card, CardExpiry, CardId, CardSecret, filter_by_status};
pub use order::{Order, OrderId, OrderStatus, PaymentReceipt};
pub use profile::ProfileInfo;
pub use transaction::{
    Cursor, PaymentHistory, PaymentPage, PaymentTotals, Transaction, TransactionStatus, TxnId,
    group_by_day,
};
