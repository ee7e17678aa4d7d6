use serde::{Deserialize, Serialize};

use crate::value_objects::{Currency, Money};

/// One funding source of the wallet (rouble account, dollar account, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingAccount {
    pub alias: String,
    pub fs_alias: String,
    pub title: String,
    pub currency: Currency,
    /// Absent for sources that don't report a balance
    pub balance: Option<Money>,
    pub is_default: bool,
}
