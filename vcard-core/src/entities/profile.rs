use serde::{Deserialize, Serialize};

use crate::value_objects::Currency;

/// Identity of the token owner, cached by the session after verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInfo {
    /// Provider person id; scopes every person-level endpoint
    pub person_id: u64,
    pub bound_email: Option<String>,
    pub last_login_date: Option<String>,
    pub registration_date: Option<String>,
    pub contract_id: Option<u64>,
    pub contract_blocked: bool,
    pub default_pay_currency: Option<Currency>,
    pub language: Option<String>,
}

impl ProfileInfo {
    pub fn new(person_id: u64) -> Self {
        ProfileInfo {
            person_id,
            bound_email: None,
            last_login_date: None,
            registration_date: None,
            contract_id: None,
            contract_blocked: false,
            default_pay_currency: None,
            language: None,
        }
    }

    pub fn person_id_string(&self) -> String {
        self.person_id.to_string()
    }
}
