pub mod cards;
pub mod history;
pub mod orders;
pub mod provider;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use cards::CardService;
pub use history::{HistoryService, Statement};
pub use orders::{OrderError, OrderService};
pub use provider::Provider;
pub use session::{PERSON_ID_KEY, Session, TOKEN_KEY};
