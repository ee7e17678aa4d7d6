mod card_status;
mod card_type;
mod money;

pub use card_status::CardStatus;
pub use card_type::CardType;
pub use money::{Currency, Money};
