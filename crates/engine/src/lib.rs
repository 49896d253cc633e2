pub use error::EngineError;
pub use ops::accounts::{AccountChanges, AccountInfo};
pub use ops::categories::{CategoryChanges, CategoryTree, ParentUpdate};
pub use ops::currencies::{CurrencyChanges, CurrencyInfo};
pub use ops::transactions::{
    AccountSplit, CategorySplit, TransactionDetail, TransactionInput,
};
pub use ops::users::{UserChanges, UserProfile};
pub use ops::{Engine, EngineBuilder};
pub use rates::{ExchangeRates, FixedRates};

mod account_owners;
mod accounts;
mod categories;
mod currencies;
mod error;
mod ops;
mod rates;
mod transaction_accounts;
mod transaction_categories;
mod transactions;
mod user_contacts;
mod user_emails;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
