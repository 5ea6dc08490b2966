pub mod collection;
pub mod diff;
pub mod match_mode;
pub mod money;
pub mod transaction;

pub use collection::{CollectionError, TransactionsCollection};
pub use diff::{DiffError, DiffStat, TransactionsDiff};
pub use match_mode::MatchMode;
pub use money::{Currency, Money, MoneyError};
pub use transaction::{Transaction, TransactionId, TransactionKind, TransactionStatus};
