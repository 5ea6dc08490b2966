pub mod comparator;
pub mod config;
pub mod description;

pub use comparator::{CompareError, TransactionsComparator};
pub use config::{ComparatorConfig, ConfigError};
pub use description::{DescriptionInfo, DescriptionParser};
