pub mod csv;
pub mod currency;

pub use crate::csv::{FeedColumnMapping, FeedError, FeedLoader, FeedProfile};
pub use crate::currency::resolve_currency;

pub mod import {
    use crate::*;
    use feedsync_core::TransactionsCollection;

    pub fn load_feed<R: std::io::Read>(
        data: R,
        profile: &FeedProfile,
    ) -> Result<TransactionsCollection, FeedError> {
        FeedLoader::new(profile.clone()).load_from_reader(data)
    }

    pub fn load_feed_file(path: &std::path::Path) -> Result<TransactionsCollection, FeedError> {
        let bytes = std::fs::read(path)?;
        FeedLoader::default().load_from_bytes(&bytes)
    }
}
