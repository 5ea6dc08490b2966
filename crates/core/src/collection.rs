use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

use super::transaction::{Transaction, TransactionId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("Duplicate transaction id: {0}")]
    DuplicateId(TransactionId),
}

/// A snapshot of a feed in feed order. Every operation returns a new
/// collection; the receiver is never modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionsCollection {
    transactions: Vec<Transaction>,
}

impl TransactionsCollection {
    pub fn new(transactions: Vec<Transaction>) -> Result<Self, CollectionError> {
        let mut seen = HashSet::with_capacity(transactions.len());
        for tx in &transactions {
            if !seen.insert(tx.id) {
                return Err(CollectionError::DuplicateId(tx.id));
            }
        }
        Ok(TransactionsCollection { transactions })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn without(&self, id: TransactionId) -> Self {
        self.filter(|tx| tx.id != id)
    }

    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Transaction) -> bool,
    {
        TransactionsCollection {
            transactions: self
                .transactions
                .iter()
                .filter(|tx| predicate(*tx))
                .cloned()
                .collect(),
        }
    }

    pub fn filter_hold(&self) -> Self {
        self.filter(Transaction::is_hold)
    }

    pub fn filter_committed(&self) -> Self {
        self.filter(Transaction::is_committed)
    }

    /// Committed entries keep their reference across re-fetches; holds only
    /// carry a placeholder, so they are never returned here.
    pub fn find_by_reference(&self, reference: &str) -> Option<&Transaction> {
        self.transactions
            .iter()
            .find(|tx| tx.is_committed() && tx.reference == reference)
    }

    /// Finds a hold with the same date, type, amount and description.
    pub fn find_by_data(&self, transaction: &Transaction) -> Option<&Transaction> {
        self.transactions
            .iter()
            .find(|tx| tx.is_hold() && tx.has_same_data(transaction))
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    pub fn first(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    /// Earliest date in the collection, regardless of feed order.
    pub fn first_day(&self) -> Option<NaiveDate> {
        self.transactions.iter().map(|tx| tx.date).min()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }
}

impl<'a> IntoIterator for &'a TransactionsCollection {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Currency, Money};
    use crate::transaction::{TransactionKind, TransactionStatus};
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(id: i64, day: u32, status: TransactionStatus, reference: &str) -> Transaction {
        Transaction {
            id: TransactionId(id),
            date: date(2018, 3, day),
            account: "40820000000011112222".to_string(),
            amount: Money::new(Decimal::new(48900, 2), Currency::from_code("RUB").unwrap()),
            kind: TransactionKind::Out,
            status,
            reference: reference.to_string(),
            description: format!("purchase {id}"),
        }
    }

    fn sample() -> TransactionsCollection {
        TransactionsCollection::new(vec![
            tx(1, 7, TransactionStatus::Hold, "HOLD"),
            tx(2, 6, TransactionStatus::Committed, "CRD_1AB2C3"),
            tx(3, 5, TransactionStatus::Hold, "HOLD"),
            tx(4, 2, TransactionStatus::Committed, "B180302001"),
        ])
        .unwrap()
    }

    fn ids(collection: &TransactionsCollection) -> Vec<i64> {
        collection.iter().map(|tx| tx.id.0).collect()
    }

    #[test]
    fn new_rejects_duplicate_ids() {
        let result = TransactionsCollection::new(vec![
            tx(1, 1, TransactionStatus::Hold, "HOLD"),
            tx(1, 2, TransactionStatus::Hold, "HOLD"),
        ]);
        assert_eq!(result, Err(CollectionError::DuplicateId(TransactionId(1))));
    }

    #[test]
    fn without_leaves_original_untouched() {
        let all = sample();
        let trimmed = all.without(TransactionId(2));
        assert_eq!(ids(&trimmed), vec![1, 3, 4]);
        assert_eq!(ids(&all), vec![1, 2, 3, 4]);
    }

    #[test]
    fn filter_by_status_keeps_order() {
        let all = sample();
        assert_eq!(ids(&all.filter_hold()), vec![1, 3]);
        assert_eq!(ids(&all.filter_committed()), vec![2, 4]);
    }

    #[test]
    fn find_by_reference_skips_holds() {
        let all = sample();
        assert_eq!(all.find_by_reference("CRD_1AB2C3").map(|t| t.id), Some(TransactionId(2)));
        assert!(all.find_by_reference("HOLD").is_none());
        assert!(all.find_by_reference("missing").is_none());
    }

    #[test]
    fn find_by_data_matches_content_not_id() {
        let all = sample();
        let mut refetched = tx(3, 5, TransactionStatus::Hold, "HOLD");
        refetched.id = TransactionId(99);
        assert_eq!(all.find_by_data(&refetched).map(|t| t.id), Some(TransactionId(3)));

        refetched.date = date(2018, 3, 4);
        assert!(all.find_by_data(&refetched).is_none());
    }

    #[test]
    fn find_by_data_skips_committed() {
        let all = sample();
        let lookalike = tx(2, 6, TransactionStatus::Hold, "HOLD");
        assert!(all.find_by_data(&lookalike).is_none());
    }

    #[test]
    fn first_day_is_earliest_date() {
        assert_eq!(sample().first_day(), Some(date(2018, 3, 2)));
        assert_eq!(TransactionsCollection::empty().first_day(), None);
    }

    #[test]
    fn len_and_empty() {
        let all = sample();
        assert_eq!(all.len(), 4);
        assert!(!all.is_empty());
        assert!(all.filter(|_| false).is_empty());
        assert_eq!(all.get(TransactionId(3)).map(|t| t.date), Some(date(2018, 3, 5)));
        assert_eq!(all.first().map(|t| t.id), Some(TransactionId(1)));
    }
}
