use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::transaction::{Transaction, TransactionId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("Diff is frozen, cannot {0}")]
    Frozen(&'static str),
    #[error("Transaction {0} is not in the new set")]
    NotNew(TransactionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DiffStat {
    pub same: usize,
    pub new: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl fmt::Display for DiffStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "same={} new={} updated={} deleted={}",
            self.same, self.new, self.updated, self.deleted
        )
    }
}

/// Result of reconciling two snapshots. Ids on the left of `same`,
/// `updated` and in `deleted` refer to the old snapshot; transactions are
/// taken from the new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionsDiff {
    same: Vec<(TransactionId, Transaction)>,
    new: Vec<Transaction>,
    updated: Vec<(TransactionId, Transaction)>,
    deleted: Vec<TransactionId>,
    #[serde(skip)]
    frozen: bool,
}

impl TransactionsDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_same(&mut self, old_id: TransactionId, transaction: Transaction) -> Result<(), DiffError> {
        self.ensure_open("add same")?;
        self.same.push((old_id, transaction));
        Ok(())
    }

    pub fn add_new(&mut self, transaction: Transaction) -> Result<(), DiffError> {
        self.ensure_open("add new")?;
        self.new.push(transaction);
        Ok(())
    }

    pub fn add_updated(&mut self, old_id: TransactionId, transaction: Transaction) -> Result<(), DiffError> {
        self.ensure_open("add updated")?;
        self.updated.push((old_id, transaction));
        Ok(())
    }

    pub fn add_deleted(&mut self, old_id: TransactionId) -> Result<(), DiffError> {
        self.ensure_open("add deleted")?;
        self.deleted.push(old_id);
        Ok(())
    }

    /// Removes a previously added new entry, used when a late match turns it
    /// into an update.
    pub fn delete_new(&mut self, id: TransactionId) -> Result<(), DiffError> {
        self.ensure_open("delete new")?;
        let before = self.new.len();
        self.new.retain(|tx| tx.id != id);
        if self.new.len() == before {
            return Err(DiffError::NotNew(id));
        }
        Ok(())
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn same(&self) -> &[(TransactionId, Transaction)] {
        &self.same
    }

    pub fn new_entries(&self) -> &[Transaction] {
        &self.new
    }

    pub fn updated(&self) -> &[(TransactionId, Transaction)] {
        &self.updated
    }

    pub fn deleted(&self) -> &[TransactionId] {
        &self.deleted
    }

    pub fn new_committed(&self) -> impl Iterator<Item = &Transaction> {
        self.new.iter().filter(|tx| tx.is_committed())
    }

    pub fn count_new_committed(&self) -> usize {
        self.new_committed().count()
    }

    /// True when nothing changed: no new, updated or deleted entries.
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    pub fn stat(&self) -> DiffStat {
        DiffStat {
            same: self.same.len(),
            new: self.new.len(),
            updated: self.updated.len(),
            deleted: self.deleted.len(),
        }
    }

    fn ensure_open(&self, operation: &'static str) -> Result<(), DiffError> {
        if self.frozen {
            return Err(DiffError::Frozen(operation));
        }
        Ok(())
    }
}
