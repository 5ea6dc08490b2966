use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Identity of an entry inside one collection. Not a bank identifier: the
/// same purchase gets unrelated ids in two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(pub i64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    In,
    Out,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::In => write!(f, "in"),
            TransactionKind::Out => write!(f, "out"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Hold,
    Committed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Hold => write!(f, "hold"),
            TransactionStatus::Committed => write!(f, "committed"),
        }
    }
}

/// One line of a bank feed. `amount` is a non-negative magnitude in the
/// currency shown for this lifecycle state; `kind` carries the direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub date: NaiveDate,
    pub account: String,
    pub amount: Money,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub reference: String,
    pub description: String,
}

impl Transaction {
    pub fn is_hold(&self) -> bool {
        self.status == TransactionStatus::Hold
    }

    pub fn is_committed(&self) -> bool {
        self.status == TransactionStatus::Committed
    }

    /// Content equality used to recognise a hold that was re-fetched verbatim.
    pub fn has_same_data(&self, other: &Transaction) -> bool {
        self.date == other.date
            && self.kind == other.kind
            && self.amount.is_equal_to(&other.amount)
            && self.description == other.description
    }
}
