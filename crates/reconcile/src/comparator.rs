use chrono::NaiveDate;
use feedsync_core::{
    DiffError, MatchMode, Transaction, TransactionId, TransactionsCollection, TransactionsDiff,
};
use thiserror::Error;
use tracing::{debug, warn, Span};

use crate::config::ComparatorConfig;
use crate::description::DescriptionParser;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("Found disappeared committed transactions: {0:?}")]
    DisappearedCommitted(Vec<TransactionId>),
    #[error("Found disappeared transactions in soft mode: {holds} hold(s) left, {committed} new committed")]
    DisappearedInSoftMode { holds: usize, committed: usize },
    #[error("Found disappeared transaction in extra-soft mode: hold {hold} does not match committed {committed}")]
    DisappearedInExtraSoftMode {
        hold: TransactionId,
        committed: TransactionId,
    },
    #[error("Ambiguous match for committed transaction {committed}: candidates {candidates:?}")]
    AmbiguousMatch {
        committed: TransactionId,
        candidates: Vec<TransactionId>,
    },
    #[error(transparent)]
    Diff(#[from] DiffError),
}

/// Reconciles a stored snapshot of a feed with a freshly fetched one.
///
/// A hold that settled shows up in the new snapshot as a committed entry
/// with a different reference and description layout; those pairs are
/// reported as updates rather than as a delete plus an add.
pub struct TransactionsComparator {
    parser: DescriptionParser,
    config: ComparatorConfig,
    span: Span,
}

impl Default for TransactionsComparator {
    fn default() -> Self {
        Self::new(ComparatorConfig::default())
    }
}

impl TransactionsComparator {
    pub fn new(config: ComparatorConfig) -> Self {
        Self {
            parser: DescriptionParser::new(),
            config,
            span: tracing::debug_span!("transactions_comparator"),
        }
    }

    /// Diagnostic events are recorded inside `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &ComparatorConfig {
        &self.config
    }

    pub fn diff(
        &self,
        old: &TransactionsCollection,
        new: &TransactionsCollection,
    ) -> Result<TransactionsDiff, CompareError> {
        let _entered = self.span.enter();
        self.run(old, new, false)
    }

    /// One full pass. A soft-mode retry starts over from the untouched inputs.
    fn run(
        &self,
        old: &TransactionsCollection,
        new: &TransactionsCollection,
        soft: bool,
    ) -> Result<TransactionsDiff, CompareError> {
        let mut diff = TransactionsDiff::new();

        // An empty fetch cannot be told apart from a failed one.
        let Some(first_day) = new.first_day() else {
            diff.freeze();
            return Ok(diff);
        };

        let mut current = trim_before_day(old, first_day);
        let mut incoming = new.clone();
        debug!(soft, old = current.len(), new = incoming.len(), "reconciling window from {first_day}");

        for tx in new {
            let found = if tx.is_hold() {
                current.find_by_data(tx)
            } else {
                current.find_by_reference(&tx.reference)
            };
            if let Some(old_id) = found.map(|t| t.id) {
                current = current.without(old_id);
                incoming = incoming.without(tx.id);
                diff.add_same(old_id, tx.clone())?;
            }
        }

        for hold in incoming.filter_hold().iter() {
            diff.add_new(hold.clone())?;
        }
        let incoming = incoming.filter_committed();

        let mut unresolved = Vec::new();
        for tx in current.filter_committed().iter() {
            if self.config.is_tolerated_reference(&tx.reference) {
                warn!(id = %tx.id, reference = %tx.reference, "skipping disappeared committed transaction with tolerated reference");
                current = current.without(tx.id);
            } else {
                unresolved.push(tx.id);
            }
        }
        if !unresolved.is_empty() {
            return Err(CompareError::DisappearedCommitted(unresolved));
        }

        let mode = if soft { MatchMode::Soft } else { MatchMode::Normal };
        for committed in incoming.iter() {
            match self.match_hold(&current, committed, mode)? {
                Some(hold_id) => {
                    current = current.without(hold_id);
                    diff.add_updated(hold_id, committed.clone())?;
                }
                None => diff.add_new(committed.clone())?,
            }
        }

        if !current.is_empty() {
            let new_committed = diff.count_new_committed();
            if new_committed > 0 {
                if !soft {
                    warn!(holds = current.len(), committed = new_committed, "found disappeared transaction, retrying in soft mode");
                    return self.run(old, new, true);
                }
                if new_committed == 1 && current.len() == 1 {
                    self.match_last_pair(&current, &mut diff)?;
                } else {
                    return Err(CompareError::DisappearedInSoftMode {
                        holds: current.len(),
                        committed: new_committed,
                    });
                }
            } else {
                let descriptions: Vec<&str> = current.iter().map(|tx| tx.description.as_str()).collect();
                warn!("Delete {} hold transactions ({})", current.len(), descriptions.join(","));
                for cancelled in current.iter() {
                    diff.add_deleted(cancelled.id)?;
                }
            }
        }

        diff.freeze();
        Ok(diff)
    }

    /// Last resort when exactly one hold and one committed entry are left
    /// over after soft matching: accept them as the same purchase if the card
    /// and direction agree.
    fn match_last_pair(
        &self,
        holds: &TransactionsCollection,
        diff: &mut TransactionsDiff,
    ) -> Result<(), CompareError> {
        let (Some(hold), Some(committed)) = (holds.first(), diff.new_committed().next().cloned()) else {
            return Ok(());
        };
        warn!(hold = %hold.id, committed = %committed.id, "found disappeared transaction, trying extra-soft match");
        if !self.is_same(&committed, hold, MatchMode::ExtraSoft) {
            return Err(CompareError::DisappearedInExtraSoftMode {
                hold: hold.id,
                committed: committed.id,
            });
        }
        diff.delete_new(committed.id)?;
        diff.add_updated(hold.id, committed)?;
        Ok(())
    }

    fn match_hold(
        &self,
        holds: &TransactionsCollection,
        committed: &Transaction,
        mode: MatchMode,
    ) -> Result<Option<TransactionId>, CompareError> {
        let candidates: Vec<TransactionId> = holds
            .iter()
            .filter(|hold| hold.is_hold() && self.is_same(committed, hold, mode))
            .map(|hold| hold.id)
            .collect();

        match candidates.len() {
            0 => Ok(None),
            1 => Ok(Some(candidates[0])),
            _ if mode == MatchMode::Normal => {
                warn!(committed = %committed.id, candidates = candidates.len(), "found more than one hold, trying hard mode");
                self.match_hold(holds, committed, MatchMode::Hard)
            }
            _ => Err(CompareError::AmbiguousMatch {
                committed: committed.id,
                candidates,
            }),
        }
    }

    fn is_same(&self, committed: &Transaction, hold: &Transaction, mode: MatchMode) -> bool {
        if committed.kind != hold.kind {
            return false;
        }

        let committed_info = self.parser.extract_committed(&committed.description);
        let hold_info = self.parser.extract_hold(&hold.description);
        if committed_info.card != hold_info.card {
            return false;
        }

        if mode == MatchMode::ExtraSoft {
            return true;
        }

        if let (Some(committed_code), Some(hold_code)) = (&committed_info.code, &hold_info.code) {
            if mode != MatchMode::Soft && committed_code != hold_code {
                return false;
            }
        }

        if mode == MatchMode::Hard {
            if let Some(hold_date) = committed_info.hold_date {
                if hold_date != hold.date {
                    return false;
                }
            }
        }

        if let (Some(committed_amount), Some(hold_amount)) = (&committed_info.amount, &hold_info.amount) {
            return committed_amount.is_equal_to(hold_amount);
        }

        if hold.amount.is_equal_to(&committed.amount) {
            return true;
        }

        // A purchase in a foreign currency can be converted at a slightly
        // different rate on settlement.
        if mode == MatchMode::Soft {
            if let Some(source) = &committed_info.amount {
                if source.currency() != committed.amount.currency() {
                    return committed
                        .amount
                        .is_nearly_equal(&hold.amount, self.config.tolerance_percent);
                }
            }
        }

        false
    }
}

fn trim_before_day(collection: &TransactionsCollection, day: NaiveDate) -> TransactionsCollection {
    collection.filter(|tx| tx.date >= day)
}
