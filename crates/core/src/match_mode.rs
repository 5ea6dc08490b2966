use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// How strictly a committed entry is compared with a hold.
///
/// `Normal < Soft < Hard` is the escalation ladder. `ExtraSoft` is a
/// last-resort, card-only comparison and is not ordered against the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Normal,
    Soft,
    Hard,
    ExtraSoft,
}

impl MatchMode {
    fn rank(self) -> Option<u8> {
        match self {
            MatchMode::Normal => Some(0),
            MatchMode::Soft => Some(1),
            MatchMode::Hard => Some(2),
            MatchMode::ExtraSoft => None,
        }
    }
}

impl PartialOrd for MatchMode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => None,
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Normal => write!(f, "normal"),
            MatchMode::Soft => write!(f, "soft"),
            MatchMode::Hard => write!(f, "hard"),
            MatchMode::ExtraSoft => write!(f, "extra_soft"),
        }
    }
}
