//! Story loop states

use serde::Serialize;
use std::fmt;

/// Why the automated phase stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Termination {
    /// The judge's overall score reached the threshold
    Passed,
    /// The revision budget ran out first
    Exhausted,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Passed => write!(f, "passed"),
            Termination::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Where a story loop is
///
/// ```text
/// Drafting -> Judging -> Accepted(Passed | Exhausted)
///               ^   |
///               |   v
///              Revising
///
/// Accepted -> UserRevision -> FinalJudging -> Finished   (optional)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Drafting,
    Judging,
    Revising,
    Accepted(Termination),
    UserRevision,
    FinalJudging,
    Finished,
}

impl LoopState {
    /// The automated phase is over
    pub fn is_accepted(&self) -> bool {
        matches!(self, LoopState::Accepted(_))
    }

    /// Nothing further can happen
    pub fn is_finished(&self) -> bool {
        matches!(self, LoopState::Finished)
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::Drafting => write!(f, "drafting"),
            LoopState::Judging => write!(f, "judging"),
            LoopState::Revising => write!(f, "revising"),
            LoopState::Accepted(t) => write!(f, "accepted ({})", t),
            LoopState::UserRevision => write!(f, "applying user feedback"),
            LoopState::FinalJudging => write!(f, "final judging"),
            LoopState::Finished => write!(f, "finished"),
        }
    }
}
