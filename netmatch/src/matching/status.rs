//! Match lifecycle.
//!
//! ```text
//! NEW -> REVIEWED -> INTRODUCTION_REQUESTED -> INTRODUCTION_MADE -> ENGAGED -> COMPLETED
//!   \________________________ any non-terminal ________________________/ -> DISMISSED
//! ```
//!
//! Steps only move forward (skipping ahead is allowed). `DISMISSED` is
//! reachable from every non-terminal state. `COMPLETED` and `DISMISSED`
//! are terminal.

use crate::models::MatchType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    New,
    Reviewed,
    IntroductionRequested,
    IntroductionMade,
    Engaged,
    Completed,
    Dismissed,
}

impl MatchStatus {
    /// Position on the forward track; `None` for `Dismissed`
    fn stage(&self) -> Option<u8> {
        match self {
            MatchStatus::New => Some(0),
            MatchStatus::Reviewed => Some(1),
            MatchStatus::IntroductionRequested => Some(2),
            MatchStatus::IntroductionMade => Some(3),
            MatchStatus::Engaged => Some(4),
            MatchStatus::Completed => Some(5),
            MatchStatus::Dismissed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Dismissed)
    }

    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.stage(), next.stage()) {
            (_, None) => true,
            (Some(current), Some(target)) => target > current,
            (None, Some(_)) => false,
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MatchStatus::New => "NEW",
            MatchStatus::Reviewed => "REVIEWED",
            MatchStatus::IntroductionRequested => "INTRODUCTION_REQUESTED",
            MatchStatus::IntroductionMade => "INTRODUCTION_MADE",
            MatchStatus::Engaged => "ENGAGED",
            MatchStatus::Completed => "COMPLETED",
            MatchStatus::Dismissed => "DISMISSED",
        };
        f.write_str(s)
    }
}

/// Emitted after every accepted status transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChange {
    pub match_id: String,
    pub source_id: String,
    pub target_id: String,
    pub match_type: MatchType,
    pub from: MatchStatus,
    pub to: MatchStatus,
}

impl StatusChange {
    /// The introduction workflow should start (e.g. draft an outbound message)
    pub fn requests_introduction(&self) -> bool {
        self.to == MatchStatus::IntroductionRequested
    }
}

/// Collaborators that react to status changes, such as introduction
/// facilitation. Called synchronously after the change is applied.
pub trait StatusListener: Send + Sync {
    fn on_status_change(&self, change: &StatusChange);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(MatchStatus::New.can_transition_to(MatchStatus::Reviewed));
        assert!(MatchStatus::Reviewed.can_transition_to(MatchStatus::IntroductionRequested));
        assert!(MatchStatus::Engaged.can_transition_to(MatchStatus::Completed));
        // skipping ahead is still forward
        assert!(MatchStatus::New.can_transition_to(MatchStatus::IntroductionRequested));
    }

    #[test]
    fn test_backward_and_self_transitions_rejected() {
        assert!(!MatchStatus::Reviewed.can_transition_to(MatchStatus::New));
        assert!(!MatchStatus::Engaged.can_transition_to(MatchStatus::Engaged));
    }

    #[test]
    fn test_dismissal() {
        for status in [
            MatchStatus::New,
            MatchStatus::Reviewed,
            MatchStatus::IntroductionRequested,
            MatchStatus::IntroductionMade,
            MatchStatus::Engaged,
        ] {
            assert!(status.can_transition_to(MatchStatus::Dismissed), "{}", status);
        }
        assert!(!MatchStatus::Completed.can_transition_to(MatchStatus::Dismissed));
        assert!(!MatchStatus::Dismissed.can_transition_to(MatchStatus::Dismissed));
        assert!(!MatchStatus::Dismissed.can_transition_to(MatchStatus::Reviewed));
    }
}
