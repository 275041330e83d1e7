//! Error taxonomy for the matching core.
//!
//! Every variant is a local validation failure surfaced to the caller
//! immediately. Candidates falling below score floors are filtered, not
//! reported here.

use thiserror::Error;

/// Errors produced by graph construction, configuration and match lifecycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    /// A contact with this id is already stored
    #[error("duplicate contact id: {0}")]
    DuplicateId(String),

    /// A connection or query referenced a contact the store does not know
    #[error("unknown contact id: {0}")]
    UnknownContact(String),

    /// Edge strength or trust outside [0, 1] (or NaN)
    #[error("invalid {field} {value} on edge {from} -> {to}: must be in [0, 1]")]
    InvalidWeight {
        from: String,
        to: String,
        field: &'static str,
        value: f64,
    },

    /// Weights not summing to 1, unknown match type, thresholds out of order
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Status change that is neither a forward step nor a dismissal
    #[error("invalid status transition for match {match_id}: {from} -> {to}")]
    InvalidTransition {
        match_id: String,
        from: String,
        to: String,
    },

    /// The caller's cancel token fired between frontiers or candidates
    #[error("operation cancelled")]
    Cancelled,
}

pub type MatchResult<T> = Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MatchError::InvalidWeight {
            from: "a".into(),
            to: "b".into(),
            field: "trust_level",
            value: 1.5,
        };
        assert_eq!(
            err.to_string(),
            "invalid trust_level 1.5 on edge a -> b: must be in [0, 1]"
        );
        assert_eq!(
            MatchError::DuplicateId("x".into()).to_string(),
            "duplicate contact id: x"
        );
    }
}
