//! Errors raised while building or checking billing records.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Rejections that depend only on the values involved, never on storage state.
///
/// Missing rows, referential conflicts and lock contention are reported by the
/// store and invoice layers in `billbook-infra`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input: blank names, bad emails, amounts with too many decimals.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A record whose parts disagree, such as an invoice total that is not the
    /// sum of its line subtotals.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_offending_detail() {
        assert_eq!(
            DomainError::validation("name is empty").to_string(),
            "validation failed: name is empty"
        );
        assert_eq!(
            DomainError::invariant("total 10 != 12").to_string(),
            "invariant violated: total 10 != 12"
        );
    }
}
