use thiserror::Error;

/// Everything that can stop a run.
///
/// None of these are recoverable: a violated invariant means the count
/// structures have drifted, and malformed input or configuration means the
/// run never starts.
#[derive(Debug, Error)]
pub enum HdpError {
    /// A bookkeeping invariant failed under the consistency checker
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A corpus line could not be parsed or is out of bounds
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput {
        /// 1-based line (document) number
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Sampler parameters are unusable
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Reading the input failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result with [`HdpError`]
pub type Result<T> = std::result::Result<T, HdpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = HdpError::MalformedInput {
            line: 3,
            reason: "expected `word:count`".into(),
        };
        assert_eq!(
            e.to_string(),
            "malformed input at line 3: expected `word:count`"
        );

        let e = HdpError::Configuration("alpha must be positive".into());
        assert_eq!(e.to_string(), "invalid configuration: alpha must be positive");

        let e = HdpError::InvariantViolation("dish 2: total 4 != 5".into());
        assert_eq!(e.to_string(), "invariant violated: dish 2: total 4 != 5");
    }
}
