//! Error taxonomy for GCodePilot.
//!
//! The analyzer boundary reports failures through a typed channel
//! (`AnalyzerError`) rather than leaving the controller to sniff
//! serialized error content. A payload classifier is kept for adapters
//! wrapping transports that cannot classify their own failures.
//!
//! All error types use `thiserror`.

use thiserror::Error;

/// Failure reported by the external analysis call.
///
/// `Cancelled` is not an error in the user-facing sense: it maps to a
/// neutral "stopped" message and mutates nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerError {
    /// The call observed its cancellation token and stopped.
    #[error("analysis cancelled")]
    Cancelled,

    /// The analysis service refused the call for rate or quota reasons.
    #[error("analysis rate-limited: {message}")]
    Quota {
        /// The underlying failure payload.
        message: String,
    },

    /// The analyzer produced output that could not be parsed into a
    /// structured result.
    #[error("analysis result not parseable: {message}")]
    Parse {
        /// The underlying failure payload.
        message: String,
    },

    /// Any other analysis failure.
    #[error("analysis failed: {message}")]
    Other {
        /// The underlying failure payload.
        message: String,
    },
}

impl AnalyzerError {
    /// Classifies an untyped failure payload.
    ///
    /// For adapters whose transport only yields serialized error content:
    /// a payload mentioning "429" or "quota" is a quota failure; one
    /// mentioning "JSON" (and not matching the quota rule) is a parse
    /// failure; anything else is opaque.
    pub fn classify(payload: impl Into<String>) -> Self {
        let message = payload.into();
        let lower = message.to_lowercase();
        if lower.contains("429") || lower.contains("quota") {
            AnalyzerError::Quota { message }
        } else if lower.contains("json") {
            AnalyzerError::Parse { message }
        } else {
            AnalyzerError::Other { message }
        }
    }

    /// Check if this is a cancellation rather than a real failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AnalyzerError::Cancelled)
    }
}

/// Session and request-controller errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A new turn was submitted while one is still outstanding.
    #[error("an analysis request is already in flight")]
    RequestInFlight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_quota_by_status_code() {
        assert!(matches!(
            AnalyzerError::classify(r#"{"code":429}"#),
            AnalyzerError::Quota { .. }
        ));
        assert!(matches!(
            AnalyzerError::classify("daily quota exceeded"),
            AnalyzerError::Quota { .. }
        ));
    }

    #[test]
    fn classify_parse_by_json_mention() {
        assert!(matches!(
            AnalyzerError::classify("Unexpected token in JSON at position 4"),
            AnalyzerError::Parse { .. }
        ));
    }

    #[test]
    fn quota_rule_wins_over_parse_rule() {
        assert!(matches!(
            AnalyzerError::classify("quota exhausted while decoding JSON"),
            AnalyzerError::Quota { .. }
        ));
    }

    #[test]
    fn classify_everything_else_as_other() {
        assert!(matches!(
            AnalyzerError::classify("network down"),
            AnalyzerError::Other { .. }
        ));
    }
}
