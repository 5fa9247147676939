//! Unified error taxonomy for Fathom.
//!
//! Two layers live in one enum: the low-level adapter failure reasons
//! (`FailureReason`, inspected per tier attempt) and the caller-facing
//! `FathomError` returned by the façade.

use thiserror::Error;

/// Result type alias using [`FathomError`].
pub type Result<T> = std::result::Result<T, FathomError>;

/// Why a single tier attempt failed.
///
/// Classified from adapter error text + status per spec.md §4.4. Ordering
/// matters only for `is_terminal`/`is_retryable`, not for variant discriminant.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FailureReason {
    #[error("request timed out")]
    Timeout,
    #[error("network error")]
    Network,
    #[error("selector not found")]
    Selector,
    #[error("validation failed")]
    Validation,
    #[error("bot challenge detected")]
    BotChallenge,
    #[error("rate limited")]
    RateLimit,
    #[error("authentication required")]
    Auth,
    #[error("unknown failure")]
    Unknown,
}

impl FailureReason {
    /// `auth` and `rate_limit` are terminal for the call (spec.md §4.1).
    pub fn is_terminal(&self) -> bool {
        matches!(self, FailureReason::Auth | FailureReason::RateLimit)
    }

    /// `network` and `timeout` retry within the same tier (spec.md §4.4).
    pub fn is_retryable_in_tier(&self) -> bool {
        matches!(self, FailureReason::Network | FailureReason::Timeout)
    }

    /// Classify from an HTTP status code and/or error message text.
    pub fn classify(status: Option<u16>, message: &str) -> Self {
        let lower = message.to_lowercase();
        match status {
            Some(401) | Some(403) => return FailureReason::Auth,
            Some(429) => return FailureReason::RateLimit,
            _ => {}
        }
        if lower.contains("rate limit") {
            FailureReason::RateLimit
        } else if lower.contains("auth") {
            FailureReason::Auth
        } else if lower.contains("timeout") || lower.contains("timed out") || lower.contains("abort")
        {
            FailureReason::Timeout
        } else if lower.contains("dns") || lower.contains("tls") || lower.contains("connection")
        {
            FailureReason::Network
        } else if lower.contains("selector") || lower.contains("wait-for-selector") {
            FailureReason::Selector
        } else if lower.contains("cloudflare")
            || lower.contains("captcha")
            || lower.contains("bot detection")
            || lower.contains("are you human")
        {
            FailureReason::BotChallenge
        } else if lower.contains("validation") {
            FailureReason::Validation
        } else {
            FailureReason::Unknown
        }
    }
}

/// Caller-facing error surfaced by `fathom-facade`.
#[derive(Error, Debug)]
pub enum FathomError {
    /// Bad URL, failed SSRF gate, or otherwise malformed request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No tier could run within the request's latency/cost budget.
    #[error("budget exhausted: no tier could be attempted within budget")]
    BudgetExhausted,

    /// The cascade was exhausted; carries the last attempt's failure reason.
    #[error("all tiers failed, last reason: {last_reason:?}")]
    AllTiersFailed { last_reason: FailureReason },

    /// Auth or rate-limit: no point retrying now.
    #[error("terminal failure: {reason:?}")]
    Terminal { reason: FailureReason },

    /// Caller-initiated cancellation.
    #[error("request cancelled")]
    Cancelled,

    /// Pattern, predictor or vector-store internal error.
    #[error("{0}")]
    Internal(String),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON (de)serialisation error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error, typically from persistence.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Escape hatch for adapter/library errors that don't fit the taxonomy.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FathomError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FathomError::AllTiersFailed { last_reason } if last_reason.is_retryable_in_tier()
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FathomError::Terminal { .. } | FathomError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_auth_from_status() {
        assert_eq!(FailureReason::classify(Some(401), ""), FailureReason::Auth);
        assert_eq!(FailureReason::classify(Some(403), ""), FailureReason::Auth);
    }

    #[test]
    fn classifies_auth_from_message_text() {
        assert_eq!(
            FailureReason::classify(None, "auth: http status 401"),
            FailureReason::Auth
        );
    }

    #[test]
    fn classifies_rate_limit() {
        assert_eq!(
            FailureReason::classify(Some(429), ""),
            FailureReason::RateLimit
        );
        assert_eq!(
            FailureReason::classify(None, "Rate limit exceeded"),
            FailureReason::RateLimit
        );
    }

    #[test]
    fn classifies_network_and_timeout() {
        assert_eq!(
            FailureReason::classify(None, "dns resolution failed"),
            FailureReason::Network
        );
        assert_eq!(
            FailureReason::classify(None, "operation timed out"),
            FailureReason::Timeout
        );
    }

    #[test]
    fn classifies_bot_challenge_and_selector() {
        assert_eq!(
            FailureReason::classify(None, "Cloudflare challenge detected"),
            FailureReason::BotChallenge
        );
        assert_eq!(
            FailureReason::classify(None, "wait-for-selector deadline exceeded"),
            FailureReason::Selector
        );
    }

    #[test]
    fn defaults_to_unknown() {
        assert_eq!(
            FailureReason::classify(None, "something weird happened"),
            FailureReason::Unknown
        );
    }

    #[test]
    fn terminal_reasons() {
        assert!(FailureReason::Auth.is_terminal());
        assert!(FailureReason::RateLimit.is_terminal());
        assert!(!FailureReason::Timeout.is_terminal());
    }

    #[test]
    fn retryable_reasons() {
        assert!(FailureReason::Network.is_retryable_in_tier());
        assert!(FailureReason::Timeout.is_retryable_in_tier());
        assert!(!FailureReason::Selector.is_retryable_in_tier());
        assert!(!FailureReason::BotChallenge.is_retryable_in_tier());
    }
}
