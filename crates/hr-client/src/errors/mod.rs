//! Error taxonomy for the HR provider client.
//!
//! This module provides:
//! - [`ErrorCategory`]: the closed set of failure categories, each carrying
//!   retryability, a base backoff delay, a user-message template, and
//!   troubleshooting steps
//! - [`RawFailure`]: a transport-level failure before classification
//! - [`ClassifiedError`]: a raw failure annotated with category, context,
//!   and user-facing guidance
//!
//! The category mapping is the single source of truth for both automated
//! retry decisions and human-facing guidance, so the two cannot drift
//! apart.

mod classify;

pub use classify::{classify, ClassifyContext};
pub(crate) use classify::rate_limit_rejection;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Categories of classified failures.
///
/// Retryable: [`Api`](Self::Api), [`RateLimit`](Self::RateLimit),
/// [`Network`](Self::Network), [`Timeout`](Self::Timeout).
/// Everything else is a deterministic outcome a retry cannot fix.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// The provider returned a server-side error (500/502/503).
    Api,
    /// The provider or the local budget rejected the call for rate reasons.
    RateLimit,
    /// The credential was rejected (401/403).
    Authentication,
    /// The requested resource does not exist (404).
    NotFound,
    /// The request itself was malformed (400).
    Validation,
    /// The call never reached the provider.
    Network,
    /// The call exceeded its time budget (504 or local deadline).
    Timeout,
    /// Nothing recognizable; degraded fallback.
    Unknown,
}

impl ErrorCategory {
    /// Stable identifier used in log records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "API_ERROR",
            Self::RateLimit => "RATE_LIMIT",
            Self::Authentication => "AUTHENTICATION",
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION",
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Whether a retry can plausibly change the outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Api | Self::RateLimit | Self::Network | Self::Timeout
        )
    }

    /// Base delay before the first retry; doubled on each further attempt.
    pub fn base_delay(&self) -> Duration {
        match self {
            Self::RateLimit => Duration::from_millis(5000),
            Self::Api => Duration::from_millis(1000),
            Self::Network => Duration::from_millis(1000),
            Self::Timeout => Duration::from_millis(2000),
            // Non-retryable categories never consult this, but the mapping
            // stays total so the policy cannot panic on a bad input.
            Self::Authentication | Self::NotFound | Self::Validation | Self::Unknown => {
                Duration::from_millis(1000)
            }
        }
    }

    /// Render the sanitized user message for a failed operation.
    pub fn user_message(&self, operation: &str) -> String {
        match self {
            Self::Api => format!(
                "The HR provider reported an internal error while trying to {}.",
                operation
            ),
            Self::RateLimit => format!(
                "Too many requests to the HR provider; could not {} right now.",
                operation
            ),
            Self::Authentication => format!(
                "The HR provider rejected the credentials while trying to {}.",
                operation
            ),
            Self::NotFound => format!(
                "The requested record was not found while trying to {}.",
                operation
            ),
            Self::Validation => format!(
                "The request was invalid and the provider refused to {}.",
                operation
            ),
            Self::Network => format!(
                "A network problem prevented the client from reaching the HR provider to {}.",
                operation
            ),
            Self::Timeout => {
                format!("The HR provider took too long to {}.", operation)
            }
            Self::Unknown => format!(
                "An unexpected error occurred while trying to {}.",
                operation
            ),
        }
    }

    /// Ordered troubleshooting steps shown alongside the user message.
    pub fn troubleshooting(&self) -> &'static [&'static str] {
        match self {
            Self::Api => &[
                "Wait a moment and try again",
                "Check the provider's status page for ongoing incidents",
                "Contact the provider's support if the problem persists",
            ],
            Self::RateLimit => &[
                "Wait for the reported interval before resubmitting",
                "Reduce the frequency of requests to this resource",
                "Review the configured per-class request budgets",
            ],
            Self::Authentication => &[
                "Verify the API key is correct and has not been revoked",
                "Confirm the key has permission for this resource",
                "Restart the process after updating the credential",
            ],
            Self::NotFound => &[
                "Check the identifier for typos",
                "Confirm the record exists in the HR system",
                "Verify the configured company domain is correct",
            ],
            Self::Validation => &[
                "Check the request parameters against the provider's API reference",
                "Verify date ranges and field names are well-formed",
            ],
            Self::Network => &[
                "Check the machine's network connectivity",
                "Verify any proxy or firewall allows outbound HTTPS",
                "Try again once connectivity is restored",
            ],
            Self::Timeout => &[
                "Try again; the provider may be under temporary load",
                "Narrow the request (fewer fields, shorter date range)",
                "Raise the configured request timeout if this recurs",
            ],
            Self::Unknown => &[
                "Try the request again",
                "Check the logs for the underlying technical message",
            ],
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transport-level failure before classification.
#[derive(Debug, Error)]
pub enum RawFailure {
    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {code}: {message}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body or status text.
        message: String,
        /// Advisory wait time from the provider, if it sent one.
        retry_after: Option<Duration>,
    },

    /// The call exceeded its time budget.
    #[error("request timed out")]
    Timeout,

    /// The call never produced an HTTP response.
    #[error("transport failure: {message}")]
    Transport {
        /// Underlying transport error text.
        message: String,
    },

    /// Anything else: malformed body, internal surprise.
    #[error("unexpected failure: {message}")]
    Unexpected {
        /// Description of the failure.
        message: String,
    },
}

/// A raw failure annotated with category, context, and guidance.
///
/// `original_message` carries the technical detail for logs; the
/// [`Display`](std::fmt::Display) impl renders the sanitized user message.
/// The two are deliberately never conflated.
#[derive(Clone, Debug, Serialize)]
pub struct ClassifiedError {
    /// Failure category.
    pub category: ErrorCategory,
    /// Human description of what the call was trying to do.
    pub operation: String,
    /// Identity of the calling tool.
    pub tool_name: String,
    /// Endpoint path the call targeted.
    pub endpoint: String,
    /// Raw technical message, for logs only.
    pub original_message: String,
    /// Whether a retry can plausibly change the outcome.
    pub is_retryable: bool,
    /// Advisory wait time reported by the provider or the local limiter.
    pub retry_after: Option<Duration>,
    /// Wall-clock time the failure was classified.
    pub occurred_at: DateTime<Utc>,
}

impl ClassifiedError {
    /// The sanitized message shown to the caller.
    pub fn user_message(&self) -> String {
        self.category.user_message(&self.operation)
    }

    /// Ordered troubleshooting steps for the caller.
    pub fn troubleshooting(&self) -> &'static [&'static str] {
        self.category.troubleshooting()
    }
}

// Display renders only the sanitized user message; the technical detail
// stays in `original_message` for the log sink.
impl std::fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for ClassifiedError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_categories() {
        assert!(ErrorCategory::Api.is_retryable());
        assert!(ErrorCategory::RateLimit.is_retryable());
        assert!(ErrorCategory::Network.is_retryable());
        assert!(ErrorCategory::Timeout.is_retryable());
    }

    #[test]
    fn test_non_retryable_categories() {
        assert!(!ErrorCategory::Authentication.is_retryable());
        assert!(!ErrorCategory::NotFound.is_retryable());
        assert!(!ErrorCategory::Validation.is_retryable());
        assert!(!ErrorCategory::Unknown.is_retryable());
    }

    #[test]
    fn test_user_message_mentions_operation() {
        let msg = ErrorCategory::Authentication.user_message("fetch the employee directory");
        assert!(msg.contains("fetch the employee directory"));
        assert!(msg.contains("credentials"));
    }

    #[test]
    fn test_authentication_guidance_points_at_credentials() {
        let steps = ErrorCategory::Authentication.troubleshooting();
        assert!(steps[0].contains("API key"));
    }

    #[test]
    fn test_every_category_has_troubleshooting_steps() {
        let categories = [
            ErrorCategory::Api,
            ErrorCategory::RateLimit,
            ErrorCategory::Authentication,
            ErrorCategory::NotFound,
            ErrorCategory::Validation,
            ErrorCategory::Network,
            ErrorCategory::Timeout,
            ErrorCategory::Unknown,
        ];
        for category in categories {
            assert!(!category.troubleshooting().is_empty());
        }
    }

    #[test]
    fn test_rate_limit_has_largest_base_delay() {
        let rate_limit = ErrorCategory::RateLimit.base_delay();
        for other in [
            ErrorCategory::Api,
            ErrorCategory::Network,
            ErrorCategory::Timeout,
        ] {
            assert!(rate_limit >= other.base_delay());
        }
    }

    #[test]
    fn test_display_shows_user_message_not_technical_detail() {
        let error = ClassifiedError {
            category: ErrorCategory::Api,
            operation: "fetch company metadata".to_string(),
            tool_name: "company_info".to_string(),
            endpoint: "/meta/company".to_string(),
            original_message: "HTTP 500: upstream shard unavailable (shard=7)".to_string(),
            is_retryable: true,
            retry_after: None,
            occurred_at: Utc::now(),
        };

        let shown = error.to_string();
        assert!(shown.contains("fetch company metadata"));
        assert!(!shown.contains("shard"));
    }

    #[test]
    fn test_raw_failure_display() {
        let raw = RawFailure::Status {
            code: 404,
            message: "employee not found".to_string(),
            retry_after: None,
        };
        assert_eq!(raw.to_string(), "HTTP 404: employee not found");
        assert_eq!(RawFailure::Timeout.to_string(), "request timed out");
    }
}
