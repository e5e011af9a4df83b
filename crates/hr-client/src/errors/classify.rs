//! Failure classification and log redaction.
//!
//! [`classify`] maps a [`RawFailure`] to a [`ClassifiedError`] using, in
//! order: the explicit HTTP status code, substring heuristics on the
//! message, then a category-appropriate default. Classification never
//! panics; a failure nothing matches degrades to
//! [`ErrorCategory::Unknown`].
//!
//! Every classification emits one structured log record. Parameters whose
//! key looks credential-related are replaced with a fixed placeholder
//! before logging, so secrets never reach persisted logs.

use chrono::Utc;
use log::warn;

use super::{ClassifiedError, ErrorCategory, RawFailure};

/// Placeholder written in place of redacted parameter values.
const REDACTED: &str = "[REDACTED]";

/// Substrings that mark a parameter key as credential-bearing.
const SECRET_KEY_PATTERNS: &[&str] = &[
    "key",
    "token",
    "secret",
    "password",
    "passwd",
    "auth",
    "credential",
];

/// Call-site context carried into classification.
#[derive(Clone, Copy, Debug)]
pub struct ClassifyContext<'a> {
    /// Human description of what the call was trying to do.
    pub operation: &'a str,
    /// Identity of the calling tool.
    pub tool_name: &'a str,
    /// Endpoint path the call targeted.
    pub endpoint: &'a str,
    /// Request parameters, redacted before logging.
    pub params: &'a [(String, String)],
}

/// Classify a raw failure into an actionable category.
pub fn classify(raw: &RawFailure, context: &ClassifyContext<'_>) -> ClassifiedError {
    let (category, retry_after) = match raw {
        RawFailure::Status {
            code,
            message,
            retry_after,
        } => (
            category_for_status(*code)
                .or_else(|| category_from_message(message))
                .unwrap_or(ErrorCategory::Api),
            *retry_after,
        ),
        RawFailure::Timeout => (ErrorCategory::Timeout, None),
        RawFailure::Transport { message } => (
            category_from_message(message).unwrap_or(ErrorCategory::Network),
            None,
        ),
        RawFailure::Unexpected { message } => (
            category_from_message(message).unwrap_or(ErrorCategory::Unknown),
            None,
        ),
    };

    let error = ClassifiedError {
        category,
        operation: context.operation.to_string(),
        tool_name: context.tool_name.to_string(),
        endpoint: context.endpoint.to_string(),
        original_message: raw.to_string(),
        is_retryable: category.is_retryable(),
        retry_after,
        occurred_at: Utc::now(),
    };

    log_classified(&error, context.params);
    error
}

/// Build and log the classified error for a local rate-limit rejection.
///
/// Local rejections never touch the transport, so there is no raw failure
/// to classify; the category is known up front.
pub(crate) fn rate_limit_rejection(
    context: &ClassifyContext<'_>,
    retry_after: std::time::Duration,
) -> ClassifiedError {
    let error = ClassifiedError {
        category: ErrorCategory::RateLimit,
        operation: context.operation.to_string(),
        tool_name: context.tool_name.to_string(),
        endpoint: context.endpoint.to_string(),
        original_message: format!(
            "local request budget exhausted, window resets in {}ms",
            retry_after.as_millis()
        ),
        is_retryable: true,
        retry_after: Some(retry_after),
        occurred_at: Utc::now(),
    };

    log_classified(&error, context.params);
    error
}

/// Map an explicit HTTP status to a category.
fn category_for_status(code: u16) -> Option<ErrorCategory> {
    match code {
        400 => Some(ErrorCategory::Validation),
        401 | 403 => Some(ErrorCategory::Authentication),
        404 => Some(ErrorCategory::NotFound),
        429 => Some(ErrorCategory::RateLimit),
        500 | 502 | 503 => Some(ErrorCategory::Api),
        504 => Some(ErrorCategory::Timeout),
        _ => None,
    }
}

/// Substring heuristics for failures without a recognized status.
fn category_from_message(message: &str) -> Option<ErrorCategory> {
    let lower = message.to_lowercase();

    if lower.contains("unauthorized")
        || lower.contains("api key")
        || lower.contains("credential")
        || lower.contains("forbidden")
    {
        Some(ErrorCategory::Authentication)
    } else if lower.contains("rate limit") || lower.contains("too many requests") {
        Some(ErrorCategory::RateLimit)
    } else if lower.contains("not found") {
        Some(ErrorCategory::NotFound)
    } else if lower.contains("timeout") || lower.contains("timed out") {
        Some(ErrorCategory::Timeout)
    } else if lower.contains("network")
        || lower.contains("connection")
        || lower.contains("dns")
    {
        Some(ErrorCategory::Network)
    } else {
        None
    }
}

/// Replace credential-looking parameter values with a placeholder.
fn redact_params(params: &[(String, String)]) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(key, value)| {
            let lower = key.to_lowercase();
            if SECRET_KEY_PATTERNS.iter().any(|p| lower.contains(p)) {
                (key.clone(), REDACTED.to_string())
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect()
}

/// Emit the structured record for a classified failure.
fn log_classified(error: &ClassifiedError, params: &[(String, String)]) {
    let redacted = redact_params(params);
    warn!(
        "classified failure: category={} retryable={} operation='{}' tool={} endpoint={} retry_after={:?} params={:?} detail='{}'",
        error.category,
        error.is_retryable,
        error.operation,
        error.tool_name,
        error.endpoint,
        error.retry_after,
        redacted,
        error.original_message
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn context<'a>(params: &'a [(String, String)]) -> ClassifyContext<'a> {
        ClassifyContext {
            operation: "fetch employee 123",
            tool_name: "get_employee",
            endpoint: "/employees/123",
            params,
        }
    }

    fn status(code: u16, message: &str) -> RawFailure {
        RawFailure::Status {
            code,
            message: message.to_string(),
            retry_after: None,
        }
    }

    #[test]
    fn test_status_code_mapping() {
        let cases = [
            (400, ErrorCategory::Validation),
            (401, ErrorCategory::Authentication),
            (403, ErrorCategory::Authentication),
            (404, ErrorCategory::NotFound),
            (429, ErrorCategory::RateLimit),
            (500, ErrorCategory::Api),
            (502, ErrorCategory::Api),
            (503, ErrorCategory::Api),
            (504, ErrorCategory::Timeout),
        ];

        for (code, expected) in cases {
            let error = classify(&status(code, "whatever"), &context(&[]));
            assert_eq!(error.category, expected, "status {}", code);
        }
    }

    #[test]
    fn test_unmapped_status_defaults_to_api_error() {
        let error = classify(&status(418, "short and stout"), &context(&[]));
        assert_eq!(error.category, ErrorCategory::Api);
        assert!(error.is_retryable);
    }

    #[test]
    fn test_unmapped_status_with_recognizable_message() {
        let error = classify(&status(422, "rate limit exceeded"), &context(&[]));
        assert_eq!(error.category, ErrorCategory::RateLimit);
    }

    #[test]
    fn test_timeout_variant() {
        let error = classify(&RawFailure::Timeout, &context(&[]));
        assert_eq!(error.category, ErrorCategory::Timeout);
        assert!(error.is_retryable);
    }

    #[test]
    fn test_transport_defaults_to_network() {
        let raw = RawFailure::Transport {
            message: "peer reset the stream".to_string(),
        };
        let error = classify(&raw, &context(&[]));
        assert_eq!(error.category, ErrorCategory::Network);
    }

    #[test]
    fn test_message_heuristics() {
        let cases = [
            ("request was Unauthorized", ErrorCategory::Authentication),
            ("invalid API key supplied", ErrorCategory::Authentication),
            ("record not found in directory", ErrorCategory::NotFound),
            ("upstream timed out waiting", ErrorCategory::Timeout),
            ("network unreachable", ErrorCategory::Network),
        ];

        for (message, expected) in cases {
            let raw = RawFailure::Unexpected {
                message: message.to_string(),
            };
            let error = classify(&raw, &context(&[]));
            assert_eq!(error.category, expected, "message '{}'", message);
        }
    }

    #[test]
    fn test_unrecognizable_failure_degrades_to_unknown() {
        let raw = RawFailure::Unexpected {
            message: "entropy reversed".to_string(),
        };
        let error = classify(&raw, &context(&[]));
        assert_eq!(error.category, ErrorCategory::Unknown);
        assert!(!error.is_retryable);
    }

    #[test]
    fn test_advisory_wait_is_carried_through() {
        let raw = RawFailure::Status {
            code: 429,
            message: "slow down".to_string(),
            retry_after: Some(Duration::from_millis(5000)),
        };
        let error = classify(&raw, &context(&[]));
        assert_eq!(error.retry_after, Some(Duration::from_millis(5000)));
    }

    #[test]
    fn test_context_is_carried_onto_error() {
        let error = classify(&status(404, "no such employee"), &context(&[]));
        assert_eq!(error.operation, "fetch employee 123");
        assert_eq!(error.tool_name, "get_employee");
        assert_eq!(error.endpoint, "/employees/123");
        assert_eq!(error.original_message, "HTTP 404: no such employee");
    }

    #[test]
    fn test_local_rejection_is_rate_limit() {
        let error = rate_limit_rejection(&context(&[]), Duration::from_secs(7));
        assert_eq!(error.category, ErrorCategory::RateLimit);
        assert!(error.is_retryable);
        assert_eq!(error.retry_after, Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_redaction_masks_credential_keys_only() {
        let params = vec![
            ("employee_id".to_string(), "123".to_string()),
            ("api_key".to_string(), "sk-live-12345".to_string()),
            ("sessionToken".to_string(), "tok-999".to_string()),
            ("fields".to_string(), "displayName,jobTitle".to_string()),
        ];

        let redacted = redact_params(&params);

        assert_eq!(redacted[0].1, "123");
        assert_eq!(redacted[1].1, REDACTED);
        assert_eq!(redacted[2].1, REDACTED);
        assert_eq!(redacted[3].1, "displayName,jobTitle");
    }

    #[test]
    fn test_classification_never_panics_on_empty_message() {
        let raw = RawFailure::Unexpected {
            message: String::new(),
        };
        let error = classify(&raw, &context(&[]));
        assert_eq!(error.category, ErrorCategory::Unknown);
    }
}
