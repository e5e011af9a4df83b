//! Request executor: cache, admission, transport, classification, retry.
//!
//! One call flows through the executor as:
//!
//! ```text
//! caller
//!   -> cache lookup          (hit: done)
//!   -> rate-limit admission  (rejected: fail fast with RATE_LIMIT)
//!   -> transport call        (bounded by the timeout budget)
//!   -> success: store in cache, done
//!   -> failure: classify -> retry policy -> sleep + re-admit, or surface
//! ```
//!
//! Retries re-request admission from the rate limiter rather than
//! bypassing it, so retries cannot starve the budget for fresh calls. A
//! saturated window can therefore keep denying a retried call until it
//! rolls over; that is backpressure, not a bug. Identical concurrent
//! calls sharing a cache key are not coalesced; both reach the transport.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use serde_json::Value;

use crate::cache::ResponseCache;
use crate::config::{ClientConfig, ResourceClass};
use crate::errors::{classify, rate_limit_rejection, ClassifiedError, ClassifyContext, RawFailure};
use crate::rate_limiter::{RateLimiter, RateWindowConfig};
use crate::retry::RetryPolicy;
use crate::transport::Transport;

/// One outbound call, fully described.
#[derive(Clone, Debug)]
pub struct RequestSpec {
    /// HTTP method.
    pub method: String,
    /// Endpoint path, appended to the provider base URL.
    pub path: String,
    /// Query parameters.
    pub params: Vec<(String, String)>,
    /// Resource class selecting the cache TTL and rate-limit bucket.
    pub resource_class: ResourceClass,
    /// Human description of the call's purpose, used in error messages.
    pub operation: String,
    /// Identity of the calling tool, carried into classified errors.
    pub tool_name: String,
    /// Per-call deadline override; the configured timeout applies when absent.
    pub deadline: Option<Duration>,
}

impl RequestSpec {
    /// Deterministic signature of method+path+params.
    ///
    /// Parameters are sorted so key order at the call site cannot split
    /// the cache.
    pub fn cache_key(&self) -> String {
        let mut params = self.params.clone();
        params.sort();

        let query: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        let signature = format!("{} {}?{}", self.method, self.path, query.join("&"));

        format!("{:x}", md5::compute(signature.as_bytes()))
    }

    fn context(&self) -> ClassifyContext<'_> {
        ClassifyContext {
            operation: &self.operation,
            tool_name: &self.tool_name,
            endpoint: &self.path,
            params: &self.params,
        }
    }
}

/// Orchestrates cached, rate-limited, retried calls to the provider.
///
/// All shared state (cache, rate windows) lives on the instance; separate
/// instances are fully isolated, which is what tests rely on.
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    cache: ResponseCache,
    rate_limiter: RateLimiter,
    retry: RetryPolicy,
    config: ClientConfig,
}

impl RequestExecutor {
    /// Create an executor over the given transport.
    ///
    /// Rate-limit budgets are configured from the per-class settings in
    /// `config`.
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        let rate_limiter = RateLimiter::new();

        for class in [
            ResourceClass::Employees,
            ResourceClass::TimeOff,
            ResourceClass::Analytics,
            ResourceClass::Company,
        ] {
            let tuning = config.class(class);
            rate_limiter.configure(
                class,
                RateWindowConfig {
                    max_requests: tuning.max_requests,
                    window: tuning.window,
                },
            );
        }

        let retry = RetryPolicy::new(config.max_attempts);

        Self {
            transport,
            cache: ResponseCache::new(),
            rate_limiter,
            retry,
            config,
        }
    }

    /// Execute one call end to end.
    ///
    /// Returns the parsed payload, or the classified error once retries
    /// are exhausted or the failure is deterministic. Never panics; every
    /// failure path returns a value.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<Value, ClassifiedError> {
        let ttl = self.config.class(spec.resource_class).cache_ttl;
        let key = spec.cache_key();

        if !ttl.is_zero() {
            if let Some(value) = self.cache.get(&key) {
                debug!(
                    "executor: cache hit for '{}' ({})",
                    spec.path, spec.resource_class
                );
                return Ok(value);
            }
        }

        let budget = spec.deadline.unwrap_or(self.config.request_timeout);
        let mut attempt: u32 = 1;

        loop {
            // A retry is a new admission request; it never bypasses the
            // window.
            let admission = self.rate_limiter.try_admit(spec.resource_class);
            if !admission.admitted {
                let retry_after = admission.retry_after.unwrap_or_default();
                return Err(rate_limit_rejection(&spec.context(), retry_after));
            }

            let outcome = tokio::time::timeout(
                budget,
                self.transport.send(&spec.method, &spec.path, &spec.params),
            )
            .await;

            let raw = match outcome {
                Ok(Ok(value)) => {
                    if !ttl.is_zero() {
                        self.cache.put(&key, value.clone(), ttl);
                    }
                    return Ok(value);
                }
                Ok(Err(raw)) => raw,
                Err(_elapsed) => RawFailure::Timeout,
            };

            let error = classify(&raw, &spec.context());
            let decision = self.retry.should_retry(&error, attempt);

            if !decision.retry {
                return Err(error);
            }

            debug!(
                "executor: attempt {} for '{}' failed with {}, retrying in {:?}",
                attempt, spec.path, error.category, decision.delay
            );
            tokio::time::sleep(decision.delay).await;
            attempt += 1;
        }
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Admissions left in the current window for a class.
    pub fn remaining_budget(&self, class: ResourceClass) -> u32 {
        self.rate_limiter.remaining(class)
    }
}
