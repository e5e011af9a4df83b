//! Peopledata HR Client Crate
//!
//! Resilient client for the external HR data provider. Every outbound
//! call is cached, rate-limited, retried with backoff, and its failures
//! are classified into actionable categories with user-facing guidance.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   Tool layer     |  (routing, formatting - external collaborators)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |    HrClient      | --> |   RequestSpec    |  (path, class, label)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! | RequestExecutor  |  cache -> admission -> transport -> retry
//! +------------------+
//!    |     |      |
//!    v     v      v
//! +-----+ +-----+ +-----------+
//! |Cache| |Rate | | Transport |  (reqwest HTTP, scripted in tests)
//! |     | |Limit| +-----------+
//! +-----+ +-----+      |
//!                      v
//!               +--------------+
//!               | Classifier   | --> ClassifiedError / RetryPolicy
//!               +--------------+
//! ```
//!
//! # Core Types
//!
//! - [`HrClient`] - typed entry points for the tool layer
//! - [`RequestExecutor`] / [`RequestSpec`] - orchestration of one call
//! - [`ResponseCache`] - in-memory TTL cache, lazy eviction
//! - [`RateLimiter`] - fixed-window budgets per [`ResourceClass`]
//! - [`ErrorCategory`] / [`ClassifiedError`] - failure taxonomy
//! - [`RetryPolicy`] - exponential backoff with jitter
//!
//! All mutable state lives on the constructed client instance; there are
//! no module-level singletons, so tests run against isolated instances.

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod executor;
pub mod rate_limiter;
pub mod retry;
pub mod transport;

// Re-export the public surface
pub use api::HrClient;
pub use cache::ResponseCache;
pub use config::{ClientConfig, ResourceClass, ResourceClassConfig};
pub use errors::{classify, ClassifiedError, ClassifyContext, ErrorCategory, RawFailure};
pub use executor::{RequestExecutor, RequestSpec};
pub use rate_limiter::{Admission, RateLimiter, RateWindowConfig};
pub use retry::{RetryDecision, RetryPolicy};
pub use transport::{HttpTransport, Transport};
