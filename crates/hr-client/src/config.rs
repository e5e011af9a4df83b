//! Client configuration: resource classes and their tuning knobs.
//!
//! Every remote call belongs to exactly one [`ResourceClass`]. The class
//! selects the cache TTL and the rate-limit budget for that call, so volatile
//! data (employee records) can be tuned independently from near-static data
//! (company metadata). Configuration is read once at construction time; the
//! client never mutates it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum number of retries after the initial attempt.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// A named category of remote calls sharing one cache TTL and one
/// rate-limit budget.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    /// Employee records and directory queries. Volatile; short TTL.
    Employees,
    /// Time-off requests and who's-out calendars.
    TimeOff,
    /// Headcount and turnover report queries.
    Analytics,
    /// Company metadata (fields, locations, divisions). Near-static.
    Company,
}

impl ResourceClass {
    /// Stable identifier used in cache keys and log records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employees => "employees",
            Self::TimeOff => "time_off",
            Self::Analytics => "analytics",
            Self::Company => "company",
        }
    }
}

impl std::fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tuning for a single resource class.
#[derive(Clone, Debug)]
pub struct ResourceClassConfig {
    /// Seconds a cached response stays valid. Zero disables caching for
    /// the class entirely.
    pub cache_ttl: Duration,
    /// Request budget per window.
    pub max_requests: u32,
    /// Length of the fixed rate-limit window.
    pub window: Duration,
}

/// Configuration consumed by the client at construction time.
///
/// Owned by the external configuration-loading collaborator; the client
/// only reads it.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the HR provider API.
    pub base_url: String,
    /// Per-request timeout budget.
    pub request_timeout: Duration,
    /// Maximum retries after the initial attempt.
    pub max_attempts: u32,
    /// Tuning for employee queries.
    pub employees: ResourceClassConfig,
    /// Tuning for time-off queries.
    pub time_off: ResourceClassConfig,
    /// Tuning for analytics queries.
    pub analytics: ResourceClassConfig,
    /// Tuning for company metadata queries.
    pub company: ResourceClassConfig,
}

impl ClientConfig {
    /// Look up the tuning for a resource class.
    pub fn class(&self, class: ResourceClass) -> &ResourceClassConfig {
        match class {
            ResourceClass::Employees => &self.employees,
            ResourceClass::TimeOff => &self.time_off,
            ResourceClass::Analytics => &self.analytics,
            ResourceClass::Company => &self.company,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            employees: ResourceClassConfig {
                cache_ttl: Duration::from_secs(300),
                max_requests: 60,
                window: Duration::from_secs(60),
            },
            time_off: ResourceClassConfig {
                cache_ttl: Duration::from_secs(300),
                max_requests: 30,
                window: Duration::from_secs(60),
            },
            analytics: ResourceClassConfig {
                cache_ttl: Duration::from_secs(600),
                max_requests: 20,
                window: Duration::from_secs(60),
            },
            company: ResourceClassConfig {
                cache_ttl: Duration::from_secs(3600),
                max_requests: 10,
                window: Duration::from_secs(60),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_lookup_matches_fields() {
        let config = ClientConfig::default();

        assert_eq!(
            config.class(ResourceClass::Employees).cache_ttl,
            Duration::from_secs(300)
        );
        assert_eq!(
            config.class(ResourceClass::Company).cache_ttl,
            Duration::from_secs(3600)
        );
    }

    #[test]
    fn test_resource_class_identifiers() {
        assert_eq!(ResourceClass::Employees.as_str(), "employees");
        assert_eq!(ResourceClass::TimeOff.as_str(), "time_off");
        assert_eq!(ResourceClass::Analytics.as_str(), "analytics");
        assert_eq!(ResourceClass::Company.as_str(), "company");
    }

    #[test]
    fn test_default_timeout_and_attempts() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_attempts, 3);
    }
}
