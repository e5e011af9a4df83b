//! Fixed-window rate limiter for provider calls.
//!
//! Each [`ResourceClass`] gets its own independently configured window;
//! classes never share quota. The algorithm is fixed-window counting: the
//! request count resets entirely when the window elapses. A burst at window
//! start is possible, but the guarantee needed is only "no more than N
//! calls to this class per window", which a fixed window delivers with
//! O(1) state per class.
//!
//! Admission is non-blocking: a rejected request is told how long until
//! the window rolls over and the caller decides what to do with that.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::config::ResourceClass;

/// Default request budget per window.
const DEFAULT_MAX_REQUESTS: u32 = 60;

/// Default window length.
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Budget configuration for one resource class.
#[derive(Clone, Debug)]
pub struct RateWindowConfig {
    /// Maximum admissions per window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateWindowConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Outcome of an admission request.
#[derive(Clone, Copy, Debug)]
pub struct Admission {
    /// Whether the request may proceed.
    pub admitted: bool,
    /// Time until the window resets, reported on rejection.
    pub retry_after: Option<Duration>,
}

/// Counting window for a single resource class.
#[derive(Debug)]
struct RateWindow {
    /// Start of the current window.
    window_start: Instant,
    /// Admissions granted in the current window.
    count: u32,
    config: RateWindowConfig,
}

impl RateWindow {
    fn new(config: RateWindowConfig) -> Self {
        Self {
            window_start: Instant::now(),
            count: 0,
            config,
        }
    }

    fn try_admit(&mut self) -> Admission {
        let elapsed = self.window_start.elapsed();

        if elapsed >= self.config.window {
            self.window_start = Instant::now();
            self.count = 0;
        }

        if self.count < self.config.max_requests {
            self.count += 1;
            Admission {
                admitted: true,
                retry_after: None,
            }
        } else {
            let remaining = self.config.window.saturating_sub(self.window_start.elapsed());
            Admission {
                admitted: false,
                retry_after: Some(remaining),
            }
        }
    }

    fn remaining(&mut self) -> u32 {
        if self.window_start.elapsed() >= self.config.window {
            self.window_start = Instant::now();
            self.count = 0;
        }
        self.config.max_requests.saturating_sub(self.count)
    }
}

/// Fixed-window rate limiter keyed by resource class.
///
/// Thread-safe; the read-modify-write on a window's count happens under a
/// single lock with no await points, so two nearly-simultaneous admission
/// checks cannot both observe the last free slot.
pub struct RateLimiter {
    /// Per-class windows, created on first use.
    windows: Mutex<HashMap<ResourceClass, RateWindow>>,
    /// Per-class configuration overrides.
    configs: Mutex<HashMap<ResourceClass, RateWindowConfig>>,
}

impl RateLimiter {
    /// Create a rate limiter with default budgets.
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            configs: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the windows mutex, recovering from poison if necessary.
    ///
    /// For rate limiting it's safe to recover from a poisoned mutex: the
    /// worst case is slightly incorrect admission counting, which is
    /// better than panicking.
    fn lock_windows(&self) -> MutexGuard<'_, HashMap<ResourceClass, RateWindow>> {
        self.windows.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter windows mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Lock the configs mutex, recovering from poison if necessary.
    fn lock_configs(&self) -> MutexGuard<'_, HashMap<ResourceClass, RateWindowConfig>> {
        self.configs.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter configs mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Configure the budget for a resource class.
    ///
    /// Resets the class's window if one already exists.
    pub fn configure(&self, class: ResourceClass, config: RateWindowConfig) {
        let mut configs = self.lock_configs();
        configs.insert(class, config);
        drop(configs); // Release configs lock before acquiring windows lock

        let mut windows = self.lock_windows();
        windows.remove(&class);
    }

    /// Request admission for one call in the given resource class.
    pub fn try_admit(&self, class: ResourceClass) -> Admission {
        let mut windows = self.lock_windows();

        let window = windows
            .entry(class)
            .or_insert_with(|| RateWindow::new(self.config_for(class)));

        let admission = window.try_admit();
        if admission.admitted {
            debug!("Rate limiter: admitted call for class '{}'", class);
        } else {
            debug!(
                "Rate limiter: rejected call for class '{}', window resets in {:?}",
                class, admission.retry_after
            );
        }
        admission
    }

    /// Admissions left in the current window for a class.
    pub fn remaining(&self, class: ResourceClass) -> u32 {
        let mut windows = self.lock_windows();

        match windows.get_mut(&class) {
            Some(window) => window.remaining(),
            None => self.config_for(class).max_requests,
        }
    }

    /// Drop the window for a class, restoring its full budget.
    pub fn reset(&self, class: ResourceClass) {
        let mut windows = self.lock_windows();
        windows.remove(&class);
    }

    fn config_for(&self, class: ResourceClass) -> RateWindowConfig {
        let configs = self.lock_configs();
        configs.get(&class).cloned().unwrap_or_default()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
