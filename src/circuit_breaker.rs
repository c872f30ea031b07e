//! # Circuit Breaker Module
//!
//! Circuit breaker for calls to the remote nutrition API. Repeated failures
//! open the circuit so that later diary entries fail fast instead of waiting
//! on a service that is down.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::config::RecoveryConfig;

/// Circuit breaker for nutrition API requests
///
/// ```text
/// CLOSED ────failures ≥ threshold────► OPEN
///    ▲                                      │
///    └─────────reset timeout───────────────┘
/// ```
///
/// After the reset timeout the counters are cleared and the next request is
/// let through; a failure on that request opens the circuit again.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: RecoveryConfig,
}

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure_time: Option<Instant>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use food_diary::config::RecoveryConfig;
    /// use food_diary::circuit_breaker::CircuitBreaker;
    ///
    /// let circuit_breaker = CircuitBreaker::new(RecoveryConfig::default());
    /// assert!(!circuit_breaker.is_open());
    /// ```
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            config,
        }
    }

    /// Check if circuit breaker is open (blocking requests)
    ///
    /// Resets itself once `circuit_breaker_reset_secs` have elapsed since the
    /// last failure.
    pub fn is_open(&self) -> bool {
        let mut state = self.state.lock();

        if state.failure_count >= self.config.circuit_breaker_threshold {
            if let Some(last_time) = state.last_failure_time {
                if last_time.elapsed() < Duration::from_secs(self.config.circuit_breaker_reset_secs)
                {
                    return true;
                }
                *state = BreakerState::default();
            }
        }
        false
    }

    /// Record a failed request
    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        state.failure_count += 1;
        state.last_failure_time = Some(Instant::now());
    }

    /// Record a successful request, closing the circuit
    pub fn record_success(&self) {
        *self.state.lock() = BreakerState::default();
    }

    pub fn failure_count(&self) -> u32 {
        self.state.lock().failure_count
    }
}
