//! Execution contexts and clocks.
//!
//! An [`ExecutionContext`] is one bounded unit of work in the host: a
//! request, a script run, a job. It owns the circuit-breaker state and the
//! clock every cache decision in that unit is made against. Contexts are
//! never shared between threads; the cache store is.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use memobox_core::FunctionIdentity;

use crate::breaker::DisabledSet;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// A clock stopped at the current wall time.
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// A clock stopped at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }

    /// Sets the clock to `at`.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// State of one execution context.
pub struct ExecutionContext {
    disabled: DisabledSet,
    clock: Arc<dyn Clock>,
}

impl ExecutionContext {
    /// A fresh context on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// A fresh context on a custom clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            disabled: DisabledSet::new(),
            clock,
        }
    }

    /// Current time according to this context's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Functions disabled so far in this context.
    pub fn disabled(&self) -> &DisabledSet {
        &self.disabled
    }

    /// Whether memoization of `identity` is switched off in this context.
    pub fn is_disabled(&self, identity: &FunctionIdentity) -> bool {
        self.disabled.is_disabled(identity)
    }

    /// Switches memoization of `identity` off for the rest of this context.
    pub fn disable(&mut self, identity: FunctionIdentity) -> bool {
        self.disabled.disable(identity)
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("disabled", &self.disabled)
            .field("now", &self.now())
            .finish()
    }
}
