//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the binary.

use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::{AppError, Result};

/// Durable slot holding the serialized store state.
///
/// The store owns the encoding; implementations only move text in and out.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait StateStorage: Send + Sync {
    /// Returns the last saved document, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<String>>;
    /// Replaces the saved document. Must not return before the write is durable.
    fn save(&self, contents: &str) -> Result<()>;
}

/// Time source for creation dates and log timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Date-only granularity, used for `created_at` fields.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        // A panic while holding the guard cannot leave a timestamp half-written.
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

pub(crate) fn lock_poisoned(what: &str) -> AppError {
    AppError::Internal(format!("{what} lock poisoned"))
}
