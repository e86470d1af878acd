//! Progress reporting for a comparison run.
//!
//! Observers are advisory. The engine calls them through [`emit`], which
//! contains a panicking observer so it can never change a run's outcome.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Info,
    Warning,
    Error,
    Success,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Success => write!(f, "success"),
        }
    }
}

pub trait Observer {
    fn notify(&self, level: Level, message: &str);
}

impl<F> Observer for F
where
    F: Fn(Level, &str),
{
    fn notify(&self, level: Level, message: &str) {
        self(level, message)
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn notify(&self, _level: Level, _message: &str) {}
}

/// Forwards messages to `tracing` under the `rowmatch::progress` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn notify(&self, level: Level, message: &str) {
        match level {
            Level::Info => tracing::info!(target: "rowmatch::progress", "{message}"),
            Level::Success => tracing::info!(target: "rowmatch::progress", success = true, "{message}"),
            Level::Warning => tracing::warn!(target: "rowmatch::progress", "{message}"),
            Level::Error => tracing::error!(target: "rowmatch::progress", "{message}"),
        }
    }
}

pub(crate) fn emit(observer: &dyn Observer, level: Level, message: &str) {
    if catch_unwind(AssertUnwindSafe(|| observer.notify(level, message))).is_err() {
        tracing::warn!(%level, "progress observer panicked; message dropped");
    }
}
