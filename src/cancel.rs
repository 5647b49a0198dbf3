//! Cooperative cancellation and wall-clock budgets for a split run.
//!
//! The driver polls these between directives only, so a directive that has
//! started always runs to completion and output order is unaffected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Default budget in seconds when one is requested without a value
pub const DEFAULT_BUDGET_SECONDS: u64 = 300;

/// Shared flag a caller can trip from another thread
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Optional deadline for a run
#[derive(Debug, Clone)]
pub struct RunBudget {
    started: Instant,
    limit: Option<Duration>,
}

impl RunBudget {
    pub fn unlimited() -> Self {
        Self {
            started: Instant::now(),
            limit: None,
        }
    }

    pub fn seconds(secs: u64) -> Self {
        Self {
            started: Instant::now(),
            limit: Some(Duration::from_secs(secs)),
        }
    }

    pub fn from_option(secs: Option<u64>) -> Self {
        secs.map_or_else(Self::unlimited, Self::seconds)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_exhausted(&self) -> bool {
        match self.limit {
            Some(limit) if self.elapsed() >= limit => {
                warn!(
                    limit_secs = limit.as_secs(),
                    "Split run exceeded its time budget"
                );
                true
            }
            _ => false,
        }
    }
}
