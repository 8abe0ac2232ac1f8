//! Work-function registry
//!
//! Maps each job kind to the function that executes it. The registry is
//! built once at startup and validated for completeness before the
//! worker pool starts, so dispatch never discovers a missing handler at
//! run time.

use crate::scheduler::job::{JobKind, JobPayload};
use crate::scheduler::wrapper::WorkStatus;
use crate::scheduler::SchedulerError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by a work function
pub type WorkFuture = Pin<Box<dyn Future<Output = crate::Result<WorkStatus>> + Send>>;

/// A registered work function
///
/// Work functions receive the job payload by value; shared configuration
/// and the submit/publish handles are captured at registration time and
/// must be read-only between invocations — a work function must not
/// retain state from one invocation to the next.
pub type WorkFn = Arc<dyn Fn(JobPayload) -> WorkFuture + Send + Sync>;

/// Lookup table from job kind to work function
pub struct WorkRegistry {
    handlers: HashMap<JobKind, WorkFn>,
}

impl WorkRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers the handler for a kind, replacing any previous one
    pub fn register(&mut self, kind: JobKind, handler: WorkFn) {
        self.handlers.insert(kind, handler);
    }

    /// Returns the handler for a kind
    pub fn get(&self, kind: JobKind) -> Option<WorkFn> {
        self.handlers.get(&kind).cloned()
    }

    /// Checks that every known kind has a handler
    ///
    /// Called before the pool starts; a missing handler is a startup
    /// configuration error, not something workers discover mid-crawl.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        for kind in JobKind::ALL {
            if !self.handlers.contains_key(kind) {
                return Err(SchedulerError::MissingHandler { kind: *kind });
            }
        }
        Ok(())
    }
}

impl Default for WorkRegistry {
    fn default() -> Self {
        Self::new()
    }
}
