//! Ordered record of calls made to the outward-facing collaborators
//!
//! Both doubles share one [`CollaboratorLog`], so a test can assert not only
//! that the cache was invalidated and the navigator moved, but in which order.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::infrastructure::navigation::{Navigator, Route};
use crate::infrastructure::query_cache::CacheInvalidator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorCall {
    Invalidated(String),
    Navigated(Route),
}

impl fmt::Display for CollaboratorCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollaboratorCall::Invalidated(root) => write!(f, "invalidate({root})"),
            CollaboratorCall::Navigated(route) => write!(f, "navigate({route})"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollaboratorLog {
    calls: Arc<Mutex<Vec<CollaboratorCall>>>,
}

impl CollaboratorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: CollaboratorCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    pub fn calls(&self) -> Vec<CollaboratorCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, call: &CollaboratorCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    /// Index of the first occurrence of `call`
    pub fn position(&self, call: &CollaboratorCall) -> Option<usize> {
        self.calls().iter().position(|c| c == call)
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }
}

/// Navigator double that only records
#[derive(Debug, Clone)]
pub struct RecordingNavigator {
    log: CollaboratorLog,
}

impl RecordingNavigator {
    pub fn new(log: CollaboratorLog) -> Self {
        Self { log }
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.log.record(CollaboratorCall::Navigated(route));
    }
}

/// Records invalidations, then forwards them to the wrapped invalidator
pub struct RecordingInvalidator {
    inner: Arc<dyn CacheInvalidator>,
    log: CollaboratorLog,
}

impl RecordingInvalidator {
    pub fn new(inner: Arc<dyn CacheInvalidator>, log: CollaboratorLog) -> Self {
        Self { inner, log }
    }
}

impl fmt::Debug for RecordingInvalidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingInvalidator")
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl CacheInvalidator for RecordingInvalidator {
    fn invalidate(&self, root: &str) -> usize {
        self.log.record(CollaboratorCall::Invalidated(root.to_string()));
        self.inner.invalidate(root)
    }
}
