//! Cancellation and deadline token passed to migration procedures.
//!
//! The registry core never inspects the context; it exists so that the runner
//! can signal cancellation or a deadline to long-running procedures. Legacy
//! procedures that predate the context-aware API receive
//! [`MigrationContext::background`] through the signature adapters in
//! [`crate::migration`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A cancellation/deadline token.
///
/// Clones share the same underlying state, so cancelling any clone cancels
/// all of them.
#[derive(Clone, Debug, Default)]
pub struct MigrationContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug, Default)]
struct ContextInner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
}

impl MigrationContext {
    /// Returns a context that is never cancelled and carries no deadline.
    pub fn background() -> Self {
        MigrationContext::default()
    }

    /// Returns a context that reports the given deadline.
    ///
    /// Enforcement is the runner's responsibility; the context only carries
    /// the value.
    pub fn with_deadline(deadline: Instant) -> Self {
        MigrationContext {
            inner: Arc::new(ContextInner {
                cancelled: AtomicBool::new(false),
                deadline: Some(deadline),
            }),
        }
    }

    /// Marks this context (and all clones of it) as cancelled.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// The deadline, if one was set at construction.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }
}
