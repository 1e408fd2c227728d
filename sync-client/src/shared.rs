//! Single-writer access to the local calendar.
//!
//! Every peer session holds a clone of the same [`SharedCalendar`]. Diffing
//! and applying both go through its lock, so two sessions can never
//! interleave partial writes to a month.

use std::sync::Arc;

use monthsync_core::CalendarStore;
use monthsync_types::EventRecord;
use tokio::sync::{Mutex, MutexGuard};

/// Calendar store shared between concurrent sync sessions.
pub struct SharedCalendar<S> {
    inner: Arc<Mutex<S>>,
}

impl<S: CalendarStore + Send> SharedCalendar<S> {
    /// Take ownership of a store.
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Exclusive access for the duration of the guard.
    pub async fn lock(&self) -> MutexGuard<'_, S> {
        self.inner.lock().await
    }

    /// Copy of all twelve slots.
    pub async fn snapshot(&self) -> Vec<EventRecord> {
        self.inner.lock().await.all_events()
    }
}

impl<S> Clone for SharedCalendar<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
