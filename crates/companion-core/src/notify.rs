//! Change Listeners
//!
//! Stores push snapshots to the UI through these callbacks.

use parking_lot::Mutex;
use std::sync::Arc;

pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Registered callbacks for one kind of snapshot
pub struct Listeners<T> {
    inner: Mutex<Vec<Listener<T>>>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self { inner: Mutex::new(Vec::new()) }
    }
}

impl<T> Listeners<T> {
    pub fn add(&self, listener: impl Fn(&T) + Send + Sync + 'static) {
        self.inner.lock().push(Arc::new(listener));
    }

    /// Call every listener; the list lock is not held while they run
    pub fn emit(&self, value: &T) {
        let listeners = self.inner.lock().clone();
        for listener in listeners {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
