//! Explicit suspension boundary.
//!
//! A producer receives a [`Resolver`] and delivers its value once; the render
//! thread owns the [`Suspense`] and polls it every frame. The boundary only
//! ever moves from `Pending` to `Ready`.

use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Pending,
    Ready(T),
}

/// Consumer half, owned by whoever decides between fallback and content.
#[derive(Debug)]
pub struct Suspense<T> {
    slot: Arc<Mutex<Option<T>>>,
    state: LoadState<T>,
}

/// Producer half; resolving consumes it so a value is delivered at most once.
#[derive(Debug)]
pub struct Resolver<T> {
    slot: Arc<Mutex<Option<T>>>,
}

pub fn channel<T>() -> (Suspense<T>, Resolver<T>) {
    let slot = Arc::new(Mutex::new(None));
    (
        Suspense {
            slot: Arc::clone(&slot),
            state: LoadState::Pending,
        },
        Resolver { slot },
    )
}

impl<T> Suspense<T> {
    /// Picks up a delivered value. Returns `true` only on the frame the
    /// boundary becomes ready.
    pub fn poll(&mut self) -> bool {
        if matches!(self.state, LoadState::Ready(_)) {
            return false;
        }
        match self.slot.lock().take() {
            Some(value) => {
                self.state = LoadState::Ready(value);
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, LoadState::Ready(_))
    }

    pub fn value(&self) -> Option<&T> {
        match &self.state {
            LoadState::Ready(value) => Some(value),
            LoadState::Pending => None,
        }
    }

    /// `false` once the resolver is gone without having delivered anything,
    /// i.e. the boundary can never become ready.
    pub fn can_resolve(&self) -> bool {
        self.is_ready() || Arc::strong_count(&self.slot) > 1 || self.slot.lock().is_some()
    }
}

impl<T> Resolver<T> {
    pub fn resolve(self, value: T) {
        *self.slot.lock() = Some(value);
    }
}
