// src/events/slot.rs

//! Rotating single-shot broadcast primitive.
//!
//! A [`Signal`] always has exactly one *current* [`Slot`]. Firing the signal
//! stores the value in the current slot, links it to a brand-new slot and
//! makes that new slot current, all in one step. A fired slot is retired
//! forever: it is never fired again and new subscribers never see it.
//!
//! A [`Subscription`] remembers the slot that was current when it was
//! created and walks the chain of fired slots from there. Because every
//! fired slot points at its successor, a subscriber that is slow to get
//! polled still observes every occurrence after its subscription point, in
//! fire order, exactly once. Retired slots nobody holds are dropped.

use std::sync::{Arc, Mutex, OnceLock};

use tokio::sync::Notify;

/// One occurrence of a signal, fired at most once.
#[derive(Debug)]
pub struct Slot<T> {
    fired: OnceLock<Fired<T>>,
    notify: Notify,
}

#[derive(Debug)]
struct Fired<T> {
    value: T,
    next: Arc<Slot<T>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            fired: OnceLock::new(),
            notify: Notify::new(),
        }
    }
}

/// The rotating signal: the owner of the current slot.
#[derive(Debug)]
pub struct Signal<T> {
    current: Mutex<Arc<Slot<T>>>,
}

impl<T: Clone> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Signal<T> {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(Arc::new(Slot::new())),
        }
    }

    /// Register interest in the next occurrence (and every one after it).
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            slot: self.current(),
        }
    }

    /// Fire the current slot with `value` and rotate to a fresh one.
    ///
    /// Releases every subscriber registered before this call.
    pub fn fire(&self, value: T) {
        let next = Arc::new(Slot::new());
        let fired = {
            let mut current = self
                .current
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::replace(&mut *current, Arc::clone(&next))
        };

        // Only the signal holds the current slot, and it was swapped out
        // under the lock above, so this slot cannot have been fired yet.
        let _ = fired.fired.set(Fired { value, next });
        fired.notify.notify_waiters();
    }

    fn current(&self) -> Arc<Slot<T>> {
        let current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&current)
    }
}

/// A position in a signal's occurrence chain.
#[derive(Debug)]
pub struct Subscription<T> {
    slot: Arc<Slot<T>>,
}

impl<T: Clone> Subscription<T> {
    /// Wait for the next occurrence after the current position and advance
    /// past it.
    pub async fn recv(&mut self) -> T {
        loop {
            let slot = Arc::clone(&self.slot);
            let notified = slot.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a fire between the check and the
            // await is not lost.
            notified.as_mut().enable();

            if let Some(fired) = slot.fired.get() {
                self.slot = Arc::clone(&fired.next);
                return fired.value.clone();
            }

            notified.await;
        }
    }

    /// Take the next occurrence if it already happened, without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        let slot = Arc::clone(&self.slot);
        let fired = slot.fired.get()?;
        self.slot = Arc::clone(&fired.next);
        Some(fired.value.clone())
    }
}
