// src/events/mod.rs

//! Host-driven event broadcasting.
//!
//! Two event categories are delivered to any number of waiting scripts:
//! - ticks (periodic pulses, no payload)
//! - key events (code, press/release, modifiers)
//!
//! Both use the rotating [`Signal`] from [`slot`]: a waiter only observes
//! occurrences fired *after* it started waiting, and observes each of those
//! exactly once, in fire order.
//!
//! [`Events`] lives inside the scheduling domain. Hosts never call
//! `fire_*` directly from their own thread; they go through
//! [`crate::host::ScriptHost`], which hands events over a channel to the
//! runtime loop that owns the `Events` instance.

pub mod key;
pub mod slot;

use std::future::Future;

use tracing::trace;

pub use key::{KeyCode, KeyEvent, KeyFilter, Modifiers};
pub use slot::{Signal, Subscription};

/// Tick and key broadcaster shared by every running script.
#[derive(Debug, Default)]
pub struct Events {
    ticks: Signal<()>,
    keys: Signal<KeyEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release every task waiting for a tick.
    pub fn fire_tick(&self) {
        trace!("firing tick");
        self.ticks.fire(());
    }

    /// Release every task waiting for a key event.
    pub fn fire_key(&self, event: KeyEvent) {
        trace!(code = %event.code, pressed = event.pressed, "firing key event");
        self.keys.fire(event);
    }

    /// Wait until `count` ticks have been fired after this call.
    ///
    /// The subscription is taken when this method is *called*, not when the
    /// returned future is first polled. `count == 0` resolves immediately.
    pub fn await_tick(&self, count: u32) -> impl Future<Output = ()> + Send + use<> {
        let mut sub = self.ticks.subscribe();
        async move {
            for _ in 0..count {
                sub.recv().await;
            }
        }
    }

    /// Wait for the next key event matching `filter` and return it.
    ///
    /// Non-matching events are skipped; the wait continues with the next
    /// occurrence.
    pub fn await_key(&self, filter: KeyFilter) -> impl Future<Output = KeyEvent> + Send + use<> {
        let mut sub = self.keys.subscribe();
        async move {
            loop {
                let event = sub.recv().await;
                if filter.matches(&event) {
                    return event;
                }
                trace!(code = %event.code, "key event does not match filter; waiting");
            }
        }
    }

    /// Raw key subscription.
    pub fn subscribe_keys(&self) -> Subscription<KeyEvent> {
        self.keys.subscribe()
    }
}
