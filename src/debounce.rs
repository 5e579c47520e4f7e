//! Cancellable delayed trigger.
//!
//! Each call to [`Model::trigger`] schedules a [`FireMsg`] and supersedes any
//! earlier pending one: only the message carrying the latest tag fires. This
//! gives "run once typing pauses" semantics without a timer registry.
//!
//! ```rust
//! use bubbletea_easytable::debounce;
//! use std::time::Duration;
//!
//! let mut debouncer = debounce::new(Duration::from_millis(1000));
//! let _cmd = debouncer.trigger();
//! assert!(debouncer.pending());
//! debouncer.cancel();
//! assert!(!debouncer.pending());
//! ```

use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

// Internal ID management for debouncer instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Sent when a scheduled trigger elapses.
#[derive(Debug, Clone)]
pub struct FireMsg {
    /// Debouncer that scheduled the message.
    pub id: i64,
    tag: i64,
}

/// A delayed trigger where a newer schedule replaces the older one.
#[derive(Debug, Clone)]
pub struct Model {
    /// Delay between the last trigger and the fire.
    pub delay: Duration,
    id: i64,
    tag: i64,
    pending: bool,
}

/// Creates a debouncer with the given delay.
pub fn new(delay: Duration) -> Model {
    Model {
        delay,
        id: next_id(),
        tag: 0,
        pending: false,
    }
}

impl Default for Model {
    fn default() -> Self {
        new(Duration::from_millis(1000))
    }
}

impl Model {
    /// Unique id of this debouncer.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns true while a trigger is scheduled and not yet fired.
    pub fn pending(&self) -> bool {
        self.pending
    }

    /// Schedules a fire after the configured delay.
    pub fn trigger(&mut self) -> Cmd {
        self.trigger_after(self.delay)
    }

    /// Schedules a fire after `delay`, replacing any pending one. A zero
    /// delay fires on the next update.
    pub fn trigger_after(&mut self, delay: Duration) -> Cmd {
        self.tag += 1;
        self.pending = true;
        let id = self.id;
        let tag = self.tag;
        if delay.is_zero() {
            // tick intervals must be non-zero
            return Box::pin(async move { Some(Box::new(FireMsg { id, tag }) as Msg) });
        }
        bubbletea_tick(delay, move |_| Box::new(FireMsg { id, tag }) as Msg)
    }

    /// Drops the pending fire, if any.
    pub fn cancel(&mut self) {
        self.tag += 1;
        self.pending = false;
    }

    /// Returns true when `msg` is this debouncer's latest fire. Stale and
    /// foreign messages return false.
    pub fn update(&mut self, msg: &Msg) -> bool {
        let Some(fire) = msg.downcast_ref::<FireMsg>() else {
            return false;
        };
        if fire.id != self.id || fire.tag != self.tag || !self.pending {
            return false;
        }
        self.pending = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids() {
        let a = new(Duration::from_millis(10));
        let b = new(Duration::from_millis(10));
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_latest_trigger_fires() {
        let mut debouncer = new(Duration::from_millis(1));
        let first = debouncer.trigger();
        let second = debouncer.trigger();

        let stale = first.await.expect("tick message");
        assert!(!debouncer.update(&stale));
        assert!(debouncer.pending());

        let latest = second.await.expect("tick message");
        assert!(debouncer.update(&latest));
        assert!(!debouncer.pending());
    }

    #[tokio::test]
    async fn test_zero_delay_fires_immediately() {
        let mut debouncer = new(Duration::ZERO);
        let stale = debouncer.trigger();
        let latest = debouncer.trigger_after(Duration::ZERO);

        let msg = stale.await.expect("fire message");
        assert!(!debouncer.update(&msg));

        let msg = latest.await.expect("fire message");
        assert!(debouncer.update(&msg));
        assert!(!debouncer.pending());
    }

    #[tokio::test]
    async fn test_fires_only_once() {
        let mut debouncer = new(Duration::from_millis(1));
        let cmd = debouncer.trigger();
        let msg = cmd.await.expect("tick message");
        assert!(debouncer.update(&msg));
        assert!(!debouncer.update(&msg));
    }

    #[tokio::test]
    async fn test_cancel_drops_pending_fire() {
        let mut debouncer = new(Duration::from_millis(1));
        let cmd = debouncer.trigger();
        debouncer.cancel();
        let msg = cmd.await.expect("tick message");
        assert!(!debouncer.update(&msg));
    }

    #[tokio::test]
    async fn test_ignores_other_debouncers() {
        let mut mine = new(Duration::from_millis(1));
        let mut other = new(Duration::from_millis(1));
        let _ = mine.trigger();
        let msg = other.trigger().await.expect("tick message");
        assert!(!mine.update(&msg));
    }

    #[test]
    fn test_ignores_unrelated_messages() {
        let mut debouncer = new(Duration::from_millis(1));
        let msg: Msg = Box::new("hello");
        assert!(!debouncer.update(&msg));
    }
}
