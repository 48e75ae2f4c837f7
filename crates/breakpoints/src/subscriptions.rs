//! Typed subscription registry.
//!
//! Global listeners live on the [`NotificationBus`](crate::notify::NotificationBus);
//! per-breakpoint listeners live here, keyed by breakpoint name. Every
//! subscription returns a [`SubscriptionHandle`] that removes it again.
//! Callbacks are cloned out before they run, so a callback may subscribe or
//! unsubscribe without deadlocking.

use crate::notify::ChangeNotification;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global transition listener.
pub type ChangeCallback = Arc<dyn Fn(&ChangeNotification) + Send + Sync>;

/// Per-breakpoint listener: receives the notification and the new match state.
pub type MatchCallback = Arc<dyn Fn(&ChangeNotification, bool) + Send + Sync>;

/// Opaque subscription identifier, unique per runtime instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// What a subscription listens to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every transition of the current breakpoint.
    Global,
    /// One breakpoint's own predicate.
    Breakpoint(String),
}

/// Returned by every subscription call; pass it back to unsubscribe.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    pub scope: Scope,
}

/// Callbacks for a breakpoint's predicate starting or stopping to match.
#[derive(Clone, Default)]
pub struct EnterLeave {
    pub on_enter: Option<ChangeCallback>,
    pub on_leave: Option<ChangeCallback>,
    /// Run the callback for the present state once, synchronously, when subscribing.
    pub immediate: bool,
}

impl EnterLeave {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_enter<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ChangeNotification) + Send + Sync + 'static,
    {
        self.on_enter = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn on_leave<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ChangeNotification) + Send + Sync + 'static,
    {
        self.on_leave = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Route to `on_enter` or `on_leave` depending on `matches`.
    pub fn dispatch(&self, notification: &ChangeNotification, matches: bool) {
        let callback = if matches { &self.on_enter } else { &self.on_leave };
        if let Some(callback) = callback {
            callback(notification);
        }
    }
}

impl Debug for EnterLeave {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("EnterLeave")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .field("immediate", &self.immediate)
            .finish()
    }
}

/// A listener bound to one breakpoint.
#[derive(Clone)]
pub enum ScopedListener {
    /// Called on every flip with the new match state.
    MatchChange(MatchCallback),
    /// Routed to enter or leave.
    EnterLeave(EnterLeave),
}

impl ScopedListener {
    pub fn dispatch(&self, notification: &ChangeNotification, matches: bool) {
        match self {
            Self::MatchChange(callback) => callback(notification, matches),
            Self::EnterLeave(routes) => routes.dispatch(notification, matches),
        }
    }
}

/// Ordered list of callbacks with removal by id.
pub struct Subscribers<C> {
    entries: Mutex<Vec<(SubscriptionId, C)>>,
}

impl<C> Default for Subscribers<C> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }
}

impl<C: Clone> Subscribers<C> {
    pub fn add(&self, id: SubscriptionId, callback: C) {
        self.entries.lock().push((id, callback));
    }

    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Clone the callbacks out in subscription order.
    pub fn snapshot(&self) -> Vec<C> {
        self.entries
            .lock()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Per-breakpoint listeners plus the id counter shared with global listeners.
#[derive(Default)]
pub struct SubscriptionRegistry {
    next_id: AtomicU64,
    scoped: Mutex<HashMap<String, Arc<Subscribers<ScopedListener>>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh id.
    pub fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Attach `listener` to `name`. The caller validates the name.
    pub fn add(&self, name: &str, listener: ScopedListener) -> SubscriptionHandle {
        let id = self.next_id();
        let subscribers = Arc::clone(self.scoped.lock().entry(name.to_owned()).or_default());
        subscribers.add(id, listener);
        SubscriptionHandle {
            id,
            scope: Scope::Breakpoint(name.to_owned()),
        }
    }

    pub fn remove(&self, name: &str, id: SubscriptionId) -> bool {
        let subscribers = self.scoped.lock().get(name).map(Arc::clone);
        subscribers.is_some_and(|subscribers| subscribers.remove(id))
    }

    /// Listeners for `name`, in subscription order.
    pub fn listeners(&self, name: &str) -> Vec<ScopedListener> {
        let subscribers = self.scoped.lock().get(name).map(Arc::clone);
        subscribers.map_or_else(Vec::new, |subscribers| subscribers.snapshot())
    }
}

impl Debug for SubscriptionRegistry {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        let scoped = self.scoped.lock();
        let mut map = formatter.debug_map();
        for (name, subscribers) in scoped.iter() {
            map.entry(name, &subscribers.len());
        }
        map.finish()
    }
}
