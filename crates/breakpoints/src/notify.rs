//! Builds and dispatches `breakpointChange` notifications.
//!
//! Event construction probes the host's native constructor once. If that
//! fails the bus latches onto the legacy path for the rest of its life and
//! never probes again.

use crate::host::{EventTarget, HostEvent, MediaQueryList};
use crate::subscriptions::{ChangeCallback, SubscriptionId, Subscribers};
use log::{debug, warn};
use serde_json::{Value, json};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::{Arc, OnceLock};

/// One transition, as seen by every listener.
#[derive(Clone)]
pub struct ChangeNotification {
    breakpoint: String,
    initial: bool,
    trigger: Arc<dyn MediaQueryList>,
}

impl ChangeNotification {
    pub fn new(breakpoint: &str, initial: bool, trigger: Arc<dyn MediaQueryList>) -> Self {
        Self {
            breakpoint: breakpoint.to_owned(),
            initial,
            trigger,
        }
    }

    /// Name of the breakpoint this notification is about.
    #[inline]
    pub fn breakpoint(&self) -> &str {
        &self.breakpoint
    }

    /// `true` only for the first determination since startup (or for the
    /// synchronous call made by an `immediate` enter/leave subscription).
    #[inline]
    pub fn initial(&self) -> bool {
        self.initial
    }

    /// The predicate whose change caused this notification.
    #[inline]
    pub fn trigger(&self) -> &Arc<dyn MediaQueryList> {
        &self.trigger
    }

    /// Query text of [`Self::trigger`].
    #[inline]
    pub fn media(&self) -> &str {
        self.trigger.media()
    }

    /// The payload as a JSON object: `{ breakpoint, initial, media }`.
    pub fn to_json(&self) -> Value {
        json!({
            "breakpoint": self.breakpoint,
            "initial": self.initial,
            "media": self.media(),
        })
    }
}

impl Debug for ChangeNotification {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("ChangeNotification")
            .field("breakpoint", &self.breakpoint)
            .field("initial", &self.initial)
            .field("media", &self.media())
            .finish()
    }
}

/// How the host can construct structured events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventConstruction {
    /// The native constructor works.
    NativeSupported,
    /// The native constructor failed once; only the legacy path is used.
    FallbackOnly,
}

/// Dispatches transition events on the global scope and to global listeners.
pub struct NotificationBus {
    target: Arc<dyn EventTarget>,
    event_type: String,
    construction: OnceLock<EventConstruction>,
    listeners: Subscribers<ChangeCallback>,
}

impl NotificationBus {
    pub fn new(target: Arc<dyn EventTarget>, event_type: &str) -> Self {
        Self {
            target,
            event_type: event_type.to_owned(),
            construction: OnceLock::new(),
            listeners: Subscribers::default(),
        }
    }

    #[inline]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The latched construction path, `None` before the first event.
    #[inline]
    pub fn construction(&self) -> Option<EventConstruction> {
        self.construction.get().copied()
    }

    pub fn subscribe(&self, id: SubscriptionId, callback: ChangeCallback) {
        self.listeners.add(id, callback);
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Dispatch `notification` as a global event, then run global listeners.
    pub fn emit(&self, notification: &ChangeNotification) {
        let event = self.build_event(notification);
        debug!(
            "Dispatching {} for {} via {:?}",
            self.event_type, notification.breakpoint, event.construction
        );
        self.target.dispatch_event(event);
        for listener in self.listeners.snapshot() {
            listener(notification);
        }
    }

    fn build_event(&self, notification: &ChangeNotification) -> HostEvent {
        match self.construction.get() {
            Some(EventConstruction::FallbackOnly) => self
                .target
                .create_legacy_event(&self.event_type, notification),
            Some(EventConstruction::NativeSupported) => self
                .target
                .create_custom_event(&self.event_type, notification)
                .unwrap_or_else(|err| {
                    warn!("Native event construction failed after succeeding before: {err}");
                    self.target.create_legacy_event(&self.event_type, notification)
                }),
            None => match self.target.create_custom_event(&self.event_type, notification) {
                Ok(event) => {
                    self.latch(EventConstruction::NativeSupported);
                    event
                }
                Err(err) => {
                    warn!("Native event construction unavailable ({err}); using legacy events");
                    self.latch(EventConstruction::FallbackOnly);
                    self.target.create_legacy_event(&self.event_type, notification)
                }
            },
        }
    }

    fn latch(&self, construction: EventConstruction) {
        // Emission is serialized by the host, so the first probe always wins.
        if self.construction.set(construction).is_err() {
            debug!("Event construction already latched");
        }
    }
}

impl Debug for NotificationBus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("NotificationBus")
            .field("event_type", &self.event_type)
            .field("construction", &self.construction())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
