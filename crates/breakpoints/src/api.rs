//! The public runtime handle.

use crate::bindings::build_breakpoints_namespace;
use crate::config::BreakpointConfig;
use crate::detector::{ChangeDetector, CurrentBreakpointState};
use crate::error::BreakpointError;
use crate::host::{MediaListener, MediaQueryListEvent, PageHost};
use crate::notify::{ChangeNotification, EventConstruction, NotificationBus};
use crate::registry::{Breakpoint, BreakpointRegistry};
use crate::source::BreakpointDataSource;
use crate::subscriptions::{
    EnterLeave, Scope, ScopedListener, SubscriptionHandle, SubscriptionRegistry,
};
use log::{debug, info};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::{Arc, OnceLock, Weak};

struct Shared {
    registry: BreakpointRegistry,
    detector: ChangeDetector,
    bus: NotificationBus,
    subscriptions: SubscriptionRegistry,
}

impl Shared {
    /// Entry point for every host media listener.
    fn on_predicate_change(&self, ordinal: usize, event: &MediaQueryListEvent) {
        let Some(breakpoint) = self.registry.at(ordinal) else {
            return;
        };
        debug!(
            "Predicate for {} flipped to {} ({})",
            breakpoint.name(),
            event.matches,
            event.media
        );
        if let Some(notification) = self.detector.recompute(&self.registry, Some(breakpoint)) {
            self.bus.emit(&notification);
        }
        let listeners = self.subscriptions.listeners(breakpoint.name());
        if listeners.is_empty() {
            return;
        }
        let notification = scoped_notification(breakpoint, false);
        for listener in listeners {
            listener.dispatch(&notification, event.matches);
        }
    }
}

/// The notification shape handed to per-breakpoint listeners.
fn scoped_notification(breakpoint: &Breakpoint, initial: bool) -> ChangeNotification {
    ChangeNotification::new(breakpoint.name(), initial, Arc::clone(breakpoint.predicate()))
}

/// A running breakpoint runtime. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Breakpoints {
    shared: Arc<Shared>,
}

impl Breakpoints {
    /// Load the payload, register every breakpoint, determine the current one
    /// and publish the namespace on the host's global object.
    ///
    /// Returns `Ok(None)` without touching the page when the host cannot read
    /// computed style or evaluate media queries.
    ///
    /// # Errors
    /// Any [`BreakpointError`] from loading or registering. Nothing is
    /// published when this fails.
    pub fn init(
        host: &dyn PageHost,
        config: &BreakpointConfig,
    ) -> Result<Option<Self>, BreakpointError> {
        if !host.supports_computed_style() || !host.supports_match_media() {
            debug!("Host lacks computed style or media queries; breakpoints disabled");
            return Ok(None);
        }

        let definitions = BreakpointDataSource::new(host, config).load()?;

        // Listeners are attached before the shared state exists; they find it
        // through this slot once it is filled.
        let slot: Arc<OnceLock<Weak<Shared>>> = Arc::new(OnceLock::new());
        let mut registry = BreakpointRegistry::new();
        for definition in &definitions {
            registry.register(host, &definition.name, &definition.query, |ordinal| {
                let slot = Arc::clone(&slot);
                let listener: MediaListener = Arc::new(move |event: &MediaQueryListEvent| {
                    if let Some(shared) = slot.get().and_then(Weak::upgrade) {
                        shared.on_predicate_change(ordinal, event);
                    }
                });
                listener
            })?;
        }

        let shared = Arc::new(Shared {
            registry,
            detector: ChangeDetector::new(),
            bus: NotificationBus::new(host.event_target(), &config.event_type),
            subscriptions: SubscriptionRegistry::new(),
        });
        if slot.set(Arc::downgrade(&shared)).is_err() {
            debug!("Listener slot already filled");
        }

        let runtime = Self { shared };
        if let Some(notification) = runtime.shared.detector.recompute(&runtime.shared.registry, None) {
            runtime.shared.bus.emit(&notification);
        }
        host.attach_namespace(&config.namespace, build_breakpoints_namespace(&runtime));
        info!(
            "Breakpoints ready: {} registered, current={:?}",
            runtime.count(),
            runtime.current_breakpoint()
        );
        Ok(Some(runtime))
    }

    /// The current breakpoint, `None` while undetermined.
    pub fn current_breakpoint(&self) -> Option<String> {
        self.shared.detector.current()
    }

    /// The breakpoint that was current before the latest transition.
    pub fn previous_breakpoint(&self) -> Option<String> {
        self.shared.detector.previous()
    }

    /// Snapshot of the detector state.
    pub fn state(&self) -> CurrentBreakpointState {
        self.shared.detector.state()
    }

    /// Query expression of `name`, or of the current breakpoint when `name` is `None`.
    pub fn query_for(&self, name: Option<&str>) -> Option<String> {
        let name = match name {
            Some(name) => name.to_owned(),
            None => self.current_breakpoint()?,
        };
        self.shared.registry.query_of(&name).map(str::to_owned)
    }

    pub fn is_current(&self, name: &str) -> bool {
        self.current_breakpoint().as_deref() == Some(name)
    }

    /// Whether the current breakpoint is `name` or wider. `None` for unknown names.
    /// While undetermined the viewport sits below every breakpoint.
    pub fn is_at_or_above(&self, name: &str) -> Option<bool> {
        let target = self.shared.registry.ordinal_of(name)?;
        Some(self.current_ordinal().is_some_and(|current| current >= target))
    }

    /// Whether the current breakpoint is narrower than `name`. `None` for unknown names.
    pub fn is_below(&self, name: &str) -> Option<bool> {
        let target = self.shared.registry.ordinal_of(name)?;
        Some(self.current_ordinal().is_none_or(|current| current < target))
    }

    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.shared.registry.ordinal_of(name)
    }

    pub fn name_at(&self, ordinal: usize) -> Option<String> {
        self.shared.registry.name_at(ordinal).map(str::to_owned)
    }

    pub fn count(&self) -> usize {
        self.shared.registry.count()
    }

    /// Breakpoint names in ascending ordinal order.
    pub fn names(&self) -> Vec<String> {
        self.shared
            .registry
            .iter()
            .map(|breakpoint| breakpoint.name().to_owned())
            .collect()
    }

    /// Whether `name`'s own predicate currently matches.
    pub fn matches(&self, name: &str) -> Option<bool> {
        self.shared.registry.get(name).map(Breakpoint::matches)
    }

    /// Event construction path latched by the first notification.
    pub fn event_construction(&self) -> Option<EventConstruction> {
        self.shared.bus.construction()
    }

    fn current_ordinal(&self) -> Option<usize> {
        self.current_breakpoint()
            .and_then(|name| self.shared.registry.ordinal_of(&name))
    }

    /// Listen to every transition of the current breakpoint.
    pub fn on_change<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&ChangeNotification) + Send + Sync + 'static,
    {
        let id = self.shared.subscriptions.next_id();
        self.shared.bus.subscribe(id, Arc::new(callback));
        SubscriptionHandle {
            id,
            scope: Scope::Global,
        }
    }

    /// Listen to every flip of `name`'s own predicate, whether or not it is current.
    ///
    /// # Errors
    /// `UnknownBreakpoint` when `name` is not registered.
    pub fn on_match_change<F>(
        &self,
        name: &str,
        callback: F,
    ) -> Result<SubscriptionHandle, BreakpointError>
    where
        F: Fn(&ChangeNotification, bool) + Send + Sync + 'static,
    {
        self.known(name)?;
        Ok(self
            .shared
            .subscriptions
            .add(name, ScopedListener::MatchChange(Arc::new(callback))))
    }

    /// Route `name`'s predicate flips to `on_enter` / `on_leave`. With
    /// `immediate`, the callback for the present state runs once before
    /// this returns, with `initial` set.
    ///
    /// # Errors
    /// `UnknownBreakpoint` when `name` is not registered.
    pub fn on_enter_leave(
        &self,
        name: &str,
        routes: EnterLeave,
    ) -> Result<SubscriptionHandle, BreakpointError> {
        let breakpoint = self.known(name)?;
        let immediate = routes.immediate.then(|| routes.clone());
        let handle = self
            .shared
            .subscriptions
            .add(name, ScopedListener::EnterLeave(routes));
        if let Some(routes) = immediate {
            routes.dispatch(&scoped_notification(breakpoint, true), breakpoint.matches());
        }
        Ok(handle)
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        match &handle.scope {
            Scope::Global => self.shared.bus.unsubscribe(handle.id),
            Scope::Breakpoint(name) => self.shared.subscriptions.remove(name, handle.id),
        }
    }

    fn known(&self, name: &str) -> Result<&Breakpoint, BreakpointError> {
        self.shared
            .registry
            .get(name)
            .ok_or_else(|| BreakpointError::UnknownBreakpoint(name.to_owned()))
    }
}

impl Debug for Breakpoints {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("Breakpoints")
            .field("registry", &self.shared.registry)
            .field("state", &self.state())
            .field("bus", &self.shared.bus)
            .field("subscriptions", &self.shared.subscriptions)
            .finish()
    }
}
