//! Host abstraction for the page environment the runtime is embedded in.
//!
//! An engine adapter implements [`PageHost`] to expose computed style, live
//! media query lists, the global event target and a way to publish a
//! namespace on the global object. The runtime never talks to an engine
//! directly. Hosts must deliver media listener callbacks serially: one
//! change and everything it triggers completes before the next is delivered.

use crate::bindings::HostNamespace;
use crate::error::HostError;
use crate::notify::{ChangeNotification, EventConstruction};
use std::sync::Arc;

/// Payload a host passes to media listeners when a list flips.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaQueryListEvent {
    /// The serialized query of the list that changed.
    pub media: String,
    /// The list's state after the change.
    pub matches: bool,
}

/// Callback registered on a [`MediaQueryList`].
pub type MediaListener = Arc<dyn Fn(&MediaQueryListEvent) + Send + Sync>;

/// A live, host-evaluated media query.
pub trait MediaQueryList: Send + Sync {
    /// The query text this list was created from.
    fn media(&self) -> &str;
    /// Whether the query currently holds.
    fn matches(&self) -> bool;
    /// Register a listener invoked each time `matches` flips.
    fn add_listener(&self, listener: MediaListener);
}

/// A structured event built by an [`EventTarget`].
#[derive(Clone, Debug)]
pub struct HostEvent {
    /// Event type tag (for example `breakpointChange`).
    pub event_type: String,
    /// The transition being announced.
    pub detail: ChangeNotification,
    /// Which construction path produced the event.
    pub construction: EventConstruction,
}

/// The global scope events are dispatched on.
pub trait EventTarget: Send + Sync {
    /// Build an event through the host's native structured-event constructor.
    ///
    /// # Errors
    /// Returns `HostError::Unsupported` when no such constructor exists.
    fn create_custom_event(
        &self,
        event_type: &str,
        detail: &ChangeNotification,
    ) -> Result<HostEvent, HostError>;

    /// Build an event through the legacy create-then-initialize path.
    fn create_legacy_event(&self, event_type: &str, detail: &ChangeNotification) -> HostEvent;

    /// Dispatch an event to the global scope's listeners.
    /// Returns `false` when a listener canceled it.
    fn dispatch_event(&self, event: HostEvent) -> bool;
}

/// Everything the runtime needs from the page.
pub trait PageHost: Send + Sync {
    /// Whether computed style (including pseudo-element content) can be read.
    fn supports_computed_style(&self) -> bool;

    /// The computed `content` value of `selector` + `pseudo`, exactly as the
    /// host serializes it (usually a quoted CSS string), or `None` when the
    /// element is missing or has no generated content.
    fn generated_content(&self, selector: &str, pseudo: &str) -> Option<String>;

    /// Whether live media query lists are available.
    fn supports_match_media(&self) -> bool;

    /// Compile `query` into a live list.
    ///
    /// # Errors
    /// Returns `HostError` when the query cannot be compiled.
    fn match_media(&self, query: &str) -> Result<Arc<dyn MediaQueryList>, HostError>;

    /// The global event target.
    fn event_target(&self) -> Arc<dyn EventTarget>;

    /// Publish `namespace` on the global object under `name`.
    fn attach_namespace(&self, name: &str, namespace: HostNamespace);
}
