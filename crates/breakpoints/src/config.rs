//! Configuration for locating the breakpoint payload and publishing the runtime.
//!
//! The defaults match the style layer's generator: the payload is the
//! generated content of `head::after`, the runtime is published as the
//! `breakpoints` namespace and transitions fire `breakpointChange`.
//! Configuration can be loaded from environment variables or constructed
//! programmatically.

use std::env;

/// Default element whose pseudo-element carries the payload.
pub const DEFAULT_SELECTOR: &str = "head";
/// Default pseudo-element carrying the payload.
pub const DEFAULT_PSEUDO: &str = "::after";
/// Default global namespace name.
pub const DEFAULT_NAMESPACE: &str = "breakpoints";
/// Default event type dispatched on every transition.
pub const DEFAULT_EVENT_TYPE: &str = "breakpointChange";

/// Where the payload lives and how the runtime is published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakpointConfig {
    /// Selector of the invisible element holding the payload
    pub selector: String,
    /// Pseudo-element whose generated `content` is the payload
    pub pseudo: String,
    /// Name of the namespace attached to the global scope
    pub namespace: String,
    /// Event type dispatched on the global scope for each transition
    pub event_type: String,
}

impl BreakpointConfig {
    /// Construct a `BreakpointConfig` with explicit values.
    ///
    /// # Arguments
    ///
    /// * `selector` - Element selector holding the payload
    /// * `pseudo` - Pseudo-element whose generated content is read
    /// * `namespace` - Global namespace name for the runtime API
    /// * `event_type` - Type tag of the transition event
    #[inline]
    #[must_use]
    pub fn new(
        selector: impl Into<String>,
        pseudo: impl Into<String>,
        namespace: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            selector: selector.into(),
            pseudo: pseudo.into(),
            namespace: namespace.into(),
            event_type: event_type.into(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables, falling back to the defaults:
    /// - `BREAKPOINTS_SELECTOR` (default: `head`)
    /// - `BREAKPOINTS_PSEUDO` (default: `::after`)
    /// - `BREAKPOINTS_NAMESPACE` (default: `breakpoints`)
    /// - `BREAKPOINTS_EVENT` (default: `breakpointChange`)
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let read = |key: &str, fallback: &str| {
            env::var(key)
                .ok()
                .filter(|val| !val.trim().is_empty())
                .unwrap_or_else(|| fallback.to_owned())
        };
        Self {
            selector: read("BREAKPOINTS_SELECTOR", DEFAULT_SELECTOR),
            pseudo: read("BREAKPOINTS_PSEUDO", DEFAULT_PSEUDO),
            namespace: read("BREAKPOINTS_NAMESPACE", DEFAULT_NAMESPACE),
            event_type: read("BREAKPOINTS_EVENT", DEFAULT_EVENT_TYPE),
        }
    }
}

impl Default for BreakpointConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_SELECTOR,
            DEFAULT_PSEUDO,
            DEFAULT_NAMESPACE,
            DEFAULT_EVENT_TYPE,
        )
    }
}
