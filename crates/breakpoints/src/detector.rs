//! Decides which breakpoint is current and detects transitions.
//!
//! Width predicates are usually open-ended minimums (`min-width: T`), so at a
//! wide viewport every breakpoint below the width matches too. The current
//! breakpoint is therefore the highest-ordinal match, found by scanning from
//! the widest breakpoint down.

use crate::notify::ChangeNotification;
use crate::registry::{Breakpoint, BreakpointRegistry};
use core::mem;
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;

/// Whether a breakpoint has been determined since startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Detection {
    /// No predicate has matched yet.
    #[default]
    Undetermined,
    /// The named breakpoint is current.
    Determined(String),
}

/// Current and previous breakpoint. Written only by [`ChangeDetector`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CurrentBreakpointState {
    current: Detection,
    previous: Option<String>,
}

impl CurrentBreakpointState {
    #[inline]
    pub fn detection(&self) -> &Detection {
        &self.current
    }

    #[inline]
    pub fn current(&self) -> Option<&str> {
        match &self.current {
            Detection::Undetermined => None,
            Detection::Determined(name) => Some(name),
        }
    }

    /// The breakpoint that was current before the last transition.
    #[inline]
    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }
}

/// Owns [`CurrentBreakpointState`] and the recomputation routine.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    state: Mutex<CurrentBreakpointState>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the state.
    pub fn state(&self) -> CurrentBreakpointState {
        self.state.lock().clone()
    }

    pub fn current(&self) -> Option<String> {
        self.state.lock().current().map(str::to_owned)
    }

    pub fn previous(&self) -> Option<String> {
        self.state.lock().previous.clone()
    }

    /// Re-derive the current breakpoint from the live predicates.
    ///
    /// Returns the notification to emit when the current breakpoint changed,
    /// `None` when it did not or when no predicate matches. `trigger` is the
    /// breakpoint whose predicate flipped; on the startup pass it is `None`
    /// and the selected breakpoint's own predicate is reported instead.
    pub fn recompute(
        &self,
        registry: &BreakpointRegistry,
        trigger: Option<&Breakpoint>,
    ) -> Option<ChangeNotification> {
        let mut state = self.state.lock();
        let Some(candidate) = registry.widest_match() else {
            debug!("No breakpoint matches; keeping previous state");
            return None;
        };
        let initial = match &state.current {
            Detection::Determined(name) if name == candidate.name() => return None,
            Detection::Determined(_) => false,
            Detection::Undetermined => true,
        };
        let next = Detection::Determined(candidate.name().to_owned());
        let previous = mem::replace(&mut state.current, next);
        if let Detection::Determined(name) = previous {
            state.previous = Some(name);
        }
        drop(state);

        info!(
            "Breakpoint changed to {} (#{}){}",
            candidate.name(),
            candidate.ordinal(),
            if initial { " [initial]" } else { "" }
        );
        let trigger = trigger.unwrap_or(candidate);
        Some(ChangeNotification::new(
            candidate.name(),
            initial,
            Arc::clone(trigger.predicate()),
        ))
    }
}
