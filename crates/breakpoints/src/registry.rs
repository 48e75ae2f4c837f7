//! The ordered set of breakpoints and their live predicates.
//!
//! Ordinals follow registration order, which follows the payload's key order.
//! The style-layer generator emits keys ascending by width threshold; the
//! registry trusts that and never parses thresholds out of query text.

use crate::error::BreakpointError;
use crate::host::{MediaListener, MediaQueryList, PageHost};
use log::debug;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

/// A named width range bound to its live predicate.
#[derive(Clone)]
pub struct Breakpoint {
    name: String,
    query: String,
    ordinal: usize,
    predicate: Arc<dyn MediaQueryList>,
}

impl Breakpoint {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The query expression exactly as authored.
    #[inline]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Rank among all breakpoints, 0 being the narrowest.
    #[inline]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The host's live evaluation of this breakpoint's query.
    #[inline]
    pub fn predicate(&self) -> &Arc<dyn MediaQueryList> {
        &self.predicate
    }

    /// Current match state as last reported by the host.
    #[inline]
    pub fn matches(&self) -> bool {
        self.predicate.matches()
    }
}

impl Debug for Breakpoint {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("Breakpoint")
            .field("name", &self.name)
            .field("query", &self.query)
            .field("ordinal", &self.ordinal)
            .field("matches", &self.matches())
            .finish()
    }
}

/// Owns every [`Breakpoint`] and the name → ordinal index.
#[derive(Debug, Default)]
pub struct BreakpointRegistry {
    breakpoints: Vec<Breakpoint>,
    ordinals: HashMap<String, usize>,
}

impl BreakpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `query` through the host, subscribe the listener built by
    /// `listener_for` and assign the next ordinal.
    ///
    /// `listener_for` receives the new ordinal so the listener knows which
    /// breakpoint fired.
    ///
    /// # Errors
    /// `DuplicateBreakpoint` if `name` is taken, `Host` if the host rejects the query.
    pub fn register<F>(
        &mut self,
        host: &dyn PageHost,
        name: &str,
        query: &str,
        listener_for: F,
    ) -> Result<usize, BreakpointError>
    where
        F: FnOnce(usize) -> MediaListener,
    {
        if self.ordinals.contains_key(name) {
            return Err(BreakpointError::DuplicateBreakpoint(name.to_owned()));
        }
        let predicate = host
            .match_media(query)
            .map_err(|source| BreakpointError::Host {
                name: name.to_owned(),
                source,
            })?;
        let ordinal = self.breakpoints.len();
        predicate.add_listener(listener_for(ordinal));
        debug!(
            "Registered breakpoint {name} #{ordinal} ({query}), matches={}",
            predicate.matches()
        );
        self.ordinals.insert(name.to_owned(), ordinal);
        self.breakpoints.push(Breakpoint {
            name: name.to_owned(),
            query: query.to_owned(),
            ordinal,
            predicate,
        });
        Ok(ordinal)
    }

    #[inline]
    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.ordinals.get(name).copied()
    }

    #[inline]
    pub fn query_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(Breakpoint::query)
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.breakpoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    #[inline]
    pub fn name_at(&self, ordinal: usize) -> Option<&str> {
        self.at(ordinal).map(Breakpoint::name)
    }

    #[inline]
    pub fn at(&self, ordinal: usize) -> Option<&Breakpoint> {
        self.breakpoints.get(ordinal)
    }

    pub fn get(&self, name: &str) -> Option<&Breakpoint> {
        self.ordinal_of(name).and_then(|ordinal| self.at(ordinal))
    }

    /// Breakpoints in ascending ordinal order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Breakpoint> {
        self.breakpoints.iter()
    }

    /// The widest breakpoint whose predicate currently matches.
    pub fn widest_match(&self) -> Option<&Breakpoint> {
        self.iter().rev().find(|breakpoint| breakpoint.matches())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessPage;
    use crate::host::MediaQueryListEvent;
    use css_media_queries::MediaEnvironment;

    fn ignore(_ordinal: usize) -> MediaListener {
        Arc::new(|_event: &MediaQueryListEvent| {})
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let page = HeadlessPage::new(MediaEnvironment::new(1000.0, 800.0));
        let mut registry = BreakpointRegistry::new();

        assert_eq!(registry.register(&page, "md", "(min-width: 48em)", ignore).unwrap(), 0);
        let err = registry
            .register(&page, "md", "(min-width: 90em)", ignore)
            .unwrap_err();

        assert!(matches!(err, BreakpointError::DuplicateBreakpoint(ref name) if name == "md"), "{err}");
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.query_of("md"), Some("(min-width: 48em)"), "first registration kept");
        assert_eq!(page.media_list_count(), 1, "rejected query is never compiled");
    }

    #[test]
    fn widest_match_prefers_highest_ordinal() {
        let page = HeadlessPage::new(MediaEnvironment::new(1000.0, 800.0));
        let mut registry = BreakpointRegistry::new();
        for (name, query) in [("sm", "(min-width: 0em)"), ("md", "(min-width: 48em)"), ("lg", "(min-width: 80em)")] {
            registry.register(&page, name, query, ignore).unwrap();
        }

        assert_eq!(registry.widest_match().map(Breakpoint::name), Some("md"));
        assert_eq!(registry.name_at(2), Some("lg"));
        assert_eq!(registry.ordinal_of("xl"), None);
    }
}
