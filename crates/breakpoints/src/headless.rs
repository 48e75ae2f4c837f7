//! In-process [`PageHost`] backed by a simulated viewport.
//!
//! Media queries are evaluated with `css_media_queries`. Viewport changes go
//! through a task queue with a single drainer, so listener callbacks are
//! strictly serialized: a callback that resizes the page again only queues
//! the resize, which runs after the current pass has finished.

use crate::bindings::{HostNamespace, JSError, JSValue};
use crate::config::{DEFAULT_PSEUDO, DEFAULT_SELECTOR};
use crate::error::HostError;
use crate::host::{
    EventTarget, HostEvent, MediaListener, MediaQueryList, MediaQueryListEvent, PageHost,
};
use crate::notify::{ChangeNotification, EventConstruction};
use css_media_queries::{MediaEnvironment, MediaQuery};
use log::trace;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Serialize `text` the way computed style reports a `content` string.
pub fn css_string(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\\\""))
}

/// A media query list evaluated against the headless viewport.
pub struct HeadlessMediaList {
    media: String,
    query: MediaQuery,
    matches: AtomicBool,
    listeners: Mutex<Vec<MediaListener>>,
}

impl HeadlessMediaList {
    /// Store the new state; returns `true` when it flipped.
    fn reevaluate(&self, env: &MediaEnvironment) -> bool {
        let now = self.query.evaluate(env);
        self.matches.swap(now, Ordering::AcqRel) != now
    }

    fn notify(&self, matches: bool) {
        let event = MediaQueryListEvent {
            media: self.media.clone(),
            matches,
        };
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener(&event);
        }
    }
}

impl MediaQueryList for HeadlessMediaList {
    fn media(&self) -> &str {
        &self.media
    }

    fn matches(&self) -> bool {
        self.matches.load(Ordering::Acquire)
    }

    fn add_listener(&self, listener: MediaListener) {
        self.listeners.lock().push(listener);
    }
}

impl Debug for HeadlessMediaList {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("HeadlessMediaList")
            .field("media", &self.media)
            .field("matches", &self.matches())
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}

/// Callback registered on the headless global scope.
pub type EventListener = Arc<dyn Fn(&HostEvent) + Send + Sync>;

/// The headless global scope: records every dispatched event.
pub struct HeadlessEventTarget {
    native_events: bool,
    native_attempts: AtomicUsize,
    listeners: Mutex<Vec<(String, EventListener)>>,
    dispatched: Mutex<Vec<HostEvent>>,
}

impl HeadlessEventTarget {
    fn new(native_events: bool) -> Self {
        Self {
            native_events,
            native_attempts: AtomicUsize::new(0),
            listeners: Mutex::new(Vec::new()),
            dispatched: Mutex::new(Vec::new()),
        }
    }

    /// Like `addEventListener(type, listener)`.
    pub fn add_event_listener<F>(&self, event_type: &str, listener: F)
    where
        F: Fn(&HostEvent) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .push((event_type.to_owned(), Arc::new(listener)));
    }

    /// Every event dispatched so far, oldest first.
    pub fn dispatched_events(&self) -> Vec<HostEvent> {
        self.dispatched.lock().clone()
    }

    /// How many times the native constructor was tried.
    pub fn native_attempts(&self) -> usize {
        self.native_attempts.load(Ordering::Relaxed)
    }
}

impl EventTarget for HeadlessEventTarget {
    fn create_custom_event(
        &self,
        event_type: &str,
        detail: &ChangeNotification,
    ) -> Result<HostEvent, HostError> {
        self.native_attempts.fetch_add(1, Ordering::Relaxed);
        if !self.native_events {
            return Err(HostError::Unsupported("CustomEvent constructor"));
        }
        Ok(HostEvent {
            event_type: event_type.to_owned(),
            detail: detail.clone(),
            construction: EventConstruction::NativeSupported,
        })
    }

    fn create_legacy_event(&self, event_type: &str, detail: &ChangeNotification) -> HostEvent {
        HostEvent {
            event_type: event_type.to_owned(),
            detail: detail.clone(),
            construction: EventConstruction::FallbackOnly,
        }
    }

    fn dispatch_event(&self, event: HostEvent) -> bool {
        trace!("dispatch {} ({})", event.event_type, event.detail.breakpoint());
        self.dispatched.lock().push(event.clone());
        let listeners: Vec<EventListener> = self
            .listeners
            .lock()
            .iter()
            .filter(|(event_type, _)| *event_type == event.event_type)
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&event);
        }
        true
    }
}

impl Debug for HeadlessEventTarget {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("HeadlessEventTarget")
            .field("native_events", &self.native_events)
            .field("dispatched", &self.dispatched.lock().len())
            .finish_non_exhaustive()
    }
}

enum Task {
    Resize(MediaEnvironment),
}

/// Clears the single-drainer flag when the drain pass ends.
struct DrainGuard<'flag>(&'flag AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A page without an engine: viewport, generated content, media lists,
/// global event target and attached namespaces.
pub struct HeadlessPage {
    environment: Mutex<MediaEnvironment>,
    computed_style: bool,
    match_media: bool,
    generated: Mutex<HashMap<(String, String), String>>,
    lists: Mutex<Vec<Arc<HeadlessMediaList>>>,
    target: Arc<HeadlessEventTarget>,
    namespaces: Mutex<BTreeMap<String, HostNamespace>>,
    tasks: Mutex<VecDeque<Task>>,
    draining: AtomicBool,
}

impl HeadlessPage {
    pub fn new(environment: MediaEnvironment) -> Self {
        Self {
            environment: Mutex::new(environment),
            computed_style: true,
            match_media: true,
            generated: Mutex::new(HashMap::new()),
            lists: Mutex::new(Vec::new()),
            target: Arc::new(HeadlessEventTarget::new(true)),
            namespaces: Mutex::new(BTreeMap::new()),
            tasks: Mutex::new(VecDeque::new()),
            draining: AtomicBool::new(false),
        }
    }

    /// Embed `json` as the generated content of the default pseudo-element.
    #[must_use]
    pub fn with_breakpoint_payload(self, json: &str) -> Self {
        self.set_generated_content(DEFAULT_SELECTOR, DEFAULT_PSEUDO, &css_string(json));
        self
    }

    /// Behave like an engine that cannot report computed style.
    #[must_use]
    pub fn without_computed_style(mut self) -> Self {
        self.computed_style = false;
        self
    }

    /// Behave like an engine without `matchMedia`.
    #[must_use]
    pub fn without_match_media(mut self) -> Self {
        self.match_media = false;
        self
    }

    /// Behave like an engine whose structured-event constructor throws.
    #[must_use]
    pub fn without_custom_event(mut self) -> Self {
        self.target = Arc::new(HeadlessEventTarget::new(false));
        self
    }

    /// Set the raw computed `content` of `selector` + `pseudo`.
    pub fn set_generated_content(&self, selector: &str, pseudo: &str, content: &str) {
        self.generated
            .lock()
            .insert((selector.to_owned(), pseudo.to_owned()), content.to_owned());
    }

    pub fn environment(&self) -> MediaEnvironment {
        *self.environment.lock()
    }

    /// Change the viewport size, keeping the other environment settings.
    pub fn resize(&self, width_px: f32, height_px: f32) {
        let mut env = self.environment();
        env.width_px = width_px;
        env.height_px = height_px;
        self.set_environment(env);
    }

    /// Replace the environment and deliver media list changes.
    pub fn set_environment(&self, env: MediaEnvironment) {
        self.tasks.lock().push_back(Task::Resize(env));
        self.drain();
    }

    /// The global event target, for listeners and inspection.
    pub fn events(&self) -> &Arc<HeadlessEventTarget> {
        &self.target
    }

    /// Number of media lists created through `match_media`.
    pub fn media_list_count(&self) -> usize {
        self.lists.lock().len()
    }

    /// A copy of an attached namespace.
    pub fn namespace(&self, name: &str) -> Option<HostNamespace> {
        self.namespaces.lock().get(name).cloned()
    }

    /// Call `namespace.function(arguments)` as page script would.
    ///
    /// # Errors
    /// `TypeError` when the namespace is not attached, otherwise whatever the call returns.
    pub fn call(
        &self,
        namespace: &str,
        function: &str,
        arguments: Vec<JSValue>,
    ) -> Result<JSValue, JSError> {
        let attached = self
            .namespace(namespace)
            .ok_or_else(|| JSError::TypeError(format!("{namespace} is not defined")))?;
        attached.call(function, arguments)
    }

    fn drain(&self) {
        loop {
            if self.draining.swap(true, Ordering::AcqRel) {
                return;
            }
            {
                // Cleared on unwind as well.
                let _drainer = DrainGuard(&self.draining);
                loop {
                    let next = self.tasks.lock().pop_front();
                    let Some(task) = next else {
                        break;
                    };
                    self.run(task);
                }
            }
            if self.tasks.lock().is_empty() {
                return;
            }
        }
    }

    fn run(&self, task: Task) {
        match task {
            Task::Resize(env) => {
                trace!("viewport {}x{}", env.width_px, env.height_px);
                *self.environment.lock() = env;
                let lists = self.lists.lock().clone();
                // Evaluate everything first, then notify, so listeners see a
                // consistent set of match states.
                let flipped: Vec<(Arc<HeadlessMediaList>, bool)> = lists
                    .into_iter()
                    .filter(|list| list.reevaluate(&env))
                    .map(|list| {
                        let matches = list.matches();
                        (list, matches)
                    })
                    .collect();
                for (list, matches) in flipped {
                    list.notify(matches);
                }
            }
        }
    }
}

impl PageHost for HeadlessPage {
    fn supports_computed_style(&self) -> bool {
        self.computed_style
    }

    fn generated_content(&self, selector: &str, pseudo: &str) -> Option<String> {
        if !self.computed_style {
            return None;
        }
        self.generated
            .lock()
            .get(&(selector.to_owned(), pseudo.to_owned()))
            .cloned()
    }

    fn supports_match_media(&self) -> bool {
        self.match_media
    }

    fn match_media(&self, query: &str) -> Result<Arc<dyn MediaQueryList>, HostError> {
        if !self.match_media {
            return Err(HostError::Unsupported("matchMedia"));
        }
        let parsed = MediaQuery::parse(query).map_err(|source| HostError::InvalidQuery {
            query: query.to_owned(),
            source,
        })?;
        let matches = parsed.evaluate(&self.environment());
        let list = Arc::new(HeadlessMediaList {
            media: query.to_owned(),
            query: parsed,
            matches: AtomicBool::new(matches),
            listeners: Mutex::new(Vec::new()),
        });
        self.lists.lock().push(Arc::clone(&list));
        Ok(list as Arc<dyn MediaQueryList>)
    }

    fn event_target(&self) -> Arc<dyn EventTarget> {
        Arc::clone(&self.target) as Arc<dyn EventTarget>
    }

    fn attach_namespace(&self, name: &str, namespace: HostNamespace) {
        self.namespaces.lock().insert(name.to_owned(), namespace);
    }
}

impl Debug for HeadlessPage {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("HeadlessPage")
            .field("environment", &self.environment())
            .field("computed_style", &self.computed_style)
            .field("match_media", &self.match_media)
            .field("media_lists", &self.media_list_count())
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
