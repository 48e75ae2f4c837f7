//! Engine-agnostic namespace published on the page's global object.
//!
//! This mirrors the host-binding facade of a JS engine adapter: a namespace
//! is a set of synchronous functions and constant properties over a small
//! value type, which any engine can install without knowing about
//! breakpoints. Subscriptions are Rust-side only; page scripts observe
//! transitions through the global `breakpointChange` event.

use crate::api::Breakpoints;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

/// Values crossing the namespace boundary. Only the kinds the breakpoint
/// queries take or return are modelled.
#[derive(Clone, Debug, PartialEq)]
pub enum JSValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

impl From<Option<bool>> for JSValue {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Undefined, Self::Boolean)
    }
}

impl From<Option<String>> for JSValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Undefined, Self::String)
    }
}

/// Thrown back into page script when a namespace call is misused.
#[derive(Debug, PartialEq, Eq)]
pub enum JSError {
    /// Wrong argument type, missing argument or unknown function.
    TypeError(String),
}

impl Display for JSError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::TypeError(message) => write!(formatter, "TypeError: {message}"),
        }
    }
}

impl Error for JSError {}

/// A synchronous host function signature.
pub type HostFnSync = dyn Fn(Vec<JSValue>) -> Result<JSValue, JSError> + Send + Sync + 'static;

/// A single function descriptor the engine adapter can install.
#[derive(Clone)]
pub enum HostFnKind {
    /// Synchronous function.
    Sync(Arc<HostFnSync>),
}

/// A namespaced set of functions and properties (for example, `breakpoints`).
#[derive(Clone, Default)]
pub struct HostNamespace {
    /// Functions to install under this namespace.
    pub functions: BTreeMap<String, HostFnKind>,
    /// Constant properties to install under this namespace.
    pub properties: BTreeMap<String, JSValue>,
}

impl HostNamespace {
    /// Create an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a synchronous function.
    #[must_use]
    pub fn with_sync_fn(mut self, name: &str, function: Arc<HostFnSync>) -> Self {
        self.functions
            .insert(name.to_owned(), HostFnKind::Sync(function));
        self
    }

    /// Register a constant property.
    #[must_use]
    pub fn with_property(mut self, name: &str, value: JSValue) -> Self {
        self.properties.insert(name.to_owned(), value);
        self
    }

    /// Invoke a function the way an engine adapter would.
    ///
    /// # Errors
    /// `TypeError` when `name` is not a function of this namespace, otherwise
    /// whatever the function returns.
    pub fn call(&self, name: &str, arguments: Vec<JSValue>) -> Result<JSValue, JSError> {
        match self.functions.get(name) {
            Some(HostFnKind::Sync(function)) => function(arguments),
            None => Err(JSError::TypeError(format!("{name} is not a function"))),
        }
    }
}

/// Read an optional string argument; `undefined`/`null`/missing map to `None`.
fn optional_name(arguments: &[JSValue], function: &str) -> Result<Option<String>, JSError> {
    match arguments.first() {
        None | Some(JSValue::Undefined | JSValue::Null) => Ok(None),
        Some(JSValue::String(name)) => Ok(Some(name.clone())),
        Some(_) => Err(JSError::TypeError(format!(
            "{function}: breakpoint name must be a string"
        ))),
    }
}

fn required_name(arguments: &[JSValue], function: &str) -> Result<String, JSError> {
    optional_name(arguments, function)?.ok_or_else(|| {
        JSError::TypeError(format!("{function}: missing breakpoint name"))
    })
}

/// Build the namespace exposing the read-only queries of `runtime`.
///
/// Functions: `current()`, `query(name?)`, `is(name)`, `isAtOrAbove(name)`,
/// `isBelow(name)`, `names()`. Property: `count`. Unknown names yield
/// `undefined` rather than throwing.
pub fn build_breakpoints_namespace(runtime: &Breakpoints) -> HostNamespace {
    let current = {
        let runtime = runtime.clone();
        Arc::new(move |_arguments: Vec<JSValue>| -> Result<JSValue, JSError> {
            Ok(runtime.current_breakpoint().into())
        })
    };
    let query = {
        let runtime = runtime.clone();
        Arc::new(move |arguments: Vec<JSValue>| -> Result<JSValue, JSError> {
            let name = optional_name(&arguments, "query")?;
            Ok(runtime.query_for(name.as_deref()).into())
        })
    };
    let is = {
        let runtime = runtime.clone();
        Arc::new(move |arguments: Vec<JSValue>| -> Result<JSValue, JSError> {
            let name = required_name(&arguments, "is")?;
            Ok(JSValue::Boolean(runtime.is_current(&name)))
        })
    };
    let at_or_above = {
        let runtime = runtime.clone();
        Arc::new(move |arguments: Vec<JSValue>| -> Result<JSValue, JSError> {
            let name = required_name(&arguments, "isAtOrAbove")?;
            Ok(runtime.is_at_or_above(&name).into())
        })
    };
    let below = {
        let runtime = runtime.clone();
        Arc::new(move |arguments: Vec<JSValue>| -> Result<JSValue, JSError> {
            let name = required_name(&arguments, "isBelow")?;
            Ok(runtime.is_below(&name).into())
        })
    };
    let names = {
        let runtime = runtime.clone();
        Arc::new(move |_arguments: Vec<JSValue>| -> Result<JSValue, JSError> {
            Ok(JSValue::String(runtime.names().join(",")))
        })
    };

    HostNamespace::new()
        .with_sync_fn("current", current)
        .with_sync_fn("query", query)
        .with_sync_fn("is", is)
        .with_sync_fn("isAtOrAbove", at_or_above)
        .with_sync_fn("isBelow", below)
        .with_sync_fn("names", names)
        .with_property("count", JSValue::Number(runtime.count() as f64))
}
