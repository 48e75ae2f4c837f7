use css_media_queries::MediaQueryError;
use thiserror::Error;

/// Faults reported by a [`PageHost`](crate::host::PageHost) implementation.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host does not provide the requested primitive.
    #[error("host does not support {0}")]
    Unsupported(&'static str),
    /// The host could not compile a media query.
    #[error("invalid media query `{query}`: {source}")]
    InvalidQuery {
        query: String,
        #[source]
        source: MediaQueryError,
    },
}

/// Errors raised while loading breakpoints or subscribing to them.
#[derive(Debug, Error)]
pub enum BreakpointError {
    /// The designated pseudo-element carries no generated content.
    #[error("no breakpoint payload in the generated content of `{selector}{pseudo}`")]
    MissingPayload { selector: String, pseudo: String },
    /// The payload is not valid JSON once unquoted.
    #[error("breakpoint payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// The payload parsed, but is not a JSON object.
    #[error("breakpoint payload must be a JSON object")]
    NotAnObject,
    /// A breakpoint maps to something other than a query string.
    #[error("breakpoint `{name}` must map to a media query string")]
    InvalidQueryValue { name: String },
    /// The same name was registered twice.
    #[error("breakpoint `{0}` is already registered")]
    DuplicateBreakpoint(String),
    /// The host refused to compile a breakpoint's query.
    #[error("host rejected breakpoint `{name}`: {source}")]
    Host {
        name: String,
        #[source]
        source: HostError,
    },
    /// A subscription named a breakpoint that was never registered.
    #[error("unknown breakpoint `{0}`")]
    UnknownBreakpoint(String),
}
