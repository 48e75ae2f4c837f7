//! Named viewport breakpoints shared between a page's style layer and its scripts.
//!
//! The style layer writes its breakpoints once, as a JSON object in the
//! generated content of an invisible pseudo-element:
//!
//! ```text
//! head::after { content: '{"sm":"(min-width: 0em)","md":"(min-width: 48em)"}'; }
//! ```
//!
//! This crate reads that payload through a [`PageHost`], compiles every query
//! into a live media query list, and keeps track of the *current* breakpoint:
//! the highest-ordinal one whose query matches. Each transition is announced
//! exactly once as a `breakpointChange` event on the global scope and to Rust
//! listeners; per-breakpoint listeners observe their own query flipping.
//!
//! # Architecture
//!
//! ```text
//! BreakpointDataSource → BreakpointRegistry → host media lists
//!                                                 ↓ (change callbacks)
//!                 Breakpoints API ← ChangeDetector → NotificationBus → global event
//! ```
//!
//! # Example
//!
//! ```
//! use breakpoints::headless::HeadlessPage;
//! use breakpoints::{BreakpointConfig, Breakpoints};
//! use css_media_queries::MediaEnvironment;
//!
//! let page = HeadlessPage::new(MediaEnvironment::new(1000.0, 800.0)).with_breakpoint_payload(
//!     r#"{"sm":"(min-width: 0em)","md":"(min-width: 48em)","lg":"(min-width: 80em)"}"#,
//! );
//! let runtime = Breakpoints::init(&page, &BreakpointConfig::default())
//!     .expect("payload is valid")
//!     .expect("headless page supports everything");
//! assert_eq!(runtime.current_breakpoint().as_deref(), Some("md"));
//!
//! page.resize(1400.0, 800.0);
//! assert_eq!(runtime.current_breakpoint().as_deref(), Some("lg"));
//! ```

#![allow(
    clippy::module_name_repetitions,
    reason = "BreakpointRegistry and friends read better than Registry"
)]
#![allow(clippy::missing_errors_doc, reason = "Errors are documented per function where useful")]

pub mod api;
pub mod bindings;
pub mod config;
pub mod detector;
pub mod error;
pub mod headless;
pub mod host;
pub mod notify;
pub mod registry;
pub mod source;
pub mod subscriptions;

pub use api::Breakpoints;
pub use bindings::{HostFnKind, HostNamespace, JSError, JSValue, build_breakpoints_namespace};
pub use config::BreakpointConfig;
pub use detector::{ChangeDetector, CurrentBreakpointState, Detection};
pub use error::{BreakpointError, HostError};
pub use host::{EventTarget, HostEvent, MediaListener, MediaQueryList, MediaQueryListEvent, PageHost};
pub use notify::{ChangeNotification, EventConstruction, NotificationBus};
pub use registry::{Breakpoint, BreakpointRegistry};
pub use source::{BreakpointDataSource, BreakpointDefinition};
pub use subscriptions::{EnterLeave, Scope, SubscriptionHandle, SubscriptionId};
