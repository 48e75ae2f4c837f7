//! Media Queries Level 4 — Parsing and evaluation of viewport range queries.
//! Spec: <https://www.w3.org/TR/mediaqueries-4/>
//!
//! Only the subset needed to evaluate width-range breakpoints is supported:
//! an optional media type followed by `and`-joined width, height and
//! orientation features. Lengths are `px`, `em` and `rem`; inside media
//! queries `em` resolves against the initial (root) font size.

#![forbid(unsafe_code)]

use core::error::Error;
use core::fmt::{Display, Formatter, Result as FmtResult};

// Per-chapter modules mirroring the spec table of contents.
pub mod chapter_2_media_types;
pub mod chapter_3_syntax;
pub mod chapter_4_features;

pub use chapter_2_media_types::MediaType;
pub use chapter_3_syntax::MediaQuery;
pub use chapter_4_features::{Length, LengthUnit, MediaEnvironment, MediaFeature, Orientation};

/// Parse error for media query parsing utilities in this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaQueryError {
    /// The query contained no media type and no feature.
    Empty,
    /// The next token did not match the expected grammar.
    UnexpectedToken,
    /// A parenthesized feature name is not supported.
    UnknownFeature,
    /// A bare identifier is not a supported media type.
    UnknownMediaType,
    /// A dimension used a unit other than `px`, `em` or `rem`.
    UnknownUnit,
}

impl Display for MediaQueryError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        let text = match self {
            Self::Empty => "empty media query",
            Self::UnexpectedToken => "unexpected token in media query",
            Self::UnknownFeature => "unsupported media feature",
            Self::UnknownMediaType => "unsupported media type",
            Self::UnknownUnit => "unsupported length unit",
        };
        formatter.write_str(text)
    }
}

impl Error for MediaQueryError {}
