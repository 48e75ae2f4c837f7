//! Media Queries Level 4 — §2.3 Media Types
//! Spec: <https://www.w3.org/TR/mediaqueries-4/#media-types>

use crate::MediaQueryError;

/// The media types still defined by Level 4.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MediaType {
    /// Matches every device.
    All,
    /// Screen-based devices. The default for interactive pages.
    #[default]
    Screen,
    /// Paged, printed output.
    Print,
}

impl MediaType {
    /// Resolve a (case-insensitive) media type identifier.
    ///
    /// # Errors
    /// Returns `MediaQueryError::UnknownMediaType` for anything else.
    pub fn from_ident(ident: &str) -> Result<Self, MediaQueryError> {
        match ident.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "screen" => Ok(Self::Screen),
            "print" => Ok(Self::Print),
            _ => Err(MediaQueryError::UnknownMediaType),
        }
    }

    /// Whether a query written for `self` applies to a device of type `device`.
    #[inline]
    pub fn applies_to(self, device: Self) -> bool {
        self == Self::All || self == device
    }
}
