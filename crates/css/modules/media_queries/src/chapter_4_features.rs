//! Media Queries Level 4 — §4 Viewport/Page Characteristics Media Features
//! Spec: <https://www.w3.org/TR/mediaqueries-4/#mf-dimensions>

use crate::{MediaQueryError, MediaType};
use cssparser::{ParseError, Parser, Token};

/// Root font size browsers use when the user has not changed it.
pub const DEFAULT_ROOT_FONT_SIZE_PX: f32 = 16.0;

/// Supported subset of CSS <length> inside media features: px, em, rem, plus unitless zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthUnit {
    Pixels,
    Ems,
    RootEms,
}

/// A CSS <length> value with unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: LengthUnit,
}

impl Length {
    /// Resolve to CSS pixels. In media queries relative units are based on the
    /// initial value of `font-size`, so `em` and `rem` both scale by the root size.
    #[inline]
    pub fn to_px(self, root_font_size_px: f32) -> f32 {
        match self.unit {
            LengthUnit::Pixels => self.value,
            LengthUnit::Ems | LengthUnit::RootEms => self.value * root_font_size_px,
        }
    }
}

/// §4.4 `orientation`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// A single parenthesized media feature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MediaFeature {
    Width(Length),
    MinWidth(Length),
    MaxWidth(Length),
    Height(Length),
    MinHeight(Length),
    MaxHeight(Length),
    Orientation(Orientation),
}

/// The device state a query is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediaEnvironment {
    pub width_px: f32,
    pub height_px: f32,
    pub root_font_size_px: f32,
    pub media_type: MediaType,
}

impl MediaEnvironment {
    /// A screen viewport with the default root font size.
    #[inline]
    pub const fn new(width_px: f32, height_px: f32) -> Self {
        Self {
            width_px,
            height_px,
            root_font_size_px: DEFAULT_ROOT_FONT_SIZE_PX,
            media_type: MediaType::Screen,
        }
    }

    /// Same viewport with a different root font size.
    #[inline]
    #[must_use]
    pub const fn with_root_font_size(mut self, root_font_size_px: f32) -> Self {
        self.root_font_size_px = root_font_size_px;
        self
    }

    /// Same viewport reported as a different media type.
    #[inline]
    #[must_use]
    pub const fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    /// §4.4: portrait when height is greater than or equal to width.
    #[inline]
    pub fn orientation(&self) -> Orientation {
        if self.height_px >= self.width_px {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

impl MediaFeature {
    /// Evaluate this feature in the given environment.
    pub fn evaluate(&self, env: &MediaEnvironment) -> bool {
        let root = env.root_font_size_px;
        match *self {
            Self::Width(length) => (env.width_px - length.to_px(root)).abs() < f32::EPSILON,
            Self::MinWidth(length) => env.width_px >= length.to_px(root),
            Self::MaxWidth(length) => env.width_px <= length.to_px(root),
            Self::Height(length) => (env.height_px - length.to_px(root)).abs() < f32::EPSILON,
            Self::MinHeight(length) => env.height_px >= length.to_px(root),
            Self::MaxHeight(length) => env.height_px <= length.to_px(root),
            Self::Orientation(orientation) => env.orientation() == orientation,
        }
    }
}

/// Parse the contents of a `( <name> : <value> )` block.
///
/// # Errors
/// Returns a custom `MediaQueryError` for unknown names, units or trailing tokens.
pub fn parse_feature<'i>(
    input: &mut Parser<'i, '_>,
) -> Result<MediaFeature, ParseError<'i, MediaQueryError>> {
    let location = input.current_source_location();
    let name = input.expect_ident()?.to_ascii_lowercase();
    input.expect_colon()?;
    let feature = match name.as_str() {
        "width" => MediaFeature::Width(parse_length(input)?),
        "min-width" => MediaFeature::MinWidth(parse_length(input)?),
        "max-width" => MediaFeature::MaxWidth(parse_length(input)?),
        "height" => MediaFeature::Height(parse_length(input)?),
        "min-height" => MediaFeature::MinHeight(parse_length(input)?),
        "max-height" => MediaFeature::MaxHeight(parse_length(input)?),
        "orientation" => MediaFeature::Orientation(parse_orientation(input)?),
        _ => return Err(location.new_custom_error(MediaQueryError::UnknownFeature)),
    };
    input.expect_exhausted()?;
    Ok(feature)
}

fn parse_orientation<'i>(
    input: &mut Parser<'i, '_>,
) -> Result<Orientation, ParseError<'i, MediaQueryError>> {
    let location = input.current_source_location();
    let ident = input.expect_ident()?.to_ascii_lowercase();
    match ident.as_str() {
        "portrait" => Ok(Orientation::Portrait),
        "landscape" => Ok(Orientation::Landscape),
        _ => Err(location.new_custom_error(MediaQueryError::UnexpectedToken)),
    }
}

/// Parse a <length>. Supports px/em/rem and unitless zero.
fn parse_length<'i>(input: &mut Parser<'i, '_>) -> Result<Length, ParseError<'i, MediaQueryError>> {
    let location = input.current_source_location();
    match *input.next()? {
        Token::Dimension {
            value, ref unit, ..
        } => {
            let unit_kind = match unit.to_ascii_lowercase().as_str() {
                "px" => LengthUnit::Pixels,
                "em" => LengthUnit::Ems,
                "rem" => LengthUnit::RootEms,
                _ => return Err(location.new_custom_error(MediaQueryError::UnknownUnit)),
            };
            Ok(Length {
                value,
                unit: unit_kind,
            })
        }
        Token::Number { value: 0.0, .. } => Ok(Length {
            value: 0.0,
            unit: LengthUnit::Pixels,
        }),
        _ => Err(location.new_custom_error(MediaQueryError::UnexpectedToken)),
    }
}
