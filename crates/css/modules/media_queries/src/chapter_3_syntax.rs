//! Media Queries Level 4 — §3 Syntax
//! Spec: <https://www.w3.org/TR/mediaqueries-4/#mq-syntax>
//!
//! Grammar accepted here (a subset of `<media-query>`):
//!
//! ```text
//! [ only ]? <media-type> [ and <media-feature> ]*
//! <media-feature> [ and <media-feature> ]*
//! ```

use crate::chapter_4_features::{MediaEnvironment, MediaFeature, parse_feature};
use crate::{MediaQueryError, MediaType};
use cssparser::{ParseError, ParseErrorKind, Parser, ParserInput, Token};

/// A parsed media query: optional media type plus conjunctive features.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaQuery {
    /// Explicit media type; `None` behaves like `all`.
    pub media_type: Option<MediaType>,
    /// Features that must all hold.
    pub features: Vec<MediaFeature>,
}

/// Where the parser is within the query grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Expect {
    /// Nothing consumed yet: `only`, a media type, or a feature.
    Start,
    /// After `only`: a media type is required.
    MediaType,
    /// After a media type or a feature: `and` or end of input.
    AndOrEnd,
    /// After `and`: a feature is required.
    Feature,
}

impl MediaQuery {
    /// Parse a single media query such as `screen and (min-width: 48em)`.
    ///
    /// # Errors
    /// Returns the first grammar violation encountered.
    pub fn parse(text: &str) -> Result<Self, MediaQueryError> {
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);
        parse_query(&mut parser)
    }

    /// Whether every part of the query holds in `env`.
    pub fn evaluate(&self, env: &MediaEnvironment) -> bool {
        let type_matches = self
            .media_type
            .is_none_or(|media_type| media_type.applies_to(env.media_type));
        type_matches && self.features.iter().all(|feature| feature.evaluate(env))
    }
}

fn parse_query(input: &mut Parser<'_, '_>) -> Result<MediaQuery, MediaQueryError> {
    let mut media_type = None;
    let mut features = Vec::new();
    let mut expect = Expect::Start;

    while let Ok(token) = input.next() {
        let token = token.clone();
        expect = match (expect, token) {
            (Expect::Start, Token::Ident(ident)) if ident.eq_ignore_ascii_case("only") => {
                Expect::MediaType
            }
            (Expect::Start | Expect::MediaType, Token::Ident(ident)) => {
                media_type = Some(MediaType::from_ident(&ident)?);
                Expect::AndOrEnd
            }
            (Expect::AndOrEnd, Token::Ident(ident)) if ident.eq_ignore_ascii_case("and") => {
                Expect::Feature
            }
            (Expect::Start | Expect::Feature, Token::ParenthesisBlock) => {
                let feature = input
                    .parse_nested_block(parse_feature)
                    .map_err(custom_kind)?;
                features.push(feature);
                Expect::AndOrEnd
            }
            _ => return Err(MediaQueryError::UnexpectedToken),
        };
    }

    match expect {
        Expect::AndOrEnd => Ok(MediaQuery {
            media_type,
            features,
        }),
        Expect::Start => Err(MediaQueryError::Empty),
        Expect::MediaType | Expect::Feature => Err(MediaQueryError::UnexpectedToken),
    }
}

fn custom_kind(error: ParseError<'_, MediaQueryError>) -> MediaQueryError {
    match error.kind {
        ParseErrorKind::Custom(kind) => kind,
        ParseErrorKind::Basic(_) => MediaQueryError::UnexpectedToken,
    }
}
