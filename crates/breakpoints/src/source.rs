//! Reads the breakpoint mapping the style layer embeds in the page.
//!
//! The generator writes a JSON object as the `content` of an invisible
//! pseudo-element. Computed style reports that content as a CSS string, so
//! the raw value arrives wrapped in one layer of quotes with inner quotes
//! escaped: `"{\"sm\":\"(min-width: 0em)\"}"`.

use crate::config::BreakpointConfig;
use crate::error::BreakpointError;
use crate::host::PageHost;
use log::debug;
use serde_json::Value;

/// One `name → query` pair, in authored order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakpointDefinition {
    pub name: String,
    pub query: String,
}

/// Extracts and parses the embedded payload.
pub struct BreakpointDataSource<'host> {
    host: &'host dyn PageHost,
    selector: &'host str,
    pseudo: &'host str,
}

impl<'host> BreakpointDataSource<'host> {
    /// Read from the pseudo-element named in `config`.
    pub fn new(host: &'host dyn PageHost, config: &'host BreakpointConfig) -> Self {
        Self {
            host,
            selector: &config.selector,
            pseudo: &config.pseudo,
        }
    }

    /// Read and parse the payload. Runs once at startup.
    ///
    /// # Errors
    /// `MissingPayload` when there is no generated content, otherwise any
    /// error from [`parse_payload`].
    pub fn load(&self) -> Result<Vec<BreakpointDefinition>, BreakpointError> {
        let missing = || BreakpointError::MissingPayload {
            selector: self.selector.to_owned(),
            pseudo: self.pseudo.to_owned(),
        };
        let raw = self
            .host
            .generated_content(self.selector, self.pseudo)
            .ok_or_else(missing)?;
        let text = unquote_payload(&raw);
        // Computed `content` reports `none`/`normal` when nothing was generated.
        if text.is_empty() || text == "none" || text == "normal" {
            return Err(missing());
        }
        let definitions = parse_payload(&text)?;
        debug!(
            "Loaded {} breakpoint(s) from {}{}",
            definitions.len(),
            self.selector,
            self.pseudo
        );
        Ok(definitions)
    }
}

/// Strip one layer of surrounding quotes and undo `\"` and `\'` escapes.
pub fn unquote_payload(raw: &str) -> String {
    let trimmed = raw.trim();
    let inner = ['"', '\'']
        .into_iter()
        .find_map(|quote| {
            trimmed
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        })
        .unwrap_or(trimmed);
    inner.replace("\\\"", "\"").replace("\\'", "'")
}

/// Parse an unquoted payload into definitions, keeping the object's key order.
///
/// # Errors
/// `InvalidJson` for malformed text, `NotAnObject` when the top level is not
/// an object, `InvalidQueryValue` when a value is not a string.
pub fn parse_payload(text: &str) -> Result<Vec<BreakpointDefinition>, BreakpointError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(map) = value else {
        return Err(BreakpointError::NotAnObject);
    };
    map.into_iter()
        .map(|(name, query)| match query {
            Value::String(query) => Ok(BreakpointDefinition { name, query }),
            _ => Err(BreakpointError::InvalidQueryValue { name }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquote_strips_css_string_layer() {
        let raw = r#""{\"sm\":\"(min-width: 0em)\"}""#;
        assert_eq!(unquote_payload(raw), r#"{"sm":"(min-width: 0em)"}"#);
    }

    #[test]
    fn unquote_handles_single_quotes_and_whitespace() {
        let raw = "  '{\\'a\\': 1}'  ";
        assert_eq!(unquote_payload(raw), "{'a': 1}");
    }

    #[test]
    fn unquote_leaves_unquoted_text_alone() {
        assert_eq!(unquote_payload(r#"{"md":"x"}"#), r#"{"md":"x"}"#);
    }

    #[test]
    fn parse_keeps_authored_order() {
        let defs = parse_payload(r#"{"xl":"(min-width: 90em)","sm":"(min-width: 0em)","md":"(min-width: 48em)"}"#)
            .unwrap();
        let names: Vec<&str> = defs.iter().map(|def| def.name.as_str()).collect();
        assert_eq!(names, ["xl", "sm", "md"], "order must follow the payload, not the keys");
    }

    #[test]
    fn parse_rejects_non_objects_and_non_strings() {
        assert!(matches!(parse_payload("[1,2]"), Err(BreakpointError::NotAnObject)));
        assert!(matches!(parse_payload("{\"sm\""), Err(BreakpointError::InvalidJson(_))));
        assert!(matches!(
            parse_payload(r#"{"sm": 0}"#),
            Err(BreakpointError::InvalidQueryValue { name }) if name == "sm"
        ));
    }

    #[test]
    fn duplicate_keys_keep_first_position_and_last_value() {
        let defs = parse_payload(
            r#"{"md":"(min-width: 48em)","sm":"(min-width: 0em)","md":"(min-width: 90em)"}"#,
        )
        .unwrap();
        let pairs: Vec<(&str, &str)> = defs
            .iter()
            .map(|def| (def.name.as_str(), def.query.as_str()))
            .collect();
        assert_eq!(pairs, [("md", "(min-width: 90em)"), ("sm", "(min-width: 0em)")]);
    }
}
