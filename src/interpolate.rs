//! `{{path.to.value}}` placeholders.
//!
//! A placeholder opens with `{{` and closes with the next `}}`; they do not nest. The path inside
//! is a dot separated list of identifiers, walked one field at a time from the root of a scope.
//!
//! There are two ways a placeholder gets resolved:
//!
//! - Against a component's method namespace, when its skeleton is built. Only the first
//!   placeholder of an event attribute matters there, see [`first_placeholder()`].
//! - Against an instance's state whenever a node is mounted or updated, see [`interpolate()`].
//!   Every placeholder is substituted, and substituted text is scanned again.

use std::collections::HashSet;

use serde_json::Value;

use crate::{Error, Result};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Upper bound on rescans of substituted text.
const MAX_PASSES: usize = 32;

/// A placeholder found within some text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Byte offset of the opening `{{`.
    pub start: usize,

    /// Byte offset just past the closing `}}`.
    pub end: usize,

    /// The trimmed path between the markers.
    pub path: &'a str,
}

/// Iterator over the well formed placeholders of a string, left to right.
pub struct Placeholders<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Iterator for Placeholders<'a> {
    type Item = Placeholder<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.offset + self.text[self.offset..].find(OPEN)?;
        let inner = start + OPEN.len();

        // An opening marker without a closing marker ends the scan
        let Some(close) = self.text[inner..].find(CLOSE) else {
            self.offset = self.text.len();
            return None;
        };

        let end = inner + close + CLOSE.len();
        self.offset = end;

        Some(Placeholder {
            start,
            end,
            path: self.text[inner..inner + close].trim(),
        })
    }
}

pub fn placeholders(text: &str) -> Placeholders<'_> {
    Placeholders { text, offset: 0 }
}

/// The path of the first placeholder in `text`, if there is one.
pub fn first_placeholder(text: &str) -> Option<&str> {
    placeholders(text).next().map(|placeholder| placeholder.path)
}

/// Walk `path` through `scope`. Objects are indexed by key, arrays by decimal index. Any segment
/// that can't be followed fails with [`Error::Lookup`].
pub fn lookup<'v>(scope: &'v Value, path: &str) -> Result<&'v Value> {
    path.split('.').try_fold(scope, |value, segment| {
        let segment = segment.trim();

        let next = match value {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        };

        next.ok_or_else(|| Error::lookup(path, segment))
    })
}

/// How a state value reads once substituted into text.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(string) => string.clone(),
        other => other.to_string(),
    }
}

/// Substitute every placeholder in `text` with its value in `state`, left to right, then scan the
/// result again until no placeholder is left.
///
/// A pass that changes nothing ends the scan, so a value that substitutes back to itself (`a` is
/// `"{{a}}"`) is left in place. Values that keep producing new text, or cycle through several,
/// fail with [`Error::Unsettled`].
pub fn interpolate(text: &str, state: &Value) -> Result<String> {
    let mut current = text.to_string();
    let mut seen = HashSet::new();

    for _ in 0..MAX_PASSES {
        let Some(next) = substitute(&current, state)? else {
            return Ok(current);
        };

        if next == current {
            return Ok(current);
        }

        if !seen.insert(current) {
            break;
        }
        current = next;
    }

    Err(Error::Unsettled {
        text: text.to_string(),
    })
}

/// One substitution pass. [`None`] when `text` holds no placeholder.
fn substitute(text: &str, state: &Value) -> Result<Option<String>> {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;

    for placeholder in placeholders(text) {
        out.push_str(&text[copied..placeholder.start]);
        out.push_str(&to_text(lookup(state, placeholder.path)?));
        copied = placeholder.end;
    }

    if copied == 0 {
        return Ok(None);
    }

    out.push_str(&text[copied..]);
    Ok(Some(out))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn substitutes_every_placeholder() {
        let state = json!({ "user": { "name": "ada", "age": 36 }, "tags": ["a", "b"] });

        assert_eq!(
            interpolate("{{user.name}} is {{ user.age }} ({{tags.1}})", &state).unwrap(),
            "ada is 36 (b)"
        );
    }

    #[test]
    fn non_string_values_render_as_json() {
        let state = json!({ "on": true, "none": null, "ratio": 0.5 });

        assert_eq!(
            interpolate("{{on}}/{{none}}/{{ratio}}", &state).unwrap(),
            "true/null/0.5"
        );
    }

    #[test]
    fn missing_field_is_a_lookup_error() {
        let error = interpolate("{{a.b}}", &json!({ "c": 1 })).unwrap_err();

        assert_eq!(error, Error::lookup("a.b", "a"));
    }

    #[test]
    fn field_of_a_scalar_is_a_lookup_error() {
        let error = interpolate("{{a.b}}", &json!({ "a": 1 })).unwrap_err();

        assert_eq!(error, Error::lookup("a.b", "b"));
    }

    #[test]
    fn unterminated_placeholder_is_left_alone() {
        let state = json!({ "a": 1 });

        assert_eq!(interpolate("{{a}} and {{a", &state).unwrap(), "1 and {{a");
        assert_eq!(interpolate("{{", &state).unwrap(), "{{");
    }

    #[test]
    fn substituted_values_are_rescanned() {
        let state = json!({ "a": "{{b}}", "b": "x{{c.d}}", "c": { "d": 1 } });

        assert_eq!(interpolate("<{{a}}>", &state).unwrap(), "<x1>");
    }

    #[test]
    fn rescan_stops_at_an_unterminated_placeholder() {
        let state = json!({ "a": "{{b", "b": 2 });

        assert_eq!(interpolate("{{a}}", &state).unwrap(), "{{b");
    }

    #[test]
    fn self_reference_is_left_in_place() {
        let state = json!({ "a": "{{a}}" });

        assert_eq!(interpolate("{{a}}", &state).unwrap(), "{{a}}");
    }

    #[test]
    fn values_that_never_settle_are_errors() {
        let cycle = json!({ "a": "{{b}}", "b": "{{a}}" });
        let growing = json!({ "a": "x{{a}}" });

        assert_eq!(
            interpolate("{{a}}", &cycle),
            Err(Error::Unsettled { text: "{{a}}".into() })
        );
        assert_eq!(
            interpolate("{{a}}", &growing),
            Err(Error::Unsettled { text: "{{a}}".into() })
        );
    }

    #[test]
    fn first_placeholder_ignores_the_rest() {
        assert_eq!(first_placeholder("x {{ increment }} {{other}}"), Some("increment"));
        assert_eq!(first_placeholder("increment"), None);
    }

    proptest! {
        #[test]
        fn text_without_placeholders_is_unchanged(text in "[^{]*") {
            prop_assert_eq!(interpolate(&text, &json!({})).unwrap(), text);
        }
    }
}
