//! Semantic JSON normalization.
//!
//! Two JSON documents that describe the same value tree normalize to the same
//! string, regardless of whitespace or object key order in the source text.
//!
//! # Canonical form
//!
//! - Object keys are sorted by their raw bytes, at every nesting level
//! - Array order is kept; only the elements are normalized
//! - Scalars are copied through; numbers keep their digits exactly, with
//!   exponent markers written as `e+`/`e-` (`1E3` becomes `1e+3`)
//! - Output is compact: no whitespace, no trailing newline
//! - Only what JSON requires is escaped (`"`, `\` and control characters);
//!   `<`, `>`, `&` and non-ASCII text are written as-is
//! - Any string is a valid object key, including the ones serde_json uses
//!   internally to smuggle numbers through a map
//!
//! # Example
//!
//! ```
//! use json_plan_modifier::normalize::normalize;
//!
//! let canonical = normalize(r#"{"b": {"y": 2, "x": 1}, "a": [3, 1, 2]}"#).unwrap();
//! assert_eq!(canonical, r#"{"a":[3,1,2],"b":{"x":1,"y":2}}"#);
//!
//! // Empty input means "no value", not malformed JSON.
//! assert_eq!(normalize("").unwrap(), "");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::error::ParseError;

/// Normalize a JSON document into its canonical string form.
///
/// The empty string normalizes to itself. Anything else must be a single,
/// complete JSON document; surrounding whitespace is allowed, trailing content
/// is not.
pub fn normalize(input: &str) -> Result<String, ParseError> {
    if input.is_empty() {
        return Ok(String::new());
    }

    let raw: &RawValue = serde_json::from_str(input)?;
    Ok(normalize_value(read_document(raw, 0)?).to_string())
}

/// Same nesting limit serde_json applies to its own parser.
const MAX_DEPTH: usize = 128;

// Objects and arrays are read through `RawValue` so an object never reaches
// `Value`'s map visitor. With `arbitrary_precision` that visitor turns an
// object keyed by `$serde_json::private::Number` into a number.
fn read_document(raw: &RawValue, depth: usize) -> Result<Value, serde_json::Error> {
    if depth > MAX_DEPTH {
        return Err(serde_json::Error::custom("recursion limit exceeded"));
    }

    let text = raw.get();
    match text.as_bytes().first() {
        Some(b'{') => {
            let entries: BTreeMap<String, &RawValue> = serde_json::from_str(text)?;
            entries
                .into_iter()
                .map(|(key, value)| Ok((key, read_document(value, depth + 1)?)))
                .collect::<Result<Map<String, Value>, serde_json::Error>>()
                .map(Value::Object)
        }
        Some(b'[') => {
            let items: Vec<&RawValue> = serde_json::from_str(text)?;
            items
                .into_iter()
                .map(|item| read_document(item, depth + 1))
                .collect::<Result<Vec<_>, serde_json::Error>>()
                .map(Value::Array)
        }
        _ => serde_json::from_str(text),
    }
}

/// Rewrite a parsed value into canonical shape.
///
/// Objects are rebuilt with their keys in byte order so the result does not
/// depend on which map implementation serde_json was compiled with.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, normalize_value(value)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_value).collect()),
        scalar => scalar,
    }
}

/// Check whether two JSON strings describe the same value.
///
/// Byte-identical inputs are equal without being parsed. Otherwise fails if
/// either side is malformed. An empty string is never equal to a document.
pub fn semantically_equal(a: &str, b: &str) -> Result<bool, ParseError> {
    if a == b {
        return Ok(true);
    }
    Ok(normalize(a)? == normalize(b)?)
}

/// A JSON string known to be in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CanonicalJson(String);

impl CanonicalJson {
    /// Parse and normalize `input`.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        normalize(input).map(Self)
    }

    /// The canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the canonical text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// True when this represents "no value".
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CanonicalJson {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CanonicalJson {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_input_is_identity() {
        assert_eq!(normalize("").unwrap(), "");
    }

    #[test]
    fn test_whitespace_only_is_malformed() {
        assert!(normalize("   ").is_err());
        assert!(normalize("\n").is_err());
    }

    #[test]
    fn test_malformed_input() {
        assert!(normalize("{\"key\": invalid}").is_err());
        assert!(normalize("{\"a\":1").is_err());
        assert!(normalize("[1,2,]").is_err());
    }

    #[test]
    fn test_trailing_content_is_malformed() {
        assert!(normalize("{} {}").is_err());
        assert!(normalize("1 2").is_err());
    }

    #[test]
    fn test_surrounding_whitespace_is_allowed() {
        assert_eq!(normalize("  {\"a\" : 1}\n").unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_sorts_nested_keys() {
        assert_eq!(
            normalize(r#"{"b":{"y":2,"x":1},"a":[3,1,2]}"#).unwrap(),
            r#"{"a":[3,1,2],"b":{"x":1,"y":2}}"#
        );
    }

    #[test]
    fn test_sorts_objects_inside_arrays() {
        assert_eq!(
            normalize(r#"[{"z":true,"m":null},{"b":[{"d":1,"c":2}]}]"#).unwrap(),
            r#"[{"m":null,"z":true},{"b":[{"c":2,"d":1}]}]"#
        );
    }

    #[test]
    fn test_keys_compare_by_bytes() {
        // Uppercase sorts before lowercase; no case folding.
        assert_eq!(
            normalize(r#"{"b":1,"B":2,"a":3,"A":4}"#).unwrap(),
            r#"{"A":4,"B":2,"a":3,"b":1}"#
        );
        // Shorter prefix first; multi-byte UTF-8 after ASCII.
        assert_eq!(
            normalize(r#"{"é":1,"ab":2,"a":3}"#).unwrap(),
            r#"{"a":3,"ab":2,"é":1}"#
        );
    }

    #[test]
    fn test_array_order_is_kept() {
        assert_eq!(normalize("[3, 2, 1]").unwrap(), "[3,2,1]");
        assert_ne!(normalize("[1,2,3]").unwrap(), normalize("[3,2,1]").unwrap());
    }

    #[test]
    fn test_number_literals_are_kept() {
        assert_eq!(normalize("123").unwrap(), "123");
        assert_eq!(normalize("0.1").unwrap(), "0.1");
        assert_eq!(normalize("-0").unwrap(), "-0");
        assert_eq!(normalize("1.0").unwrap(), "1.0");
        assert_eq!(
            normalize(r#"{"p":3.141592653589793238462643383279}"#).unwrap(),
            r#"{"p":3.141592653589793238462643383279}"#
        );
        assert_eq!(
            normalize("123456789012345678901234567890").unwrap(),
            "123456789012345678901234567890"
        );
    }

    #[test]
    fn test_exponent_markers_are_canonical() {
        assert_eq!(normalize("1e3").unwrap(), "1e+3");
        assert_eq!(normalize("1E3").unwrap(), "1e+3");
        assert_eq!(normalize("1e+3").unwrap(), "1e+3");
        assert_eq!(normalize("[1e3]").unwrap(), "[1e+3]");
    }

    #[test]
    fn test_private_number_key_is_an_object() {
        let key = "$serde_json::private::Number";
        assert_eq!(
            normalize(&format!(r#"{{"{key}":"1"}}"#)).unwrap(),
            format!(r#"{{"{key}":"1"}}"#)
        );
        assert_eq!(
            normalize(&format!(r#"{{ "{key}" : "abc" }}"#)).unwrap(),
            format!(r#"{{"{key}":"abc"}}"#)
        );
        assert_eq!(
            normalize(&format!(r#"{{"b":[{{"{key}":2}}],"a":1}}"#)).unwrap(),
            format!(r#"{{"a":1,"b":[{{"{key}":2}}]}}"#)
        );
        assert_ne!(
            normalize(&format!(r#"{{"{key}":"1"}}"#)).unwrap(),
            normalize("1").unwrap()
        );
    }

    #[test]
    fn test_private_raw_value_key_is_an_object() {
        let doc = r#"{"$serde_json::private::RawValue":"[1]"}"#;
        assert_eq!(normalize(doc).unwrap(), doc);
    }

    #[test]
    fn test_escaped_keys_decode_before_sorting() {
        assert_eq!(normalize(r#"{"\u0062":1,"a":2}"#).unwrap(), r#"{"a":2,"b":1}"#);
        assert_eq!(
            normalize(r#"{"\u0024serde_json::private::Number":"1"}"#).unwrap(),
            r#"{"$serde_json::private::Number":"1"}"#
        );
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}{}", "[".repeat(200), "]".repeat(200));
        assert!(normalize(&deep).is_err());
        let shallow = format!("{}{}", "[".repeat(100), "]".repeat(100));
        assert_eq!(normalize(&shallow).unwrap(), shallow);
    }
    #[test]
    fn test_scalars() {
        assert_eq!(normalize("true").unwrap(), "true");
        assert_eq!(normalize("null").unwrap(), "null");
        assert_eq!(normalize(r#" "text" "#).unwrap(), r#""text""#);
    }

    #[test]
    fn test_no_html_escaping() {
        assert_eq!(
            normalize(r#"{"q":"a < b && c > d"}"#).unwrap(),
            r#"{"q":"a < b && c > d"}"#
        );
        assert_eq!(
            normalize(r#"{"q":"<b>"}"#).unwrap(),
            r#"{"q":"<b>"}"#
        );
    }

    #[test]
    fn test_required_escapes() {
        assert_eq!(
            normalize(r#""quote \" backslash \\ newline \n tab \t""#).unwrap(),
            r#""quote \" backslash \\ newline \n tab \t""#
        );
        assert_eq!(normalize(r#""\u0001""#).unwrap(), r#""\u0001""#);
        // Unneeded escapes collapse to the literal character.
        assert_eq!(normalize(r#""\/é""#).unwrap(), "\"/é\"");
    }

    #[test]
    fn test_duplicate_keys_keep_last() {
        assert_eq!(normalize(r#"{"a":1,"a":2}"#).unwrap(), r#"{"a":2}"#);
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            r#"{"b":{"y":2,"x":1},"a":[3,1,2]}"#,
            "{\n  \"name\": \"tool\",\n  \"args\": {\"limit\": 1.50, \"tags\": [\"x\", \"<y>\"]}\n}",
            r#""line\nbreak""#,
            "[]",
            "{}",
            "",
        ];
        for input in inputs {
            let once = normalize(input).unwrap();
            let twice = normalize(&once).unwrap();
            assert_eq!(once, twice, "normalization not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_normalize_value_rebuilds_objects() {
        let value = normalize_value(json!({"b": 1, "a": {"d": [ {"f": 1, "e": 2} ], "c": 3}}));
        assert_eq!(
            value.to_string(),
            r#"{"a":{"c":3,"d":[{"e":2,"f":1}]},"b":1}"#
        );
    }

    #[test]
    fn test_semantically_equal() {
        assert!(semantically_equal(r#"{"a":1,"b":2}"#, "{ \"b\": 2, \"a\": 1 }").unwrap());
        assert!(!semantically_equal(r#"{"a":1}"#, r#"{"a":2}"#).unwrap());
        assert!(!semantically_equal("", "{}").unwrap());
        assert!(semantically_equal("", "").unwrap());
        assert!(semantically_equal("{", "{").unwrap());
        assert!(semantically_equal("{", "{}").is_err());
    }

    #[test]
    fn test_canonical_json() {
        let canonical: CanonicalJson = "{ \"b\": 1, \"a\": 2 }".parse().unwrap();
        assert_eq!(canonical.as_str(), r#"{"a":2,"b":1}"#);
        assert_eq!(canonical.to_string(), r#"{"a":2,"b":1}"#);
        assert!(!canonical.is_empty());
        assert!(CanonicalJson::parse("").unwrap().is_empty());
        assert!(CanonicalJson::parse("nope").is_err());
        assert_eq!(
            canonical.into_string(),
            CanonicalJson::parse(r#"{"a":2,"b":1}"#).unwrap().into_string()
        );
    }
}
