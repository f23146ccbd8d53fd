//! Configuration validation against a [`Schema`].
//!
//! Plan modifiers never fail on malformed JSON; they keep the planned value and
//! move on. The user still needs to hear about it, and this is where they do:
//! a JSON attribute whose string does not parse produces an error diagnostic
//! pointing at the syntax error.
//!
//! # Example
//!
//! ```
//! use json_plan_modifier::schema::{Attribute, Schema};
//! use json_plan_modifier::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("parameters", Attribute::optional_json());
//!
//! assert!(validate(&schema, &json!({"name": "gpt", "parameters": "{\"n\": 1}"})).is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"name": "gpt", "parameters": "{n: 1}"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].summary, "Invalid JSON string");
//! ```

use serde_json::Value;

use crate::normalize::normalize;
use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};

/// Validate a configuration object against a schema.
///
/// An empty result means the value is valid.
///
/// - Required attributes must be present and non-null
/// - Computed-only attributes are skipped
/// - Attribute types must match the schema
/// - JSON attributes must hold a parseable document (the empty string counts
///   as no value)
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return diagnostics,
        other => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(other))),
            );
            return diagnostics;
        }
    };

    for (name, attr) in &schema.attributes {
        validate_attribute(attr, obj.get(name), name, &mut diagnostics);
    }
    diagnostics
}

/// Like [`validate`], but returns the diagnostics as an error.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a value is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

/// Check that a string holds a JSON document.
///
/// Returns an error diagnostic for `path` when it does not.
pub fn validate_json_string(path: &str, value: &str) -> Option<Diagnostic> {
    normalize(value).err().map(|err| {
        Diagnostic::error("Invalid JSON string")
            .with_detail(format!(
                "The value of '{}' must be valid JSON: {}",
                path,
                err.inner()
            ))
            .with_attribute(path)
    })
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if attr.flags.is_computed_only() {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        }
        Some(Value::String(s)) if attr.is_json() => {
            diagnostics.extend(validate_json_string(path, s));
        }
        Some(v) => validate_type(&attr.attr_type, v, path, diagnostics),
    }
}

fn validate_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match attr_type {
        AttributeType::String if !value.is_string() => {
            diagnostics.push(type_error(path, "string", value));
        }
        AttributeType::Int64 if !is_int64(value) => {
            diagnostics.push(type_error(path, "int64", value));
        }
        AttributeType::Float64 if !value.is_number() => {
            diagnostics.push(type_error(path, "float64", value));
        }
        AttributeType::Bool if !value.is_boolean() => {
            diagnostics.push(type_error(path, "bool", value));
        }
        AttributeType::List(element_type) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    validate_type(element_type, item, &format!("{}.{}", path, i), diagnostics);
                }
            }
            None => diagnostics.push(type_error(path, "list", value)),
        },
        AttributeType::Map(value_type) => match value.as_object() {
            Some(map) => {
                for (key, item) in map {
                    validate_type(value_type, item, &format!("{}.{}", path, key), diagnostics);
                }
            }
            None => diagnostics.push(type_error(path, "map", value)),
        },
        _ => {}
    }
}

fn is_int64(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.as_i64().is_some()
                || n.as_f64().is_some_and(|f| {
                    f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64
                })
        }
        _ => false,
    }
}

pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, value_type_name(got)))
        .with_attribute(path)
}
