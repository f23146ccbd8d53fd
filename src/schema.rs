//! Schema types for describing resource attributes.
//!
//! A schema lists the attributes of a resource, how each may be set, and which
//! plan modifiers run on it. [`crate::plan::plan_resource`] and
//! [`crate::validation::validate`] both walk these definitions.
//!
//! # Example
//!
//! ```
//! use json_plan_modifier::schema::{Attribute, ProviderSchema, Schema};
//!
//! let schema = ProviderSchema::new().with_resource(
//!     "platform_tool",
//!     Schema::v0()
//!         .with_attribute("id", Attribute::computed_id())
//!         .with_attribute("name", Attribute::required_string())
//!         .with_attribute("input_schema", Attribute::required_json()),
//! );
//!
//! assert!(schema.resource("platform_tool").is_ok());
//! assert!(schema.resource("platform_space").is_err());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::plan_modifier::AttributePlanModifier;

/// The type of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// A string value.
    String,
    /// A 64-bit integer.
    Int64,
    /// A 64-bit floating point number.
    Float64,
    /// A boolean value.
    Bool,
    /// A list of values of a single type.
    List(Box<AttributeType>),
    /// A map from string keys to values of a single type.
    Map(Box<AttributeType>),
    /// Any value.
    Dynamic,
}

impl AttributeType {
    /// Create a list type.
    pub fn list(element_type: AttributeType) -> Self {
        Self::List(Box::new(element_type))
    }

    /// Create a map type.
    pub fn map(element_type: AttributeType) -> Self {
        Self::Map(Box::new(element_type))
    }
}

/// Describes how an attribute can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// Must be set in configuration.
    pub required: bool,
    /// May be set in configuration.
    pub optional: bool,
    /// Set by the provider.
    pub computed: bool,
    /// Hidden in logs and UI.
    pub sensitive: bool,
}

impl AttributeFlags {
    /// Flags for a required attribute.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    /// Flags for an optional attribute.
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Default::default()
        }
    }

    /// Flags for a computed, read-only attribute.
    pub fn computed() -> Self {
        Self {
            computed: true,
            ..Default::default()
        }
    }

    /// Flags for an attribute that may be set, with a provider default.
    pub fn optional_computed() -> Self {
        Self {
            optional: true,
            computed: true,
            ..Default::default()
        }
    }

    /// Mark the attribute as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Whether configuration can never set this attribute.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// Describes a single attribute in a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// The type of the attribute.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Flags describing how the attribute can be used.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Human-readable description of the attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Changing this attribute replaces the resource.
    #[serde(default)]
    pub force_new: bool,
    /// Plan modifiers, run in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<AttributePlanModifier>,
}

impl Attribute {
    /// Create a new attribute with the given type and flags.
    pub fn new(attr_type: AttributeType, flags: AttributeFlags) -> Self {
        Self {
            attr_type,
            flags,
            description: None,
            force_new: false,
            plan_modifiers: Vec::new(),
        }
    }

    /// Create a required string attribute.
    pub fn required_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::required())
    }

    /// Create an optional string attribute.
    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional())
    }

    /// Create a computed string attribute.
    pub fn computed_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::computed())
    }

    /// Create a computed id that keeps its prior value across updates.
    pub fn computed_id() -> Self {
        Self::computed_string().with_plan_modifier(AttributePlanModifier::UseStateForUnknown)
    }

    /// Create a required string attribute holding a JSON document.
    pub fn required_json() -> Self {
        Self::json(AttributeFlags::required())
    }

    /// Create an optional string attribute holding a JSON document.
    pub fn optional_json() -> Self {
        Self::json(AttributeFlags::optional())
    }

    /// Create an optional JSON attribute the remote API may fill in.
    pub fn optional_computed_json() -> Self {
        Self::json(AttributeFlags::optional_computed())
    }

    fn json(flags: AttributeFlags) -> Self {
        Self::new(AttributeType::String, flags)
            .with_plan_modifier(AttributePlanModifier::SuppressEquivalentJson)
    }

    /// Create a required int64 attribute.
    pub fn required_int64() -> Self {
        Self::new(AttributeType::Int64, AttributeFlags::required())
    }

    /// Create an optional int64 attribute.
    pub fn optional_int64() -> Self {
        Self::new(AttributeType::Int64, AttributeFlags::optional())
    }

    /// Create a required bool attribute.
    pub fn required_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::required())
    }

    /// Create an optional bool attribute.
    pub fn optional_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::optional())
    }

    /// Set the description for this attribute.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark this attribute as forcing resource replacement when changed.
    pub fn with_force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Append a plan modifier.
    pub fn with_plan_modifier(mut self, modifier: AttributePlanModifier) -> Self {
        if !self.plan_modifiers.contains(&modifier) {
            self.plan_modifiers.push(modifier);
        }
        self
    }

    /// Mark this attribute as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.flags.sensitive = true;
        self
    }

    /// Whether the attribute holds a JSON document compared semantically.
    pub fn is_json(&self) -> bool {
        self.attr_type == AttributeType::String
            && self
                .plan_modifiers
                .contains(&AttributePlanModifier::SuppressEquivalentJson)
    }
}

/// Schema for a resource or data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schema {
    /// The version of this schema.
    #[serde(default)]
    pub version: u64,
    /// Attributes by name.
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Schema {
    /// Create a new schema with the given version.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            attributes: BTreeMap::new(),
            description: None,
        }
    }

    /// Create a schema at version 0.
    pub fn v0() -> Self {
        Self::new(0)
    }

    /// Add an attribute to the schema.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Set the description for this schema.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Look up an attribute.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }
}

/// Schemas for everything a provider exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    /// Schema for provider configuration.
    #[serde(default)]
    pub provider: Schema,
    /// Schemas for each resource type.
    #[serde(default)]
    pub resources: BTreeMap<String, Schema>,
    /// Schemas for each data source type.
    #[serde(default)]
    pub data_sources: BTreeMap<String, Schema>,
}

impl ProviderSchema {
    /// Create a new empty provider schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider configuration schema.
    pub fn with_provider_config(mut self, schema: Schema) -> Self {
        self.provider = schema;
        self
    }

    /// Add a resource schema.
    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }

    /// Add a data source schema.
    pub fn with_data_source(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.data_sources.insert(name.into(), schema);
        self
    }

    /// Look up a resource schema.
    pub fn resource(&self, resource_type: &str) -> Result<&Schema, ProviderError> {
        self.resources
            .get(resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    /// Look up a data source schema.
    pub fn data_source(&self, data_source_type: &str) -> Result<&Schema, ProviderError> {
        self.data_sources
            .get(data_source_type)
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Prevents the operation from completing.
    Error,
    /// Should be addressed but does not block.
    Warning,
}

/// A diagnostic message about configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: DiagnosticSeverity,
    /// A short summary of the issue.
    pub summary: String,
    /// A detailed description of the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The attribute path where the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Add detail to this diagnostic.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the attribute path for this diagnostic.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether this is an error.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_flags() {
        let required = AttributeFlags::required();
        assert!(required.required);
        assert!(!required.is_computed_only());

        let computed = AttributeFlags::computed();
        assert!(computed.is_computed_only());

        let optional_computed = AttributeFlags::optional_computed();
        assert!(optional_computed.optional && optional_computed.computed);
        assert!(!optional_computed.is_computed_only());

        assert!(AttributeFlags::required().sensitive().sensitive);
    }

    #[test]
    fn test_json_attributes() {
        let attr = Attribute::required_json().with_description("Tool input schema");
        assert_eq!(attr.attr_type, AttributeType::String);
        assert!(attr.flags.required);
        assert!(attr.is_json());
        assert_eq!(
            attr.plan_modifiers,
            vec![AttributePlanModifier::SuppressEquivalentJson]
        );

        assert!(Attribute::optional_json().flags.optional);
        assert!(Attribute::optional_computed_json().flags.computed);
        assert!(!Attribute::required_string().is_json());
    }

    #[test]
    fn test_plan_modifier_not_duplicated() {
        let attr = Attribute::optional_json()
            .with_plan_modifier(AttributePlanModifier::SuppressEquivalentJson)
            .with_plan_modifier(AttributePlanModifier::UseStateForUnknown);
        assert_eq!(
            attr.plan_modifiers,
            vec![
                AttributePlanModifier::SuppressEquivalentJson,
                AttributePlanModifier::UseStateForUnknown,
            ]
        );
    }

    #[test]
    fn test_computed_id() {
        let attr = Attribute::computed_id();
        assert!(attr.flags.is_computed_only());
        assert_eq!(
            attr.plan_modifiers,
            vec![AttributePlanModifier::UseStateForUnknown]
        );
        assert!(!attr.is_json());
    }

    #[test]
    fn test_schema_builder() {
        let schema = Schema::v0()
            .with_description("A processor")
            .with_attribute("name", Attribute::required_string().with_force_new())
            .with_attribute("config", Attribute::optional_json());

        assert_eq!(schema.version, 0);
        assert!(schema.attribute("name").unwrap().force_new);
        assert!(schema.attribute("config").unwrap().is_json());
        assert!(schema.attribute("missing").is_none());
        let names: Vec<_> = schema.attributes.keys().cloned().collect();
        assert_eq!(names, vec!["config", "name"]);
    }

    #[test]
    fn test_provider_schema_lookup() {
        let provider_schema = ProviderSchema::new()
            .with_provider_config(
                Schema::v0().with_attribute("api_key", Attribute::required_string().sensitive()),
            )
            .with_resource("platform_class", Schema::v0())
            .with_data_source("platform_space", Schema::v0());

        assert!(provider_schema.provider.attributes["api_key"].flags.sensitive);
        assert!(provider_schema.resource("platform_class").is_ok());
        assert!(provider_schema.data_source("platform_space").is_ok());

        let err = provider_schema.resource("platform_space").unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(ref name) if name == "platform_space"));
    }

    #[test]
    fn test_attribute_serialization() {
        let value = serde_json::to_value(Attribute::optional_json()).unwrap();
        assert_eq!(value["type"], "string");
        assert_eq!(value["optional"], true);
        assert_eq!(value["plan_modifiers"][0], "suppress_equivalent_json");

        let value = serde_json::to_value(Attribute::optional_string()).unwrap();
        assert!(value.get("plan_modifiers").is_none());

        let back: Attribute =
            serde_json::from_value(serde_json::to_value(Attribute::required_json()).unwrap())
                .unwrap();
        assert_eq!(back, Attribute::required_json());
    }

    #[test]
    fn test_diagnostic() {
        let err = Diagnostic::error("Invalid JSON string")
            .with_detail("expected value at line 1 column 9")
            .with_attribute("parameters");

        assert!(err.is_error());
        assert_eq!(err.summary, "Invalid JSON string");
        assert_eq!(err.attribute, Some("parameters".to_string()));
        assert!(!Diagnostic::warning("deprecated").is_error());
    }
}
