//! Resource planning.
//!
//! Runs each attribute's plan modifiers over a proposed resource state and
//! reports which attributes will change. This is where
//! [`SuppressEquivalentJson`](crate::plan_modifier::SuppressEquivalentJson)
//! takes effect: an equivalent JSON document is swapped for the prior state
//! string, so it no longer shows up as a change.
//!
//! # Example
//!
//! ```
//! use json_plan_modifier::plan::{plan_resource, PlanRequest};
//! use json_plan_modifier::schema::{Attribute, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("id", Attribute::computed_id())
//!     .with_attribute("parameters", Attribute::optional_json());
//!
//! let prior = json!({"id": "model-1", "parameters": "{\"top_p\":0.9,\"temperature\":0.2}"});
//! let proposed = json!({"parameters": "{\n  \"temperature\": 0.2,\n  \"top_p\": 0.9\n}"});
//!
//! let result = plan_resource(
//!     &schema,
//!     PlanRequest::update(prior.clone(), proposed).with_unknown("id"),
//! )
//! .unwrap();
//!
//! assert!(result.changes.is_empty());
//! assert_eq!(result.planned_state, prior);
//! ```

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::ProviderError;
use crate::plan_modifier::{PlanModifier, PlanModifierRequest, StringValue};
use crate::schema::{ProviderSchema, Schema};
use crate::types::{AttributeChange, PlanResult};
use crate::validation::value_type_name;

/// Input to [`plan_resource`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanRequest {
    /// State from the last apply; `None` when creating.
    pub prior_state: Option<Value>,
    /// State proposed by configuration. Must be an object.
    pub proposed_state: Value,
    /// Attributes whose proposed value is not yet known.
    pub unknown: BTreeSet<String>,
}

impl PlanRequest {
    /// Plan a new resource.
    pub fn create(proposed_state: Value) -> Self {
        Self {
            prior_state: None,
            proposed_state,
            unknown: BTreeSet::new(),
        }
    }

    /// Plan an update of an existing resource.
    pub fn update(prior_state: Value, proposed_state: Value) -> Self {
        Self {
            prior_state: Some(prior_state),
            proposed_state,
            unknown: BTreeSet::new(),
        }
    }

    /// Mark an attribute as unknown.
    ///
    /// The name must be a schema attribute; [`plan_resource`] rejects the
    /// request otherwise.
    pub fn with_unknown(mut self, name: impl Into<String>) -> Self {
        self.unknown.insert(name.into());
        self
    }

    /// Decode raw JSON state. Empty prior bytes mean the resource is new.
    pub fn from_slices(prior_state: &[u8], proposed_state: &[u8]) -> Result<Self, ProviderError> {
        let prior_state = if prior_state.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(prior_state)?)
        };
        Ok(Self {
            prior_state,
            proposed_state: serde_json::from_slice(proposed_state)?,
            unknown: BTreeSet::new(),
        })
    }
}

/// Plan a resource type looked up in a provider schema.
#[instrument(skip(provider, request), name = "plan")]
pub fn plan(
    provider: &ProviderSchema,
    resource_type: &str,
    request: PlanRequest,
) -> Result<PlanResult, ProviderError> {
    let schema = provider.resource(resource_type)?;
    plan_resource(schema, request)
}

/// Apply plan modifiers and compute attribute changes for one resource.
pub fn plan_resource(schema: &Schema, request: PlanRequest) -> Result<PlanResult, ProviderError> {
    let mut planned = match request.proposed_state {
        Value::Object(map) => map,
        other => {
            return Err(ProviderError::InvalidRequest(format!(
                "proposed state must be an object, got {}",
                value_type_name(&other)
            )))
        }
    };
    let prior = match request.prior_state {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            return Err(ProviderError::InvalidRequest(format!(
                "prior state must be an object, got {}",
                value_type_name(&other)
            )))
        }
    };
    let mut unknown = request.unknown;
    if let Some(name) = unknown.iter().find(|name| schema.attribute(name).is_none()) {
        return Err(ProviderError::InvalidRequest(format!(
            "unknown attribute '{}' is not in the schema",
            name
        )));
    }
    let is_create = prior.is_none();

    debug!(
        attributes = schema.attributes.len(),
        is_create = is_create,
        "Applying plan modifiers"
    );

    for (name, attr) in &schema.attributes {
        if attr.plan_modifiers.is_empty() {
            continue;
        }

        let plan_value = if unknown.contains(name) {
            StringValue::Unknown
        } else {
            match StringValue::from_json(planned.get(name)) {
                Some(value) => value,
                None => {
                    debug!(attribute = %name, "Skipping plan modifiers for non-string value");
                    continue;
                }
            }
        };
        let state_value = prior
            .as_ref()
            .and_then(|p| StringValue::from_json(p.get(name)))
            .unwrap_or_default();

        let mut value = plan_value;
        for modifier in &attr.plan_modifiers {
            value = modifier.modify_plan(&PlanModifierRequest {
                path: name,
                plan_value: &value,
                state_value: &state_value,
            });
        }

        match value {
            StringValue::Unknown => {
                unknown.insert(name.clone());
            }
            StringValue::Null => {}
            StringValue::Known(resolved) => {
                unknown.remove(name);
                planned.insert(name.clone(), Value::String(resolved));
            }
        }
    }

    for name in &unknown {
        planned.remove(name);
    }

    let mut changes = Vec::new();
    let mut requires_replace = false;
    for (name, attr) in &schema.attributes {
        let is_unknown = unknown.contains(name);
        let before = non_null(prior.as_ref(), name);
        let after = non_null(Some(&planned), name);

        let changed = if is_create {
            is_unknown || after.is_some()
        } else {
            is_unknown || before != after
        };
        if !changed {
            continue;
        }

        if attr.force_new && !is_create {
            requires_replace = true;
        }
        changes.push(AttributeChange::new(name.clone(), before, after));
    }

    debug!(
        changes = changes.len(),
        requires_replace = requires_replace,
        unknown = unknown.len(),
        "Plan completed"
    );

    Ok(
        PlanResult::with_changes(Value::Object(planned), changes, requires_replace)
            .with_unknown(unknown.into_iter().collect()),
    )
}

fn non_null(state: Option<&Map<String, Value>>, name: &str) -> Option<Value> {
    state
        .and_then(|s| s.get(name))
        .filter(|v| !v.is_null())
        .cloned()
}
