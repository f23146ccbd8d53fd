//! Plan modifiers for string attributes.
//!
//! A plan modifier runs while a plan is being computed, before anything is sent
//! to the remote API. It sees the value proposed by configuration and the value
//! recorded in prior state, and decides which one the plan should carry.
//! Returning the prior state value tells the host "nothing changed here".
//!
//! The main modifier is [`SuppressEquivalentJson`]: remote APIs rarely echo a
//! JSON document back byte-for-byte, so without it every refresh would show a
//! diff for attributes that only differ in whitespace or key order.
//!
//! # Example
//!
//! ```
//! use json_plan_modifier::plan_modifier::resolve_plan_value;
//!
//! let planned = "{\n  \"a\": 1,\n  \"b\": 2\n}";
//! let prior = r#"{"b":2,"a":1}"#;
//! assert_eq!(resolve_plan_value(planned, prior, true, true), prior);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::normalize::normalize;

/// Choose between a planned and a prior state JSON string.
///
/// Rules, first match wins:
///
/// 1. Either value is not yet known: `planned`.
/// 2. The strings are byte-identical: `planned`.
/// 3. Both normalize and the normalized forms match: `prior_state`.
/// 4. Anything else, including malformed JSON on either side: `planned`.
///
/// Malformed input never produces an error here; validation reports it.
pub fn resolve_plan_value<'a>(
    planned: &'a str,
    prior_state: &'a str,
    planned_is_known: bool,
    state_is_known: bool,
) -> &'a str {
    if !planned_is_known || !state_is_known {
        return planned;
    }
    if planned == prior_state {
        return planned;
    }

    let Ok(normalized_plan) = normalize(planned) else {
        trace!("planned value is not valid JSON, keeping it");
        return planned;
    };
    let Ok(normalized_state) = normalize(prior_state) else {
        trace!("prior state value is not valid JSON, keeping planned value");
        return planned;
    };

    if normalized_plan == normalized_state {
        trace!("planned value is semantically equal to prior state, suppressing diff");
        prior_state
    } else {
        planned
    }
}

/// The plan-time value of a string attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StringValue {
    /// No value is set.
    #[default]
    Null,
    /// The value depends on something not yet applied.
    Unknown,
    /// A concrete value.
    Known(String),
}

impl StringValue {
    /// Create a known value.
    pub fn known(value: impl Into<String>) -> Self {
        Self::Known(value.into())
    }

    /// Whether the value has been determined (null counts as determined).
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Whether the value is unknown.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Whether the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The concrete string, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Known(value) => Some(value),
            _ => None,
        }
    }

    /// Read a string attribute out of a state document.
    ///
    /// Absent and `null` map to [`StringValue::Null`]. Returns `None` when the
    /// attribute holds a non-string JSON value.
    pub fn from_json(value: Option<&Value>) -> Option<Self> {
        match value {
            None | Some(Value::Null) => Some(Self::Null),
            Some(Value::String(s)) => Some(Self::Known(s.clone())),
            Some(_) => None,
        }
    }

    /// Convert back to a state value. Unknown values have no JSON form.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Null => Some(Value::Null),
            Self::Unknown => None,
            Self::Known(value) => Some(Value::String(value)),
        }
    }
}

/// Input to a single plan modifier invocation.
#[derive(Debug, Clone, Copy)]
pub struct PlanModifierRequest<'a> {
    /// The attribute path being planned.
    pub path: &'a str,
    /// The value proposed by configuration (possibly already modified).
    pub plan_value: &'a StringValue,
    /// The value recorded in prior state; null on create.
    pub state_value: &'a StringValue,
}

/// A hook that may rewrite a planned attribute value.
pub trait PlanModifier: Send + Sync {
    /// Short human-readable description of the modifier.
    fn description(&self) -> &'static str;

    /// Return the value the plan should carry.
    fn modify_plan(&self, request: &PlanModifierRequest<'_>) -> StringValue;
}

/// Replaces the planned value with prior state when both hold the same JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuppressEquivalentJson;

impl PlanModifier for SuppressEquivalentJson {
    fn description(&self) -> &'static str {
        "Suppresses the diff when planned and prior JSON are semantically equal"
    }

    fn modify_plan(&self, request: &PlanModifierRequest<'_>) -> StringValue {
        match (request.plan_value, request.state_value) {
            (StringValue::Known(planned), StringValue::Known(prior)) => {
                let resolved = resolve_plan_value(planned, prior, true, true);
                if resolved != planned.as_str() {
                    trace!(path = request.path, "using prior state for equivalent JSON");
                }
                StringValue::known(resolved)
            }
            (plan, _) => plan.clone(),
        }
    }
}

/// Carries a known prior state value forward when the plan is unknown.
///
/// Meant for computed attributes, such as remote ids, that never change once
/// the resource exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> &'static str {
        "Uses the prior state value when the planned value is unknown"
    }

    fn modify_plan(&self, request: &PlanModifierRequest<'_>) -> StringValue {
        match (request.plan_value, request.state_value) {
            (StringValue::Unknown, StringValue::Known(prior)) => StringValue::known(prior.clone()),
            (plan, _) => plan.clone(),
        }
    }
}

/// The plan modifiers an attribute schema can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributePlanModifier {
    /// See [`SuppressEquivalentJson`].
    SuppressEquivalentJson,
    /// See [`UseStateForUnknown`].
    UseStateForUnknown,
}

impl PlanModifier for AttributePlanModifier {
    fn description(&self) -> &'static str {
        match self {
            Self::SuppressEquivalentJson => SuppressEquivalentJson.description(),
            Self::UseStateForUnknown => UseStateForUnknown.description(),
        }
    }

    fn modify_plan(&self, request: &PlanModifierRequest<'_>) -> StringValue {
        match self {
            Self::SuppressEquivalentJson => SuppressEquivalentJson.modify_plan(request),
            Self::UseStateForUnknown => UseStateForUnknown.modify_plan(request),
        }
    }
}
