//! Semantic JSON plan modifiers for infrastructure providers.
//!
//! Providers often store JSON documents in plain string attributes: tool input
//! schemas, model parameters, processor configuration. The remote API rarely
//! echoes such a document back byte-for-byte, so a naive string comparison
//! reports a diff on every plan. This crate decides when two JSON strings are
//! the same document and keeps the prior state value when they are.
//!
//! # Overview
//!
//! - [`normalize`](mod@normalize): canonical JSON serialization (sorted keys, compact output)
//! - [`plan_modifier`]: [`resolve_plan_value`] and the [`PlanModifier`] trait
//! - [`schema`]: attribute definitions that carry plan modifiers
//! - [`plan`](mod@plan): runs plan modifiers over a whole resource and reports changes
//! - [`validation`]: surfaces malformed JSON strings as diagnostics
//! - [`logging`]: `tracing` subscriber setup writing to stderr
//! - [`testing`]: assertion helpers for plans, diagnostics and JSON
//!
//! # Quick Start
//!
//! ```
//! use json_plan_modifier::{normalize, resolve_plan_value};
//!
//! assert_eq!(
//!     normalize(r#"{"b":{"y":2,"x":1},"a":[3,1,2]}"#).unwrap(),
//!     r#"{"a":[3,1,2],"b":{"x":1,"y":2}}"#
//! );
//!
//! let planned = "{\n  \"a\": 1,\n  \"b\": 2\n}";
//! let prior = r#"{"b":2,"a":1}"#;
//! assert_eq!(resolve_plan_value(planned, prior, true, true), prior);
//! assert_eq!(resolve_plan_value(r#"{"a":1}"#, r#"{"a":2}"#, true, true), r#"{"a":1}"#);
//! ```
//!
//! Everything here is synchronous and free of shared state, so it can be
//! called from any number of threads.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod logging;
pub mod normalize;
pub mod plan;
pub mod plan_modifier;
pub mod schema;
pub mod testing;
pub mod types;
pub mod validation;

pub use error::{ParseError, ProviderError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use normalize::{normalize, normalize_value, semantically_equal, CanonicalJson};
pub use plan::{plan, plan_resource, PlanRequest};
pub use plan_modifier::{
    resolve_plan_value, AttributePlanModifier, PlanModifier, PlanModifierRequest, StringValue,
    SuppressEquivalentJson, UseStateForUnknown,
};
pub use schema::ProviderSchema;
pub use types::{AttributeChange, PlanResult};
pub use validation::{is_valid, validate, validate_result};

pub use serde_json;
pub use tracing;
