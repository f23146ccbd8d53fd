//! Assertion helpers for provider tests.
//!
//! # Example
//!
//! ```
//! use json_plan_modifier::plan::{plan_resource, PlanRequest};
//! use json_plan_modifier::schema::{Attribute, Schema};
//! use json_plan_modifier::testing::{assert_json_equivalent, assert_plan_no_changes};
//! use serde_json::json;
//!
//! let schema = Schema::v0().with_attribute("config", Attribute::required_json());
//! let prior = json!({"config": "{\"b\":2,\"a\":1}"});
//! let proposed = json!({"config": "{\"a\": 1, \"b\": 2}"});
//!
//! let plan = plan_resource(&schema, PlanRequest::update(prior, proposed)).unwrap();
//! assert_plan_no_changes(&plan);
//! assert_json_equivalent("{\"a\": 1, \"b\": 2}", "{\"b\":2,\"a\":1}");
//! ```

use crate::normalize::normalize;
use crate::schema::Diagnostic;
use crate::types::PlanResult;

fn changed_paths(plan: &PlanResult) -> Vec<&str> {
    plan.changes.iter().map(|c| c.path.as_str()).collect()
}

/// Assert that a plan changes nothing.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        changed_paths(plan)
    );
}

/// Assert that a plan changes something.
///
/// # Panics
///
/// Panics if the plan has no changes.
pub fn assert_plan_has_changes(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes, but got no changes"
    );
}

/// Assert that a plan replaces the resource.
///
/// # Panics
///
/// Panics if the plan updates in place.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not"
    );
}

/// Assert that a plan changes the attribute at `path`.
///
/// # Panics
///
/// Panics if there is no change for `path`.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    assert!(
        plan.change(path).is_some(),
        "Expected plan to change attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        changed_paths(plan)
    );
}

/// Assert that a plan leaves the attribute at `path` alone.
///
/// # Panics
///
/// Panics if there is a change for `path`.
pub fn assert_plan_does_not_change_attribute(plan: &PlanResult, path: &str) {
    assert!(
        plan.change(path).is_none(),
        "Expected plan to not change attribute '{}', but it was changed",
        path
    );
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.is_error())
        .map(|d| &d.summary)
        .collect();
    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    assert!(
        diagnostics.iter().any(Diagnostic::is_error),
        "Expected at least one error, but got none"
    );
}

/// Assert that some error diagnostic's summary contains `substring`.
///
/// # Panics
///
/// Panics if no error diagnostic matches.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    assert!(
        diagnostics
            .iter()
            .any(|d| d.is_error() && d.summary.contains(substring)),
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}

/// Assert that two JSON strings normalize to the same document.
///
/// # Panics
///
/// Panics if either side is malformed or the documents differ.
pub fn assert_json_equivalent(left: &str, right: &str) {
    let (l, r) = normalize_pair(left, right);
    assert!(
        l == r,
        "Expected equivalent JSON.\n  left:  {}\n  right: {}",
        l,
        r
    );
}

/// Assert that two JSON strings describe different documents.
///
/// # Panics
///
/// Panics if either side is malformed or the documents are equivalent.
pub fn assert_json_not_equivalent(left: &str, right: &str) {
    let (l, r) = normalize_pair(left, right);
    assert!(l != r, "Expected different JSON, both normalize to {}", l);
}

fn normalize_pair(left: &str, right: &str) -> (String, String) {
    let l = normalize(left).unwrap_or_else(|e| panic!("left is not valid JSON: {}", e));
    let r = normalize(right).unwrap_or_else(|e| panic!("right is not valid JSON: {}", e));
    (l, r)
}
