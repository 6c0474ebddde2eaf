//! Project form validation.
//!
//! Provides the field-error map and a pure-logic evaluator. Every rule
//! looks at exactly one field, so a single field can be re-checked after
//! an edit without touching the others.

pub mod evaluator;
pub mod rules;
