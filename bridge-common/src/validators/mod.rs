//! Field validation with accumulated errors
//!
//! Validators never fail fast: every check records into [`ValidationErrors`]
//! and the caller decides what to do with the result. [`validate_entity`]
//! turns a non-empty result into `Error::InvalidEntity`.

use std::collections::BTreeMap;

use crate::{Error, Result};

pub mod participant;
pub mod utils;

pub use participant::{LabelsValidator, StudyParticipantValidator};
pub use utils::*;

/// Message code for missing values
pub const CANNOT_BE_BLANK: &str = "cannot be missing, null, or blank";

/// Field errors keyed by full field path
///
/// Codes containing `%s` are rendered with the full field path substituted;
/// other codes are prefixed with it, so `reject_value("password", "is required")`
/// records `"password is required"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    nested_path: Vec<String>,
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_nested_path(&mut self, path: impl Into<String>) {
        self.nested_path.push(path.into());
    }

    pub fn pop_nested_path(&mut self) {
        self.nested_path.pop();
    }

    /// Run `f` with `path` pushed, popping it afterwards
    pub fn nested<F>(&mut self, path: impl Into<String>, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push_nested_path(path);
        f(self);
        self.pop_nested_path();
    }

    /// Record an error for `field` under the current nested path
    pub fn reject_value(&mut self, field: &str, code: &str) {
        let path = self.field_path(field);
        let message = if code.contains("%s") {
            code.replace("%s", &path)
        } else {
            format!("{} {}", path, code)
        };
        self.errors.entry(path).or_default().push(message);
    }

    fn field_path(&self, field: &str) -> String {
        self.nested_path
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(field))
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Total number of recorded errors across all fields
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn field_errors(&self, path: &str) -> &[String] {
        self.errors.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    pub fn into_errors(self) -> BTreeMap<String, Vec<String>> {
        self.errors
    }
}

/// An entity-level validator
pub trait Validate {
    fn validate(&self, errors: &mut ValidationErrors);
}

/// Run `validator` and fail with `Error::InvalidEntity` if anything was rejected
///
/// The message reads `"<entity_name> is invalid: <msg>; <msg>"`.
pub fn validate_entity<V: Validate + ?Sized>(validator: &V, entity_name: &str) -> Result<()> {
    let mut errors = ValidationErrors::new();
    validator.validate(&mut errors);
    if !errors.has_errors() {
        return Ok(());
    }
    let messages: Vec<&str> = errors
        .errors()
        .values()
        .flatten()
        .map(String::as_str)
        .collect();
    Err(Error::InvalidEntity {
        message: format!("{} is invalid: {}", entity_name, messages.join("; ")),
        errors: errors.into_errors(),
    })
}
