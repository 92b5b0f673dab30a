//! Field-level validation of a return and its wage ledger.
//!
//! Validation never fails; it reports. A [`ValidationResult`] lists, per
//! field, the messages to show the user. An empty result means the checked
//! fields are valid.

mod validator;

use std::collections::BTreeMap;
use std::fmt;

pub use validator::ReturnValidator;

use crate::wizard::Section;
use crate::{ReturnField, WageField};

/// Identifies a field on the return or on one wage entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldPath {
    Return(ReturnField),
    Wage { index: usize, field: WageField },
}

impl From<ReturnField> for FieldPath {
    fn from(field: ReturnField) -> Self {
        Self::Return(field)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Return(field) => f.write_str(field.as_str()),
            Self::Wage { index, field } => write!(f, "wages[{index}].{field}"),
        }
    }
}

/// Validation messages keyed by field, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<FieldPath, Vec<String>>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        path: impl Into<FieldPath>,
        message: impl Into<String>,
    ) {
        self.errors
            .entry(path.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages for one field; empty when the field is valid.
    pub fn errors_for(
        &self,
        path: impl Into<FieldPath>,
    ) -> &[String] {
        self.errors
            .get(&path.into())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Fields with at least one message.
    pub fn fields(&self) -> impl Iterator<Item = &FieldPath> {
        self.errors.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &[String])> {
        self.errors
            .iter()
            .map(|(path, messages)| (path, messages.as_slice()))
    }

    /// Number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Only the entries governed by `section`.
    pub fn for_section(
        &self,
        section: Section,
    ) -> ValidationResult {
        Self {
            errors: self
                .errors
                .iter()
                .filter(|(path, _)| section.governs(path))
                .map(|(path, messages)| (*path, messages.clone()))
                .collect(),
        }
    }

    pub fn merge(
        &mut self,
        other: ValidationResult,
    ) {
        for (path, messages) in other.errors {
            self.errors.entry(path).or_default().extend(messages);
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (path, messages) in &self.errors {
            for message in messages {
                writeln!(f, "{path}: {message}")?;
            }
        }
        Ok(())
    }
}
