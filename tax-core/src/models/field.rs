use std::fmt;

use thiserror::Error;

use super::Amount;

/// The kind of value a form field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Money,
    Flag,
    Choice,
}

impl fmt::Display for FieldKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Money => "money",
            Self::Flag => "flag",
            Self::Choice => "choice",
        };
        f.write_str(name)
    }
}

/// Structural errors raised when a caller addresses a field incorrectly.
///
/// These are programming errors on the caller's side, not user input
/// problems; user input problems surface through validation instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{0}' is derived and cannot be set")]
    DerivedField(&'static str),

    #[error("field '{field}' expects a {expected} value")]
    TypeMismatch {
        field: &'static str,
        expected: FieldKind,
    },
}

/// A value headed for a form field.
///
/// Text sent to a money field is read with the lenient [`Amount::parse`],
/// matching what a user typing into the form would see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Money(Amount),
    Flag(bool),
}

impl FieldValue {
    pub(crate) fn into_text(
        self,
        field: &'static str,
    ) -> Result<String, FieldError> {
        match self {
            Self::Text(text) => Ok(text),
            _ => Err(FieldError::TypeMismatch {
                field,
                expected: FieldKind::Text,
            }),
        }
    }

    pub(crate) fn into_amount(
        self,
        field: &'static str,
    ) -> Result<Amount, FieldError> {
        match self {
            Self::Money(amount) => Ok(amount),
            Self::Text(text) => Ok(Amount::parse(&text)),
            Self::Flag(_) => Err(FieldError::TypeMismatch {
                field,
                expected: FieldKind::Money,
            }),
        }
    }

    pub(crate) fn into_flag(
        self,
        field: &'static str,
    ) -> Result<bool, FieldError> {
        match self {
            Self::Flag(flag) => Ok(flag),
            _ => Err(FieldError::TypeMismatch {
                field,
                expected: FieldKind::Flag,
            }),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Amount> for FieldValue {
    fn from(value: Amount) -> Self {
        Self::Money(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}
