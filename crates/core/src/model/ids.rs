use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldNameError {
    #[error("field name cannot be empty")]
    Empty,
    #[error("field name cannot contain quotes: {0}")]
    Quoted(String),
}

/// Name shared by every control that submits under the same key.
///
/// Radio options of one group share a single `FieldName`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldName(String);

impl FieldName {
    /// Creates a new `FieldName`.
    ///
    /// # Errors
    ///
    /// Returns `FieldNameError::Empty` for blank names and
    /// `FieldNameError::Quoted` when the name contains a quote character.
    pub fn new(name: impl Into<String>) -> Result<Self, FieldNameError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(FieldNameError::Empty);
        }
        if trimmed.contains(['"', '\'']) {
            return Err(FieldNameError::Quoted(name));
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FieldName {
    type Error = FieldNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FieldName> for String {
    fn from(value: FieldName) -> Self {
        value.0
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stable position of a control inside the form: its step and its slot in that step.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControlId {
    step: usize,
    slot: usize,
}

impl ControlId {
    #[must_use]
    pub fn new(step: usize, slot: usize) -> Self {
        Self { step, slot }
    }

    #[must_use]
    pub fn step(&self) -> usize {
        self.step
    }

    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl fmt::Debug for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldName({})", self.0)
    }
}

impl fmt::Debug for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ControlId({}:{})", self.step, self.slot)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "form-control-{}-{}", self.step, self.slot)
    }
}
