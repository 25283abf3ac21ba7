//! Presence checks for required controls and the visible error state they drive.

use std::collections::BTreeMap;

use crate::model::{Control, FieldName, Step};

/// Result of checking one required field (a radio group counts once).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub name: FieldName,
    pub satisfied: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepValidation {
    checks: Vec<FieldCheck>,
}

impl StepValidation {
    /// True when every required field is satisfied; a step without required fields is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.checks.iter().all(|c| c.satisfied)
    }

    #[must_use]
    pub fn checks(&self) -> &[FieldCheck] {
        &self.checks
    }

    pub fn failing(&self) -> impl Iterator<Item = &FieldCheck> {
        self.checks.iter().filter(|c| !c.satisfied)
    }
}

/// Check every required control of `step`.
///
/// Radio groups pass when any option of the group within the step is checked,
/// checkboxes when checked, everything else when the value is not empty.
#[must_use]
pub fn validate_step(step: &Step) -> StepValidation {
    let mut checks: Vec<FieldCheck> = Vec::new();
    for control in step.controls().iter().filter(|c| c.is_required()) {
        if checks.iter().any(|c| &c.name == control.name()) {
            continue;
        }
        checks.push(FieldCheck {
            name: control.name().clone(),
            satisfied: is_satisfied(step, control),
            message: control.error_message(),
        });
    }
    StepValidation { checks }
}

fn is_satisfied(step: &Step, control: &Control) -> bool {
    let kind = control.kind();
    if kind.is_radio() {
        return step
            .controls()
            .iter()
            .any(|c| c.name() == control.name() && c.kind().is_radio() && c.is_checked());
    }
    if kind.is_checkbox() {
        return control.is_checked();
    }
    !control.value().is_empty()
}

/// What changed in the visible error state after applying a validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorChanges {
    pub shown: Vec<FieldName>,
    pub cleared: Vec<FieldName>,
}

impl ErrorChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty() && self.cleared.is_empty()
    }
}

/// Fields currently shown as invalid, with the message displayed for each.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors {
    visible: BTreeMap<FieldName, String>,
}

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_invalid(&self, name: &FieldName) -> bool {
        self.visible.contains_key(name)
    }

    #[must_use]
    pub fn message(&self, name: &FieldName) -> Option<&str> {
        self.visible.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &str)> {
        self.visible.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Update visible state from `validation`.
    ///
    /// Passing fields are always cleared. Failing fields are only shown when
    /// `attempted` is set; otherwise their previous state is kept as is.
    pub fn apply(&mut self, validation: &StepValidation, attempted: bool) -> ErrorChanges {
        let mut changes = ErrorChanges::default();
        for check in validation.checks() {
            if check.satisfied {
                if self.visible.remove(&check.name).is_some() {
                    changes.cleared.push(check.name.clone());
                }
            } else if attempted
                && self
                    .visible
                    .insert(check.name.clone(), check.message.clone())
                    .is_none()
            {
                changes.shown.push(check.name.clone());
            }
        }
        changes
    }
}
