use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::{Control, ControlId, ControlKind, FieldName, Step};

/// Submitted data keyed by field name, built the way a browser builds form data.
pub type FieldValues = BTreeMap<String, String>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldChangeError {
    #[error("no control named {0}")]
    UnknownField(FieldName),
    #[error("radio group {name} has no option {value}")]
    UnknownOption { name: FieldName, value: String },
    #[error("control {0} does not accept this kind of change")]
    KindMismatch(FieldName),
}

/// A user edit reported by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Text { name: FieldName, value: String },
    Checkbox { name: FieldName, checked: bool },
    Radio { name: FieldName, value: String },
}

impl FieldChange {
    #[must_use]
    pub fn name(&self) -> &FieldName {
        match self {
            Self::Text { name, .. } | Self::Checkbox { name, .. } | Self::Radio { name, .. } => {
                name
            }
        }
    }
}

/// Where a change landed and whether it checked a radio option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedChange {
    pub step: usize,
    pub radio_checked: bool,
}

/// The ordered, fixed list of steps plus the live state of every control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    steps: Vec<Step>,
}

impl Form {
    /// Returns `None` when `steps` is empty; a form always has at least one step.
    #[must_use]
    pub fn new(steps: Vec<Step>) -> Option<Self> {
        if steps.is_empty() {
            return None;
        }
        Some(Self { steps })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    #[must_use]
    pub fn is_loading(&self, index: usize) -> bool {
        self.step(index).is_some_and(Step::is_loading)
    }

    /// Number of steps a user actually fills in (loading steps excluded).
    #[must_use]
    pub fn real_step_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.is_loading()).count()
    }

    /// Zero-based position of `index` among the non-loading steps.
    #[must_use]
    pub fn real_position(&self, index: usize) -> usize {
        self.steps
            .iter()
            .take(index)
            .filter(|s| !s.is_loading())
            .count()
    }

    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.steps.iter().flat_map(|s| s.controls().iter())
    }

    #[must_use]
    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.step(id.step())?.controls().get(id.slot())
    }

    fn controls_mut(&mut self) -> impl Iterator<Item = &mut Control> {
        self.steps.iter_mut().flat_map(|s| s.controls_mut().iter_mut())
    }

    /// Apply a user edit to the matching control(s).
    ///
    /// # Errors
    ///
    /// Returns `FieldChangeError::UnknownField` if no control carries the name,
    /// `FieldChangeError::UnknownOption` if a radio value is not part of the group,
    /// and `FieldChangeError::KindMismatch` if the change does not fit the control.
    pub fn apply_change(&mut self, change: &FieldChange) -> Result<AppliedChange, FieldChangeError> {
        let name = change.name();
        if !self.controls().any(|c| c.name() == name) {
            return Err(FieldChangeError::UnknownField(name.clone()));
        }

        match change {
            FieldChange::Text { value, .. } => {
                let control = self
                    .controls_mut()
                    .find(|c| c.name() == name && !c.kind().is_toggle())
                    .ok_or_else(|| FieldChangeError::KindMismatch(name.clone()))?;
                control.set_value(value.clone());
                Ok(AppliedChange {
                    step: control.id().step(),
                    radio_checked: false,
                })
            }
            FieldChange::Checkbox { checked, .. } => {
                let control = self
                    .controls_mut()
                    .find(|c| c.name() == name && c.kind().is_checkbox())
                    .ok_or_else(|| FieldChangeError::KindMismatch(name.clone()))?;
                control.set_checked(*checked);
                Ok(AppliedChange {
                    step: control.id().step(),
                    radio_checked: false,
                })
            }
            FieldChange::Radio { value, .. } => {
                if !self.controls().any(|c| c.name() == name && c.kind().is_radio()) {
                    return Err(FieldChangeError::KindMismatch(name.clone()));
                }
                let step = self
                    .check_radio(name, value)
                    .ok_or_else(|| FieldChangeError::UnknownOption {
                        name: name.clone(),
                        value: value.clone(),
                    })?;
                Ok(AppliedChange {
                    step,
                    radio_checked: true,
                })
            }
        }
    }

    /// Checks the option of `name` carrying `value` and unchecks its siblings.
    ///
    /// Returns the step of the checked option, or `None` when no option matches
    /// (in which case the group is left untouched).
    fn check_radio(&mut self, name: &FieldName, value: &str) -> Option<usize> {
        let target = self.controls().find(|c| {
            c.name() == name && matches!(c.kind(), ControlKind::Radio { value: v } if v == value)
        })?;
        let target_id = target.id();
        for control in self.controls_mut() {
            if control.name() == name && control.kind().is_radio() {
                control.set_checked(control.id() == target_id);
            }
        }
        Some(target_id.step())
    }

    /// Current values of every named control across all steps.
    #[must_use]
    pub fn values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        for control in self.controls() {
            if let Some(value) = control.submitted_value() {
                values.insert(control.name().to_string(), value.to_owned());
            }
        }
        values
    }

    /// Seed control state from stored values. Unknown names are skipped.
    ///
    /// A stored record only lists checked checkboxes, so every checkbox whose name
    /// is absent is unchecked.
    ///
    /// Returns how many stored entries were applied to a control.
    pub fn restore_values(&mut self, values: &FieldValues) -> usize {
        for control in self.controls_mut() {
            if control.kind().is_checkbox() && !values.contains_key(control.name().as_str()) {
                control.set_checked(false);
            }
        }

        let mut applied = 0;
        for (raw_name, value) in values {
            let Ok(name) = FieldName::new(raw_name.as_str()) else {
                continue;
            };
            let Some(kind) = self
                .controls()
                .find(|c| c.name() == &name)
                .map(|c| c.kind().clone())
            else {
                continue;
            };
            match kind {
                ControlKind::Radio { .. } => {
                    if self.check_radio(&name, value).is_some() {
                        applied += 1;
                    }
                }
                ControlKind::Checkbox { .. } => {
                    applied += 1;
                    for control in self.controls_mut().filter(|c| c.name() == &name) {
                        let on = matches!(control.kind(), ControlKind::Checkbox { value: v } if v == value);
                        control.set_checked(on);
                    }
                }
                ControlKind::Text
                | ControlKind::Textarea
                | ControlKind::Select { .. }
                | ControlKind::Hidden => {
                    applied += 1;
                    for control in self.controls_mut().filter(|c| c.name() == &name) {
                        control.set_value(value.clone());
                    }
                }
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn name(raw: &str) -> FieldName {
        FieldName::new(raw).unwrap()
    }

    fn sample_form() -> Form {
        let step0 = Step::new(
            0,
            Some("Plan".to_owned()),
            BTreeSet::new(),
            vec![
                Control::new(
                    ControlId::new(0, 0),
                    name("plan"),
                    ControlKind::Radio {
                        value: "basic".to_owned(),
                    },
                ),
                Control::new(
                    ControlId::new(0, 1),
                    name("plan"),
                    ControlKind::Radio {
                        value: "pro".to_owned(),
                    },
                ),
            ],
            "loading-step",
        );
        let step1 = Step::new(
            1,
            None,
            BTreeSet::from(["loading-step".to_owned()]),
            Vec::new(),
            "loading-step",
        );
        let step2 = Step::new(
            2,
            Some("Contact".to_owned()),
            BTreeSet::new(),
            vec![
                Control::new(ControlId::new(2, 0), name("email"), ControlKind::Text),
                Control::new(
                    ControlId::new(2, 1),
                    name("terms"),
                    ControlKind::Checkbox {
                        value: "on".to_owned(),
                    },
                ),
            ],
            "loading-step",
        );
        Form::new(vec![step0, step1, step2]).unwrap()
    }

    #[test]
    fn empty_step_list_is_not_a_form() {
        assert!(Form::new(Vec::new()).is_none());
    }

    #[test]
    fn real_positions_skip_loading_steps() {
        let form = sample_form();
        assert_eq!(form.real_step_count(), 2);
        assert_eq!(form.real_position(0), 0);
        assert_eq!(form.real_position(2), 1);
    }

    #[test]
    fn radio_change_checks_one_option() {
        let mut form = sample_form();
        let applied = form
            .apply_change(&FieldChange::Radio {
                name: name("plan"),
                value: "pro".to_owned(),
            })
            .unwrap();
        assert_eq!(applied, AppliedChange { step: 0, radio_checked: true });

        form.apply_change(&FieldChange::Radio {
            name: name("plan"),
            value: "basic".to_owned(),
        })
        .unwrap();
        assert_eq!(form.values().get("plan").map(String::as_str), Some("basic"));
        let checked = form.controls().filter(|c| c.is_checked()).count();
        assert_eq!(checked, 1);
    }

    #[test]
    fn rejects_unknown_fields_and_options() {
        let mut form = sample_form();
        assert!(matches!(
            form.apply_change(&FieldChange::Text {
                name: name("missing"),
                value: "x".to_owned()
            }),
            Err(FieldChangeError::UnknownField(_))
        ));
        assert!(matches!(
            form.apply_change(&FieldChange::Radio {
                name: name("plan"),
                value: "enterprise".to_owned()
            }),
            Err(FieldChangeError::UnknownOption { .. })
        ));
        assert!(matches!(
            form.apply_change(&FieldChange::Text {
                name: name("plan"),
                value: "pro".to_owned()
            }),
            Err(FieldChangeError::KindMismatch(_))
        ));
    }

    #[test]
    fn values_follow_form_data_rules() {
        let mut form = sample_form();
        let values = form.values();
        assert_eq!(values.get("email").map(String::as_str), Some(""));
        assert!(!values.contains_key("terms"));
        assert!(!values.contains_key("plan"));

        form.apply_change(&FieldChange::Checkbox {
            name: name("terms"),
            checked: true,
        })
        .unwrap();
        assert_eq!(form.values().get("terms").map(String::as_str), Some("on"));
    }

    #[test]
    fn restore_applies_type_semantics_and_ignores_unknown_names() {
        let mut form = sample_form();
        let stored = FieldValues::from([
            ("plan".to_owned(), "pro".to_owned()),
            ("terms".to_owned(), "on".to_owned()),
            ("email".to_owned(), "a@b.c".to_owned()),
            ("retired".to_owned(), "x".to_owned()),
        ]);
        assert_eq!(form.restore_values(&stored), 3);
        let values = form.values();
        assert_eq!(values.get("plan").map(String::as_str), Some("pro"));
        assert_eq!(values.get("terms").map(String::as_str), Some("on"));
        assert_eq!(values.get("email").map(String::as_str), Some("a@b.c"));
        assert!(!values.contains_key("retired"));
    }

    #[test]
    fn restore_unchecks_checkbox_for_other_values() {
        let mut form = sample_form();
        form.apply_change(&FieldChange::Checkbox {
            name: name("terms"),
            checked: true,
        })
        .unwrap();
        form.restore_values(&FieldValues::from([("terms".to_owned(), "off".to_owned())]));
        assert!(!form.values().contains_key("terms"));
    }

    #[test]
    fn restore_unchecks_default_checked_checkbox_missing_from_record() {
        let mut form = sample_form();
        form.apply_change(&FieldChange::Checkbox {
            name: name("terms"),
            checked: true,
        })
        .unwrap();
        form.apply_change(&FieldChange::Checkbox {
            name: name("terms"),
            checked: false,
        })
        .unwrap();
        let saved = form.values();
        assert!(!saved.contains_key("terms"));

        let mut restored = sample_form();
        restored
            .apply_change(&FieldChange::Checkbox {
                name: name("terms"),
                checked: true,
            })
            .unwrap();
        restored.restore_values(&saved);
        assert_eq!(restored.values(), saved);
        assert!(!restored.controls().any(|c| c.name() == &name("terms") && c.is_checked()));
    }

    #[test]
    fn restore_counts_only_matching_radio_options() {
        let mut form = sample_form();
        let stored = FieldValues::from([
            ("plan".to_owned(), "enterprise".to_owned()),
            ("email".to_owned(), "a@b.c".to_owned()),
        ]);
        assert_eq!(form.restore_values(&stored), 1);
        assert!(!form.values().contains_key("plan"));
    }
}
