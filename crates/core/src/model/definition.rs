use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Control, ControlId, ControlKind, FieldName, Form, FormConfig, Step};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormDefinitionError {
    #[error("form definition could not be parsed: {0}")]
    Parse(String),
    #[error("form has no steps")]
    NoSteps,
    #[error("radio option of {name} has an empty value")]
    EmptyRadioValue { name: FieldName },
    #[error("field name {name} is used by more than one non-radio control")]
    DuplicateName { name: FieldName },
}

/// Host-supplied description of a single control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: FieldName,
    #[serde(default)]
    pub label: Option<String>,
    pub kind: ControlKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepDefinition {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub markers: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// Full description of a form: its configuration and ordered steps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormDefinition {
    #[serde(default)]
    pub config: FormConfig,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

impl FormDefinition {
    /// Parse a definition from JSON.
    ///
    /// # Errors
    ///
    /// Returns `FormDefinitionError::Parse` when the text is not a valid definition.
    pub fn from_json(text: &str) -> Result<Self, FormDefinitionError> {
        serde_json::from_str(text).map_err(|err| FormDefinitionError::Parse(err.to_string()))
    }

    /// Build the live form, deriving loading and auto-advance flags per step.
    ///
    /// # Errors
    ///
    /// Returns `FormDefinitionError::NoSteps` for an empty definition,
    /// `FormDefinitionError::EmptyRadioValue` for radio options without a value and
    /// `FormDefinitionError::DuplicateName` when non-radio controls share a name.
    pub fn build(&self) -> Result<Form, FormDefinitionError> {
        self.check_names()?;

        let steps = self
            .steps
            .iter()
            .enumerate()
            .map(|(index, def)| {
                let controls = def
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(slot, field)| build_control(ControlId::new(index, slot), field))
                    .collect();
                let markers: BTreeSet<String> = def.markers.iter().cloned().collect();
                Step::new(
                    index,
                    def.heading.clone(),
                    markers,
                    controls,
                    &self.config.loading_step_marker,
                )
            })
            .collect();

        Form::new(steps).ok_or(FormDefinitionError::NoSteps)
    }

    fn check_names(&self) -> Result<(), FormDefinitionError> {
        let mut seen: BTreeMap<&FieldName, bool> = BTreeMap::new();
        for field in self.steps.iter().flat_map(|s| s.fields.iter()) {
            let is_radio = match &field.kind {
                ControlKind::Radio { value } if value.is_empty() => {
                    return Err(FormDefinitionError::EmptyRadioValue {
                        name: field.name.clone(),
                    });
                }
                kind => kind.is_radio(),
            };
            if let Some(previous_radio) = seen.insert(&field.name, is_radio) {
                if !(previous_radio && is_radio) {
                    return Err(FormDefinitionError::DuplicateName {
                        name: field.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn build_control(id: ControlId, field: &FieldDefinition) -> Control {
    let mut control = Control::new(id, field.name.clone(), field.kind.clone())
        .with_required(field.required)
        .with_value(field.value.clone())
        .with_checked(field.checked);
    if let Some(label) = &field.label {
        control = control.with_label(label.clone());
    }
    if let Some(message) = &field.error_message {
        control = control.with_error_message(message.clone());
    }
    control
}
