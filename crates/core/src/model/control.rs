use serde::{Deserialize, Serialize};

use crate::model::{ControlId, FieldName};

fn default_checkbox_value() -> String {
    "on".to_owned()
}

/// What kind of input a control is, and the value it submits when it is a toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControlKind {
    Text,
    Textarea,
    Select {
        #[serde(default)]
        options: Vec<String>,
    },
    Checkbox {
        #[serde(default = "default_checkbox_value")]
        value: String,
    },
    Radio {
        value: String,
    },
    Hidden,
}

impl ControlKind {
    #[must_use]
    pub fn is_radio(&self) -> bool {
        matches!(self, Self::Radio { .. })
    }

    #[must_use]
    pub fn is_checkbox(&self) -> bool {
        matches!(self, Self::Checkbox { .. })
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }

    /// Toggles (checkbox, radio) carry a checked flag instead of free text.
    #[must_use]
    pub fn is_toggle(&self) -> bool {
        self.is_radio() || self.is_checkbox()
    }
}

/// A single input of a step, holding its live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    id: ControlId,
    name: FieldName,
    label: Option<String>,
    kind: ControlKind,
    required: bool,
    error_message: Option<String>,
    value: String,
    checked: bool,
}

impl Control {
    #[must_use]
    pub fn new(id: ControlId, name: FieldName, kind: ControlKind) -> Self {
        Self {
            id,
            name,
            label: None,
            kind,
            required: false,
            error_message: None,
            value: String::new(),
            checked: false,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    #[must_use]
    pub fn id(&self) -> ControlId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> &ControlKind {
        &self.kind
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Message shown and announced when this control fails the required check.
    #[must_use]
    pub fn error_message(&self) -> String {
        if let Some(message) = &self.error_message {
            return message.clone();
        }
        match &self.label {
            Some(label) => format!("{label} is required."),
            None => "This field is required.".to_owned(),
        }
    }

    /// Value this control contributes to the submitted data, if any.
    ///
    /// Unchecked toggles contribute nothing, mirroring how browsers build form data.
    #[must_use]
    pub fn submitted_value(&self) -> Option<&str> {
        match &self.kind {
            ControlKind::Checkbox { value } | ControlKind::Radio { value } => {
                self.checked.then_some(value.as_str())
            }
            ControlKind::Text
            | ControlKind::Textarea
            | ControlKind::Select { .. }
            | ControlKind::Hidden => Some(self.value.as_str()),
        }
    }

    pub(crate) fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub(crate) fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }
}
