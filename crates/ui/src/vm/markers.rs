use serde::{Deserialize, Serialize};

/// Values of the `data-multistep-form` attribute and the class names the rendered
/// markup carries, so host stylesheets and scripts can find each part.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub form: String,
    pub step: String,
    pub progress_bar: String,
    pub step_counter: String,
    pub next: String,
    pub prev: String,
    pub submit: String,
    pub field_error: String,
    pub field_wrapper: String,
    pub active_class: String,
    pub input_error_class: String,
    pub auto_advance_class: String,
    pub loading_class: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            form: "form".to_owned(),
            step: "step".to_owned(),
            progress_bar: "progress-bar".to_owned(),
            step_counter: "step-counter".to_owned(),
            next: "next".to_owned(),
            prev: "prev".to_owned(),
            submit: "submit".to_owned(),
            field_error: "field-error".to_owned(),
            field_wrapper: "field-wrapper".to_owned(),
            active_class: "active".to_owned(),
            input_error_class: "error".to_owned(),
            auto_advance_class: "auto-advance-step".to_owned(),
            loading_class: "loading-step".to_owned(),
        }
    }
}

impl Markers {
    /// Markers with the loading class taken from the form's configured loading marker.
    #[must_use]
    pub fn with_loading_class(mut self, class: impl Into<String>) -> Self {
        self.loading_class = class.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let markers: Markers = serde_json::from_str(r#"{"active_class": "is-current"}"#).unwrap();
        assert_eq!(markers.active_class, "is-current");
        assert_eq!(markers.step, "step");
        assert_eq!(markers.input_error_class, "error");
    }
}
