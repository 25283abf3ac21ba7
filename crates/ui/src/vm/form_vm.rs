use form_core::model::{ControlKind, FieldName, StepCounterTemplate};
use services::PresenterState;
use services::presentation::{ControlSnapshot, FormSnapshot, StepSnapshot};

use super::Markers;

/// Which navigation buttons are shown for the current step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonsVm {
    pub prev: bool,
    pub next: bool,
    pub submit: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldInputVm {
    Text,
    Textarea,
    Select { options: Vec<String> },
    Checkbox { value: String },
    Radio { value: String },
    Hidden,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldVm {
    pub dom_id: String,
    pub name: FieldName,
    pub label: Option<String>,
    pub input: FieldInputVm,
    pub value: String,
    pub checked: bool,
    pub required: bool,
    pub invalid: bool,
    pub input_class: String,
    /// Error text rendered under this control; only the first option of a radio
    /// group carries it.
    pub error_text: Option<String>,
}

impl FieldVm {
    #[must_use]
    pub fn aria_invalid(&self) -> &'static str {
        if self.invalid { "true" } else { "false" }
    }

    #[must_use]
    pub fn aria_required(&self) -> &'static str {
        if self.required { "true" } else { "false" }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepVm {
    pub index: usize,
    pub dom_id: String,
    pub heading: String,
    pub active: bool,
    pub class: String,
    pub fields: Vec<FieldVm>,
}

impl StepVm {
    #[must_use]
    pub fn aria_hidden(&self) -> &'static str {
        if self.active { "false" } else { "true" }
    }

    /// Active steps are reachable with the keyboard; others are skipped.
    #[must_use]
    pub fn tabindex(&self) -> &'static str {
        if self.active { "0" } else { "-1" }
    }
}

/// Render-ready view of the whole form.
#[derive(Clone, Debug, PartialEq)]
pub struct FormVm {
    pub steps: Vec<StepVm>,
    pub current_index: usize,
    pub progress: f64,
    pub counter_text: String,
    pub buttons: ButtonsVm,
    pub announcement: String,
    pub error_banner: Option<String>,
    pub transitioning: bool,
    pub submitted: bool,
    pub markers: Markers,
}

impl FormVm {
    #[must_use]
    pub fn progress_style(&self) -> String {
        format!("width: {}%", self.progress)
    }

    #[must_use]
    pub fn progress_value(&self) -> String {
        format!("{:.0}", self.progress)
    }
}

/// Percentage of real (non-loading) steps reached, counting the current one.
#[must_use]
pub fn progress_percent(real_index: usize, real_count: usize) -> f64 {
    if real_count == 0 {
        return 0.0;
    }
    let reached = f64::from(u32::try_from(real_index + 1).unwrap_or(u32::MAX));
    let total = f64::from(u32::try_from(real_count).unwrap_or(u32::MAX));
    (reached / total * 100.0).min(100.0)
}

#[must_use]
pub fn build_form_vm(
    state: &PresenterState,
    template: &StepCounterTemplate,
    markers: &Markers,
) -> FormVm {
    let snapshot = &state.snapshot;
    FormVm {
        steps: snapshot
            .steps
            .iter()
            .map(|step| map_step(step, snapshot.current_index, markers))
            .collect(),
        current_index: snapshot.current_index,
        progress: progress_percent(snapshot.real_index, snapshot.real_count),
        counter_text: template.render(snapshot.real_index + 1, snapshot.real_count),
        buttons: buttons_for(snapshot),
        announcement: state.announcement.clone().unwrap_or_default(),
        error_banner: state.error_banner.clone(),
        transitioning: snapshot.transitioning,
        submitted: snapshot.submitted,
        markers: markers.clone(),
    }
}

fn buttons_for(snapshot: &FormSnapshot) -> ButtonsVm {
    let Some(step) = snapshot.current_step() else {
        return ButtonsVm::default();
    };
    if snapshot.submitted || step.is_loading {
        return ButtonsVm::default();
    }
    let forward = !step.is_auto_advance;
    ButtonsVm {
        prev: !snapshot.is_first(),
        next: forward && !snapshot.is_last(),
        submit: forward && snapshot.is_last(),
    }
}

fn map_step(step: &StepSnapshot, current: usize, markers: &Markers) -> StepVm {
    let active = step.index == current;
    let mut classes = vec![markers.step.as_str()];
    if active {
        classes.push(&markers.active_class);
    }
    if step.is_loading {
        classes.push(&markers.loading_class);
    }
    if step.is_auto_advance {
        classes.push(&markers.auto_advance_class);
    }

    let mut seen: Vec<&FieldName> = Vec::new();
    let fields = step
        .controls
        .iter()
        .map(|control| {
            let first_of_name = !seen.contains(&&control.name);
            if first_of_name {
                seen.push(&control.name);
            }
            map_field(control, first_of_name, markers)
        })
        .collect();

    StepVm {
        index: step.index,
        dom_id: format!("step-{}", step.index + 1),
        heading: step.heading.clone(),
        active,
        class: classes.join(" "),
        fields,
    }
}

fn map_field(control: &ControlSnapshot, first_of_name: bool, markers: &Markers) -> FieldVm {
    let input = match &control.kind {
        ControlKind::Text => FieldInputVm::Text,
        ControlKind::Textarea => FieldInputVm::Textarea,
        ControlKind::Select { options } => FieldInputVm::Select {
            options: options.clone(),
        },
        ControlKind::Checkbox { value } => FieldInputVm::Checkbox {
            value: value.clone(),
        },
        ControlKind::Radio { value } => FieldInputVm::Radio {
            value: value.clone(),
        },
        ControlKind::Hidden => FieldInputVm::Hidden,
    };
    FieldVm {
        dom_id: control.id.to_string(),
        name: control.name.clone(),
        label: control.label.clone(),
        input,
        value: control.value.clone(),
        checked: control.checked,
        required: control.required,
        invalid: control.invalid,
        input_class: if control.invalid {
            markers.input_error_class.clone()
        } else {
            String::new()
        },
        error_text: control
            .error_message
            .clone()
            .filter(|_| first_of_name),
    }
}

#[cfg(test)]
mod tests {
    use form_core::model::FormDefinition;
    use services::sequencer::{Direction, Sequencer};

    use super::*;

    const SIGNUP: &str = r#"{
        "steps": [
            {
                "heading": "Plan",
                "fields": [
                    { "name": "plan", "kind": { "type": "radio", "value": "basic" }, "required": true },
                    { "name": "plan", "kind": { "type": "radio", "value": "pro" }, "required": true }
                ]
            },
            { "heading": "Checking", "markers": ["loading-step"] },
            {
                "heading": "Details",
                "fields": [
                    { "name": "email", "label": "Email", "kind": { "type": "text" }, "required": true }
                ]
            }
        ]
    }"#;

    fn sequencer() -> Sequencer {
        let definition = FormDefinition::from_json(SIGNUP).unwrap();
        Sequencer::new(definition.build().unwrap(), definition.config.timing)
    }

    fn vm_for(seq: &Sequencer) -> FormVm {
        let state = PresenterState {
            snapshot: seq.snapshot(),
            ..PresenterState::default()
        };
        build_form_vm(&state, &StepCounterTemplate::default(), &Markers::default())
    }

    #[test]
    fn progress_counts_only_real_steps() {
        assert!((progress_percent(0, 2) - 50.0).abs() < f64::EPSILON);
        assert!((progress_percent(1, 2) - 100.0).abs() < f64::EPSILON);
        assert!(progress_percent(0, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn auto_advance_first_step_hides_forward_buttons() {
        let vm = vm_for(&sequencer());
        assert_eq!(vm.counter_text, "Step 1 of 2");
        assert_eq!(vm.buttons, ButtonsVm::default());
        assert_eq!(vm.steps[0].class, "step active auto-advance-step");
        assert_eq!(vm.steps[1].class, "step loading-step");
        assert_eq!(vm.steps[0].aria_hidden(), "false");
        assert_eq!(vm.steps[2].tabindex(), "-1");
        assert_eq!(vm.progress_value(), "50");
    }

    #[test]
    fn radio_group_error_is_shown_once() {
        let mut seq = sequencer();
        seq.request_move(Direction::Forward);
        let vm = vm_for(&seq);
        let fields = &vm.steps[0].fields;
        assert!(fields.iter().all(|f| f.invalid && f.aria_invalid() == "true"));
        assert_eq!(fields[0].error_text.as_deref(), Some("This field is required."));
        assert_eq!(fields[1].error_text, None);
        assert_eq!(fields[0].input_class, "error");
    }

    #[test]
    fn last_step_shows_prev_and_submit() {
        let snapshot = FormSnapshot {
            current_index: 2,
            ..sequencer().snapshot()
        };
        let state = PresenterState {
            snapshot,
            ..PresenterState::default()
        };
        let vm = build_form_vm(&state, &StepCounterTemplate::default(), &Markers::default());
        assert_eq!(
            vm.buttons,
            ButtonsVm {
                prev: true,
                next: false,
                submit: true
            }
        );
        assert_eq!(vm.steps[2].fields[0].dom_id, "form-control-2-0");
        assert_eq!(vm.steps[2].fields[0].aria_required(), "true");
    }
}
