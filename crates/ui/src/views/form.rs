use dioxus::document::eval;
use dioxus::prelude::*;
use form_core::model::FieldChange;
use services::{FocusTarget, FormEvent as FormIntent};

use crate::context::AppContext;
use crate::views::ViewError;
use crate::vm::{FieldInputVm, FieldVm, FormVm, Markers, StepVm, build_form_vm};

/// Connected form: follows the running form's presenter state and forwards
/// user intents to its handle.
#[component]
pub fn FormPage() -> Element {
    let ctx = use_context::<AppContext>();
    let initial = ctx.presenter_state().borrow().clone();
    let presenter_state = use_signal(|| initial);
    let mut view_error = use_signal(|| None::<ViewError>);

    let watch_ctx = ctx.clone();
    use_future(move || {
        let mut rx = watch_ctx.presenter_state();
        let mut presenter_state = presenter_state;
        async move {
            while rx.changed().await.is_ok() {
                let next = rx.borrow_and_update().clone();
                presenter_state.set(next);
            }
        }
    });

    let mut applied_focus = use_signal(|| 0_u64);
    use_effect(move || {
        let state = presenter_state.read();
        if state.focus_revision == *applied_focus.peek() {
            return;
        }
        let revision = state.focus_revision;
        let target = state.focus.clone();
        drop(state);
        applied_focus.set(revision);
        if let Some(target) = target {
            let dom_id = focus_dom_id(&target);
            let _ = eval(&format!("document.getElementById('{dom_id}')?.focus();"));
        }
    });

    let handle = ctx.form_handle();
    let on_event = use_callback(move |intent: FormIntent| {
        if handle.try_send(intent).is_err() {
            view_error.set(Some(ViewError::Stopped));
        }
    });

    let exit_handle = ctx.form_handle();
    use_drop(move || {
        let _ = exit_handle.try_send(FormIntent::PageExit);
    });

    let vm = build_form_vm(&presenter_state.read(), ctx.counter_template(), ctx.markers());

    rsx! {
        div { class: "page page--form",
            if let Some(err) = view_error() {
                p { class: "form-view-error", role: "alert", "{err.message()}" }
            }
            MultistepFormView { vm, on_event }
        }
    }
}

fn focus_dom_id(target: &FocusTarget) -> String {
    match target {
        FocusTarget::Control(id) => id.to_string(),
        FocusTarget::Step(index) => format!("step-{}", index + 1),
    }
}

/// Markup for one form, rendered purely from its view model.
#[component]
pub fn MultistepFormView(vm: FormVm, on_event: Callback<FormIntent>) -> Element {
    let markers = vm.markers.clone();
    let form_class = if vm.transitioning {
        "multistep-form is-transitioning"
    } else {
        "multistep-form"
    };

    rsx! {
        form {
            class: form_class,
            "data-multistep-form": "{markers.form}",
            // Required fields are checked per step by the form itself.
            novalidate: true,
            onsubmit: move |evt| {
                evt.prevent_default();
                on_event.call(FormIntent::Submit);
            },

            if let Some(banner) = vm.error_banner.clone() {
                div { class: "form-error-message", role: "alert", aria_live: "assertive", "{banner}" }
            }

            div { class: "form-progress",
                div {
                    class: "form-progress-bar",
                    "data-multistep-form": "{markers.progress_bar}",
                    role: "progressbar",
                    aria_valuemin: "0",
                    aria_valuemax: "100",
                    aria_valuenow: "{vm.progress_value()}",
                    style: "{vm.progress_style()}",
                }
            }
            p { class: "form-step-counter", "data-multistep-form": "{markers.step_counter}",
                "{vm.counter_text}"
            }
            div { class: "sr-only", role: "status", aria_live: "polite", aria_atomic: "true",
                "{vm.announcement}"
            }

            for step in vm.steps.iter().cloned() {
                FormStep { key: "{step.dom_id}", step, markers: markers.clone(), on_event }
            }

            if vm.submitted {
                p { class: "form-complete", role: "status", "Thank you. Your answers have been sent." }
            }

            div { class: "form-nav",
                if vm.buttons.prev {
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        "data-multistep-form": "{markers.prev}",
                        onclick: move |_| on_event.call(FormIntent::Prev),
                        "Back"
                    }
                }
                if vm.buttons.next {
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        "data-multistep-form": "{markers.next}",
                        onclick: move |_| on_event.call(FormIntent::Next),
                        "Next"
                    }
                }
                if vm.buttons.submit {
                    button {
                        class: "btn btn-primary",
                        r#type: "submit",
                        "data-multistep-form": "{markers.submit}",
                        "Submit"
                    }
                }
            }
        }
    }
}

#[component]
fn FormStep(step: StepVm, markers: Markers, on_event: Callback<FormIntent>) -> Element {
    rsx! {
        section {
            id: "{step.dom_id}",
            class: "{step.class}",
            "data-multistep-form": "{markers.step}",
            role: "tabpanel",
            aria_hidden: step.aria_hidden(),
            tabindex: step.tabindex(),
            hidden: !step.active,
            h2 { class: "form-step-heading", "{step.heading}" }
            for field in step.fields.iter().cloned() {
                FormField { key: "{field.dom_id}", field, markers: markers.clone(), on_event }
            }
        }
    }
}

#[component]
fn FormField(field: FieldVm, markers: Markers, on_event: Callback<FormIntent>) -> Element {
    let dom_id = field.dom_id.clone();
    let name = field.name.clone();
    let name_attr = field.name.to_string();

    let control = match field.input.clone() {
        FieldInputVm::Hidden => {
            return rsx! {
                input { r#type: "hidden", id: "{dom_id}", name: "{name_attr}", value: "{field.value}" }
            };
        }
        FieldInputVm::Text => rsx! {
            input {
                r#type: "text",
                id: "{dom_id}",
                name: "{name_attr}",
                class: "{field.input_class}",
                value: "{field.value}",
                required: field.required,
                aria_required: field.aria_required(),
                aria_invalid: field.aria_invalid(),
                oninput: move |evt| {
                    on_event.call(FormIntent::FieldChanged(FieldChange::Text {
                        name: name.clone(),
                        value: evt.value(),
                    }));
                },
            }
        },
        FieldInputVm::Textarea => rsx! {
            textarea {
                id: "{dom_id}",
                name: "{name_attr}",
                class: "{field.input_class}",
                value: "{field.value}",
                required: field.required,
                aria_required: field.aria_required(),
                aria_invalid: field.aria_invalid(),
                oninput: move |evt| {
                    on_event.call(FormIntent::FieldChanged(FieldChange::Text {
                        name: name.clone(),
                        value: evt.value(),
                    }));
                },
            }
        },
        FieldInputVm::Select { options } => rsx! {
            select {
                id: "{dom_id}",
                name: "{name_attr}",
                class: "{field.input_class}",
                value: "{field.value}",
                required: field.required,
                aria_required: field.aria_required(),
                aria_invalid: field.aria_invalid(),
                onchange: move |evt| {
                    on_event.call(FormIntent::FieldChanged(FieldChange::Text {
                        name: name.clone(),
                        value: evt.value(),
                    }));
                },
                option { value: "", selected: field.value.is_empty(), "Choose..." }
                for opt in options {
                    option { value: "{opt}", selected: opt == field.value, "{opt}" }
                }
            }
        },
        FieldInputVm::Checkbox { value } => rsx! {
            input {
                r#type: "checkbox",
                id: "{dom_id}",
                name: "{name_attr}",
                class: "{field.input_class}",
                value: "{value}",
                checked: field.checked,
                required: field.required,
                aria_required: field.aria_required(),
                aria_invalid: field.aria_invalid(),
                onchange: move |evt| {
                    on_event.call(FormIntent::FieldChanged(FieldChange::Checkbox {
                        name: name.clone(),
                        checked: evt.checked(),
                    }));
                },
            }
        },
        FieldInputVm::Radio { value } => {
            let option_value = value.clone();
            rsx! {
                input {
                    r#type: "radio",
                    id: "{dom_id}",
                    name: "{name_attr}",
                    class: "{field.input_class}",
                    value: "{value}",
                    checked: field.checked,
                    required: field.required,
                    aria_required: field.aria_required(),
                    aria_invalid: field.aria_invalid(),
                    onchange: move |_| {
                        on_event.call(FormIntent::FieldChanged(FieldChange::Radio {
                            name: name.clone(),
                            value: option_value.clone(),
                        }));
                    },
                }
            }
        }
    };

    let is_toggle = matches!(
        field.input,
        FieldInputVm::Checkbox { .. } | FieldInputVm::Radio { .. }
    );
    let label_text = match (&field.label, &field.input) {
        (Some(label), _) => Some(label.clone()),
        (None, FieldInputVm::Radio { value }) => Some(value.clone()),
        (None, _) => None,
    };

    rsx! {
        div {
            class: "form-field",
            "data-multistep-form": "{markers.field_wrapper}",
            if is_toggle {
                {control}
                if let Some(text) = label_text {
                    label { r#for: "{dom_id}", "{text}" }
                }
            } else {
                if let Some(text) = label_text {
                    label { r#for: "{dom_id}", "{text}" }
                }
                {control}
            }
            if let Some(error) = field.error_text.clone() {
                span {
                    class: "form-field-error",
                    "data-multistep-form": "{markers.field_error}",
                    role: "alert",
                    "{error}"
                }
            }
        }
    }
}
