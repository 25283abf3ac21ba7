use std::sync::Arc;

use form_core::model::StepCounterTemplate;
use services::{FormHandle, PresenterState};
use tokio::sync::watch;

use crate::vm::Markers;

pub trait UiApp: Send + Sync {
    fn title(&self) -> String;
    fn counter_template(&self) -> StepCounterTemplate;
    fn markers(&self) -> Markers;

    fn form_handle(&self) -> FormHandle;
    fn presenter_state(&self) -> watch::Receiver<PresenterState>;
}

#[derive(Clone)]
pub struct AppContext {
    title: String,
    counter_template: StepCounterTemplate,
    markers: Markers,

    form_handle: FormHandle,
    presenter_state: watch::Receiver<PresenterState>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            title: app.title(),
            counter_template: app.counter_template(),
            markers: app.markers(),
            form_handle: app.form_handle(),
            presenter_state: app.presenter_state(),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn counter_template(&self) -> &StepCounterTemplate {
        &self.counter_template
    }

    #[must_use]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Sender into the running form. Every clone keeps the form alive.
    #[must_use]
    pub fn form_handle(&self) -> FormHandle {
        self.form_handle.clone()
    }

    /// A fresh receiver for the latest presenter state.
    #[must_use]
    pub fn presenter_state(&self) -> watch::Receiver<PresenterState> {
        self.presenter_state.clone()
    }
}

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
