//! Immutable snapshots of the session and the contract adapters render them through.

use form_core::model::{ControlId, ControlKind, FieldName};
use thiserror::Error;
use tokio::sync::watch;

/// Inline banner text shown when the form hits an unrecoverable error.
pub const ERROR_BANNER_TEXT: &str = "An error occurred. Please try again or refresh the page.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PresentationError {
    #[error("presentation target is gone")]
    Closed,
    #[error("presentation failed: {0}")]
    Failed(String),
}

/// Where focus moves after a step commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Control(ControlId),
    /// The step container itself, for steps without a focusable control.
    Step(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSnapshot {
    pub id: ControlId,
    pub name: FieldName,
    pub label: Option<String>,
    pub kind: ControlKind,
    pub required: bool,
    pub value: String,
    pub checked: bool,
    pub invalid: bool,
    /// Visible error text; `None` while the field is not marked invalid.
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSnapshot {
    pub index: usize,
    pub heading: String,
    pub is_loading: bool,
    pub is_auto_advance: bool,
    pub controls: Vec<ControlSnapshot>,
}

/// Everything an adapter needs to render the form after a committed change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormSnapshot {
    pub current_index: usize,
    pub step_count: usize,
    /// Position among non-loading steps, zero-based.
    pub real_index: usize,
    pub real_count: usize,
    pub steps: Vec<StepSnapshot>,
    pub transitioning: bool,
    pub submitted: bool,
}

impl FormSnapshot {
    #[must_use]
    pub fn current_step(&self) -> Option<&StepSnapshot> {
        self.steps.get(self.current_index)
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.step_count
    }

    #[must_use]
    pub fn has_invalid_fields(&self) -> bool {
        self.steps
            .iter()
            .flat_map(|s| s.controls.iter())
            .any(|c| c.invalid)
    }
}

/// Rendering side of the form. Implementations must tolerate missing optional
/// elements; only a gone target is reported as an error.
pub trait PresentationAdapter: Send {
    /// # Errors
    ///
    /// Returns `PresentationError` if the snapshot cannot be delivered.
    fn render(&mut self, snapshot: &FormSnapshot) -> Result<(), PresentationError>;

    /// Replace the live-region text.
    ///
    /// # Errors
    ///
    /// Returns `PresentationError` if the announcement cannot be delivered.
    fn announce(&mut self, message: &str) -> Result<(), PresentationError>;

    /// # Errors
    ///
    /// Returns `PresentationError` if focus cannot be moved.
    fn focus(&mut self, target: FocusTarget) -> Result<(), PresentationError>;

    /// Show the inline error banner. Never fails; this is the last resort.
    fn show_error_banner(&mut self, message: &str);
}

/// Latest presentation state, published as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PresenterState {
    pub snapshot: FormSnapshot,
    pub announcement: Option<String>,
    pub focus: Option<FocusTarget>,
    /// Bumped on every focus request, so repeated requests for one target are visible.
    pub focus_revision: u64,
    pub error_banner: Option<String>,
}

/// Adapter that publishes `PresenterState` on a `watch` channel for a UI to observe.
#[derive(Debug)]
pub struct WatchPresenter {
    tx: watch::Sender<PresenterState>,
}

impl WatchPresenter {
    #[must_use]
    pub fn channel() -> (Self, watch::Receiver<PresenterState>) {
        let (tx, rx) = watch::channel(PresenterState::default());
        (Self { tx }, rx)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PresenterState> {
        self.tx.subscribe()
    }

    fn update(&self, apply: impl FnOnce(&mut PresenterState)) -> Result<(), PresentationError> {
        if self.tx.is_closed() {
            return Err(PresentationError::Closed);
        }
        self.tx.send_modify(apply);
        Ok(())
    }
}

impl PresentationAdapter for WatchPresenter {
    fn render(&mut self, snapshot: &FormSnapshot) -> Result<(), PresentationError> {
        let snapshot = snapshot.clone();
        self.update(|state| state.snapshot = snapshot)
    }

    fn announce(&mut self, message: &str) -> Result<(), PresentationError> {
        let message = message.to_owned();
        self.update(|state| state.announcement = Some(message))
    }

    fn focus(&mut self, target: FocusTarget) -> Result<(), PresentationError> {
        self.update(|state| {
            state.focus = Some(target);
            state.focus_revision += 1;
        })
    }

    fn show_error_banner(&mut self, message: &str) {
        let message = message.to_owned();
        self.tx
            .send_modify(|state| state.error_banner = Some(message));
    }
}

/// Adapter that records every call, for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    pub renders: Vec<FormSnapshot>,
    pub announcements: Vec<String>,
    pub focus: Vec<FocusTarget>,
    pub banners: Vec<String>,
}

impl RecordingPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last_snapshot(&self) -> Option<&FormSnapshot> {
        self.renders.last()
    }
}

impl PresentationAdapter for RecordingPresenter {
    fn render(&mut self, snapshot: &FormSnapshot) -> Result<(), PresentationError> {
        self.renders.push(snapshot.clone());
        Ok(())
    }

    fn announce(&mut self, message: &str) -> Result<(), PresentationError> {
        self.announcements.push(message.to_owned());
        Ok(())
    }

    fn focus(&mut self, target: FocusTarget) -> Result<(), PresentationError> {
        self.focus.push(target);
        Ok(())
    }

    fn show_error_banner(&mut self, message: &str) {
        self.banners.push(message.to_owned());
    }
}
