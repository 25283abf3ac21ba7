//! Entry point for everything the host feeds into a form: clicks, edits, history
//! pops, page exit and the passage of time.

use form_core::model::{FieldChange, FieldValues, FormDefinition, RestorePolicy, Timing};
use tracing::{debug, error, info};

use crate::error::FormError;
use crate::history::{HistoryEntry, NavigationHistory};
use crate::persistence::PersistenceManager;
use crate::presentation::{ERROR_BANNER_TEXT, FormSnapshot, PresentationAdapter};
use crate::sequencer::{
    Direction, Effect, HistoryMode, MoveOutcome, RejectReason, Sequencer, SubmitOutcome,
    ValidationTrigger,
};
use crate::timers::{TimerPurpose, TimerSet};

/// Something the host reports to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Next,
    Prev,
    FieldChanged(FieldChange),
    Submit,
    /// A history entry was popped; `None` is the initial page state.
    HistoryPopped(Option<HistoryEntry>),
    PageExit,
}

/// Result of one entry point call. Failures have already been reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored,
    Rejected(RejectReason),
    Submitted(FieldValues),
    Failed,
}

impl From<MoveOutcome> for Outcome {
    fn from(outcome: MoveOutcome) -> Self {
        match outcome {
            MoveOutcome::Started { .. } | MoveOutcome::EnteringLoading { .. } => Outcome::Applied,
            MoveOutcome::Rejected(RejectReason::Busy) => Outcome::Ignored,
            MoveOutcome::Rejected(reason) => Outcome::Rejected(reason),
        }
    }
}

/// Owns one form session and wires the sequencer to timers, storage, rendering and history.
///
/// Time is a monotonic millisecond count supplied by the caller.
pub struct FormController<P, H> {
    sequencer: Sequencer,
    timers: TimerSet,
    timing: Timing,
    persistence: PersistenceManager,
    presenter: P,
    history: H,
}

impl<P, H> FormController<P, H>
where
    P: PresentationAdapter,
    H: NavigationHistory,
{
    /// Build the form, render it and apply any stored in-progress state.
    ///
    /// # Errors
    ///
    /// Returns `FormError` if the definition does not produce a form or the first
    /// render fails. The error banner has been shown in both cases.
    pub async fn start(
        definition: &FormDefinition,
        persistence: PersistenceManager,
        mut presenter: P,
        history: H,
        now_ms: u64,
    ) -> Result<Self, FormError> {
        let form = match definition.build() {
            Ok(form) => form,
            Err(err) => {
                error!(error = %err, "form initialization failed");
                presenter.show_error_banner(ERROR_BANNER_TEXT);
                return Err(err.into());
            }
        };

        let config = &definition.config;
        let mut controller = Self {
            sequencer: Sequencer::new(form, config.timing),
            timers: TimerSet::new(),
            timing: config.timing,
            persistence,
            presenter,
            history,
        };

        if let Err(err) = controller.presenter.render(&controller.sequencer.snapshot()) {
            error!(error = %err, "initial render failed");
            controller.presenter.show_error_banner(ERROR_BANNER_TEXT);
            return Err(err.into());
        }

        controller.restore(config.restore_policy, now_ms).await;
        info!(
            steps = controller.sequencer.form().len(),
            key = controller.persistence.key(),
            "form started"
        );
        Ok(controller)
    }

    #[must_use]
    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    #[must_use]
    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    #[must_use]
    pub fn snapshot(&self) -> FormSnapshot {
        self.sequencer.snapshot()
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.sequencer.is_submitted()
    }

    /// Earliest pending timer, in the caller's milliseconds.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn is_pending(&self, purpose: TimerPurpose) -> bool {
        self.timers.is_pending(purpose)
    }

    /// Handle one event, then fire any timers already due at `now_ms`.
    pub async fn dispatch(&mut self, event: FormEvent, now_ms: u64) -> Outcome {
        debug!(?event, now_ms, "form event");
        let result = match self.handle(event, now_ms).await {
            Ok(outcome) => self.fire_due(now_ms).await.map(|()| outcome),
            Err(err) => Err(err),
        };
        self.boundary(result)
    }

    /// Fire every timer due at `now_ms`, including ones scheduled by earlier timers.
    pub async fn advance_time(&mut self, now_ms: u64) -> Outcome {
        let result = self.fire_due(now_ms).await.map(|()| Outcome::Applied);
        self.boundary(result)
    }

    fn boundary(&mut self, result: Result<Outcome, FormError>) -> Outcome {
        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, step = self.sequencer.current(), "form event failed");
                self.presenter.show_error_banner(ERROR_BANNER_TEXT);
                Outcome::Failed
            }
        }
    }

    async fn restore(&mut self, policy: RestorePolicy, now_ms: u64) {
        let Some(state) = self.persistence.restore().await else {
            return;
        };
        let applied = self.sequencer.restore_values(&state.data);
        debug!(applied, step = ?state.step, "restoring form state");
        if let Some(stored) = state.step {
            let target = self.sequencer.restore_target(stored, policy);
            let outcome = self.sequencer.go_to_index(target, HistoryMode::Suppress);
            debug!(?outcome, target, "restored step");
        }
        let result = match self.apply_effects(now_ms) {
            Ok(()) => self.fire_due(now_ms).await,
            Err(err) => Err(err),
        };
        let _ = self.boundary(result.map(|()| Outcome::Applied));
    }

    async fn handle(&mut self, event: FormEvent, now_ms: u64) -> Result<Outcome, FormError> {
        let outcome = match event {
            FormEvent::Next => self.sequencer.request_move(Direction::Forward).into(),
            FormEvent::Prev => self.sequencer.request_move(Direction::Backward).into(),
            FormEvent::FieldChanged(change) => self.field_changed(&change, now_ms)?,
            FormEvent::Submit => self.submit().await,
            FormEvent::HistoryPopped(None) => Outcome::Ignored,
            FormEvent::HistoryPopped(Some(entry)) => self
                .sequencer
                .go_to_index(entry.step, HistoryMode::Suppress)
                .into(),
            FormEvent::PageExit => self.page_exit().await,
        };
        self.apply_effects(now_ms)?;
        Ok(outcome)
    }

    fn field_changed(&mut self, change: &FieldChange, now_ms: u64) -> Result<Outcome, FormError> {
        if self.sequencer.is_submitted() {
            return Ok(Outcome::Ignored);
        }
        let applied = self.sequencer.apply_change(change)?;
        self.timers.schedule(
            TimerPurpose::ValidationDebounce,
            now_ms,
            self.timing.validation_debounce_ms,
        );
        self.timers
            .schedule(TimerPurpose::SaveDebounce, now_ms, self.timing.save_debounce_ms);
        if self.sequencer.triggers_auto_advance(&applied) {
            self.timers.schedule(
                TimerPurpose::AutoAdvance,
                now_ms,
                self.timing.auto_advance_delay_ms,
            );
        }
        Ok(Outcome::Applied)
    }

    async fn submit(&mut self) -> Outcome {
        match self.sequencer.submit() {
            SubmitOutcome::Submitted(values) => {
                self.timers.clear();
                self.persistence.clear().await;
                info!(fields = values.len(), "form submitted");
                Outcome::Submitted(values)
            }
            SubmitOutcome::Navigation(outcome) => outcome.into(),
        }
    }

    async fn page_exit(&mut self) -> Outcome {
        if self.sequencer.is_submitted() {
            return Outcome::Ignored;
        }
        self.timers.cancel(TimerPurpose::SaveDebounce);
        self.save().await;
        Outcome::Applied
    }

    async fn save(&mut self) {
        let values = self.sequencer.form().values();
        self.persistence.save(values, self.sequencer.current()).await;
    }

    async fn fire_due(&mut self, now_ms: u64) -> Result<(), FormError> {
        while let Some((purpose, due_ms)) = self.timers.pop_due(now_ms) {
            match purpose {
                TimerPurpose::Transition => self.sequencer.on_transition_elapsed(),
                TimerPurpose::LoadingDwell => {
                    let outcome = self.sequencer.on_loading_dwell_elapsed();
                    debug!(?outcome, "loading dwell elapsed");
                }
                TimerPurpose::AutoAdvance => {
                    let outcome = self.sequencer.on_auto_advance_elapsed();
                    debug!(?outcome, "auto-advance fired");
                }
                TimerPurpose::ValidationDebounce => {
                    self.sequencer.validate_current(ValidationTrigger::Input);
                }
                TimerPurpose::SaveDebounce => {
                    if !self.sequencer.is_submitted() {
                        self.save().await;
                    }
                }
            }
            self.apply_effects(due_ms)?;
        }
        Ok(())
    }

    /// Turn sequencer effects into timers, history entries and presenter calls.
    ///
    /// Timers and history are applied before the presenter so a failed render
    /// cannot strand an in-flight transition.
    fn apply_effects(&mut self, base_ms: u64) -> Result<(), FormError> {
        let effects = self.sequencer.take_effects();
        if effects.is_empty() {
            return Ok(());
        }

        for effect in &effects {
            match effect {
                Effect::Schedule { purpose, delay_ms } => {
                    self.timers.schedule(*purpose, base_ms, *delay_ms);
                }
                Effect::Cancel(purpose) => {
                    self.timers.cancel(*purpose);
                }
                Effect::PushHistory(entry) => self.history.push(*entry),
                Effect::Render | Effect::Announce(_) | Effect::Focus(_) => {}
            }
        }

        if effects.iter().any(|e| matches!(e, Effect::Render)) {
            self.presenter.render(&self.sequencer.snapshot())?;
        }
        for effect in effects {
            match effect {
                Effect::Announce(message) => self.presenter.announce(&message)?,
                Effect::Focus(target) => self.presenter.focus(target)?,
                _ => {}
            }
        }
        Ok(())
    }
}
