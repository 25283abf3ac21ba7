//! Step navigation state machine.
//!
//! The sequencer never sleeps or touches the rendering layer. Every decision is
//! recorded as an `Effect`; the controller turns effects into timers, renders,
//! announcements, focus moves and history entries.

use form_core::model::{
    AppliedChange, FieldChange, FieldChangeError, FieldValues, Form, RestorePolicy, Timing,
};
use form_core::validation::{FieldErrors, validate_step};
use tracing::debug;

use crate::history::HistoryEntry;
use crate::presentation::{ControlSnapshot, FocusTarget, FormSnapshot, StepSnapshot};
use crate::timers::TimerPurpose;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Whether a committed move records a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Push,
    Suppress,
}

/// Why validation runs; decides whether failing fields become visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationTrigger {
    /// Explicit forward attempt: raises the attempted flag for the current step.
    Advance,
    /// Debounced input: visible only if an attempt was already made on this step.
    Input,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Schedule { purpose: TimerPurpose, delay_ms: u64 },
    Cancel(TimerPurpose),
    Render,
    Announce(String),
    Focus(FocusTarget),
    PushHistory(HistoryEntry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    OutOfRange,
    /// Backward scan found only loading steps.
    NoEarlierStep,
    Invalid,
    Busy,
    Submitted,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Started { target: usize },
    EnteringLoading { target: usize },
    Rejected(RejectReason),
}

impl MoveOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, MoveOutcome::Rejected(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(FieldValues),
    /// Submit on an earlier step acts as a forward request.
    Navigation(MoveOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    FadingOut { target: usize, mode: HistoryMode },
    FadingIn,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    form: Form,
    timing: Timing,
    current: usize,
    attempted_on: Option<usize>,
    errors: FieldErrors,
    phase: Phase,
    submitted: bool,
    effects: Vec<Effect>,
}

impl Sequencer {
    #[must_use]
    pub fn new(form: Form, timing: Timing) -> Self {
        Self {
            form,
            timing,
            current: 0,
            attempted_on: None,
            errors: FieldErrors::new(),
            phase: Phase::Idle,
            submitted: false,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.phase != Phase::Idle
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// True once a forward attempt was made on the current step and has not yet succeeded.
    #[must_use]
    pub fn has_attempted_advance(&self) -> bool {
        self.attempted_on == Some(self.current)
    }

    /// Drain the effects recorded since the last call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Move one step in `direction`.
    ///
    /// Forward moves validate the current step with visible errors first.
    /// Backward moves skip over loading steps.
    pub fn request_move(&mut self, direction: Direction) -> MoveOutcome {
        if let Some(reason) = self.blocked() {
            return MoveOutcome::Rejected(reason);
        }
        match direction {
            Direction::Forward => {
                let target = self.current + 1;
                if target > self.form.last_index() {
                    return MoveOutcome::Rejected(RejectReason::OutOfRange);
                }
                if !self.validate_current(ValidationTrigger::Advance) {
                    debug!(step = self.current, "forward move rejected by validation");
                    return MoveOutcome::Rejected(RejectReason::Invalid);
                }
                self.attempted_on = None;
                self.begin(target, HistoryMode::Push)
            }
            Direction::Backward => {
                if self.current == 0 {
                    return MoveOutcome::Rejected(RejectReason::OutOfRange);
                }
                let Some(target) = (0..self.current)
                    .rev()
                    .find(|i| !self.form.is_loading(*i))
                else {
                    debug!(step = self.current, "no earlier non-loading step");
                    return MoveOutcome::Rejected(RejectReason::NoEarlierStep);
                };
                self.begin(target, HistoryMode::Push)
            }
        }
    }

    /// Jump to `index`, used by restore and history pops.
    ///
    /// A forward jump requires the current step to validate; errors stay silent
    /// unless an advance was already attempted on it.
    pub fn go_to_index(&mut self, index: usize, mode: HistoryMode) -> MoveOutcome {
        if let Some(reason) = self.blocked() {
            return MoveOutcome::Rejected(reason);
        }
        if index > self.form.last_index() {
            return MoveOutcome::Rejected(RejectReason::OutOfRange);
        }
        if index == self.current {
            return MoveOutcome::Rejected(RejectReason::Unchanged);
        }
        if index > self.current && !self.validate_current(ValidationTrigger::Input) {
            debug!(from = self.current, to = index, "jump rejected by validation");
            return MoveOutcome::Rejected(RejectReason::Invalid);
        }
        self.begin(index, mode)
    }

    /// Step index to restore to under `policy`, given the stored index.
    #[must_use]
    pub fn restore_target(&self, stored: usize, policy: RestorePolicy) -> usize {
        match policy {
            RestorePolicy::TrustStored => stored,
            RestorePolicy::StopAtFirstIncomplete => (0..stored.min(self.form.len()))
                .find(|i| {
                    self.form
                        .step(*i)
                        .is_some_and(|s| !s.is_loading() && !validate_step(s).is_valid())
                })
                .unwrap_or(stored),
        }
    }

    /// Validate the current step and update visible field errors.
    ///
    /// Returns whether every required field of the step is satisfied.
    pub fn validate_current(&mut self, trigger: ValidationTrigger) -> bool {
        if matches!(
            trigger,
            ValidationTrigger::Advance | ValidationTrigger::Submit
        ) {
            self.attempted_on = Some(self.current);
        }
        let visible = self.has_attempted_advance();
        let Some(step) = self.form.step(self.current) else {
            return false;
        };
        let validation = validate_step(step);
        let changes = self.errors.apply(&validation, visible);
        if !changes.is_empty() {
            self.effects.push(Effect::Render);
        }

        let announced = match trigger {
            ValidationTrigger::Input => changes
                .shown
                .first()
                .and_then(|name| self.errors.message(name))
                .map(str::to_owned),
            ValidationTrigger::Advance | ValidationTrigger::Submit => {
                validation.failing().next().map(|check| check.message.clone())
            }
        };
        if let Some(message) = announced {
            self.effects.push(Effect::Announce(message));
        }
        validation.is_valid()
    }

    /// Apply a user edit to the live form.
    ///
    /// # Errors
    ///
    /// Returns `FieldChangeError` when the change matches no control.
    pub fn apply_change(&mut self, change: &FieldChange) -> Result<AppliedChange, FieldChangeError> {
        let applied = self.form.apply_change(change)?;
        self.effects.push(Effect::Render);
        Ok(applied)
    }

    /// Seed field values from a persisted record.
    pub fn restore_values(&mut self, values: &FieldValues) -> usize {
        let applied = self.form.restore_values(values);
        if applied > 0 {
            self.effects.push(Effect::Render);
        }
        applied
    }

    /// Whether `applied` should schedule an automatic forward move.
    #[must_use]
    pub fn triggers_auto_advance(&self, applied: &AppliedChange) -> bool {
        applied.radio_checked
            && applied.step == self.current
            && !self.submitted
            && self
                .form
                .step(self.current)
                .is_some_and(|s| s.is_auto_advance() && !s.is_loading())
    }

    pub fn on_auto_advance_elapsed(&mut self) -> MoveOutcome {
        let still_auto = self
            .form
            .step(self.current)
            .is_some_and(|s| s.is_auto_advance());
        if !still_auto {
            return MoveOutcome::Rejected(RejectReason::Unchanged);
        }
        self.request_move(Direction::Forward)
    }

    /// Advance the in-flight transition: commit after fade-out, settle after fade-in.
    pub fn on_transition_elapsed(&mut self) {
        match self.phase {
            Phase::Idle => {}
            Phase::FadingOut { target, mode } => {
                self.commit(target, mode);
                self.phase = Phase::FadingIn;
                self.effects.push(Effect::Schedule {
                    purpose: TimerPurpose::Transition,
                    delay_ms: self.timing.fade_in_ms,
                });
            }
            Phase::FadingIn => {
                self.phase = Phase::Idle;
                self.effects.push(Effect::Render);
            }
        }
    }

    /// Leave a loading step once its dwell has elapsed.
    ///
    /// A following loading step repeats the protocol; a trailing loading step stays put.
    pub fn on_loading_dwell_elapsed(&mut self) -> MoveOutcome {
        if self.submitted || !self.form.is_loading(self.current) {
            return MoveOutcome::Rejected(RejectReason::Unchanged);
        }
        match self.phase {
            Phase::FadingOut { .. } => return MoveOutcome::Rejected(RejectReason::Busy),
            Phase::FadingIn => {
                self.phase = Phase::Idle;
                self.effects.push(Effect::Cancel(TimerPurpose::Transition));
            }
            Phase::Idle => {}
        }
        let following = self.current + 1;
        if following > self.form.last_index() {
            debug!(step = self.current, "trailing loading step, staying");
            return MoveOutcome::Rejected(RejectReason::OutOfRange);
        }
        self.begin(following, HistoryMode::Push)
    }

    /// Submit from the current step.
    ///
    /// On the last step this validates with visible errors and, when valid, ends the
    /// session with the collected values. On earlier steps it behaves as a forward move.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.current != self.form.last_index() {
            return SubmitOutcome::Navigation(self.request_move(Direction::Forward));
        }
        if let Some(reason) = self.blocked() {
            return SubmitOutcome::Navigation(MoveOutcome::Rejected(reason));
        }
        if !self.validate_current(ValidationTrigger::Submit) {
            return SubmitOutcome::Navigation(MoveOutcome::Rejected(RejectReason::Invalid));
        }
        self.attempted_on = None;
        self.submitted = true;
        self.effects.push(Effect::Cancel(TimerPurpose::AutoAdvance));
        self.effects.push(Effect::Render);
        debug!(step = self.current, "form submitted");
        SubmitOutcome::Submitted(self.form.values())
    }

    /// Live-region text for the current step.
    #[must_use]
    pub fn announcement(&self) -> String {
        let heading = self
            .form
            .step(self.current)
            .map(form_core::model::Step::display_heading)
            .unwrap_or_default();
        format!(
            "{heading}. {} of {} steps.",
            self.form.real_position(self.current) + 1,
            self.form.real_step_count()
        )
    }

    #[must_use]
    pub fn snapshot(&self) -> FormSnapshot {
        let steps = self
            .form
            .steps()
            .iter()
            .map(|step| StepSnapshot {
                index: step.index(),
                heading: step.display_heading(),
                is_loading: step.is_loading(),
                is_auto_advance: step.is_auto_advance(),
                controls: step
                    .controls()
                    .iter()
                    .map(|control| {
                        let error_message = self.errors.message(control.name()).map(str::to_owned);
                        ControlSnapshot {
                            id: control.id(),
                            name: control.name().clone(),
                            label: control.label().map(str::to_owned),
                            kind: control.kind().clone(),
                            required: control.is_required(),
                            value: control.value().to_owned(),
                            checked: control.is_checked(),
                            invalid: error_message.is_some(),
                            error_message,
                        }
                    })
                    .collect(),
            })
            .collect();

        FormSnapshot {
            current_index: self.current,
            step_count: self.form.len(),
            real_index: self.form.real_position(self.current),
            real_count: self.form.real_step_count(),
            steps,
            transitioning: self.is_transitioning(),
            submitted: self.submitted,
        }
    }

    fn blocked(&self) -> Option<RejectReason> {
        if self.submitted {
            Some(RejectReason::Submitted)
        } else if self.is_transitioning() {
            Some(RejectReason::Busy)
        } else {
            None
        }
    }

    fn begin(&mut self, target: usize, mode: HistoryMode) -> MoveOutcome {
        debug!(from = self.current, to = target, "transition started");
        self.phase = Phase::FadingOut { target, mode };
        self.effects.push(Effect::Render);
        self.effects.push(Effect::Schedule {
            purpose: TimerPurpose::Transition,
            delay_ms: self.timing.fade_out_ms,
        });
        if self.form.is_loading(target) {
            MoveOutcome::EnteringLoading { target }
        } else {
            MoveOutcome::Started { target }
        }
    }

    fn commit(&mut self, target: usize, mode: HistoryMode) {
        self.current = target;
        self.attempted_on = None;
        self.effects.push(Effect::Cancel(TimerPurpose::AutoAdvance));
        self.effects.push(Effect::Render);

        let Some(step) = self.form.step(target) else {
            return;
        };
        if step.is_loading() {
            self.effects.push(Effect::Schedule {
                purpose: TimerPurpose::LoadingDwell,
                delay_ms: self.timing.loading_delay_ms,
            });
            return;
        }

        let focus = step
            .first_focusable()
            .map_or(FocusTarget::Step(target), |c| FocusTarget::Control(c.id()));
        let announcement = self.announcement();
        self.effects.push(Effect::Announce(announcement));
        self.effects.push(Effect::Focus(focus));
        if mode == HistoryMode::Push {
            self.effects
                .push(Effect::PushHistory(HistoryEntry::new(target)));
        }
    }
}
