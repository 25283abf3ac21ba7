#![forbid(unsafe_code)]

pub mod controller;
pub mod error;
pub mod history;
pub mod persistence;
pub mod presentation;
pub mod runtime;
pub mod sequencer;
pub mod timers;

pub use form_core::Clock;

pub use controller::{FormController, FormEvent, Outcome};
pub use error::FormError;
pub use history::{HistoryEntry, InMemoryHistory, NavigationHistory, NoHistory};
pub use persistence::PersistenceManager;
pub use presentation::{
    ERROR_BANNER_TEXT, FocusTarget, FormSnapshot, PresentationAdapter, PresenterState,
    RecordingPresenter, WatchPresenter,
};
pub use runtime::{FormHandle, FormRuntime};
pub use sequencer::{Direction, HistoryMode, MoveOutcome, RejectReason, Sequencer};
pub use timers::TimerPurpose;
