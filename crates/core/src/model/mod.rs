mod config;
mod control;
mod definition;
mod form;
mod ids;
mod persisted;
mod step;

pub use config::{FormConfig, RestorePolicy, StepCounterTemplate, Timing};
pub use control::{Control, ControlKind};
pub use definition::{FieldDefinition, FormDefinition, FormDefinitionError, StepDefinition};
pub use form::{AppliedChange, FieldChange, FieldChangeError, FieldValues, Form};
pub use ids::{ControlId, FieldName, FieldNameError};
pub use persisted::{PersistedState, PersistedStateError};
pub use step::Step;
