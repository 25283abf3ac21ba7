//! Shared error types for the services crate.

use thiserror::Error;

use form_core::model::{FieldChangeError, FormDefinitionError};

use crate::presentation::PresentationError;

/// Errors raised by the form controller and its wiring.
///
/// Storage failures never appear here: `PersistenceManager` logs them and
/// treats the record as absent.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FormError {
    #[error(transparent)]
    Definition(#[from] FormDefinitionError),
    #[error(transparent)]
    FieldChange(#[from] FieldChangeError),
    #[error(transparent)]
    Presentation(#[from] PresentationError),
    #[error("form runtime has stopped")]
    Stopped,
}
