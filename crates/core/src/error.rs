use thiserror::Error;

use crate::model::{FieldChangeError, FieldNameError, FormDefinitionError, PersistedStateError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] FormDefinitionError),
    #[error(transparent)]
    FieldName(#[from] FieldNameError),
    #[error(transparent)]
    FieldChange(#[from] FieldChangeError),
    #[error(transparent)]
    PersistedState(#[from] PersistedStateError),
}
