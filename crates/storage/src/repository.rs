use async_trait::async_trait;
use form_core::model::{PersistedState, PersistedStateError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<PersistedStateError> for StorageError {
    fn from(err: PersistedStateError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Repository contract for the single in-progress record of a form.
///
/// Each storage key holds at most one record; writing replaces it.
#[async_trait]
pub trait FormStateRepository: Send + Sync {
    /// Fetch the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored payload is corrupt,
    /// or other storage errors.
    async fn load_state(&self, key: &str) -> Result<Option<PersistedState>, StorageError>;

    /// Persist `state` under `key`, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_state(&self, key: &str, state: &PersistedState) -> Result<(), StorageError>;

    /// Remove the record under `key`. Removing a missing record is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn delete_state(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Records are kept as JSON text so corrupt payloads can be exercised.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store raw text under `key`, bypassing encoding.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_raw(&self, key: &str, payload: impl Into<String>) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), payload.into());
        Ok(())
    }

    /// Raw text stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }
}

#[async_trait]
impl FormStateRepository for InMemoryRepository {
    async fn load_state(&self, key: &str) -> Result<Option<PersistedState>, StorageError> {
        let payload = self.raw(key)?;
        payload
            .map(|text| PersistedState::from_json(&text).map_err(StorageError::from))
            .transpose()
    }

    async fn save_state(&self, key: &str, state: &PersistedState) -> Result<(), StorageError> {
        let payload = state.to_json()?;
        self.insert_raw(key, payload)
    }

    async fn delete_state(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub form_states: Arc<dyn FormStateRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let form_states: Arc<dyn FormStateRepository> = Arc::new(InMemoryRepository::new());
        Self { form_states }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_core::model::FieldValues;
    use form_core::time::fixed_now;

    fn sample_state(step: usize) -> PersistedState {
        let data = FieldValues::from([("email".to_owned(), "a@b.c".to_owned())]);
        PersistedState::new(data, step, fixed_now())
    }

    #[tokio::test]
    async fn round_trips_state_per_key() {
        let repo = InMemoryRepository::new();
        repo.save_state("signup", &sample_state(2)).await.unwrap();

        let loaded = repo.load_state("signup").await.unwrap();
        assert_eq!(loaded, Some(sample_state(2)));
        assert_eq!(repo.load_state("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn saving_replaces_previous_record() {
        let repo = InMemoryRepository::new();
        repo.save_state("signup", &sample_state(1)).await.unwrap();
        repo.save_state("signup", &sample_state(3)).await.unwrap();

        let loaded = repo.load_state("signup").await.unwrap().unwrap();
        assert_eq!(loaded.step, Some(3));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = InMemoryRepository::new();
        repo.save_state("signup", &sample_state(1)).await.unwrap();
        repo.delete_state("signup").await.unwrap();
        repo.delete_state("signup").await.unwrap();
        assert_eq!(repo.load_state("signup").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_payload_is_a_serialization_error() {
        let repo = InMemoryRepository::new();
        repo.insert_raw("signup", "{not json").unwrap();
        let err = repo.load_state("signup").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
