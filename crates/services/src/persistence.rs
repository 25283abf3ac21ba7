use std::sync::Arc;

use chrono::Duration;
use form_core::Clock;
use form_core::model::{FieldValues, FormConfig, PersistedState};
use storage::repository::FormStateRepository;
use tracing::{debug, warn};

/// Saves and restores the single in-progress record of a form.
///
/// Storage failures never reach the caller: they are logged and treated as
/// "no state".
#[derive(Clone)]
pub struct PersistenceManager {
    repo: Arc<dyn FormStateRepository>,
    key: String,
    expiry: Duration,
    clock: Clock,
}

impl PersistenceManager {
    #[must_use]
    pub fn new(repo: Arc<dyn FormStateRepository>, key: impl Into<String>, expiry: Duration) -> Self {
        Self {
            repo,
            key: key.into(),
            expiry,
            clock: Clock::default(),
        }
    }

    /// Key and expiry taken from `config`.
    #[must_use]
    pub fn from_config(repo: Arc<dyn FormStateRepository>, config: &FormConfig) -> Self {
        Self::new(repo, config.storage_key.clone(), config.expiry())
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Write `values` and `step` stamped with the current time, replacing any record.
    ///
    /// Returns whether the write succeeded.
    pub async fn save(&self, values: FieldValues, step: usize) -> bool {
        let state = PersistedState::new(values, step, self.clock.now());
        match self.repo.save_state(&self.key, &state).await {
            Ok(()) => {
                debug!(key = %self.key, step, "form state saved");
                true
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to save form state");
                false
            }
        }
    }

    /// Read the stored record if present and still inside the expiry window.
    ///
    /// An expired record is deleted.
    pub async fn restore(&self) -> Option<PersistedState> {
        let state = match self.repo.load_state(&self.key).await {
            Ok(Some(state)) => state,
            Ok(None) => return None,
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read form state");
                return None;
            }
        };

        if state.is_expired(self.clock.now(), self.expiry) {
            debug!(key = %self.key, "stored form state expired");
            self.clear().await;
            return None;
        }
        Some(state)
    }

    /// Delete the stored record. Returns whether the delete succeeded.
    pub async fn clear(&self) -> bool {
        match self.repo.delete_state(&self.key).await {
            Ok(()) => true,
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to clear form state");
                false
            }
        }
    }
}
