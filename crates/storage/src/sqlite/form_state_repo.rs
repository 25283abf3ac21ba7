use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{FormStateRepository, StorageError};
use form_core::model::PersistedState;

use super::SqliteRepository;

#[async_trait]
impl FormStateRepository for SqliteRepository {
    async fn load_state(&self, key: &str) -> Result<Option<PersistedState>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT payload
            FROM form_states
            WHERE storage_key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row
            .try_get("payload")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        PersistedState::from_json(&payload)
            .map(Some)
            .map_err(StorageError::from)
    }

    async fn save_state(&self, key: &str, state: &PersistedState) -> Result<(), StorageError> {
        let payload = state.to_json()?;
        sqlx::query(
            r"
            INSERT INTO form_states (storage_key, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(storage_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn delete_state(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM form_states WHERE storage_key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
