use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::FieldValues;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PersistedStateError {
    #[error("persisted form state is not valid JSON: {0}")]
    Malformed(String),
    #[error("persisted form state could not be encoded: {0}")]
    Encode(String),
}

/// Durable snapshot of an in-progress form.
///
/// Serialized as `{ "data": {..}, "step": n, "timestamp": epoch_millis }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub data: FieldValues,
    #[serde(default)]
    pub step: Option<usize>,
    pub timestamp: i64,
}

impl PersistedState {
    #[must_use]
    pub fn new(data: FieldValues, step: usize, saved_at: DateTime<Utc>) -> Self {
        Self {
            data,
            step: Some(step),
            timestamp: saved_at.timestamp_millis(),
        }
    }

    #[must_use]
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp)
    }

    /// A record is expired once strictly more than `expiry` has passed since it was saved.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, expiry: Duration) -> bool {
        now.timestamp_millis().saturating_sub(self.timestamp) > expiry.num_milliseconds()
    }

    /// # Errors
    ///
    /// Returns `PersistedStateError::Encode` if serialization fails.
    pub fn to_json(&self) -> Result<String, PersistedStateError> {
        serde_json::to_string(self).map_err(|err| PersistedStateError::Encode(err.to_string()))
    }

    /// # Errors
    ///
    /// Returns `PersistedStateError::Malformed` for text that is not a valid record.
    pub fn from_json(text: &str) -> Result<Self, PersistedStateError> {
        serde_json::from_str(text).map_err(|err| PersistedStateError::Malformed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn encodes_widget_record_shape() {
        let data = FieldValues::from([("email".to_owned(), "a@b.c".to_owned())]);
        let state = PersistedState::new(data, 2, fixed_now());
        let json: serde_json::Value = serde_json::from_str(&state.to_json().unwrap()).unwrap();
        assert_eq!(json["data"]["email"], "a@b.c");
        assert_eq!(json["step"], 2);
        assert_eq!(json["timestamp"], 1_700_000_000_000_i64);
    }

    #[test]
    fn missing_step_is_tolerated() {
        let state = PersistedState::from_json(r#"{"data":{},"timestamp":5}"#).unwrap();
        assert_eq!(state.step, None);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            PersistedState::from_json("not json"),
            Err(PersistedStateError::Malformed(_))
        ));
        assert!(PersistedState::from_json(r#"{"data":{},"step":-1,"timestamp":5}"#).is_err());
    }

    #[test]
    fn expiry_is_exclusive_of_the_window() {
        let now = fixed_now();
        let state = PersistedState::new(FieldValues::new(), 0, now - Duration::hours(24));
        assert!(!state.is_expired(now, Duration::hours(24)));
        let state = PersistedState::new(FieldValues::new(), 0, now - Duration::hours(25));
        assert!(state.is_expired(now, Duration::hours(24)));
    }
}
