use chrono::Duration;
use serde::{Deserialize, Serialize};

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// How a restored step index is applied when the session starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestorePolicy {
    /// Jump to the stored index, validating only the step the session starts on.
    #[default]
    TrustStored,
    /// Stop at the first step before the stored index with unmet required fields.
    StopAtFirstIncomplete,
}

/// Delays driving transitions, auto-advance and debounced work, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub fade_out_ms: u64,
    pub fade_in_ms: u64,
    pub auto_advance_delay_ms: u64,
    pub loading_delay_ms: u64,
    pub validation_debounce_ms: u64,
    pub save_debounce_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            fade_out_ms: 150,
            fade_in_ms: 150,
            auto_advance_delay_ms: 500,
            loading_delay_ms: 2000,
            validation_debounce_ms: 300,
            save_debounce_ms: 500,
        }
    }
}

impl Timing {
    /// All delays zero; transitions commit within the dispatch that started them.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            fade_out_ms: 0,
            fade_in_ms: 0,
            auto_advance_delay_ms: 0,
            loading_delay_ms: 0,
            validation_debounce_ms: 0,
            save_debounce_ms: 0,
        }
    }
}

/// Counter text with `{current}` and `{total}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepCounterTemplate(String);

impl Default for StepCounterTemplate {
    fn default() -> Self {
        Self("Step {current} of {total}".to_owned())
    }
}

impl StepCounterTemplate {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    #[must_use]
    pub fn render(&self, current: usize, total: usize) -> String {
        self.0
            .replace("{current}", &current.to_string())
            .replace("{total}", &total.to_string())
    }
}

/// Behavior knobs for one form instance. Every field is optional when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub timing: Timing,
    pub step_counter_template: StepCounterTemplate,
    pub loading_step_marker: String,
    pub storage_key: String,
    pub expiry_ms: u64,
    pub restore_policy: RestorePolicy,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            timing: Timing::default(),
            step_counter_template: StepCounterTemplate::default(),
            loading_step_marker: "loading-step".to_owned(),
            storage_key: "form-state".to_owned(),
            expiry_ms: DAY_MS,
            restore_policy: RestorePolicy::default(),
        }
    }
}

impl FormConfig {
    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    #[must_use]
    pub fn with_restore_policy(mut self, policy: RestorePolicy) -> Self {
        self.restore_policy = policy;
        self
    }

    #[must_use]
    pub fn expiry(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.expiry_ms).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_widget_timings() {
        let config = FormConfig::default();
        assert_eq!(config.timing.fade_out_ms, 150);
        assert_eq!(config.timing.auto_advance_delay_ms, 500);
        assert_eq!(config.timing.loading_delay_ms, 2000);
        assert_eq!(config.storage_key, "form-state");
        assert_eq!(config.expiry(), Duration::hours(24));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: FormConfig =
            serde_json::from_str(r#"{"timing":{"loading_delay_ms":10},"storage_key":"signup"}"#)
                .unwrap();
        assert_eq!(config.timing.loading_delay_ms, 10);
        assert_eq!(config.timing.fade_in_ms, 150);
        assert_eq!(config.storage_key, "signup");
        assert_eq!(config.restore_policy, RestorePolicy::TrustStored);
    }

    #[test]
    fn counter_template_replaces_placeholders() {
        let template = StepCounterTemplate::default();
        assert_eq!(template.render(2, 5), "Step 2 of 5");
        let custom = StepCounterTemplate::new("{current}/{total}");
        assert_eq!(custom.render(1, 3), "1/3");
    }
}
