//! Sequencer configuration.
//!
//! Fixed at construction. The two dwell times are separate constants even
//! though they currently share a value; nothing couples them.

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Maximum length of a converter label.
pub const LABEL_CAPACITY: usize = 32;

/// Fixed-capacity converter label (device-tree style node label).
pub type Label = heapless::String<LABEL_CAPACITY>;

/// Node label of the primary (host) converter.
pub const PRIMARY_LABEL: &str = "cp9314";
/// Node label of the optional secondary converter.
pub const SECONDARY_LABEL: &str = "cp9314_dev2";

/// How long the converters are held enabled each cycle.
pub const ENABLED_DWELL_MS: u32 = 10_000;
/// How long the converters are held disabled each cycle.
pub const DISABLED_DWELL_MS: u32 = 10_000;

/// Build a [`Label`], rejecting strings that do not fit.
pub fn label(s: &str) -> Result<Label, ConfigError> {
    let mut l = Label::new();
    l.push_str(s)
        .map_err(|()| ConfigError::ValidationFailed("label longer than 32 bytes"))?;
    Ok(l)
}

/// Sequencer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Registry label of the converter that must exist.
    pub primary_label: Label,
    /// Registry label of the converter that may exist.
    pub secondary_label: Label,
    /// Hold time in the enabled phase (milliseconds).
    pub enabled_dwell_ms: u32,
    /// Hold time in the disabled phase (milliseconds).
    pub disabled_dwell_ms: u32,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        let mut primary_label = Label::new();
        let _ = primary_label.push_str(PRIMARY_LABEL);
        let mut secondary_label = Label::new();
        let _ = secondary_label.push_str(SECONDARY_LABEL);
        Self {
            primary_label,
            secondary_label,
            enabled_dwell_ms: ENABLED_DWELL_MS,
            disabled_dwell_ms: DISABLED_DWELL_MS,
        }
    }
}

impl SequencerConfig {
    /// Reject configurations the sequencer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.primary_label.is_empty() {
            return Err(ConfigError::ValidationFailed("primary label is empty"));
        }
        if self.secondary_label.is_empty() {
            return Err(ConfigError::ValidationFailed("secondary label is empty"));
        }
        if self.primary_label == self.secondary_label {
            return Err(ConfigError::ValidationFailed(
                "primary and secondary labels are identical",
            ));
        }
        if self.enabled_dwell_ms == 0 {
            return Err(ConfigError::ValidationFailed("enabled dwell is zero"));
        }
        if self.disabled_dwell_ms == 0 {
            return Err(ConfigError::ValidationFailed("disabled dwell is zero"));
        }
        Ok(())
    }

    pub fn enabled_dwell(&self) -> Duration {
        Duration::from_millis(u64::from(self.enabled_dwell_ms))
    }

    pub fn disabled_dwell(&self) -> Duration {
        Duration::from_millis(u64::from(self.disabled_dwell_ms))
    }
}

/// Why a [`SequencerConfig`] was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed validation; the message names it.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::error::Error for ConfigError {}
