//! Session configuration validation.
//!
//! Every rule is evaluated so the editor can flag all offending fields at
//! once. The last-round check looks at the raw breathe time and ignores the
//! 10 second floor applied by [`crate::timer::RoundPlan::generate`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::format::parse_duration;
use crate::timer::SessionConfig;

pub const MIN_ROUNDS: i64 = 1;
pub const MAX_ROUNDS: i64 = 10;

/// Editable field of a [`SessionConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigField {
    BreatheSec,
    HoldSec,
    DecreaseSec,
    Rounds,
}

impl ConfigField {
    pub const ALL: [ConfigField; 4] = [
        ConfigField::BreatheSec,
        ConfigField::HoldSec,
        ConfigField::DecreaseSec,
        ConfigField::Rounds,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigField::BreatheSec => "breatheSec",
            ConfigField::HoldSec => "holdSec",
            ConfigField::DecreaseSec => "decreaseSec",
            ConfigField::Rounds => "rounds",
        }
    }

    /// Accepts the serialized name or a short alias (`breathe`, `hold`, ...).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "breatheSec" | "breathe" => Some(ConfigField::BreatheSec),
            "holdSec" | "hold" => Some(ConfigField::HoldSec),
            "decreaseSec" | "decrease" => Some(ConfigField::DecreaseSec),
            "rounds" => Some(ConfigField::Rounds),
            _ => None,
        }
    }

    pub fn get(self, config: &SessionConfig) -> i64 {
        match self {
            ConfigField::BreatheSec => config.breathe_sec,
            ConfigField::HoldSec => config.hold_sec,
            ConfigField::DecreaseSec => config.decrease_sec,
            ConfigField::Rounds => config.rounds,
        }
    }

    pub fn set(self, config: &mut SessionConfig, value: i64) {
        match self {
            ConfigField::BreatheSec => config.breathe_sec = value,
            ConfigField::HoldSec => config.hold_sec = value,
            ConfigField::DecreaseSec => config.decrease_sec = value,
            ConfigField::Rounds => config.rounds = value,
        }
    }

    /// Parse editor input for this field: a duration for the time fields,
    /// an integer for `rounds`.
    pub fn parse_value(self, input: &str) -> Result<i64, ValidationError> {
        match self {
            ConfigField::Rounds => input.trim().parse().map_err(|_| ValidationError::InvalidValue {
                field: self.to_string(),
                message: format!("'{}' is not a whole number", input.trim()),
            }),
            _ => parse_duration(input),
        }
    }
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub errors: BTreeMap<ConfigField, String>,
}

impl ValidationResult {
    pub fn error(&self, field: ConfigField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Convert into a `Result` for callers that propagate with `?`.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.ok {
            Ok(())
        } else {
            Err(ValidationError::Fields(self.errors.into_iter().collect()))
        }
    }
}

pub fn validate(config: &SessionConfig) -> ValidationResult {
    let mut errors = BTreeMap::new();

    if config.breathe_sec < 0 {
        errors.insert(
            ConfigField::BreatheSec,
            "First breath time cannot be negative.".to_string(),
        );
    }
    if config.hold_sec < 0 {
        errors.insert(ConfigField::HoldSec, "Hold time cannot be negative.".to_string());
    }
    if config.decrease_sec < 0 {
        errors.insert(
            ConfigField::DecreaseSec,
            "Decrease seconds cannot be negative.".to_string(),
        );
    }
    if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&config.rounds) {
        errors.insert(
            ConfigField::Rounds,
            "Rounds must be between 1 and 10.".to_string(),
        );
    }

    // Overrides the negative-decrease message when both apply.
    let last_breathe = config
        .breathe_sec
        .saturating_sub(config.rounds.saturating_sub(1).saturating_mul(config.decrease_sec));
    if last_breathe < 0 {
        errors.insert(
            ConfigField::DecreaseSec,
            "Decrease amount is too large, making the last round breath time negative."
                .to_string(),
        );
    }

    ValidationResult {
        ok: errors.is_empty(),
        errors,
    }
}
