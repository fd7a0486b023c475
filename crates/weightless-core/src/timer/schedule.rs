use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Breathe phases never go below this many seconds, whatever the decrease.
pub const MIN_BREATHE_SECS: u64 = 10;

/// User-editable session parameters.
///
/// Fields are signed so that out-of-range input survives long enough to be
/// reported by [`crate::validate::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default = "default_breathe_sec")]
    pub breathe_sec: i64,
    #[serde(default = "default_hold_sec")]
    pub hold_sec: i64,
    #[serde(default = "default_decrease_sec")]
    pub decrease_sec: i64,
    #[serde(default = "default_rounds")]
    pub rounds: i64,
    /// Set by the config store on every save.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_breathe_sec() -> i64 {
    120
}
fn default_hold_sec() -> i64 {
    60
}
fn default_decrease_sec() -> i64 {
    10
}
fn default_rounds() -> i64 {
    6
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            breathe_sec: default_breathe_sec(),
            hold_sec: default_hold_sec(),
            decrease_sec: default_decrease_sec(),
            rounds: default_rounds(),
            updated_at: None,
        }
    }
}

impl SessionConfig {
    pub fn new(breathe_sec: i64, hold_sec: i64, decrease_sec: i64, rounds: i64) -> Self {
        Self {
            breathe_sec,
            hold_sec,
            decrease_sec,
            rounds,
            updated_at: None,
        }
    }
}

/// One breathe-then-hold cycle, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub breathe: u64,
    pub hold: u64,
}

impl Round {
    pub fn duration_secs(&self) -> u64 {
        self.breathe.saturating_add(self.hold)
    }
}

/// Ordered per-round durations for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPlan {
    pub rounds: Vec<Round>,
}

impl RoundPlan {
    /// Derive the plan for `config`.
    ///
    /// No validation happens here. Arithmetic saturates, a negative hold
    /// becomes 0 and a non-positive round count yields an empty plan.
    pub fn generate(config: &SessionConfig) -> Self {
        let count = u64::try_from(config.rounds).unwrap_or(0);
        let hold = u64::try_from(config.hold_sec).unwrap_or(0);
        let rounds = (0..count)
            .map(|i| {
                let i = i64::try_from(i).unwrap_or(i64::MAX);
                let raw = config
                    .breathe_sec
                    .saturating_sub(i.saturating_mul(config.decrease_sec));
                let breathe = u64::try_from(raw)
                    .unwrap_or(0)
                    .max(MIN_BREATHE_SECS);
                Round { breathe, hold }
            })
            .collect();
        Self { rounds }
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Round> {
        self.rounds.get(index)
    }

    pub fn first(&self) -> Option<&Round> {
        self.rounds.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Round> {
        self.rounds.iter()
    }

    /// Sum of every breathe and hold phase.
    pub fn total_secs(&self) -> u64 {
        self.rounds.iter().map(Round::duration_secs).sum()
    }

    /// Seconds spent in rounds before (not including) `round_index`.
    pub fn cumulative_secs(&self, round_index: usize) -> u64 {
        self.rounds
            .iter()
            .take(round_index)
            .map(Round::duration_secs)
            .sum()
    }
}

impl<'a> IntoIterator for &'a RoundPlan {
    type Item = &'a Round;
    type IntoIter = std::slice::Iter<'a, Round>;

    fn into_iter(self) -> Self::IntoIter {
        self.rounds.iter()
    }
}

/// Derive the per-round plan for `config`. See [`RoundPlan::generate`].
pub fn generate(config: &SessionConfig) -> RoundPlan {
    RoundPlan::generate(config)
}
