use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Announcement, Overlay, Phase, SessionSummary};

/// Every state change of a session produces an Event.
/// Presentation adapters consume them; nothing reads them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        rounds: usize,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        phase: Phase,
        round_index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// One second elapsed without a phase change.
    Tick {
        phase: Phase,
        round_index: usize,
        remaining_secs: u64,
        overlay: Option<Overlay>,
    },
    Announcement {
        kind: Announcement,
        round_index: usize,
        at: DateTime<Utc>,
    },
    Paused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    Resumed {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    Stopped {
        round_index: usize,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        summary: SessionSummary,
        at: DateTime<Utc>,
    },
    CompletionAcknowledged {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        round_index: usize,
        total_rounds: usize,
        remaining_secs: u64,
        is_paused: bool,
        overlay: Option<Overlay>,
        session_progress_pct: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine-readable name, as used in the `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "session_started",
            Event::PhaseChanged { .. } => "phase_changed",
            Event::Tick { .. } => "tick",
            Event::Announcement { .. } => "announcement",
            Event::Paused { .. } => "paused",
            Event::Resumed { .. } => "resumed",
            Event::Stopped { .. } => "stopped",
            Event::SessionCompleted { .. } => "session_completed",
            Event::CompletionAcknowledged { .. } => "completion_acknowledged",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
