use serde::{Deserialize, Serialize};

/// How long an announcement stays on screen, in ticks.
pub const OVERLAY_SECS: u64 = 3;

/// Narrated cue tied to a countdown threshold.
///
/// Announcements are cosmetic: they never change the authoritative
/// countdown of the phase they are shown over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Announcement {
    /// Played when a session starts, over the initial countdown.
    RoundOneStartsSoon,
    /// Breathe phase of round 2 and later has begun.
    BreatheGently,
    GetReadyToHold,
    GetReadyToBreathe,
    /// Replaces `GetReadyToBreathe` at the end of the last hold.
    FinalRoundClosing,
}

impl Announcement {
    pub fn message(self) -> &'static str {
        match self {
            Announcement::RoundOneStartsSoon => "Round 1 starts soon.",
            Announcement::BreatheGently => "Breathe gently. The round has begun.",
            Announcement::GetReadyToHold => "Get ready to hold.",
            Announcement::GetReadyToBreathe => "Get ready to breathe.",
            Announcement::FinalRoundClosing => "The final round is closing.",
        }
    }

    /// Stable identifier, also used to name audio cues.
    pub fn key(self) -> &'static str {
        match self {
            Announcement::RoundOneStartsSoon => "round-one-starts-soon",
            Announcement::BreatheGently => "breathe-gently",
            Announcement::GetReadyToHold => "get-ready-to-hold",
            Announcement::GetReadyToBreathe => "get-ready-to-breathe",
            Announcement::FinalRoundClosing => "final-round-closing",
        }
    }

    /// Whether the overlay shows its own 3-2-1 counter.
    pub fn shows_countdown(self) -> bool {
        !matches!(self, Announcement::BreatheGently)
    }
}

impl std::fmt::Display for Announcement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A visible announcement and the ticks left before it hides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub announcement: Announcement,
    pub remaining_secs: u64,
}

impl Overlay {
    pub fn new(announcement: Announcement) -> Self {
        Self {
            announcement,
            remaining_secs: OVERLAY_SECS,
        }
    }

    /// Advance one second. Returns `None` once the window has elapsed.
    pub fn tick(self) -> Option<Self> {
        let remaining_secs = self.remaining_secs.saturating_sub(1);
        (remaining_secs > 0).then_some(Self {
            remaining_secs,
            ..self
        })
    }
}
