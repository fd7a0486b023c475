mod announcement;
mod engine;
mod schedule;

pub use announcement::{Announcement, Overlay, OVERLAY_SECS};
pub use engine::{
    Phase, SessionState, SessionSummary, SessionTimer, TimerOptions, ANNOUNCE_AT_SECS,
    COUNTDOWN_SECS,
};
pub use schedule::{generate, Round, RoundPlan, SessionConfig, MIN_BREATHE_SECS};
