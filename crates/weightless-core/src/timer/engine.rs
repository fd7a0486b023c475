//! Session timer engine.
//!
//! The engine is a tick-driven state machine. It owns no thread and reads no
//! clock for its countdowns: the caller invokes `tick()` once per second and
//! forwards the returned events to a presentation adapter.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Countdown -> Breathing -> Holding -> (Transitioning -> Breathing ... | Complete) -> Idle
//! ```
//!
//! Only the first round gets the 3 second countdown. `Complete` stays until
//! the user acknowledges the summary; `stop()` is refused while it is shown.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = SessionTimer::new();
//! timer.start(RoundPlan::generate(&config));
//! // Once per second:
//! for event in timer.tick() { presenter.present(&event); }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::announcement::{Announcement, Overlay};
use super::schedule::{Round, RoundPlan, MIN_BREATHE_SECS};
use crate::events::Event;

/// Length of the countdown before the first breathe phase.
pub const COUNTDOWN_SECS: u64 = 3;

/// Remaining seconds at which the end-of-phase cue plays.
pub const ANNOUNCE_AT_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Countdown,
    Breathing,
    Holding,
    /// Passed through between a hold and the next round's breathe phase.
    Transitioning,
    /// Session finished; waits for `acknowledge_completion()`.
    Complete,
}

impl Phase {
    /// Phases whose countdown advances on `tick()`.
    pub fn is_ticking(self) -> bool {
        matches!(self, Phase::Countdown | Phase::Breathing | Phase::Holding)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    pub current_round_index: usize,
    pub remaining_seconds: u64,
    pub is_paused: bool,
}

impl SessionState {
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            current_round_index: 0,
            remaining_seconds: 0,
            is_paused: false,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::idle()
    }
}

/// What the completion screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub rounds: Vec<Round>,
    pub total_secs: u64,
}

/// Optional behaviour. Older revisions of the app had neither pause nor
/// announcements, so both can be switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerOptions {
    pub announcements: bool,
    pub pause_enabled: bool,
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self {
            announcements: true,
            pause_enabled: true,
        }
    }
}

/// Per-session context, created by `start()` and dropped on stop or
/// acknowledgement.
#[derive(Debug, Clone)]
struct ActiveSession {
    plan: RoundPlan,
    state: SessionState,
    overlay: Option<Overlay>,
    started_at: DateTime<Utc>,
    summary: Option<SessionSummary>,
}

/// Core session engine.
#[derive(Debug, Clone, Default)]
pub struct SessionTimer {
    options: TimerOptions,
    session: Option<ActiveSession>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TimerOptions) -> Self {
        Self {
            options,
            session: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn options(&self) -> TimerOptions {
        self.options
    }

    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map(|s| s.state)
            .unwrap_or_default()
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    pub fn round_index(&self) -> usize {
        self.state().current_round_index
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state().remaining_seconds
    }

    pub fn is_paused(&self) -> bool {
        self.state().is_paused
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.session.as_ref().and_then(|s| s.overlay)
    }

    pub fn plan(&self) -> Option<&RoundPlan> {
        self.session.as_ref().map(|s| &s.plan)
    }

    pub fn total_rounds(&self) -> usize {
        self.plan().map(RoundPlan::len).unwrap_or(0)
    }

    /// Available while the session sits in `Complete`.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.session.as_ref().and_then(|s| s.summary.as_ref())
    }

    /// 0.0 .. 100.0 progress across the whole session.
    pub fn session_progress_pct(&self) -> f64 {
        let Some(session) = self.session.as_ref() else {
            return 0.0;
        };
        let total = session.plan.total_secs();
        if session.state.phase == Phase::Complete {
            return 100.0;
        }
        if total == 0 {
            return 0.0;
        }
        let idx = session.state.current_round_index;
        let remaining = session.state.remaining_seconds;
        let done_in_round = match (session.state.phase, session.plan.get(idx)) {
            (Phase::Breathing, Some(round)) => round.breathe.saturating_sub(remaining),
            (Phase::Holding, Some(round)) => round.duration_secs().saturating_sub(remaining),
            _ => 0,
        };
        let elapsed = session.plan.cumulative_secs(idx) + done_in_round;
        (elapsed as f64 / total as f64 * 100.0).min(100.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let state = self.state();
        Event::StateSnapshot {
            phase: state.phase,
            round_index: state.current_round_index,
            total_rounds: self.total_rounds(),
            remaining_secs: state.remaining_seconds,
            is_paused: state.is_paused,
            overlay: self.overlay(),
            session_progress_pct: self.session_progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a session. Ignored unless idle, or when `plan` has no rounds.
    pub fn start(&mut self, plan: RoundPlan) -> Vec<Event> {
        if self.session.is_some() {
            debug!(phase = ?self.phase(), "start ignored: session already active");
            return Vec::new();
        }
        if plan.is_empty() {
            debug!("start ignored: plan has no rounds");
            return Vec::new();
        }

        let now = Utc::now();
        info!(rounds = plan.len(), total_secs = plan.total_secs(), "session started");
        let mut events = vec![Event::SessionStarted {
            rounds: plan.len(),
            total_secs: plan.total_secs(),
            at: now,
        }];

        let mut session = ActiveSession {
            plan,
            state: SessionState::idle(),
            overlay: None,
            started_at: now,
            summary: None,
        };
        session.set_phase(Phase::Countdown, COUNTDOWN_SECS, &mut events);
        session.announce(Announcement::RoundOneStartsSoon, self.options, &mut events);
        self.session = Some(session);
        events
    }

    /// Advance the running phase by one second.
    pub fn tick(&mut self) -> Vec<Event> {
        let options = self.options;
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if session.state.is_paused || !session.state.phase.is_ticking() {
            return Vec::new();
        }

        let mut events = Vec::new();
        session.overlay = session.overlay.and_then(Overlay::tick);
        session.state.remaining_seconds = session.state.remaining_seconds.saturating_sub(1);
        let remaining = session.state.remaining_seconds;

        match session.state.phase {
            Phase::Countdown if remaining == 0 => session.enter_breathing(options, &mut events),
            Phase::Breathing if remaining == 0 => session.enter_holding(&mut events),
            Phase::Holding if remaining == 0 => session.finish_round(options, &mut events),
            phase => {
                events.push(session.tick_event());
                if remaining == ANNOUNCE_AT_SECS {
                    if let Some(kind) = session.threshold_announcement(phase) {
                        session.announce(kind, options, &mut events);
                    }
                }
            }
        }
        events
    }

    pub fn pause(&mut self) -> Vec<Event> {
        if !self.options.pause_enabled {
            return Vec::new();
        }
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if session.state.is_paused || !session.state.phase.is_ticking() {
            return Vec::new();
        }
        session.state.is_paused = true;
        debug!(phase = ?session.state.phase, remaining = session.state.remaining_seconds, "paused");
        vec![Event::Paused {
            phase: session.state.phase,
            remaining_secs: session.state.remaining_seconds,
            at: Utc::now(),
        }]
    }

    /// Continue a paused phase from its retained remaining time. A cue whose
    /// threshold has already passed is played again.
    pub fn resume(&mut self) -> Vec<Event> {
        let options = self.options;
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if !session.state.is_paused {
            return Vec::new();
        }
        session.state.is_paused = false;
        let phase = session.state.phase;
        let remaining = session.state.remaining_seconds;
        debug!(phase = ?phase, remaining, "resumed");

        let mut events = vec![Event::Resumed {
            phase,
            remaining_secs: remaining,
            at: Utc::now(),
        }];
        if remaining > 0 && remaining <= ANNOUNCE_AT_SECS {
            if let Some(kind) = session.threshold_announcement(phase) {
                session.announce(kind, options, &mut events);
            }
        }
        events
    }

    /// Abandon the session. Refused while the completion summary is pending.
    pub fn stop(&mut self) -> Vec<Event> {
        match self.session.as_ref() {
            None => Vec::new(),
            Some(session) if session.state.phase == Phase::Complete => {
                debug!("stop ignored: completion summary pending");
                Vec::new()
            }
            Some(session) => {
                let round_index = session.state.current_round_index;
                info!(round_index, "session stopped");
                self.session = None;
                vec![Event::Stopped {
                    round_index,
                    at: Utc::now(),
                }]
            }
        }
    }

    pub fn acknowledge_completion(&mut self) -> Vec<Event> {
        match self.session.as_ref() {
            Some(session) if session.state.phase == Phase::Complete => {
                self.session = None;
                debug!("completion acknowledged");
                vec![Event::CompletionAcknowledged { at: Utc::now() }]
            }
            _ => Vec::new(),
        }
    }
}

impl ActiveSession {
    fn set_phase(&mut self, phase: Phase, remaining: u64, events: &mut Vec<Event>) {
        self.state.phase = phase;
        self.state.remaining_seconds = remaining;
        self.overlay = None;
        debug!(
            phase = ?phase,
            round_index = self.state.current_round_index,
            remaining,
            "phase changed"
        );
        events.push(Event::PhaseChanged {
            phase,
            round_index: self.state.current_round_index,
            remaining_secs: remaining,
            at: Utc::now(),
        });
    }

    fn announce(&mut self, kind: Announcement, options: TimerOptions, events: &mut Vec<Event>) {
        if !options.announcements {
            return;
        }
        self.overlay = Some(Overlay::new(kind));
        events.push(Event::Announcement {
            kind,
            round_index: self.state.current_round_index,
            at: Utc::now(),
        });
    }

    /// The cue played `ANNOUNCE_AT_SECS` before `phase` ends.
    fn threshold_announcement(&self, phase: Phase) -> Option<Announcement> {
        match phase {
            Phase::Breathing => Some(Announcement::GetReadyToHold),
            Phase::Holding if self.is_last_round() => Some(Announcement::FinalRoundClosing),
            Phase::Holding => Some(Announcement::GetReadyToBreathe),
            _ => None,
        }
    }

    fn is_last_round(&self) -> bool {
        self.state.current_round_index + 1 >= self.plan.len()
    }

    fn current_round(&self) -> Option<&Round> {
        self.plan.get(self.state.current_round_index)
    }

    fn tick_event(&self) -> Event {
        Event::Tick {
            phase: self.state.phase,
            round_index: self.state.current_round_index,
            remaining_secs: self.state.remaining_seconds,
            overlay: self.overlay,
        }
    }

    fn enter_breathing(&mut self, options: TimerOptions, events: &mut Vec<Event>) {
        let breathe = self
            .current_round()
            .map(|r| r.breathe)
            .unwrap_or(MIN_BREATHE_SECS);
        self.set_phase(Phase::Breathing, breathe, events);
        if self.state.current_round_index >= 1 {
            self.announce(Announcement::BreatheGently, options, events);
        }
    }

    fn enter_holding(&mut self, events: &mut Vec<Event>) {
        let hold = self.current_round().map(|r| r.hold).unwrap_or(0);
        self.set_phase(Phase::Holding, hold, events);
    }

    fn finish_round(&mut self, options: TimerOptions, events: &mut Vec<Event>) {
        self.state.current_round_index += 1;
        if self.state.current_round_index < self.plan.len() {
            self.set_phase(Phase::Transitioning, 0, events);
            self.enter_breathing(options, events);
        } else {
            self.complete(events);
        }
    }

    fn complete(&mut self, events: &mut Vec<Event>) {
        let now = Utc::now();
        self.set_phase(Phase::Complete, 0, events);
        let summary = SessionSummary {
            started_at: self.started_at,
            completed_at: now,
            rounds: self.plan.rounds.clone(),
            total_secs: self.plan.total_secs(),
        };
        info!(
            rounds = summary.rounds.len(),
            total_secs = summary.total_secs,
            "session complete"
        );
        events.push(Event::SessionCompleted {
            summary: summary.clone(),
            at: now,
        });
        self.summary = Some(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SessionConfig;

    fn plan(breathe: i64, hold: i64, decrease: i64, rounds: i64) -> RoundPlan {
        RoundPlan::generate(&SessionConfig::new(breathe, hold, decrease, rounds))
    }

    fn announcements(events: &[Event]) -> Vec<Announcement> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Announcement { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    fn phases(events: &[Event]) -> Vec<Phase> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::PhaseChanged { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect()
    }

    fn tick_n(timer: &mut SessionTimer, n: usize) -> Vec<Event> {
        (0..n).flat_map(|_| timer.tick()).collect()
    }

    #[test]
    fn start_enters_countdown() {
        let mut timer = SessionTimer::new();
        let events = timer.start(plan(30, 10, 10, 2));
        assert_eq!(timer.phase(), Phase::Countdown);
        assert_eq!(timer.remaining_secs(), 3);
        assert_eq!(timer.round_index(), 0);
        assert_eq!(phases(&events), vec![Phase::Countdown]);
        assert_eq!(announcements(&events), vec![Announcement::RoundOneStartsSoon]);
    }

    #[test]
    fn start_is_ignored_when_not_idle() {
        let mut timer = SessionTimer::new();
        timer.start(plan(30, 10, 10, 2));
        timer.tick();
        assert!(timer.start(plan(60, 10, 10, 5)).is_empty());
        assert_eq!(timer.total_rounds(), 2);
        assert_eq!(timer.remaining_secs(), 2);
    }

    #[test]
    fn start_with_empty_plan_is_ignored() {
        let mut timer = SessionTimer::new();
        assert!(timer.start(plan(30, 10, 10, 0)).is_empty());
        assert_eq!(timer.phase(), Phase::Idle);
    }

    #[test]
    fn countdown_leads_into_first_breathe_without_cue() {
        let mut timer = SessionTimer::new();
        timer.start(plan(30, 10, 10, 2));
        let events = tick_n(&mut timer, 3);
        assert_eq!(timer.phase(), Phase::Breathing);
        assert_eq!(timer.remaining_secs(), 30);
        assert_eq!(phases(&events), vec![Phase::Breathing]);
        assert!(announcements(&events).is_empty());
    }

    #[test]
    fn get_ready_to_hold_at_three_seconds() {
        let mut timer = SessionTimer::new();
        timer.start(plan(10, 5, 0, 1));
        tick_n(&mut timer, 3);
        let events = tick_n(&mut timer, 7);
        assert_eq!(timer.remaining_secs(), 3);
        assert_eq!(announcements(&events), vec![Announcement::GetReadyToHold]);
        assert_eq!(timer.overlay().map(|o| o.remaining_secs), Some(3));

        let events = tick_n(&mut timer, 3);
        assert_eq!(timer.phase(), Phase::Holding);
        assert_eq!(timer.remaining_secs(), 5);
        assert_eq!(phases(&events), vec![Phase::Holding]);
        assert!(timer.overlay().is_none());
    }

    #[test]
    fn hold_cue_depends_on_round() {
        let mut timer = SessionTimer::new();
        timer.start(plan(10, 5, 0, 2));
        // countdown + breathe + 2 seconds of hold
        let events = tick_n(&mut timer, 3 + 10 + 2);
        assert_eq!(timer.phase(), Phase::Holding);
        assert_eq!(
            announcements(&events).last(),
            Some(&Announcement::GetReadyToBreathe)
        );

        let events = tick_n(&mut timer, 3 + 10 + 2);
        assert_eq!(timer.round_index(), 1);
        assert_eq!(
            announcements(&events).last(),
            Some(&Announcement::FinalRoundClosing)
        );
    }

    #[test]
    fn later_rounds_skip_countdown() {
        let mut timer = SessionTimer::new();
        timer.start(plan(20, 4, 10, 2));
        tick_n(&mut timer, 3 + 20 + 3);
        let events = timer.tick();
        assert_eq!(phases(&events), vec![Phase::Transitioning, Phase::Breathing]);
        assert_eq!(announcements(&events), vec![Announcement::BreatheGently]);
        assert_eq!(timer.round_index(), 1);
        assert_eq!(timer.remaining_secs(), 10);
        assert_eq!(
            timer.overlay(),
            Some(Overlay::new(Announcement::BreatheGently))
        );
    }

    #[test]
    fn full_session_completes() {
        let p = plan(30, 10, 10, 4);
        let expected_ticks = 3 + p.total_secs() as usize;
        let mut timer = SessionTimer::new();
        timer.start(p.clone());

        let events = tick_n(&mut timer, expected_ticks);
        assert_eq!(timer.phase(), Phase::Complete);
        assert_eq!(timer.round_index(), 4);
        let summary = timer.summary().expect("summary while complete");
        assert_eq!(summary.rounds, p.rounds);
        assert_eq!(summary.total_secs, 110);
        assert!(matches!(events.last(), Some(Event::SessionCompleted { .. })));

        assert!(tick_n(&mut timer, 10).is_empty());
        assert_eq!(timer.phase(), Phase::Complete);
    }

    #[test]
    fn zero_hold_still_takes_one_tick() {
        let mut timer = SessionTimer::new();
        timer.start(plan(10, 0, 0, 1));
        tick_n(&mut timer, 3 + 10);
        assert_eq!(timer.phase(), Phase::Holding);
        assert_eq!(timer.remaining_secs(), 0);
        timer.tick();
        assert_eq!(timer.phase(), Phase::Complete);
    }

    #[test]
    fn paused_timer_ignores_ticks() {
        let mut timer = SessionTimer::new();
        timer.start(plan(30, 10, 10, 2));
        tick_n(&mut timer, 5);
        let before = timer.state();
        assert_eq!(timer.pause().len(), 1);
        assert!(timer.is_paused());
        assert!(tick_n(&mut timer, 20).is_empty());
        assert_eq!(timer.remaining_secs(), before.remaining_seconds);
        assert!(timer.pause().is_empty());
    }

    #[test]
    fn pause_then_resume_keeps_state() {
        let mut timer = SessionTimer::new();
        timer.start(plan(30, 10, 10, 2));
        tick_n(&mut timer, 8);
        let before = timer.state();
        timer.pause();
        let events = timer.resume();
        assert_eq!(timer.state(), before);
        assert!(announcements(&events).is_empty());
    }

    #[test]
    fn resume_replays_passed_cue() {
        let mut timer = SessionTimer::new();
        timer.start(plan(10, 5, 0, 1));
        tick_n(&mut timer, 3 + 8);
        assert_eq!(timer.remaining_secs(), 2);
        timer.pause();
        let events = timer.resume();
        assert_eq!(announcements(&events), vec![Announcement::GetReadyToHold]);
        assert_eq!(timer.overlay().map(|o| o.remaining_secs), Some(3));
        assert_eq!(timer.remaining_secs(), 2);
    }

    #[test]
    fn resume_without_pause_is_noop() {
        let mut timer = SessionTimer::new();
        assert!(timer.resume().is_empty());
        timer.start(plan(30, 10, 10, 2));
        assert!(timer.resume().is_empty());
    }

    #[test]
    fn stop_resets_to_idle() {
        let mut timer = SessionTimer::new();
        timer.start(plan(30, 10, 10, 2));
        tick_n(&mut timer, 10);
        timer.pause();
        let events = timer.stop();
        assert!(matches!(events.as_slice(), [Event::Stopped { round_index: 0, .. }]));
        assert_eq!(timer.state(), SessionState::idle());
        assert!(timer.plan().is_none());
        assert!(timer.stop().is_empty());
    }

    #[test]
    fn stop_is_blocked_while_completion_pending() {
        let mut timer = SessionTimer::new();
        let p = plan(10, 1, 0, 1);
        let ticks = 3 + p.total_secs() as usize;
        timer.start(p);
        tick_n(&mut timer, ticks);
        assert_eq!(timer.phase(), Phase::Complete);
        let before = timer.state();

        assert!(timer.stop().is_empty());
        assert_eq!(timer.state(), before);
        assert!(timer.pause().is_empty());

        assert_eq!(timer.acknowledge_completion().len(), 1);
        assert_eq!(timer.phase(), Phase::Idle);
        assert!(timer.summary().is_none());
    }

    #[test]
    fn acknowledge_only_in_complete() {
        let mut timer = SessionTimer::new();
        assert!(timer.acknowledge_completion().is_empty());
        timer.start(plan(30, 10, 10, 2));
        assert!(timer.acknowledge_completion().is_empty());
        assert_eq!(timer.phase(), Phase::Countdown);
    }

    #[test]
    fn options_disable_cues_and_pause() {
        let mut timer = SessionTimer::with_options(TimerOptions {
            announcements: false,
            pause_enabled: false,
        });
        let mut events = timer.start(plan(10, 5, 0, 2));
        events.extend(tick_n(&mut timer, 40));
        assert!(announcements(&events).is_empty());
        assert!(timer.overlay().is_none());

        assert!(timer.pause().is_empty());
        assert!(!timer.is_paused());
    }

    #[test]
    fn progress_tracks_elapsed_seconds() {
        let mut timer = SessionTimer::new();
        assert_eq!(timer.session_progress_pct(), 0.0);
        timer.start(plan(10, 10, 0, 2));
        tick_n(&mut timer, 3 + 10);
        assert!((timer.session_progress_pct() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut timer = SessionTimer::new();
        timer.start(plan(30, 10, 10, 3));
        timer.pause();
        match timer.snapshot() {
            Event::StateSnapshot {
                phase,
                total_rounds,
                remaining_secs,
                is_paused,
                ..
            } => {
                assert_eq!(phase, Phase::Countdown);
                assert_eq!(total_rounds, 3);
                assert_eq!(remaining_secs, 3);
                assert!(is_paused);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }
}
