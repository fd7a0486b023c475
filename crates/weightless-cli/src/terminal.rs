//! Terminal rendering of session events.

use std::io::Write;

use chrono::Local;
use weightless_core::format::{format_clock, format_total};
use weightless_core::{Event, Overlay, Phase, PresentationAdapter, SessionSummary};

const BELL: &str = "\x07";

pub struct TerminalPresenter<W: Write> {
    out: W,
    sound_on: bool,
    total_rounds: usize,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, sound_on: bool) -> Self {
        Self {
            out,
            sound_on,
            total_rounds: 0,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn phase_label(phase: Phase) -> &'static str {
        match phase {
            Phase::Countdown => "Starting",
            Phase::Breathing => "Breathe",
            Phase::Holding => "Hold",
            _ => "",
        }
    }

    fn status_line(&self, phase: Phase, round_index: usize, remaining: u64) -> String {
        if phase == Phase::Countdown {
            return format!("{}  {remaining}", Self::phase_label(phase));
        }
        format!(
            "Round {}/{}  {:<7}  {}",
            round_index + 1,
            self.total_rounds,
            Self::phase_label(phase),
            format_clock(remaining)
        )
    }

    fn write_summary(&mut self, summary: &SessionSummary) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Session complete")?;
        writeln!(
            self.out,
            "Date: {}",
            summary
                .completed_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
        )?;
        writeln!(self.out, "{:<7} {:>8} {:>8}", "Round", "Breathe", "Hold")?;
        for (i, round) in summary.rounds.iter().enumerate() {
            writeln!(
                self.out,
                "{:<7} {:>8} {:>8}",
                i + 1,
                format_clock(round.breathe),
                format_clock(round.hold)
            )?;
        }
        writeln!(self.out, "Total time: {}", format_total(summary.total_secs))?;
        writeln!(self.out, "Press Enter to finish.")
    }

    fn render(&mut self, event: &Event) -> std::io::Result<()> {
        match event {
            Event::SessionStarted {
                rounds, total_secs, ..
            } => {
                self.total_rounds = *rounds;
                writeln!(
                    self.out,
                    "{rounds} rounds, {} in total. p = pause/resume, s = stop.",
                    format_total(*total_secs)
                )?;
            }
            Event::PhaseChanged {
                phase,
                round_index,
                remaining_secs,
                ..
            } if phase.is_ticking() => {
                let line = self.status_line(*phase, *round_index, *remaining_secs);
                write!(self.out, "\n{line}")?;
            }
            Event::PhaseChanged { .. } => {}
            Event::Tick {
                phase,
                round_index,
                remaining_secs,
                overlay,
            } => {
                let mut line = self.status_line(*phase, *round_index, *remaining_secs);
                if let Some(counter) = overlay.and_then(overlay_counter) {
                    line.push_str(&counter);
                }
                // Pad to clear a longer previous line.
                write!(self.out, "\r{line:<40}")?;
            }
            Event::Announcement { kind, .. } => {
                let bell = if self.sound_on { BELL } else { "" };
                write!(self.out, "\n{bell}>> {}", kind.message())?;
            }
            Event::Paused { .. } => write!(self.out, "\nPaused. Press p to resume.")?,
            Event::Resumed { .. } => write!(self.out, "\nResumed.")?,
            Event::Stopped { .. } => writeln!(self.out, "\nSession stopped.")?,
            Event::SessionCompleted { summary, .. } => self.write_summary(summary)?,
            Event::CompletionAcknowledged { .. } => {}
            Event::StateSnapshot {
                phase,
                round_index,
                total_rounds,
                remaining_secs,
                is_paused,
                session_progress_pct,
                ..
            } => {
                self.total_rounds = *total_rounds;
                let mut line = if phase.is_ticking() {
                    self.status_line(*phase, *round_index, *remaining_secs)
                } else {
                    format!("{phase:?}")
                };
                line.push_str(&format!("  {session_progress_pct:.0}% done"));
                if *is_paused {
                    line.push_str("  (paused)");
                }
                write!(self.out, "\n{line}")?;
            }
        }
        self.out.flush()
    }
}

/// The 3-2-1 counter shown beside cues that lead into a phase change.
fn overlay_counter(overlay: Overlay) -> Option<String> {
    overlay
        .announcement
        .shows_countdown()
        .then(|| format!("  ({})", overlay.remaining_secs))
}

impl<W: Write> PresentationAdapter for TerminalPresenter<W> {
    fn present(&mut self, event: &Event) {
        if let Err(e) = self.render(event) {
            tracing::warn!(error = %e, event = event.name(), "failed to render event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weightless_core::{RoundPlan, SessionConfig, SessionTimer};

    fn render_session(sound_on: bool) -> String {
        let mut timer = SessionTimer::new();
        let mut presenter = TerminalPresenter::new(Vec::new(), sound_on);
        presenter.present_all(&timer.start(RoundPlan::generate(&SessionConfig::new(10, 4, 0, 2))));
        for _ in 0..40 {
            presenter.present_all(&timer.tick());
        }
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn renders_cues_and_summary() {
        let out = render_session(false);
        assert!(out.contains("2 rounds, 28s in total."));
        assert!(out.contains(">> Round 1 starts soon."));
        assert!(out.contains(">> Get ready to hold."));
        assert!(out.contains(">> Breathe gently. The round has begun."));
        assert!(out.contains(">> The final round is closing."));
        assert!(out.contains("Round 2/2  Hold"));
        assert!(out.contains("Session complete"));
        assert!(out.contains("Total time: 28s"));
        assert!(!out.contains(BELL));

        // Last breathe seconds of round 1 carry the hold counter.
        assert!(out.contains("Round 1/2  Breathe  0:02  (2)"));
        assert!(out.contains("Round 1/2  Breathe  0:01  (1)"));
        // Round 2 opens with the gentle cue, which has no counter.
        assert!(out.contains("Round 2/2  Breathe  0:09 "));
        assert!(!out.contains("Round 2/2  Breathe  0:09  ("));
    }

    #[test]
    fn counter_only_for_countdown_cues() {
        use weightless_core::Announcement;

        let hold = Overlay {
            announcement: Announcement::GetReadyToHold,
            remaining_secs: 2,
        };
        let gentle = Overlay {
            announcement: Announcement::BreatheGently,
            remaining_secs: 2,
        };
        assert_eq!(overlay_counter(hold).as_deref(), Some("  (2)"));
        assert_eq!(overlay_counter(gentle), None);
    }

    #[test]
    fn snapshot_shows_progress() {
        let mut timer = SessionTimer::new();
        timer.start(RoundPlan::generate(&SessionConfig::new(10, 10, 0, 2)));
        for _ in 0..13 {
            timer.tick();
        }
        timer.pause();
        let mut presenter = TerminalPresenter::new(Vec::new(), false);
        presenter.present(&timer.snapshot());
        let out = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(out.contains("Round 1/2  Hold     0:10  25% done  (paused)"));
    }

    #[test]
    fn bell_only_when_sound_on() {
        assert!(render_session(true).contains(BELL));
    }

    #[test]
    fn status_line_formats_clock() {
        let mut presenter = TerminalPresenter::new(Vec::new(), false);
        presenter.total_rounds = 6;
        assert_eq!(
            presenter.status_line(Phase::Breathing, 0, 125),
            "Round 1/6  Breathe  2:05"
        );
        assert_eq!(presenter.status_line(Phase::Countdown, 0, 3), "Starting  3");
    }
}
