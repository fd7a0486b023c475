//! Interactive session in the terminal.
//!
//! One task owns the timer. A one-second interval and stdin lines are
//! multiplexed with `select!`, so ticks and commands never overlap.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;
use weightless_core::{
    validate, ConfigStore, Event, KvConfigStore, Phase, PresentationAdapter, RoundPlan,
    SessionTimer, Settings,
};

use crate::terminal::TerminalPresenter;

/// A line typed while a session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    TogglePause,
    Stop,
    Acknowledge,
    Status,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "p" | "pause" => Some(Command::TogglePause),
            "s" | "stop" | "q" => Some(Command::Stop),
            "" => Some(Command::Acknowledge),
            "?" | "status" => Some(Command::Status),
            _ => None,
        }
    }

    fn apply(self, timer: &mut SessionTimer) -> Vec<Event> {
        match self {
            Command::TogglePause if timer.is_paused() => timer.resume(),
            Command::TogglePause => timer.pause(),
            Command::Stop => timer.stop(),
            Command::Acknowledge => timer.acknowledge_completion(),
            Command::Status => vec![timer.snapshot()],
        }
    }
}

/// Once stdin is closed nobody can resume or press Enter, so a paused
/// session carries on and a finished one is acknowledged.
fn on_input_closed(timer: &mut SessionTimer) -> Vec<Event> {
    if timer.is_paused() {
        timer.resume()
    } else if timer.phase() == Phase::Complete {
        timer.acknowledge_completion()
    } else {
        Vec::new()
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    let config = KvConfigStore::open()?.load()?;
    validate(&config).into_result()?;
    let plan = RoundPlan::generate(&config);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(drive(plan, &settings))
}

async fn drive(plan: RoundPlan, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut timer = SessionTimer::with_options(settings.timer_options());
    let mut presenter = TerminalPresenter::new(std::io::stdout(), settings.audio.sound_on);
    presenter.present_all(&timer.start(plan));
    if timer.phase() == Phase::Idle {
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of an interval fires immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => presenter.present_all(&timer.tick()),
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => {
                    let Some(command) = Command::parse(&line) else {
                        debug!(input = %line.trim(), "ignored input");
                        continue;
                    };
                    let events = command.apply(&mut timer);
                    if events.iter().any(|e| matches!(e, Event::Resumed { .. })) {
                        ticker.reset();
                    }
                    presenter.present_all(&events);
                }
                None => {
                    debug!("stdin closed");
                    stdin_open = false;
                }
            },
        }

        if !stdin_open {
            let events = on_input_closed(&mut timer);
            if events.iter().any(|e| matches!(e, Event::Resumed { .. })) {
                ticker.reset();
            }
            presenter.present_all(&events);
        }
        if timer.phase() == Phase::Idle {
            break;
        }
    }
    Ok(())
}
