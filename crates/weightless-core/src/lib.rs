//! # Weightless Core Library
//!
//! Core logic for the Weightless breath-hold trainer. The CLI is a thin layer
//! over this crate; anything with a screen or a speaker talks to it through
//! [`PresentationAdapter`].
//!
//! ## Architecture
//!
//! - **Validation**: pure checks of a [`SessionConfig`] against the field rules
//! - **Schedule**: derives the per-round breathe/hold plan from a configuration
//! - **Session Timer**: a tick-driven state machine; the caller invokes
//!   `tick()` once per second and forwards the returned [`Event`]s
//! - **Storage**: the current configuration as a JSON blob in SQLite, and
//!   TOML application settings
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: Core session state machine
//! - [`RoundPlan`]: Per-round durations for one session
//! - [`ConfigStore`]: Load/save of the current configuration
//! - [`Settings`]: Application settings

pub mod error;
pub mod events;
pub mod format;
pub mod presentation;
pub mod storage;
pub mod timer;
pub mod validate;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use presentation::{PresentationAdapter, RecordingPresenter};
pub use storage::{ConfigStore, Database, KvConfigStore, MemoryConfigStore, Settings};
pub use timer::{
    Announcement, Overlay, Phase, Round, RoundPlan, SessionConfig, SessionState, SessionSummary,
    SessionTimer, TimerOptions,
};
pub use validate::{validate, ConfigField, ValidationResult};
