use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerMode, TimerSettings};

/// Every state change in the session produces an Event.
/// Hosts use them to drive the clock, log, and render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero and the cycle advanced.
    TimerCompleted {
        completed: TimerMode,
        next: TimerMode,
        next_duration_secs: u64,
        daily_completed: u32,
        sets_since_long_break: u32,
        at: DateTime<Utc>,
    },
    /// The current interval was forced to complete early.
    TimerSkipped {
        from: TimerMode,
        to: TimerMode,
        forfeited_secs: u64,
        daily_completed: u32,
        sets_since_long_break: u32,
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: TimerMode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SettingsUpdated {
        /// Whether the running interval picked up the new duration.
        applied_now: bool,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        remaining_secs: u64,
        total_secs: u64,
        is_active: bool,
        sets_since_long_break: u32,
        daily_completed: u32,
        daily_goal: u32,
        goal_reached: bool,
        settings: TimerSettings,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Completion-type events, natural or skipped.
    pub fn is_completion(&self) -> bool {
        matches!(self, Event::TimerCompleted { .. } | Event::TimerSkipped { .. })
    }
}
