use serde::{Deserialize, Serialize};
use std::fmt;

use super::settings::TimerSettings;

/// The three interval kinds of the Pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Work, TimerMode::ShortBreak, TimerMode::LongBreak];

    /// Interval length in seconds under the given settings.
    pub fn duration_secs(self, settings: &TimerSettings) -> u64 {
        match self {
            TimerMode::Work => settings.work_duration,
            TimerMode::ShortBreak => settings.short_break_duration,
            TimerMode::LongBreak => settings.long_break_duration,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Work => "Focus",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
