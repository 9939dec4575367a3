use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Parameters the session state machine runs with.
///
/// Durations are in seconds. `visual_theme` and `layout` are carried for the
/// renderer and never interpreted by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub work_duration: u64,
    pub short_break_duration: u64,
    pub long_break_duration: u64,
    /// Completed work intervals before a long break.
    pub long_break_interval: u32,
    /// Informational target, not enforced.
    pub daily_goal: u32,
    #[serde(default = "default_theme")]
    pub visual_theme: String,
    #[serde(default = "default_layout")]
    pub layout: String,
}

fn default_theme() -> String {
    "memory".into()
}

fn default_layout() -> String {
    "vertical".into()
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_duration: 25 * 60,
            short_break_duration: 5 * 60,
            long_break_duration: 15 * 60,
            long_break_interval: 4,
            daily_goal: 8,
            visual_theme: default_theme(),
            layout: default_layout(),
        }
    }
}

impl TimerSettings {
    /// Settings with the given durations (seconds) and interval, other fields default.
    pub fn with_durations(work: u64, short_break: u64, long_break: u64, interval: u32) -> Self {
        Self {
            work_duration: work,
            short_break_duration: short_break,
            long_break_duration: long_break,
            long_break_interval: interval,
            ..Self::default()
        }
    }

    /// Reject degenerate values.
    ///
    /// The state machine does not call this; it is applied where settings
    /// enter the system (config file, CLI).
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("work_duration", self.work_duration),
            ("short_break_duration", self.short_break_duration),
            ("long_break_duration", self.long_break_duration),
        ] {
            if value == 0 {
                return Err(ValidationError::ZeroDuration { field });
            }
        }
        if self.long_break_interval == 0 {
            return Err(ValidationError::ZeroInterval);
        }
        if self.daily_goal == 0 {
            return Err(ValidationError::ZeroGoal);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(TimerSettings::default().validate().is_ok());
    }

    #[test]
    fn zero_duration_rejected() {
        let s = TimerSettings::with_durations(1500, 0, 900, 4);
        assert_eq!(
            s.validate(),
            Err(ValidationError::ZeroDuration { field: "short_break_duration" })
        );
    }

    #[test]
    fn zero_interval_rejected() {
        let s = TimerSettings::with_durations(1500, 300, 900, 0);
        assert_eq!(s.validate(), Err(ValidationError::ZeroInterval));
    }

    #[test]
    fn missing_presentation_fields_default() {
        let json = r#"{"work_duration":60,"short_break_duration":30,"long_break_duration":90,"long_break_interval":2,"daily_goal":3}"#;
        let s: TimerSettings = serde_json::from_str(json).unwrap();
        assert_eq!(s.visual_theme, "memory");
        assert_eq!(s.layout, "vertical");
    }
}
