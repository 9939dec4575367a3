//! Session state machine.
//!
//! The engine owns the current mode, the countdown and the long-break
//! counter. It has no internal thread: a clock (see [`super::ClockDriver`])
//! or a test calls [`TimerEngine::tick`] once per elapsed second while the
//! session is active.
//!
//! ## Cycle
//!
//! ```text
//! Work -> ShortBreak -> Work -> ... -> Work -> LongBreak -> Work
//!         (sets < interval)              (sets >= interval)
//! ```
//!
//! Completing a work interval counts toward the daily ledger and the
//! long-break counter; completing a long break clears the counter.
//! Completing a break never touches the ledger.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(settings, DailyLedger::new(db));
//! engine.toggle();
//! // Once per second while active:
//! engine.tick(); // Returns Some(Event) when the interval completes
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::mode::TimerMode;
use super::settings::TimerSettings;
use crate::events::Event;
use crate::platform::{Notifier, SilentNotifier, WakeLockManager};
use crate::storage::DailyLedger;

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: TimerMode,
    /// Seconds remaining in the current interval.
    pub time_left: u64,
    /// Length of the current interval as it was when the mode was entered.
    pub interval_secs: u64,
    pub is_active: bool,
    pub sets_since_long_break: u32,
    pub daily_completed: u32,
}

/// What the renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub time_left: u64,
    pub total_duration: u64,
    pub mode: TimerMode,
}

impl Frame {
    /// 0.0 .. 1.0 elapsed fraction of the interval.
    pub fn progress(&self) -> f64 {
        if self.total_duration == 0 {
            return 1.0;
        }
        1.0 - (self.time_left as f64 / self.total_duration as f64)
    }
}

/// Core session state machine.
pub struct TimerEngine {
    settings: TimerSettings,
    state: SessionState,
    ledger: DailyLedger,
    notifier: Box<dyn Notifier>,
    wake_lock: WakeLockManager,
}

impl TimerEngine {
    /// Create an engine in `Work`, inactive, with a full work countdown.
    ///
    /// Reads the ledger once to seed the daily count.
    pub fn new(settings: TimerSettings, mut ledger: DailyLedger) -> Self {
        let daily_completed = ledger.load();
        let duration = TimerMode::Work.duration_secs(&settings);
        Self {
            state: SessionState {
                mode: TimerMode::Work,
                time_left: duration,
                interval_secs: duration,
                is_active: false,
                sets_since_long_break: 0,
                daily_completed,
            },
            settings,
            ledger,
            notifier: Box::new(SilentNotifier),
            wake_lock: WakeLockManager::disabled(),
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_wake_lock(mut self, wake_lock: WakeLockManager) -> Self {
        self.wake_lock = wake_lock;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    pub fn time_left(&self) -> u64 {
        self.state.time_left
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active
    }

    pub fn sets_since_long_break(&self) -> u32 {
        self.state.sets_since_long_break
    }

    pub fn daily_completed(&self) -> u32 {
        self.state.daily_completed
    }

    pub fn goal_reached(&self) -> bool {
        self.state.daily_completed >= self.settings.daily_goal
    }

    pub fn wake_lock(&self) -> &WakeLockManager {
        &self.wake_lock
    }

    pub fn frame(&self) -> Frame {
        Frame {
            time_left: self.state.time_left,
            total_duration: self.state.interval_secs,
            mode: self.state.mode,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.state.mode,
            remaining_secs: self.state.time_left,
            total_secs: self.state.interval_secs,
            is_active: self.state.is_active,
            sets_since_long_break: self.state.sets_since_long_break,
            daily_completed: self.state.daily_completed,
            daily_goal: self.settings.daily_goal,
            goal_reached: self.goal_reached(),
            settings: self.settings.clone(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or pause the countdown.
    pub fn toggle(&mut self) -> Event {
        self.set_active(!self.state.is_active);
        if self.state.is_active {
            debug!(mode = %self.state.mode, remaining = self.state.time_left, "timer started");
            Event::TimerStarted {
                mode: self.state.mode,
                remaining_secs: self.state.time_left,
                at: Utc::now(),
            }
        } else {
            debug!(mode = %self.state.mode, remaining = self.state.time_left, "timer paused");
            Event::TimerPaused {
                mode: self.state.mode,
                remaining_secs: self.state.time_left,
                at: Utc::now(),
            }
        }
    }

    /// Stop and refill the current interval. Mode and counts are unchanged.
    pub fn reset(&mut self) -> Event {
        self.set_active(false);
        self.refill();
        Event::TimerReset {
            mode: self.state.mode,
            remaining_secs: self.state.time_left,
            at: Utc::now(),
        }
    }

    /// Complete the current interval now, whatever is left on it.
    pub fn skip(&mut self) -> Event {
        let from = self.state.mode;
        let forfeited_secs = self.state.time_left;
        self.complete();
        Event::TimerSkipped {
            from,
            to: self.state.mode,
            forfeited_secs,
            daily_completed: self.state.daily_completed,
            sets_since_long_break: self.state.sets_since_long_break,
            at: Utc::now(),
        }
    }

    /// Advance one second. Returns `Some(Event::TimerCompleted)` when the
    /// interval finishes. Ignored while inactive.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.is_active {
            return None;
        }
        if self.state.time_left > 1 {
            self.state.time_left -= 1;
            return None;
        }
        let completed = self.state.mode;
        self.complete();
        Some(Event::TimerCompleted {
            completed,
            next: self.state.mode,
            next_duration_secs: self.state.time_left,
            daily_completed: self.state.daily_completed,
            sets_since_long_break: self.state.sets_since_long_break,
            at: Utc::now(),
        })
    }

    /// Apply up to `secs` ticks, stopping early if the session goes inactive.
    pub fn advance(&mut self, secs: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..secs {
            if !self.state.is_active {
                break;
            }
            if let Some(event) = self.tick() {
                events.push(event);
            }
        }
        events
    }

    /// Replace the settings.
    ///
    /// A lowered long-break interval clamps the sets counter. While inactive
    /// the current interval is refilled from the new durations immediately.
    /// While active the running countdown is left alone and the new
    /// durations apply from the next mode entry.
    pub fn update_settings(&mut self, settings: TimerSettings) -> Event {
        self.settings = settings;
        self.state.sets_since_long_break = self
            .state
            .sets_since_long_break
            .min(self.settings.long_break_interval);
        let applied_now = !self.state.is_active;
        if applied_now {
            self.refill();
        }
        debug!(applied_now, "settings updated");
        Event::SettingsUpdated {
            applied_now,
            remaining_secs: self.state.time_left,
            at: Utc::now(),
        }
    }

    /// Switch to `mode` with a fresh countdown. Counts and the active flag
    /// are unchanged.
    pub fn set_mode(&mut self, mode: TimerMode) -> Event {
        self.enter(mode);
        Event::ModeChanged {
            mode,
            duration_secs: self.state.time_left,
            at: Utc::now(),
        }
    }

    /// Host visibility changed (e.g. terminal focus).
    pub fn on_visibility_change(&mut self, visible: bool) {
        self.wake_lock.on_visibility_change(visible);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn set_active(&mut self, active: bool) {
        self.state.is_active = active;
        self.wake_lock.set_active(active);
    }

    fn refill(&mut self) {
        let duration = self.state.mode.duration_secs(&self.settings);
        self.state.time_left = duration;
        self.state.interval_secs = duration;
    }

    fn enter(&mut self, mode: TimerMode) {
        self.state.mode = mode;
        self.refill();
    }

    /// The completion transition shared by tick-to-zero and skip.
    fn complete(&mut self) {
        let finished = self.state.mode;
        self.set_active(false);

        if let Err(e) = self.notifier.notify(finished) {
            debug!(error = %e, "completion cue failed");
        }

        let next = match finished {
            TimerMode::Work => {
                self.state.daily_completed = self.ledger.increment();
                // Capped so a long break bypassed with set_mode cannot push it past the interval.
                self.state.sets_since_long_break = self
                    .state
                    .sets_since_long_break
                    .saturating_add(1)
                    .min(self.settings.long_break_interval);
                if self.state.sets_since_long_break >= self.settings.long_break_interval {
                    TimerMode::LongBreak
                } else {
                    TimerMode::ShortBreak
                }
            }
            TimerMode::ShortBreak => TimerMode::Work,
            TimerMode::LongBreak => {
                self.state.sets_since_long_break = 0;
                TimerMode::Work
            }
        };
        self.enter(next);
        info!(
            completed = %finished,
            next = %next,
            daily = self.state.daily_completed,
            sets = self.state.sets_since_long_break,
            "interval completed"
        );
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("ledger", &self.ledger)
            .field("wake_lock", &self.wake_lock)
            .finish_non_exhaustive()
    }
}
