//! Best-effort platform effects the session drives: keeping the display
//! awake and the audible completion cue.
//!
//! Both are injectable so the state machine can be exercised without a
//! terminal, sound player, or power manager.

pub mod notify;
pub mod wake_lock;

pub use notify::{CompositeNotifier, Notifier, SilentNotifier, SoundCommand, TerminalBell};
pub use wake_lock::{InhibitorWakeLock, NoopWakeLock, WakeLock, WakeLockManager};
