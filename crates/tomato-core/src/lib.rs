//! # Tomato Timer Core Library
//!
//! This library provides the core logic for the Tomato Pomodoro timer.
//! Hosts (the `tomato` terminal binary, or anything else that can render a
//! countdown) drive it and render what it reports.
//!
//! ## Architecture
//!
//! - **Timer Engine**: the session state machine; the caller invokes
//!   `tick()` once per second while the session is active
//! - **Clock Driver**: a start/stop tokio task producing those ticks
//! - **Storage**: SQLite key-value table for the daily ledger, TOML
//!   configuration
//! - **Platform**: injectable wake lock and completion notifier
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core session state machine
//! - [`Session`]: Engine and clock wired together
//! - [`DailyLedger`]: Today's completed work intervals
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod platform;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{
    ConfigError, CoreError, DatabaseError, LedgerError, NotifyError, ValidationError,
    WakeLockError,
};
pub use events::Event;
pub use platform::{Notifier, WakeLock, WakeLockManager};
pub use session::Session;
pub use storage::{Config, DailyLedger, Database, KvStore, MemoryStore};
pub use timer::{ClockDriver, Frame, SessionState, Tick, TimerEngine, TimerMode, TimerSettings};
