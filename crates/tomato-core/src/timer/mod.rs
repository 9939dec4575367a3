mod clock;
mod engine;
mod mode;
mod settings;

pub use clock::{ClockDriver, Tick};
pub use engine::{Frame, SessionState, TimerEngine};
pub use mode::TimerMode;
pub use settings::TimerSettings;
