//! A running session: the engine plus the clock that advances it.
//!
//! Every command is forwarded to the [`TimerEngine`] and the clock is then
//! started or stopped to match the engine's active flag. Ticks that were
//! queued before a stop are drained so a paused countdown never moves.

use tokio::sync::mpsc;

use crate::events::Event;
use crate::timer::{ClockDriver, Tick, TimerEngine, TimerMode, TimerSettings};

pub struct Session {
    engine: TimerEngine,
    clock: ClockDriver,
    ticks: mpsc::Receiver<Tick>,
}

impl Session {
    pub fn new(engine: TimerEngine) -> Self {
        let (clock, ticks) = ClockDriver::new();
        Self::with_clock(engine, clock, ticks)
    }

    pub fn with_clock(engine: TimerEngine, clock: ClockDriver, ticks: mpsc::Receiver<Tick>) -> Self {
        Self {
            engine,
            clock,
            ticks,
        }
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn clock_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn toggle(&mut self) -> Event {
        let event = self.engine.toggle();
        self.sync_clock();
        event
    }

    pub fn reset(&mut self) -> Event {
        let event = self.engine.reset();
        self.sync_clock();
        event
    }

    pub fn skip(&mut self) -> Event {
        let event = self.engine.skip();
        self.sync_clock();
        event
    }

    pub fn set_mode(&mut self, mode: TimerMode) -> Event {
        let event = self.engine.set_mode(mode);
        self.sync_clock();
        event
    }

    pub fn update_settings(&mut self, settings: TimerSettings) -> Event {
        self.engine.update_settings(settings)
    }

    pub fn on_visibility_change(&mut self, visible: bool) {
        self.engine.on_visibility_change(visible);
    }

    /// Wait for the next tick. Pending forever while the clock is stopped,
    /// so it is safe to use as a `select!` branch.
    pub async fn next_tick(&mut self) -> Option<Tick> {
        self.ticks.recv().await
    }

    /// Apply one tick from [`Session::next_tick`].
    pub fn on_tick(&mut self) -> Option<Event> {
        let event = self.engine.tick();
        self.sync_clock();
        event
    }

    fn sync_clock(&mut self) {
        if self.engine.is_active() {
            self.clock.start();
        } else if self.clock.stop() {
            while self.ticks.try_recv().is_ok() {}
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("engine", &self.engine)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
