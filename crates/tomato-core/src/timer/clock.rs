//! One-second tick source.
//!
//! The driver is a spawned tokio task feeding a bounded channel. Only one
//! task exists at a time, and the channel holds at most one undelivered
//! tick, so ticks reach the consumer strictly one after another.
//! `start` must be called from inside a tokio runtime.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

/// One elapsed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

#[derive(Debug)]
pub struct ClockDriver {
    period: Duration,
    tx: mpsc::Sender<Tick>,
    task: Option<JoinHandle<()>>,
}

impl ClockDriver {
    pub const PERIOD: Duration = Duration::from_secs(1);

    /// A stopped 1 Hz driver and the receiving end of its ticks.
    pub fn new() -> (Self, mpsc::Receiver<Tick>) {
        Self::with_period(Self::PERIOD)
    }

    pub fn with_period(period: Duration) -> (Self, mpsc::Receiver<Tick>) {
        let (tx, rx) = mpsc::channel(1);
        (
            Self {
                period,
                tx,
                task: None,
            },
            rx,
        )
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Begin ticking. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        let tx = self.tx.clone();
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                trace!("tick");
                if tx.send(Tick).await.is_err() {
                    break;
                }
            }
        }));
        true
    }

    /// Stop ticking. Returns false if it was not running.
    ///
    /// A tick already sitting in the channel is not withdrawn; consumers
    /// that care drain the receiver after stopping.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for ClockDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Count ticks delivered within `window`.
    async fn count_ticks(rx: &mut mpsc::Receiver<Tick>, window: Duration) -> usize {
        let mut n = 0;
        let _ = time::timeout(window, async {
            while rx.recv().await.is_some() {
                n += 1;
            }
        })
        .await;
        n
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let (mut clock, mut rx) = ClockDriver::new();
        assert!(clock.start());
        assert!(clock.is_running());

        let started = Instant::now();
        rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(1));

        assert_eq!(count_ticks(&mut rx, Duration::from_millis(3500)).await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let (mut clock, mut rx) = ClockDriver::new();
        assert!(clock.start());
        assert!(!clock.start());
        assert!(!clock.start());

        assert_eq!(count_ticks(&mut rx, Duration::from_millis(3500)).await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_ticks() {
        let (mut clock, mut rx) = ClockDriver::new();
        clock.start();
        rx.recv().await.unwrap();

        assert!(clock.stop());
        assert!(!clock.is_running());
        assert!(!clock.stop());

        assert_eq!(count_ticks(&mut rx, Duration::from_secs(5)).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop() {
        let (mut clock, mut rx) = ClockDriver::new();
        clock.start();
        clock.stop();
        assert!(clock.start());
        assert_eq!(count_ticks(&mut rx, Duration::from_millis(2500)).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_driver_closes_channel() {
        let (mut clock, mut rx) = ClockDriver::new();
        clock.start();
        drop(clock);
        // The aborted task may have queued nothing; either way the channel ends.
        while rx.recv().await.is_some() {}
    }
}
