use std::process::{Child, Command, Stdio};

use tracing::{debug, warn};

use crate::error::WakeLockError;

/// A platform "keep the display awake" resource.
pub trait WakeLock: Send {
    /// Acquire the lock. Acquiring while already held must not leak a second lock.
    fn acquire(&mut self) -> Result<(), WakeLockError>;

    /// Release the lock. Releasing when not held is a no-op.
    fn release(&mut self) -> Result<(), WakeLockError>;
}

/// Wake lock that does nothing. Used when the feature is disabled.
#[derive(Debug, Default)]
pub struct NoopWakeLock;

impl WakeLock for NoopWakeLock {
    fn acquire(&mut self) -> Result<(), WakeLockError> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), WakeLockError> {
        Ok(())
    }
}

/// Holds an OS idle inhibitor process for as long as the lock is held.
///
/// Linux uses `systemd-inhibit`, macOS `caffeinate`. The inhibitor may be
/// killed from outside (session lock, logout); `acquire` notices the dead
/// child and spawns a new one.
#[derive(Debug, Default)]
pub struct InhibitorWakeLock {
    child: Option<Child>,
}

impl InhibitorWakeLock {
    pub fn new() -> Self {
        Self::default()
    }

    fn command() -> Result<Command, WakeLockError> {
        if cfg!(target_os = "linux") {
            let mut cmd = Command::new("systemd-inhibit");
            cmd.args([
                "--what=idle:sleep",
                "--who=tomato-timer",
                "--why=Focus session running",
                "--mode=block",
                "sleep",
                "infinity",
            ]);
            Ok(cmd)
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("caffeinate");
            cmd.args(["-d", "-i"]);
            Ok(cmd)
        } else {
            Err(WakeLockError::Unsupported)
        }
    }

    fn is_alive(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

impl WakeLock for InhibitorWakeLock {
    fn acquire(&mut self) -> Result<(), WakeLockError> {
        if self.is_alive() {
            return Ok(());
        }
        let child = Self::command()?
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| WakeLockError::Process {
                action: "acquire",
                source,
            })?;
        debug!(pid = child.id(), "wake lock inhibitor started");
        self.child = Some(child);
        Ok(())
    }

    fn release(&mut self) -> Result<(), WakeLockError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if matches!(child.try_wait(), Ok(Some(_))) {
            return Ok(());
        }
        child.kill().map_err(|source| WakeLockError::Process {
            action: "release",
            source,
        })?;
        // Reap so the inhibitor does not linger as a zombie.
        let _ = child.wait();
        debug!("wake lock inhibitor stopped");
        Ok(())
    }
}

impl Drop for InhibitorWakeLock {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

/// Ties a [`WakeLock`] to the session's active flag.
///
/// While active the manager is "subscribed" to visibility changes: regaining
/// visibility re-acquires the lock, since hosts commonly drop it when the
/// surface is backgrounded. Failures are logged and never surface to the
/// caller.
pub struct WakeLockManager {
    lock: Box<dyn WakeLock>,
    subscribed: bool,
}

impl WakeLockManager {
    pub fn new(lock: Box<dyn WakeLock>) -> Self {
        Self {
            lock,
            subscribed: false,
        }
    }

    pub fn disabled() -> Self {
        Self::new(Box::new(NoopWakeLock))
    }

    /// Whether the manager currently wants the lock held.
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Follow an `is_active` transition.
    pub fn set_active(&mut self, active: bool) {
        if active {
            self.subscribed = true;
            self.try_acquire();
        } else {
            self.subscribed = false;
            if let Err(e) = self.lock.release() {
                warn!(error = %e, "failed to release wake lock");
            }
        }
    }

    /// Host visibility changed. Only regaining visibility while active matters.
    pub fn on_visibility_change(&mut self, visible: bool) {
        if visible && self.subscribed {
            debug!("visibility regained, re-acquiring wake lock");
            self.try_acquire();
        }
    }

    fn try_acquire(&mut self) {
        if let Err(e) = self.lock.acquire() {
            warn!(error = %e, "failed to acquire wake lock");
        }
    }
}

impl Drop for WakeLockManager {
    fn drop(&mut self) {
        if self.subscribed {
            let _ = self.lock.release();
        }
    }
}

impl std::fmt::Debug for WakeLockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WakeLockManager")
            .field("subscribed", &self.subscribed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Call {
        Acquire,
        Release,
    }

    /// Records calls; optionally fails every acquisition.
    #[derive(Clone, Default)]
    pub struct RecordingWakeLock {
        pub calls: Arc<Mutex<Vec<Call>>>,
        pub fail_acquire: bool,
    }

    impl RecordingWakeLock {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl WakeLock for RecordingWakeLock {
        fn acquire(&mut self) -> Result<(), WakeLockError> {
            self.calls.lock().unwrap().push(Call::Acquire);
            if self.fail_acquire {
                Err(WakeLockError::Unsupported)
            } else {
                Ok(())
            }
        }

        fn release(&mut self) -> Result<(), WakeLockError> {
            self.calls.lock().unwrap().push(Call::Release);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Call, RecordingWakeLock};
    use super::*;

    #[test]
    fn activation_acquires_and_deactivation_releases() {
        let lock = RecordingWakeLock::default();
        let mut manager = WakeLockManager::new(Box::new(lock.clone()));

        manager.set_active(true);
        assert!(manager.is_subscribed());
        manager.set_active(false);
        assert!(!manager.is_subscribed());

        assert_eq!(lock.calls(), vec![Call::Acquire, Call::Release]);
    }

    #[test]
    fn visibility_regained_while_active_reacquires() {
        let lock = RecordingWakeLock::default();
        let mut manager = WakeLockManager::new(Box::new(lock.clone()));

        manager.set_active(true);
        manager.on_visibility_change(false);
        manager.on_visibility_change(true);

        assert_eq!(lock.calls(), vec![Call::Acquire, Call::Acquire]);
    }

    #[test]
    fn visibility_ignored_while_inactive() {
        let lock = RecordingWakeLock::default();
        let mut manager = WakeLockManager::new(Box::new(lock.clone()));

        manager.on_visibility_change(true);
        manager.set_active(true);
        manager.set_active(false);
        manager.on_visibility_change(true);

        assert_eq!(lock.calls(), vec![Call::Acquire, Call::Release]);
    }

    #[test]
    fn acquisition_failure_is_swallowed() {
        let lock = RecordingWakeLock {
            fail_acquire: true,
            ..Default::default()
        };
        let mut manager = WakeLockManager::new(Box::new(lock.clone()));

        manager.set_active(true);
        assert!(manager.is_subscribed());
        manager.on_visibility_change(true);
        assert_eq!(lock.calls(), vec![Call::Acquire, Call::Acquire]);
    }

    #[test]
    fn drop_releases_held_lock() {
        let lock = RecordingWakeLock::default();
        {
            let mut manager = WakeLockManager::new(Box::new(lock.clone()));
            manager.set_active(true);
        }
        assert_eq!(lock.calls(), vec![Call::Acquire, Call::Release]);
    }

    #[test]
    fn inhibitor_release_without_acquire_is_noop() {
        let mut lock = InhibitorWakeLock::new();
        assert!(lock.release().is_ok());
    }
}
