use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::NotifyError;
use crate::timer::TimerMode;

/// Audible cue fired when an interval completes.
///
/// Implementations must not block on playback; the session calls this from
/// inside a tick.
pub trait Notifier: Send {
    fn notify(&self, completed: TimerMode) -> Result<(), NotifyError>;
}

/// Emits nothing. Used when notifications are disabled and in tests.
#[derive(Debug, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _completed: TimerMode) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Rings the terminal bell on stderr so stdout stays machine readable.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl Notifier for TerminalBell {
    fn notify(&self, _completed: TimerMode) -> Result<(), NotifyError> {
        let mut err = std::io::stderr();
        err.write_all(b"\x07")?;
        err.flush()?;
        Ok(())
    }
}

const DEFAULT_SOUNDS: &[(&str, &str)] = &[
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("paplay", "/usr/share/sounds/freedesktop/stereo/bell.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("afplay", "/System/Library/Sounds/Glass.aiff"),
];

/// Plays a sound file through an external player, spawned and never awaited.
#[derive(Debug, Clone)]
pub struct SoundCommand {
    candidates: Vec<(String, PathBuf)>,
}

impl SoundCommand {
    /// Probe the usual system sound locations.
    pub fn system_default() -> Self {
        Self {
            candidates: DEFAULT_SOUNDS
                .iter()
                .map(|(player, file)| (player.to_string(), PathBuf::from(file)))
                .collect(),
        }
    }

    /// Play a specific file with a specific player.
    pub fn with_file(player: impl Into<String>, file: impl AsRef<Path>) -> Self {
        Self {
            candidates: vec![(player.into(), file.as_ref().to_path_buf())],
        }
    }

    fn pick(&self) -> Option<&(String, PathBuf)> {
        self.candidates.iter().find(|(_, file)| file.exists())
    }
}

impl Notifier for SoundCommand {
    fn notify(&self, _completed: TimerMode) -> Result<(), NotifyError> {
        let (player, file) = self.pick().ok_or(NotifyError::NoPlayer)?;
        let mut child = Command::new(player)
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        // Reap without blocking the tick.
        std::thread::spawn(move || child.wait());
        Ok(())
    }
}

/// Fans a cue out to several notifiers. Succeeds if any of them did.
#[derive(Default)]
pub struct CompositeNotifier {
    inner: Vec<Box<dyn Notifier>>,
}

impl CompositeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, notifier: impl Notifier + 'static) -> Self {
        self.inner.push(Box::new(notifier));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Notifier for CompositeNotifier {
    fn notify(&self, completed: TimerMode) -> Result<(), NotifyError> {
        let mut last_err = None;
        let mut delivered = false;
        for notifier in &self.inner {
            match notifier.notify(completed) {
                Ok(()) => delivered = true,
                Err(e) => {
                    debug!(error = %e, "notifier failed");
                    last_err = Some(e);
                }
            }
        }
        match last_err {
            Some(e) if !delivered => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Records every cue; optionally fails after recording.
    #[derive(Clone, Default)]
    pub struct RecordingNotifier {
        pub fired: Arc<Mutex<Vec<TimerMode>>>,
        pub fail: bool,
    }

    impl RecordingNotifier {
        pub fn fired(&self) -> Vec<TimerMode> {
            self.fired.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, completed: TimerMode) -> Result<(), NotifyError> {
            self.fired.lock().unwrap().push(completed);
            if self.fail {
                Err(NotifyError::NoPlayer)
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingNotifier;
    use super::*;

    #[test]
    fn missing_sound_file_reports_no_player() {
        let sound = SoundCommand::with_file("paplay", "/nonexistent/tomato.oga");
        assert!(matches!(
            sound.notify(TimerMode::Work),
            Err(NotifyError::NoPlayer)
        ));
    }

    #[test]
    fn composite_succeeds_when_any_member_succeeds() {
        let failing = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let ok = RecordingNotifier::default();
        let composite = CompositeNotifier::new().push(failing.clone()).push(ok.clone());

        assert!(composite.notify(TimerMode::ShortBreak).is_ok());
        assert_eq!(failing.fired(), vec![TimerMode::ShortBreak]);
        assert_eq!(ok.fired(), vec![TimerMode::ShortBreak]);
    }

    #[test]
    fn composite_fails_when_all_members_fail() {
        let failing = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let composite = CompositeNotifier::new().push(failing);
        assert!(composite.notify(TimerMode::Work).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn sound_command_spawns_player() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ding.wav");
        std::fs::write(&file, b"").unwrap();

        let sound = SoundCommand::with_file("true", &file);
        assert!(sound.notify(TimerMode::Work).is_ok());
        assert!(sound.notify(TimerMode::ShortBreak).is_ok());
    }

    #[test]
    fn empty_composite_is_silent() {
        let composite = CompositeNotifier::new();
        assert!(composite.is_empty());
        assert!(composite.notify(TimerMode::LongBreak).is_ok());
    }
}
