use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use clap::Args;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event as CtEvent, KeyCode, KeyEvent,
    KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tokio::sync::mpsc;
use tracing::{info, warn};

use tomato_core::platform::{
    CompositeNotifier, InhibitorWakeLock, SilentNotifier, SoundCommand, TerminalBell,
};
use tomato_core::storage::data_dir;
use tomato_core::{
    ClockDriver, Config, DailyLedger, Database, Event, Notifier, Session, TimerEngine, TimerMode,
    WakeLockManager,
};

use crate::{logging, render};

#[derive(Args)]
pub struct RunArgs {
    /// Print events as JSON lines instead of drawing the display
    #[arg(long)]
    headless: bool,

    /// Stop after this many completed work intervals (headless only)
    #[arg(long, requires = "headless")]
    cycles: Option<u32>,

    /// Tick period in milliseconds
    #[arg(long, hide = true, default_value_t = 1000)]
    tick_millis: u64,
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Reset,
    Skip,
    Mode(TimerMode),
    Quit,
}

pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Command::Toggle),
        KeyCode::Char('r') => Some(Command::Reset),
        KeyCode::Char('s') => Some(Command::Skip),
        KeyCode::Char('1') => Some(Command::Mode(TimerMode::Work)),
        KeyCode::Char('2') => Some(Command::Mode(TimerMode::ShortBreak)),
        KeyCode::Char('3') => Some(Command::Mode(TimerMode::LongBreak)),
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

/// Apply a non-quit command to the session.
pub fn apply(session: &mut Session, command: Command) -> Option<Event> {
    match command {
        Command::Toggle => Some(session.toggle()),
        Command::Reset => Some(session.reset()),
        Command::Skip => Some(session.skip()),
        Command::Mode(mode) => Some(session.set_mode(mode)),
        Command::Quit => None,
    }
}

pub fn run(args: RunArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if args.headless {
        logging::init_stderr(verbose);
    } else {
        logging::init_file(verbose, &data_dir()?.join("tomato.log"))?;
    }

    let config = Config::load()?;
    config.timer_settings().validate()?;
    let session = build_session(&config, Duration::from_millis(args.tick_millis.max(1)))?;
    let watcher = ConfigWatcher::new(Config::path()?);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(async move {
        if args.headless {
            run_headless(session, watcher, args.cycles).await
        } else {
            run_interactive(session, watcher).await
        }
    })
}

fn build_session(
    config: &Config,
    period: Duration,
) -> Result<Session, Box<dyn std::error::Error>> {
    let ledger = DailyLedger::new(Database::open()?);
    let wake_lock = if config.wake_lock.enabled {
        WakeLockManager::new(Box::new(InhibitorWakeLock::new()))
    } else {
        WakeLockManager::disabled()
    };
    let engine = TimerEngine::new(config.timer_settings(), ledger).with_wake_lock(wake_lock);
    let engine = match notifier(config) {
        Some(notifier) => engine.with_notifier(notifier),
        None => engine.with_notifier(SilentNotifier),
    };
    let (clock, ticks) = ClockDriver::with_period(period);
    Ok(Session::with_clock(engine, clock, ticks))
}

fn notifier(config: &Config) -> Option<impl Notifier> {
    let cfg = &config.notifications;
    if !cfg.enabled {
        return None;
    }
    let mut notifier = CompositeNotifier::new();
    if cfg.bell {
        notifier = notifier.push(TerminalBell);
    }
    if cfg.sound {
        notifier = match &cfg.sound_file {
            Some(file) => notifier.push(SoundCommand::with_file(&cfg.sound_player, file)),
            None => notifier.push(SoundCommand::system_default()),
        };
    }
    Some(notifier)
}

/// Picks up edits to the config file made while the timer runs.
struct ConfigWatcher {
    path: PathBuf,
    seen: Option<SystemTime>,
}

impl ConfigWatcher {
    const POLL: Duration = Duration::from_secs(2);

    fn new(path: PathBuf) -> Self {
        let seen = Self::modified(&path);
        Self { path, seen }
    }

    fn modified(path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    /// The new config, if the file changed and still holds valid settings.
    fn poll(&mut self) -> Option<Config> {
        let modified = Self::modified(&self.path);
        if modified == self.seen {
            return None;
        }
        self.seen = modified;
        let config = match Config::load_from(&self.path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable config change");
                return None;
            }
        };
        if let Err(e) = config.timer_settings().validate() {
            warn!(error = %e, "ignoring invalid config change");
            return None;
        }
        info!("config reloaded");
        Some(config)
    }
}

fn print_json(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, event)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

async fn run_headless(
    mut session: Session,
    mut watcher: ConfigWatcher,
    cycles: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reload = tokio::time::interval(ConfigWatcher::POLL);
    let mut completed_work = 0u32;

    print_json(&session.toggle())?;
    loop {
        tokio::select! {
            tick = session.next_tick() => {
                if tick.is_none() {
                    break;
                }
                let Some(event) = session.on_tick() else {
                    continue;
                };
                print_json(&event)?;
                if matches!(event, Event::TimerCompleted { completed: TimerMode::Work, .. }) {
                    completed_work += 1;
                }
                if cycles.is_some_and(|n| completed_work >= n) {
                    break;
                }
                print_json(&session.toggle())?;
            }
            _ = reload.tick() => {
                if let Some(config) = watcher.poll() {
                    print_json(&session.update_settings(config.timer_settings()))?;
                }
            }
        }
    }
    print_json(&session.engine().snapshot())
}

enum Input {
    Key(KeyEvent),
    Focus(bool),
    Resize,
}

/// Blocking crossterm reader on its own thread, forwarding into the loop.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<Input> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || loop {
        let input = match event::read() {
            Ok(CtEvent::Key(key)) => Input::Key(key),
            Ok(CtEvent::FocusGained) => Input::Focus(true),
            Ok(CtEvent::FocusLost) => Input::Focus(false),
            Ok(CtEvent::Resize(_, _)) => Input::Resize,
            Ok(_) => continue,
            Err(_) => break,
        };
        if tx.send(input).is_err() {
            break;
        }
    });
    rx
}

/// Raw mode and alternate screen for as long as it lives.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide, EnableFocusChange)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableFocusChange, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn draw(session: &Session, status: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    queue!(out, Clear(ClearType::All))?;
    for (row, line) in render::lines(session.engine(), status).iter().enumerate() {
        queue!(out, MoveTo(2, row as u16 + 1))?;
        out.write_all(line.as_bytes())?;
    }
    out.flush()
}

fn describe(event: &Event) -> String {
    match event {
        Event::TimerCompleted { completed, next, .. } => {
            format!("{completed} finished, {next} is next")
        }
        Event::TimerSkipped { from, to, .. } => format!("skipped {from}, {to} is next"),
        Event::TimerReset { mode, .. } => format!("{mode} reset"),
        Event::ModeChanged { mode, .. } => format!("switched to {mode}"),
        Event::SettingsUpdated { applied_now: false, .. } => {
            "settings saved, applied from the next interval".into()
        }
        Event::SettingsUpdated { .. } => "settings applied".into(),
        _ => String::new(),
    }
}

async fn run_interactive(
    mut session: Session,
    mut watcher: ConfigWatcher,
) -> Result<(), Box<dyn std::error::Error>> {
    let _guard = TerminalGuard::enter()?;
    let mut input = spawn_input_reader();
    let mut reload = tokio::time::interval(ConfigWatcher::POLL);
    let mut status = String::new();

    draw(&session, &status)?;
    loop {
        tokio::select! {
            tick = session.next_tick() => {
                if tick.is_none() {
                    break;
                }
                if let Some(event) = session.on_tick() {
                    status = describe(&event);
                }
            }
            received = input.recv() => match received {
                None => break,
                Some(Input::Key(key)) => match command_for(key) {
                    Some(Command::Quit) => break,
                    Some(command) => {
                        if let Some(event) = apply(&mut session, command) {
                            status = describe(&event);
                        }
                    }
                    None => continue,
                },
                Some(Input::Focus(visible)) => session.on_visibility_change(visible),
                Some(Input::Resize) => {}
            },
            _ = reload.tick() => {
                match watcher.poll() {
                    Some(config) => status = describe(&session.update_settings(config.timer_settings())),
                    None => continue,
                }
            }
        }
        draw(&session, &status)?;
    }
    Ok(())
}
