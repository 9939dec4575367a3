//! Plain text rendering of the countdown.
//!
//! Only `Frame` plus the theme/layout selectors feed the picture; the
//! counters come from the engine for the status rows.

use tomato_core::{Frame, TimerEngine, TimerMode};

const BAR_WIDTH: usize = 30;

/// Glyphs for (remaining, spent) cells.
fn glyphs(theme: &str) -> (char, char) {
    match theme {
        "liquid" => ('█', '░'),
        "erosion" => ('▓', '·'),
        _ => ('■', '□'),
    }
}

/// `MM:SS`, minutes unbounded.
pub fn clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// A bar whose filled part shrinks as the interval runs down.
pub fn bar(frame: &Frame, theme: &str, width: usize) -> String {
    let (full, empty) = glyphs(theme);
    let remaining = 1.0 - frame.progress();
    let filled = ((remaining * width as f64).ceil() as usize).min(width);
    let mut out = String::with_capacity(width * 3);
    out.extend(std::iter::repeat(full).take(filled));
    out.extend(std::iter::repeat(empty).take(width - filled));
    out
}

fn mode_tag(mode: TimerMode) -> &'static str {
    match mode {
        TimerMode::Work => "FOCUS",
        TimerMode::ShortBreak => "SHORT BREAK",
        TimerMode::LongBreak => "LONG BREAK",
    }
}

/// Lines of the interactive display.
pub fn lines(engine: &TimerEngine, status: &str) -> Vec<String> {
    let frame = engine.frame();
    let settings = engine.settings();
    let state = if engine.is_active() { "running" } else { "paused" };

    let daily = format!(
        "today {} / {}{}",
        engine.daily_completed(),
        settings.daily_goal,
        if engine.goal_reached() { "  GOAL REACHED" } else { "" }
    );
    let sets = format!(
        "sets {} / {}",
        engine.sets_since_long_break(),
        settings.long_break_interval
    );

    let mut out = vec![
        format!("{}  ({state})", mode_tag(frame.mode)),
        String::new(),
        format!("  {}", clock(frame.time_left)),
        format!("  {}", bar(&frame, &settings.visual_theme, BAR_WIDTH)),
        String::new(),
    ];
    if settings.layout == "horizontal" {
        out.push(format!("{daily}    {sets}"));
    } else {
        out.push(daily);
        out.push(sets);
    }
    out.push(String::new());
    out.push("[space] start/pause  [r] reset  [s] skip  [1/2/3] mode  [q] quit".into());
    out.push(status.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tomato_core::{DailyLedger, TimerSettings};

    fn frame(time_left: u64, total: u64) -> Frame {
        Frame {
            time_left,
            total_duration: total,
            mode: TimerMode::Work,
        }
    }

    #[test]
    fn clock_formats_minutes_and_seconds() {
        assert_eq!(clock(1500), "25:00");
        assert_eq!(clock(61), "01:01");
        assert_eq!(clock(0), "00:00");
        assert_eq!(clock(5400), "90:00");
    }

    #[test]
    fn bar_depletes() {
        assert_eq!(bar(&frame(10, 10), "memory", 10), "■■■■■■■■■■");
        assert_eq!(bar(&frame(5, 10), "memory", 10), "■■■■■□□□□□");
        assert_eq!(bar(&frame(0, 10), "liquid", 4), "░░░░");
    }

    #[test]
    fn unknown_theme_falls_back() {
        assert_eq!(bar(&frame(1, 1), "nope", 2), "■■");
    }

    #[test]
    fn layout_controls_status_rows() {
        let mut settings = TimerSettings::default();
        let engine = TimerEngine::new(settings.clone(), DailyLedger::in_memory());
        let vertical = lines(&engine, "");

        settings.layout = "horizontal".into();
        let engine = TimerEngine::new(settings, DailyLedger::in_memory());
        let horizontal = lines(&engine, "");

        assert_eq!(vertical.len(), horizontal.len() + 1);
        assert!(vertical[0].starts_with("FOCUS"));
        assert_eq!(vertical[2], "  25:00");
    }
}
