//! Display text for the primary surface and the tray title.
//!
//! Pure functions over timer state; the rendering layer decides where the
//! text ends up.

use crate::types::{CountDirection, TimerMode, TimerSnapshot};

/// Formats seconds as `MM:SS`. Minutes are not wrapped at 60.
pub fn format_clock(total_seconds: u32) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Heading shown above the clock.
pub fn mode_label(mode: TimerMode) -> &'static str {
    match mode {
        TimerMode::Work => "Work Time",
        TimerMode::Break => "Break Time",
        TimerMode::LongBreak => "Long Break",
    }
}

/// Short badge text for the mode indicator.
pub fn mode_badge(mode: TimerMode) -> &'static str {
    match mode {
        TimerMode::Work => "Work",
        TimerMode::Break => "Break",
        TimerMode::LongBreak => "Long Break",
    }
}

/// Fraction of an interval that has elapsed, in `0.0..=1.0`.
///
/// Count-up has no target, so it always reports `0.0`.
pub fn progress(remaining_seconds: u32, interval_seconds: u32, direction: CountDirection) -> f64 {
    if direction == CountDirection::Countup || interval_seconds == 0 {
        return 0.0;
    }
    let elapsed = interval_seconds.saturating_sub(remaining_seconds);
    (f64::from(elapsed) / f64::from(interval_seconds)).clamp(0.0, 1.0)
}

/// Session counter text, e.g. `2 / 4`.
pub fn session_label(session_count: u32, sessions_before_long_break: u32) -> String {
    format!("{} / {}", session_count, sessions_before_long_break)
}

/// Title for the tray icon, e.g. `🐱 Work 24:59` or `🐱 Paused 24:59`.
pub fn title(snapshot: &TimerSnapshot) -> String {
    let pet = snapshot.pet_type.emoji();
    let clock = format_clock(snapshot.remaining_seconds);
    if snapshot.is_running {
        format!("{} {} {}", pet, mode_badge(snapshot.mode), clock)
    } else {
        format!("{} Paused {}", pet, clock)
    }
}
