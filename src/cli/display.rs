//! Display utilities for the PomodoroCat CLI.
//!
//! This module provides formatted output for:
//! - Command results
//! - Status display
//! - Settings
//! - Error messages

use std::path::Path;

use crate::engine::display::{format_clock, mode_label, progress, session_label, title};
use crate::preferences::Settings;
use crate::types::{CountDirection, IpcResponse, TimerSnapshot};

/// Width of the status progress bar in characters.
const PROGRESS_WIDTH: usize = 20;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the result of a control command.
    pub fn show_command_result(response: &IpcResponse) {
        println!("{}", response.message);
        if let Some(data) = &response.data {
            println!("  {}", Self::clock_line(data));
        }
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        println!("PomodoroCat status");
        println!("─────────────────────────────");

        match &response.data {
            Some(data) => {
                for line in Self::status_lines(data) {
                    println!("{}", line);
                }
            }
            None => println!("No timer data"),
        }
    }

    /// Shows the settings stored at `path`.
    pub fn show_settings(settings: &Settings, path: &Path) {
        println!("Settings ({})", path.display());
        for line in Self::settings_lines(settings) {
            println!("  {}", line);
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Shows a note that does not stop the command.
    pub fn show_note(message: &str) {
        eprintln!("Note: {}", message);
    }

    fn clock_line(data: &TimerSnapshot) -> String {
        let label = match data.direction {
            CountDirection::Countdown => "Remaining",
            CountDirection::Countup => "Elapsed",
        };
        format!("{}: {}", label, format_clock(data.remaining_seconds))
    }

    fn status_lines(data: &TimerSnapshot) -> Vec<String> {
        let state = if data.is_running { "Running" } else { "Paused" };
        let mut lines = vec![
            format!("Title: {}", title(data)),
            format!("Mode: {}", mode_label(data.mode)),
            format!("State: {}", state),
            Self::clock_line(data),
        ];

        if data.direction == CountDirection::Countdown {
            let ratio = progress(data.remaining_seconds, data.interval_seconds, data.direction);
            lines.push(format!("Progress: {}", Self::progress_bar(ratio)));
        }

        lines.push(format!(
            "Session: {}",
            session_label(data.session_count, data.sessions_before_long_break)
        ));
        lines.push(format!(
            "Break total: {}",
            format_clock(u32::try_from(data.accumulated_break_seconds).unwrap_or(u32::MAX))
        ));
        lines.push(format!("Direction: {}", data.direction));
        lines.push(format!(
            "Pet: {} {} ({})",
            data.pet_type.emoji(),
            data.pet_type,
            data.theme
        ));
        lines
    }

    fn settings_lines(settings: &Settings) -> Vec<String> {
        vec![
            format!("Work: {} min", settings.work_time),
            format!("Break: {} min", settings.break_time),
            format!("Long break: {} min", settings.long_break_time),
            format!(
                "Sessions before long break: {}",
                settings.sessions_before_long_break
            ),
            format!("Theme: {}", settings.cat_theme),
            format!("Pet: {}", settings.pet_type),
        ]
    }

    fn progress_bar(ratio: f64) -> String {
        let filled = ((ratio * PROGRESS_WIDTH as f64).round() as usize).min(PROGRESS_WIDTH);
        format!(
            "[{}{}] {:>3.0}%",
            "#".repeat(filled),
            "-".repeat(PROGRESS_WIDTH - filled),
            ratio * 100.0
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
