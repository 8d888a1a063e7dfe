//! Command definitions for the PomodoroCat CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::preferences::SettingsInput;
use crate::tray::TrayAction;
use crate::types::CountDirection;

// ============================================================================
// CLI Structure
// ============================================================================

/// PomodoroCat - a Pomodoro timer with a desktop pet
#[derive(Parser, Debug)]
#[command(
    name = "pomodorocat",
    version,
    about = "Pomodoro timer with a desktop pet companion",
    long_about = "Counts work and break intervals and keeps a pet overlay in sync.\n\
                  Run 'pomodorocat run' to start the app, then control it with the other commands.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path of the command socket [default: ~/.pomodorocat/pomodorocat.sock]
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    /// Path of the settings file [default: ~/.pomodorocat/settings.json]
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer app in the foreground
    Run(RunArgs),

    /// Start the timer
    Start,

    /// Pause the timer
    Pause,

    /// Start if paused, pause if running
    Toggle,

    /// Restart the current interval
    Reset,

    /// Show the pet overlay
    Show,

    /// Hide the pet overlay
    Hide,

    /// Show current timer status
    Status,

    /// Count down to zero or count elapsed time up
    Direction {
        /// countdown (down) or countup (up)
        #[arg(value_parser = parse_direction)]
        direction: CountDirection,
    },

    /// Trigger a tray menu item (show-app, start-timer, pause-timer,
    /// show-overlay, hide-overlay, quit)
    Tray {
        /// Menu item id
        #[arg(value_parser = parse_tray_action)]
        action: TrayAction,
    },

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Do not start the pet overlay
    #[arg(long)]
    pub no_overlay: bool,

    /// Log interval completions instead of showing desktop notifications
    #[arg(long)]
    pub no_notify: bool,
}

// ============================================================================
// Settings Subcommands
// ============================================================================

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print the current settings
    Show,

    /// Change one or more settings and notify the running app
    Set(SettingsSetArgs),
}

/// Values for `settings set`. Durations are in minutes.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsSetArgs {
    /// Work duration in minutes
    #[arg(short, long, value_name = "MINUTES")]
    pub work: Option<String>,

    /// Short break duration in minutes
    #[arg(short, long = "break", value_name = "MINUTES")]
    pub break_time: Option<String>,

    /// Long break duration in minutes
    #[arg(short, long, value_name = "MINUTES")]
    pub long_break: Option<String>,

    /// Work sessions before a long break
    #[arg(short, long, value_name = "COUNT")]
    pub sessions: Option<String>,

    /// Overlay skin, e.g. chubby-gray or pixel-calico
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Pet shown on the overlay: cat, dog, bird or rabbit
    #[arg(short, long)]
    pub pet: Option<String>,
}

impl SettingsSetArgs {
    /// Converts to raw settings input. Validation happens on apply.
    pub fn to_input(&self) -> SettingsInput {
        SettingsInput {
            work_time: self.work.clone(),
            break_time: self.break_time.clone(),
            long_break_time: self.long_break.clone(),
            sessions_before_long_break: self.sessions.clone(),
            cat_theme: self.theme.clone(),
            pet_type: self.pet.clone(),
        }
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

fn parse_direction(s: &str) -> Result<CountDirection, String> {
    s.parse()
}

fn parse_tray_action(s: &str) -> Result<TrayAction, String> {
    TrayAction::from_id(s).ok_or_else(|| {
        let ids: Vec<_> = TrayAction::ALL.iter().map(TrayAction::id).collect();
        format!("unknown tray action '{s}' (expected one of: {})", ids.join(", "))
    })
}

// ============================================================================
// Tests
// ============================================================================
