//! Tray menu actions.
//!
//! The tray icon itself is drawn by the host, which reports clicks with
//! `pomodorocat tray <id>`. This module names the menu entries and maps them
//! onto controller commands.

use std::fmt;

use crate::app::AppCommand;
use crate::sync::SurfaceCommand;

// ============================================================================
// TrayAction
// ============================================================================

/// Entries of the tray menu, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrayAction {
    /// Bring the primary window forward
    ShowApp,
    StartTimer,
    PauseTimer,
    ShowOverlay,
    HideOverlay,
    Quit,
}

impl TrayAction {
    pub const ALL: [TrayAction; 6] = [
        TrayAction::ShowApp,
        TrayAction::StartTimer,
        TrayAction::PauseTimer,
        TrayAction::ShowOverlay,
        TrayAction::HideOverlay,
        TrayAction::Quit,
    ];

    /// Menu item identifier.
    pub fn id(&self) -> &'static str {
        match self {
            TrayAction::ShowApp => "show-app",
            TrayAction::StartTimer => "start-timer",
            TrayAction::PauseTimer => "pause-timer",
            TrayAction::ShowOverlay => "show-overlay",
            TrayAction::HideOverlay => "hide-overlay",
            TrayAction::Quit => "quit",
        }
    }

    /// Text shown in the menu.
    pub fn label(&self) -> &'static str {
        match self {
            TrayAction::ShowApp => "Show App",
            TrayAction::StartTimer => "Start Timer",
            TrayAction::PauseTimer => "Pause Timer",
            TrayAction::ShowOverlay => "Show Cat",
            TrayAction::HideOverlay => "Hide Cat",
            TrayAction::Quit => "Quit",
        }
    }

    /// Looks up an action by menu item identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.id() == id)
    }

    /// Returns the controller command for this action.
    ///
    /// `ShowApp` has none: raising the window is the host's job.
    pub fn to_command(&self) -> Option<AppCommand> {
        let command = match self {
            TrayAction::ShowApp => return None,
            TrayAction::StartTimer => AppCommand::Surface(SurfaceCommand::RequestStart),
            TrayAction::PauseTimer => AppCommand::Surface(SurfaceCommand::RequestPause),
            TrayAction::ShowOverlay => AppCommand::Surface(SurfaceCommand::RequestShow),
            TrayAction::HideOverlay => AppCommand::Surface(SurfaceCommand::RequestHide),
            TrayAction::Quit => AppCommand::Quit,
        };
        Some(command)
    }
}

impl fmt::Display for TrayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ============================================================================
// Tests
// ============================================================================
