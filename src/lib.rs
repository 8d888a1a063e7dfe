//! PomodoroCat Library
//!
//! This library provides the core functionality for PomodoroCat, a Pomodoro
//! timer with a desktop pet overlay. It includes:
//! - Timer engine with work/break transitions and both counting directions
//! - State synchronization between the primary surface and the pet overlay
//! - Durable preferences with per-key fallback
//! - The primary surface controller that owns all of the above
//! - IPC server/client and CLI command parsing
//! - Tray menu actions and desktop notifications

pub mod app;
pub mod cli;
pub mod engine;
pub mod ipc;
pub mod notify;
pub mod preferences;
pub mod sync;
pub mod tray;
pub mod types;

// Re-export commonly used types for convenience
pub use app::{App, AppCommand};
pub use engine::{TimerEngine, TimerEvent};
pub use notify::{BackgroundNotifier, DesktopNotifier, LogNotifier, MockNotifier, Notifier};
pub use preferences::{JsonFileStore, MemoryStore, PreferencesStore, Settings, SettingsError};
pub use sync::{OverlayMessage, OverlayVisual, SurfaceCommand, SyncBridge};
pub use tray::TrayAction;
pub use types::{
    CountDirection, IpcRequest, IpcResponse, PetType, TimerConfig, TimerMode, TimerSnapshot,
    TimerState,
};
