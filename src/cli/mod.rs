//! CLI module for PomodoroCat.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `client`: IPC client for the running app
//! - `display`: Output formatting and display logic

pub mod client;
pub mod commands;
pub mod display;

pub use client::IpcClient;
pub use commands::{Cli, Commands, RunArgs, SettingsCommand, SettingsSetArgs};
pub use display::Display;
