//! Durable user preferences.
//!
//! - `store`: the key-value store trait with file and in-memory backends
//! - `settings`: typed settings with per-key fallback on load
//! - `error`: settings errors

pub mod error;
pub mod settings;
pub mod store;

pub use error::SettingsError;
pub use settings::{keys, load_settings, save_settings, Settings, SettingsInput};
pub use store::{JsonFileStore, MemoryStore, PreferencesStore};
