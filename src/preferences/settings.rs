//! User settings: the persisted, minute-based form of `TimerConfig`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{PetType, TimerConfig, DEFAULT_THEME};

use super::error::SettingsError;
use super::store::PreferencesStore;

/// Store keys, as written to the settings file.
pub mod keys {
    pub const WORK_TIME: &str = "workTime";
    pub const BREAK_TIME: &str = "breakTime";
    pub const LONG_BREAK_TIME: &str = "longBreakTime";
    pub const SESSIONS_BEFORE_LONG_BREAK: &str = "sessionsBeforeLongBreak";
    pub const CAT_THEME: &str = "catTheme";
    pub const PET_TYPE: &str = "petType";
}

// ============================================================================
// Settings
// ============================================================================

/// Persisted preferences. Durations are in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub work_time: u32,
    pub break_time: u32,
    pub long_break_time: u32,
    pub sessions_before_long_break: u32,
    pub cat_theme: String,
    pub pet_type: PetType,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_time: 25,
            break_time: 5,
            long_break_time: 15,
            sessions_before_long_break: 4,
            cat_theme: DEFAULT_THEME.to_string(),
            pet_type: PetType::Cat,
        }
    }
}

impl Settings {
    /// Converts to the engine's configuration, minutes to seconds.
    pub fn to_timer_config(&self) -> Result<TimerConfig, SettingsError> {
        let config = TimerConfig {
            work_duration: minutes_to_seconds(keys::WORK_TIME, self.work_time)?,
            break_duration: minutes_to_seconds(keys::BREAK_TIME, self.break_time)?,
            long_break_duration: minutes_to_seconds(keys::LONG_BREAK_TIME, self.long_break_time)?,
            sessions_before_long_break: self.sessions_before_long_break,
            pet_type: self.pet_type,
            theme: self.cat_theme.clone(),
        };

        config
            .validate()
            .map_err(|(field, reason)| SettingsError::invalid(field, reason))?;
        Ok(config)
    }

    /// Checks every value without building a config.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.to_timer_config().map(|_| ())
    }
}

fn minutes_to_seconds(field: &str, minutes: u32) -> Result<u32, SettingsError> {
    minutes
        .checked_mul(60)
        .ok_or_else(|| SettingsError::invalid(field, format!("{minutes} minutes is too long")))
}

// ============================================================================
// Load / Save
// ============================================================================

/// Loads settings, falling back to the default for every key that is
/// missing, unreadable or invalid. Never fails.
pub fn load_settings(store: &dyn PreferencesStore) -> Settings {
    let defaults = Settings::default();

    Settings {
        work_time: load_key(store, keys::WORK_TIME, defaults.work_time, positive_minutes),
        break_time: load_key(store, keys::BREAK_TIME, defaults.break_time, positive_minutes),
        long_break_time: load_key(
            store,
            keys::LONG_BREAK_TIME,
            defaults.long_break_time,
            positive_minutes,
        ),
        sessions_before_long_break: load_key(
            store,
            keys::SESSIONS_BEFORE_LONG_BREAK,
            defaults.sessions_before_long_break,
            positive_count,
        ),
        cat_theme: load_key(store, keys::CAT_THEME, defaults.cat_theme, theme_name),
        pet_type: load_key(store, keys::PET_TYPE, defaults.pet_type, pet_name),
    }
}

/// Validates and writes every setting to the store in a single write.
///
/// On error the store keeps its previous contents.
pub fn save_settings(store: &mut dyn PreferencesStore, settings: &Settings) -> Result<(), SettingsError> {
    settings.validate()?;

    let mut entries = Map::new();
    entries.insert(keys::WORK_TIME.to_string(), Value::from(settings.work_time));
    entries.insert(keys::BREAK_TIME.to_string(), Value::from(settings.break_time));
    entries.insert(
        keys::LONG_BREAK_TIME.to_string(),
        Value::from(settings.long_break_time),
    );
    entries.insert(
        keys::SESSIONS_BEFORE_LONG_BREAK.to_string(),
        Value::from(settings.sessions_before_long_break),
    );
    entries.insert(keys::CAT_THEME.to_string(), Value::from(settings.cat_theme.as_str()));
    entries.insert(keys::PET_TYPE.to_string(), Value::from(settings.pet_type.as_str()));
    store.set_many(entries)?;

    tracing::info!(
        work_minutes = settings.work_time,
        break_minutes = settings.break_time,
        long_break_minutes = settings.long_break_time,
        sessions = settings.sessions_before_long_break,
        "settings saved"
    );
    Ok(())
}

fn load_key<T>(
    store: &dyn PreferencesStore,
    key: &str,
    default: T,
    decode: fn(&Value) -> Option<T>,
) -> T {
    match store.get(key) {
        Ok(Some(value)) => decode(&value).unwrap_or_else(|| {
            tracing::warn!(key, %value, "invalid stored setting, using default");
            default
        }),
        Ok(None) => default,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to load setting, using default");
            default
        }
    }
}

fn positive_minutes(value: &Value) -> Option<u32> {
    let minutes = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    let minutes = u32::try_from(minutes).ok().filter(|m| *m > 0)?;
    minutes.checked_mul(60).map(|_| minutes)
}

fn positive_count(value: &Value) -> Option<u32> {
    let count = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    count.filter(|n| *n > 0)
}

fn theme_name(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn pet_name(value: &Value) -> Option<PetType> {
    value.as_str().and_then(|s| s.parse().ok())
}

// ============================================================================
// SettingsInput
// ============================================================================

/// Raw, unvalidated values from a settings form or the command line.
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsInput {
    pub work_time: Option<String>,
    pub break_time: Option<String>,
    pub long_break_time: Option<String>,
    pub sessions_before_long_break: Option<String>,
    pub cat_theme: Option<String>,
    pub pet_type: Option<String>,
}

impl SettingsInput {
    /// Parses the input on top of the defaults.
    pub fn parse(&self) -> Result<Settings, SettingsError> {
        self.apply_to(&Settings::default())
    }

    /// Parses the input on top of `base`. Rejects non-numeric and
    /// non-positive numbers.
    pub fn apply_to(&self, base: &Settings) -> Result<Settings, SettingsError> {
        let mut settings = base.clone();

        if let Some(raw) = &self.work_time {
            settings.work_time = parse_positive(keys::WORK_TIME, raw)?;
        }
        if let Some(raw) = &self.break_time {
            settings.break_time = parse_positive(keys::BREAK_TIME, raw)?;
        }
        if let Some(raw) = &self.long_break_time {
            settings.long_break_time = parse_positive(keys::LONG_BREAK_TIME, raw)?;
        }
        if let Some(raw) = &self.sessions_before_long_break {
            settings.sessions_before_long_break =
                parse_positive(keys::SESSIONS_BEFORE_LONG_BREAK, raw)?;
        }
        if let Some(raw) = &self.cat_theme {
            let theme = raw.trim();
            if theme.is_empty() {
                return Err(SettingsError::invalid(keys::CAT_THEME, "theme name must not be empty"));
            }
            settings.cat_theme = theme.to_string();
        }
        if let Some(raw) = &self.pet_type {
            settings.pet_type = raw
                .parse()
                .map_err(|e: String| SettingsError::invalid(keys::PET_TYPE, e))?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_positive(field: &str, raw: &str) -> Result<u32, SettingsError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| SettingsError::invalid(field, format!("'{}' is not a whole number", raw.trim())))?;

    if value <= 0 {
        return Err(SettingsError::invalid(field, "must be greater than zero"));
    }

    u32::try_from(value).map_err(|_| SettingsError::invalid(field, format!("{value} is too large")))
}

// ============================================================================
// Tests
// ============================================================================
