//! Settings error types.

use thiserror::Error;

/// Errors raised while reading, validating or writing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A value was rejected at the input boundary.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// The settings file could not be read or written.
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file exists but is not a JSON object.
    #[error("settings file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl SettingsError {
    /// Builds an `InvalidValue` error.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error came from user input rather than storage.
    #[must_use]
    pub fn is_invalid_value(&self) -> bool {
        matches!(self, Self::InvalidValue { .. })
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidValue { .. } => "durations and session counts must be positive whole numbers",
            Self::Io(_) => "check that the settings directory is writable",
            Self::Corrupt(_) => "delete the settings file to restore the defaults",
        }
    }
}
