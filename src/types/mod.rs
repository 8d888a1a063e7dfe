//! Core data types for PomodoroCat.
//!
//! This module defines the data structures used for:
//! - Timer configuration with validation
//! - Timer state and its interval transitions
//! - Status snapshots and IPC request/response serialization

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// TimerMode
// ============================================================================

/// The interval type that is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    /// Focused work interval
    #[default]
    Work,
    /// Short break between work intervals
    Break,
    /// Long break after a full set of sessions
    LongBreak,
}

impl TimerMode {
    /// Returns the wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::Break => "break",
            TimerMode::LongBreak => "longBreak",
        }
    }

    /// Returns true for `Break` and `LongBreak`.
    pub fn is_break(&self) -> bool {
        !matches!(self, TimerMode::Work)
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CountDirection
// ============================================================================

/// Direction of time progression within an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountDirection {
    /// Counts the remaining time down to zero, then switches interval
    #[default]
    Countdown,
    /// Counts elapsed time up without ever completing on its own
    Countup,
}

impl CountDirection {
    /// Returns the wire name of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            CountDirection::Countdown => "countdown",
            CountDirection::Countup => "countup",
        }
    }
}

impl fmt::Display for CountDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "countdown" | "down" => Ok(CountDirection::Countdown),
            "countup" | "up" | "reverse" => Ok(CountDirection::Countup),
            other => Err(format!("unknown count direction: {other}")),
        }
    }
}

// ============================================================================
// PetType
// ============================================================================

/// The companion shown on the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    #[default]
    Cat,
    Dog,
    Bird,
    Rabbit,
}

impl PetType {
    /// All selectable pets, in menu order.
    pub const ALL: [PetType; 4] = [PetType::Cat, PetType::Dog, PetType::Bird, PetType::Rabbit];

    /// Returns the wire name of the pet.
    pub fn as_str(&self) -> &'static str {
        match self {
            PetType::Cat => "cat",
            PetType::Dog => "dog",
            PetType::Bird => "bird",
            PetType::Rabbit => "rabbit",
        }
    }

    /// Emoji used in titles and log lines.
    pub fn emoji(&self) -> &'static str {
        match self {
            PetType::Cat => "🐱",
            PetType::Dog => "🐶",
            PetType::Bird => "🐦",
            PetType::Rabbit => "🐰",
        }
    }
}

impl fmt::Display for PetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cat" => Ok(PetType::Cat),
            "dog" => Ok(PetType::Dog),
            "bird" => Ok(PetType::Bird),
            "rabbit" => Ok(PetType::Rabbit),
            other => Err(format!("unknown pet type: {other}")),
        }
    }
}

// ============================================================================
// TimerConfig
// ============================================================================

/// Default overlay skin.
pub const DEFAULT_THEME: &str = "chubby-gray";

/// Configuration for the timer engine. Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    pub work_duration: u32,
    pub break_duration: u32,
    pub long_break_duration: u32,
    /// Work intervals completed before a long break is due
    pub sessions_before_long_break: u32,
    pub pet_type: PetType,
    /// Visual skin name, e.g. `chubby-gray` or `pixel-calico`
    pub theme: String,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_duration: 25 * 60,
            break_duration: 5 * 60,
            long_break_duration: 15 * 60,
            sessions_before_long_break: 4,
            pet_type: PetType::Cat,
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

impl TimerConfig {
    /// Sets the work duration in seconds.
    pub fn with_work_duration(mut self, seconds: u32) -> Self {
        self.work_duration = seconds;
        self
    }

    /// Sets the short break duration in seconds.
    pub fn with_break_duration(mut self, seconds: u32) -> Self {
        self.break_duration = seconds;
        self
    }

    /// Sets the long break duration in seconds.
    pub fn with_long_break_duration(mut self, seconds: u32) -> Self {
        self.long_break_duration = seconds;
        self
    }

    /// Sets the number of work sessions before a long break.
    pub fn with_sessions_before_long_break(mut self, sessions: u32) -> Self {
        self.sessions_before_long_break = sessions;
        self
    }

    /// Returns the configured length of `mode` in seconds.
    pub fn duration_for(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Work => self.work_duration,
            TimerMode::Break => self.break_duration,
            TimerMode::LongBreak => self.long_break_duration,
        }
    }

    /// Validates the configuration.
    ///
    /// Returns the offending field and a reason if validation fails.
    pub fn validate(&self) -> Result<(), (&'static str, String)> {
        if self.work_duration == 0 {
            return Err(("workTime", "work duration must be greater than zero".to_string()));
        }
        if self.break_duration == 0 {
            return Err(("breakTime", "break duration must be greater than zero".to_string()));
        }
        if self.long_break_duration == 0 {
            return Err((
                "longBreakTime",
                "long break duration must be greater than zero".to_string(),
            ));
        }
        if self.sessions_before_long_break == 0 {
            return Err((
                "sessionsBeforeLongBreak",
                "at least one session is required before a long break".to_string(),
            ));
        }
        if self.theme.trim().is_empty() {
            return Err(("catTheme", "theme name must not be empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// The authoritative timer state. Only `TimerEngine` mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub mode: TimerMode,
    /// Seconds left (countdown) or seconds elapsed (count-up)
    pub remaining_seconds: u32,
    pub is_running: bool,
    /// 1-based index of the current work session within the set
    pub session_count: u32,
    pub accumulated_break_seconds: u64,
    pub direction: CountDirection,
}

impl TimerState {
    /// Creates the initial state: a paused work interval at session 1.
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            mode: TimerMode::Work,
            remaining_seconds: config.work_duration,
            is_running: false,
            session_count: 1,
            accumulated_break_seconds: 0,
            direction: CountDirection::Countdown,
        }
    }

    /// Returns the value the counter starts from for the current mode.
    ///
    /// Countdown starts from the configured duration, count-up from zero.
    pub fn origin(&self, config: &TimerConfig) -> u32 {
        match self.direction {
            CountDirection::Countdown => config.duration_for(self.mode),
            CountDirection::Countup => 0,
        }
    }

    /// Moves the counter by one second in the current direction.
    ///
    /// Returns true if a countdown has reached zero.
    pub fn advance(&mut self) -> bool {
        match self.direction {
            CountDirection::Countdown => {
                self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
                self.remaining_seconds == 0
            }
            CountDirection::Countup => {
                self.remaining_seconds = self.remaining_seconds.saturating_add(1);
                false
            }
        }
    }

    /// Switches to the interval that follows the current one.
    ///
    /// Returns the mode that just completed. The caller is responsible for
    /// stopping the tick and signalling completion.
    pub fn enter_next_interval(&mut self, config: &TimerConfig) -> TimerMode {
        let completed = self.mode;
        match completed {
            TimerMode::Work => {
                self.session_count += 1;
                if self.session_count > config.sessions_before_long_break {
                    self.mode = TimerMode::LongBreak;
                    self.session_count = 1;
                } else {
                    self.mode = TimerMode::Break;
                }
            }
            TimerMode::Break | TimerMode::LongBreak => {
                self.accumulated_break_seconds += u64::from(config.duration_for(completed));
                self.mode = TimerMode::Work;
            }
        }
        self.remaining_seconds = config.duration_for(self.mode);
        self.is_running = false;
        completed
    }
}

// ============================================================================
// TimerSnapshot
// ============================================================================

/// Serializable view of the timer used for status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub remaining_seconds: u32,
    /// Configured length of the current mode
    pub interval_seconds: u32,
    pub is_running: bool,
    pub session_count: u32,
    pub sessions_before_long_break: u32,
    pub accumulated_break_seconds: u64,
    pub direction: CountDirection,
    pub theme: String,
    pub pet_type: PetType,
}

impl TimerSnapshot {
    /// Builds a snapshot from the engine's state and configuration.
    pub fn capture(state: &TimerState, config: &TimerConfig) -> Self {
        Self {
            mode: state.mode,
            remaining_seconds: state.remaining_seconds,
            interval_seconds: config.duration_for(state.mode),
            is_running: state.is_running,
            session_count: state.session_count,
            sessions_before_long_break: config.sessions_before_long_break,
            accumulated_break_seconds: state.accumulated_break_seconds,
            direction: state.direction,
            theme: config.theme.clone(),
            pet_type: config.pet_type,
        }
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from a client (CLI, tray helper) to the running app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum IpcRequest {
    /// start-timer
    Start,
    /// pause-timer
    Pause,
    /// Start if paused, pause if running
    Toggle,
    /// Restart the current interval
    Reset,
    /// show-overlay
    Show,
    /// hide-overlay
    Hide,
    /// Switch between countdown and count-up
    Direction { direction: CountDirection },
    /// settings-updated: reload the settings file and apply it
    SettingsUpdated,
    /// A tray menu click, by menu item id (e.g. "start-timer", "quit")
    Tray { action: String },
    /// Query the current status
    Status,
}

/// IPC response from the running app to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Timer snapshot taken after the command was applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TimerSnapshot>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<TimerSnapshot>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true if the request was accepted.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Enum Tests
    // ------------------------------------------------------------------------

    mod enum_tests {
        use super::*;

        #[test]
        fn test_mode_wire_names() {
            assert_eq!(serde_json::to_string(&TimerMode::Work).unwrap(), "\"work\"");
            assert_eq!(serde_json::to_string(&TimerMode::Break).unwrap(), "\"break\"");
            assert_eq!(
                serde_json::to_string(&TimerMode::LongBreak).unwrap(),
                "\"longBreak\""
            );
            assert_eq!(TimerMode::LongBreak.as_str(), "longBreak");
        }

        #[test]
        fn test_mode_is_break() {
            assert!(!TimerMode::Work.is_break());
            assert!(TimerMode::Break.is_break());
            assert!(TimerMode::LongBreak.is_break());
        }

        #[test]
        fn test_direction_from_str() {
            assert_eq!("countdown".parse::<CountDirection>(), Ok(CountDirection::Countdown));
            assert_eq!("CountUp".parse::<CountDirection>(), Ok(CountDirection::Countup));
            assert_eq!("reverse".parse::<CountDirection>(), Ok(CountDirection::Countup));
            assert!("sideways".parse::<CountDirection>().is_err());
        }

        #[test]
        fn test_pet_type_from_str() {
            for pet in PetType::ALL {
                assert_eq!(pet.as_str().parse::<PetType>(), Ok(pet));
            }
            assert!("hamster".parse::<PetType>().is_err());
        }

        #[test]
        fn test_pet_type_default_is_cat() {
            assert_eq!(PetType::default(), PetType::Cat);
        }
    }

    // ------------------------------------------------------------------------
    // TimerConfig Tests
    // ------------------------------------------------------------------------

    mod timer_config_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let config = TimerConfig::default();
            assert_eq!(config.work_duration, 1500);
            assert_eq!(config.break_duration, 300);
            assert_eq!(config.long_break_duration, 900);
            assert_eq!(config.sessions_before_long_break, 4);
            assert_eq!(config.theme, "chubby-gray");
            assert_eq!(config.pet_type, PetType::Cat);
        }

        #[test]
        fn test_duration_for() {
            let config = TimerConfig::default();
            assert_eq!(config.duration_for(TimerMode::Work), 1500);
            assert_eq!(config.duration_for(TimerMode::Break), 300);
            assert_eq!(config.duration_for(TimerMode::LongBreak), 900);
        }

        #[test]
        fn test_validate_rejects_zero_durations() {
            let cases = [
                (TimerConfig::default().with_work_duration(0), "workTime"),
                (TimerConfig::default().with_break_duration(0), "breakTime"),
                (TimerConfig::default().with_long_break_duration(0), "longBreakTime"),
                (
                    TimerConfig::default().with_sessions_before_long_break(0),
                    "sessionsBeforeLongBreak",
                ),
            ];
            for (config, field) in cases {
                let (bad, _) = config.validate().unwrap_err();
                assert_eq!(bad, field);
            }
        }

        #[test]
        fn test_validate_rejects_blank_theme() {
            let config = TimerConfig {
                theme: "  ".to_string(),
                ..TimerConfig::default()
            };
            assert_eq!(config.validate().unwrap_err().0, "catTheme");
        }

        #[test]
        fn test_validate_minimum_values() {
            let config = TimerConfig::default()
                .with_work_duration(1)
                .with_break_duration(1)
                .with_long_break_duration(1)
                .with_sessions_before_long_break(1);
            assert!(config.validate().is_ok());
        }
    }

    // ------------------------------------------------------------------------
    // TimerState Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        #[test]
        fn test_new_state() {
            let state = TimerState::new(&TimerConfig::default());
            assert_eq!(state.mode, TimerMode::Work);
            assert_eq!(state.remaining_seconds, 1500);
            assert!(!state.is_running);
            assert_eq!(state.session_count, 1);
            assert_eq!(state.accumulated_break_seconds, 0);
            assert_eq!(state.direction, CountDirection::Countdown);
        }

        #[test]
        fn test_advance_countdown() {
            let mut state = TimerState::new(&TimerConfig::default());
            state.remaining_seconds = 2;

            assert!(!state.advance());
            assert_eq!(state.remaining_seconds, 1);
            assert!(state.advance());
            assert_eq!(state.remaining_seconds, 0);
        }

        #[test]
        fn test_advance_countdown_clamps_at_zero() {
            let mut state = TimerState::new(&TimerConfig::default());
            state.remaining_seconds = 0;

            assert!(state.advance());
            assert_eq!(state.remaining_seconds, 0);
        }

        #[test]
        fn test_advance_countup_never_completes() {
            let mut state = TimerState::new(&TimerConfig::default());
            state.direction = CountDirection::Countup;
            state.remaining_seconds = 0;

            for _ in 0..3 {
                assert!(!state.advance());
            }
            assert_eq!(state.remaining_seconds, 3);
        }

        #[test]
        fn test_origin_follows_direction() {
            let config = TimerConfig::default();
            let mut state = TimerState::new(&config);
            assert_eq!(state.origin(&config), 1500);

            state.direction = CountDirection::Countup;
            assert_eq!(state.origin(&config), 0);
        }

        #[test]
        fn test_work_to_break() {
            let config = TimerConfig::default();
            let mut state = TimerState::new(&config);
            state.is_running = true;

            let completed = state.enter_next_interval(&config);

            assert_eq!(completed, TimerMode::Work);
            assert_eq!(state.mode, TimerMode::Break);
            assert_eq!(state.remaining_seconds, 300);
            assert_eq!(state.session_count, 2);
            assert!(!state.is_running);
        }

        #[test]
        fn test_work_to_long_break_resets_sessions() {
            let config = TimerConfig::default();
            let mut state = TimerState::new(&config);
            state.session_count = 4;

            state.enter_next_interval(&config);

            assert_eq!(state.mode, TimerMode::LongBreak);
            assert_eq!(state.remaining_seconds, 900);
            assert_eq!(state.session_count, 1);
        }

        #[test]
        fn test_breaks_accumulate() {
            let config = TimerConfig::default();
            let mut state = TimerState::new(&config);

            state.mode = TimerMode::Break;
            state.enter_next_interval(&config);
            assert_eq!(state.mode, TimerMode::Work);
            assert_eq!(state.accumulated_break_seconds, 300);

            state.mode = TimerMode::LongBreak;
            state.enter_next_interval(&config);
            assert_eq!(state.mode, TimerMode::Work);
            assert_eq!(state.remaining_seconds, 1500);
            assert_eq!(state.accumulated_break_seconds, 1200);
        }

        #[test]
        fn test_break_completion_keeps_session_count() {
            let config = TimerConfig::default();
            let mut state = TimerState::new(&config);
            state.mode = TimerMode::Break;
            state.session_count = 3;

            state.enter_next_interval(&config);
            assert_eq!(state.session_count, 3);
        }
    }

    // ------------------------------------------------------------------------
    // IPC Types Tests
    // ------------------------------------------------------------------------

    mod ipc_tests {
        use super::*;

        #[test]
        fn test_request_wire_format() {
            assert_eq!(
                serde_json::to_string(&IpcRequest::Start).unwrap(),
                r#"{"command":"start"}"#
            );
            assert_eq!(
                serde_json::to_string(&IpcRequest::SettingsUpdated).unwrap(),
                r#"{"command":"settings_updated"}"#
            );
            assert_eq!(
                serde_json::to_string(&IpcRequest::Direction {
                    direction: CountDirection::Countup
                })
                .unwrap(),
                r#"{"command":"direction","direction":"countup"}"#
            );
            assert_eq!(
                serde_json::to_string(&IpcRequest::Tray {
                    action: "quit".to_string()
                })
                .unwrap(),
                r#"{"command":"tray","action":"quit"}"#
            );
        }

        #[test]
        fn test_request_all_commands() {
            let commands = vec![
                (r#"{"command":"start"}"#, IpcRequest::Start),
                (r#"{"command":"pause"}"#, IpcRequest::Pause),
                (r#"{"command":"toggle"}"#, IpcRequest::Toggle),
                (r#"{"command":"reset"}"#, IpcRequest::Reset),
                (r#"{"command":"show"}"#, IpcRequest::Show),
                (r#"{"command":"hide"}"#, IpcRequest::Hide),
                (r#"{"command":"status"}"#, IpcRequest::Status),
            ];

            for (json, expected) in commands {
                let request: IpcRequest = serde_json::from_str(json).unwrap();
                assert_eq!(request, expected, "{json}");
            }
        }

        #[test]
        fn test_snapshot_capture() {
            let config = TimerConfig::default();
            let mut state = TimerState::new(&config);
            state.remaining_seconds = 1200;
            state.accumulated_break_seconds = 300;

            let snapshot = TimerSnapshot::capture(&state, &config);

            assert_eq!(snapshot.mode, TimerMode::Work);
            assert_eq!(snapshot.remaining_seconds, 1200);
            assert_eq!(snapshot.sessions_before_long_break, 4);
            assert_eq!(snapshot.accumulated_break_seconds, 300);
            assert_eq!(snapshot.theme, "chubby-gray");
        }

        #[test]
        fn test_response_serialize() {
            let config = TimerConfig::default();
            let snapshot = TimerSnapshot::capture(&TimerState::new(&config), &config);
            let response = IpcResponse::success("OK", Some(snapshot));

            let json = serde_json::to_string(&response).unwrap();
            assert!(json.contains("\"status\":\"success\""));
            assert!(json.contains("\"remainingSeconds\":1500"));
            assert!(json.contains("\"petType\":\"cat\""));
        }

        #[test]
        fn test_response_error_has_no_data() {
            let response = IpcResponse::error("unreachable");
            assert!(!response.is_success());
            assert!(response.data.is_none());
            assert!(!serde_json::to_string(&response).unwrap().contains("data"));
        }
    }
}
