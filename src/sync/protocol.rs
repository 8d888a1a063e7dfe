//! Messages exchanged between the primary surface and the overlay.
//!
//! Outbound messages carry only qualitative state. The overlay is a mood
//! companion, so remaining and accumulated seconds never cross the bridge.

use serde::{Deserialize, Serialize};

use crate::types::{PetType, TimerMode, TimerSnapshot};

// ============================================================================
// OverlayVisual
// ============================================================================

/// The three poses the overlay pet can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayVisual {
    Working,
    OnBreak,
    #[default]
    Idle,
}

impl OverlayVisual {
    /// Returns the style class name for the pose.
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayVisual::Working => "working",
            OverlayVisual::OnBreak => "onBreak",
            OverlayVisual::Idle => "idle",
        }
    }
}

/// Maps running flag and mode to exactly one pose.
pub fn visual_state(is_running: bool, mode: TimerMode) -> OverlayVisual {
    match (is_running, mode) {
        (false, _) => OverlayVisual::Idle,
        (true, TimerMode::Work) => OverlayVisual::Working,
        (true, TimerMode::Break | TimerMode::LongBreak) => OverlayVisual::OnBreak,
    }
}

// ============================================================================
// Outbound
// ============================================================================

/// Reduced projection of the timer state sent on every state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPayload {
    pub is_running: bool,
    pub mode: TimerMode,
    pub theme: String,
    pub pet_type: PetType,
}

impl OverlayPayload {
    /// Projects a snapshot down to what the overlay is allowed to see.
    pub fn from_snapshot(snapshot: &TimerSnapshot) -> Self {
        Self {
            is_running: snapshot.is_running,
            mode: snapshot.mode,
            theme: snapshot.theme.clone(),
            pet_type: snapshot.pet_type,
        }
    }

    /// Pose the overlay should show for this payload.
    pub fn visual(&self) -> OverlayVisual {
        visual_state(self.is_running, self.mode)
    }
}

/// Primary → overlay message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OverlayMessage {
    /// Timer state changed
    State(OverlayPayload),
    /// Settings were saved; skin or pet may have changed
    #[serde(rename_all = "camelCase")]
    Appearance { theme: String, pet_type: PetType },
    /// Show or hide the overlay surface
    Visibility { visible: bool },
}

// ============================================================================
// Inbound
// ============================================================================

/// Overlay/tray → primary command. No payload, no acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceCommand {
    RequestStart,
    RequestPause,
    RequestShow,
    RequestHide,
}
