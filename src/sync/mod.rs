//! State synchronization between the primary surface and the pet overlay.
//!
//! - `protocol`: message types and the pure state → pose mapping
//! - `bridge`: primary-side broadcaster and inbound command channel
//! - `overlay`: the overlay surface and its receive loop

pub mod bridge;
pub mod overlay;
pub mod protocol;

pub use bridge::SyncBridge;
pub use overlay::{spawn_overlay, OverlayView, OverlayViewState};
pub use protocol::{visual_state, OverlayMessage, OverlayPayload, OverlayVisual, SurfaceCommand};
