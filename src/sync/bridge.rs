//! The primary side of the overlay channel.
//!
//! Delivery is best effort and in send order. A detached or vanished overlay
//! makes every send a silent no-op.

use crossbeam_channel::{Sender, TrySendError};
use tokio::sync::mpsc;

use crate::types::{PetType, TimerSnapshot};

use super::protocol::{OverlayMessage, OverlayPayload, SurfaceCommand};

// ============================================================================
// SyncBridge
// ============================================================================

/// Broadcasts state to the overlay and hands out the inbound command sender.
pub struct SyncBridge {
    /// Outbound channel to the overlay thread, if one is attached
    overlay_tx: Option<Sender<OverlayMessage>>,
    /// Inbound commands from overlay and tray
    command_tx: mpsc::UnboundedSender<SurfaceCommand>,
}

impl SyncBridge {
    /// Creates a bridge with no overlay attached.
    ///
    /// Returns the receiving end of the inbound command channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SurfaceCommand>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        (
            Self {
                overlay_tx: None,
                command_tx,
            },
            command_rx,
        )
    }

    /// Returns a sender the overlay or tray can use to issue commands.
    pub fn command_sender(&self) -> mpsc::UnboundedSender<SurfaceCommand> {
        self.command_tx.clone()
    }

    /// Connects an overlay surface, replacing any previous one.
    pub fn attach(&mut self, overlay_tx: Sender<OverlayMessage>) {
        tracing::debug!("overlay attached");
        self.overlay_tx = Some(overlay_tx);
    }

    /// Disconnects the overlay surface.
    pub fn detach(&mut self) {
        if self.overlay_tx.take().is_some() {
            tracing::debug!("overlay detached");
        }
    }

    /// Returns true if an overlay is attached and still listening.
    pub fn is_attached(&self) -> bool {
        self.overlay_tx.is_some()
    }

    /// Sends the reduced state projection. Returns true if it was delivered.
    pub fn broadcast_state(&mut self, snapshot: &TimerSnapshot) -> bool {
        let payload = OverlayPayload::from_snapshot(snapshot);
        tracing::trace!(visual = payload.visual().as_str(), "broadcasting overlay state");
        self.send(OverlayMessage::State(payload))
    }

    /// Sends theme and pet type. Fired on settings changes, not on ticks.
    pub fn broadcast_appearance(&mut self, theme: &str, pet_type: PetType) -> bool {
        self.send(OverlayMessage::Appearance {
            theme: theme.to_string(),
            pet_type,
        })
    }

    /// Asks the overlay to show or hide itself.
    pub fn send_visibility(&mut self, visible: bool) -> bool {
        self.send(OverlayMessage::Visibility { visible })
    }

    fn send(&mut self, message: OverlayMessage) -> bool {
        let Some(tx) = &self.overlay_tx else {
            return false;
        };

        match tx.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!("overlay channel full, message dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("overlay surface gone, detaching");
                self.overlay_tx = None;
                false
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
