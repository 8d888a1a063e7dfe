//! The overlay surface: an independent view of the timer's mood.
//!
//! The overlay runs on its own thread and keeps its own copy of the state it
//! needs. Nothing here is shared with the primary surface; state arrives as
//! [`OverlayMessage`]s and user intents leave as [`SurfaceCommand`]s.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use rand::Rng;
use tokio::sync::mpsc;

use crate::types::{PetType, TimerMode, DEFAULT_THEME};

use super::protocol::{visual_state, OverlayMessage, OverlayVisual, SurfaceCommand};

/// How long the petting animation lasts.
pub const PETTING_DURATION: Duration = Duration::from_millis(500);

/// How often an idle pet considers doing something on its own.
pub const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Chance that an idle check plays the petting animation.
pub const IDLE_PET_CHANCE: f64 = 0.1;

/// Source of values in `[0, 1)` deciding idle animations.
pub type IdleRoll = Box<dyn FnMut() -> f64 + Send>;

// ============================================================================
// OverlayViewState
// ============================================================================

/// What the overlay knows about the timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayViewState {
    pub mode: TimerMode,
    pub is_running: bool,
    pub theme: String,
    pub pet_type: PetType,
}

impl Default for OverlayViewState {
    fn default() -> Self {
        Self {
            mode: TimerMode::Work,
            is_running: false,
            theme: DEFAULT_THEME.to_string(),
            pet_type: PetType::Cat,
        }
    }
}

impl OverlayViewState {
    /// Current pose of the pet.
    pub fn visual(&self) -> OverlayVisual {
        visual_state(self.is_running, self.mode)
    }
}

// ============================================================================
// OverlayView
// ============================================================================

/// Overlay surface state plus its local-only decorations.
pub struct OverlayView {
    view: OverlayViewState,
    /// Window visibility, driven by the primary surface
    visible: bool,
    /// End of the running petting animation; never synchronized back
    petting_until: Option<Instant>,
    idle_interval: Duration,
    idle_roll: IdleRoll,
    commands: mpsc::UnboundedSender<SurfaceCommand>,
}

impl OverlayView {
    /// Creates a visible overlay in the idle pose.
    pub fn new(commands: mpsc::UnboundedSender<SurfaceCommand>) -> Self {
        Self {
            view: OverlayViewState::default(),
            visible: true,
            petting_until: None,
            idle_interval: IDLE_CHECK_INTERVAL,
            idle_roll: Box::new(|| rand::thread_rng().gen::<f64>()),
            commands,
        }
    }

    /// Replaces the idle check period and its random source.
    pub fn with_idle_behavior(
        mut self,
        interval: Duration,
        roll: impl FnMut() -> f64 + Send + 'static,
    ) -> Self {
        self.idle_interval = interval;
        self.idle_roll = Box::new(roll);
        self
    }

    /// Applies one message from the primary surface.
    ///
    /// Returns true if the pet's pose changed.
    pub fn apply(&mut self, message: OverlayMessage) -> bool {
        let before = self.view.visual();

        match message {
            OverlayMessage::State(payload) => {
                self.view.is_running = payload.is_running;
                self.view.mode = payload.mode;
                self.view.theme = payload.theme;
                self.view.pet_type = payload.pet_type;
            }
            OverlayMessage::Appearance { theme, pet_type } => {
                tracing::debug!(theme = %theme, pet = %pet_type, "overlay appearance updated");
                self.view.theme = theme;
                self.view.pet_type = pet_type;
            }
            OverlayMessage::Visibility { visible } => {
                self.visible = visible;
            }
        }

        let after = self.view.visual();
        if before != after {
            tracing::debug!(from = before.as_str(), to = after.as_str(), "overlay pose changed");
        }
        before != after
    }

    /// Starts the petting animation. It ends after [`PETTING_DURATION`].
    pub fn pet(&mut self) {
        self.petting_until = Some(Instant::now() + PETTING_DURATION);
    }

    /// Ends the petting animation.
    pub fn stop_petting(&mut self) {
        self.petting_until = None;
    }

    /// Lets an idle pet play the petting animation now and then.
    ///
    /// Returns true if the animation started.
    pub fn idle_check(&mut self) -> bool {
        if self.view.visual() != OverlayVisual::Idle || self.is_petting() {
            return false;
        }
        if (self.idle_roll)() < IDLE_PET_CHANCE {
            tracing::trace!("idle petting");
            self.pet();
            return true;
        }
        false
    }

    /// Close button: asks the primary surface to hide the overlay.
    pub fn close(&self) {
        self.send(SurfaceCommand::RequestHide);
    }

    /// Returns the projected timer state.
    pub fn view(&self) -> &OverlayViewState {
        &self.view
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_petting(&self) -> bool {
        self.petting_until.is_some()
    }

    fn send(&self, command: SurfaceCommand) {
        // At most once; a primary that is gone simply does not hear it.
        if self.commands.send(command).is_err() {
            tracing::debug!(?command, "primary surface gone, command dropped");
        }
    }

    /// Runs the overlay loop until the primary side drops its sender.
    ///
    /// Between messages the loop ends petting animations and runs the idle
    /// check every `idle_interval`. Returns the last known view state.
    pub fn run(mut self, messages: Receiver<OverlayMessage>) -> OverlayViewState {
        let mut next_idle_check = Instant::now() + self.idle_interval;

        loop {
            let deadline = match self.petting_until {
                Some(until) => until.min(next_idle_check),
                None => next_idle_check,
            };

            match messages.recv_deadline(deadline) {
                Ok(message) => {
                    self.apply(message);
                }
                Err(RecvTimeoutError::Timeout) => {
                    let now = Instant::now();
                    if self.petting_until.is_some_and(|until| now >= until) {
                        self.stop_petting();
                    }
                    if now >= next_idle_check {
                        self.idle_check();
                        next_idle_check = now + self.idle_interval;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        tracing::debug!("overlay loop finished");
        self.view
    }
}

/// Spawns an overlay surface on its own thread.
///
/// Returns the sender to attach to a `SyncBridge` and the thread handle.
pub fn spawn_overlay(
    commands: mpsc::UnboundedSender<SurfaceCommand>,
) -> std::io::Result<(Sender<OverlayMessage>, JoinHandle<OverlayViewState>)> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let view = OverlayView::new(commands);
    let handle = thread::Builder::new()
        .name("pet-overlay".to_string())
        .spawn(move || view.run(rx))?;
    Ok((tx, handle))
}

// ============================================================================
// Tests
// ============================================================================
