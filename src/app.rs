//! The primary surface controller.
//!
//! `App` is the single owner of the timer engine, the overlay bridge, the
//! settings store and the notifier. Every input (IPC, tray, overlay) arrives
//! as a message and is handled one at a time on the controller task.

use tokio::sync::{mpsc, oneshot};

use crate::engine::display;
use crate::engine::{IntervalTicker, Tick, TickScheduler, TimerEngine, TimerEvent};
use crate::notify::{Notifier, INTERVAL_COMPLETE_MESSAGE, NOTIFICATION_TITLE};
use crate::preferences::{self, PreferencesStore, Settings, SettingsError};
use crate::sync::{OverlayMessage, SurfaceCommand, SyncBridge};
use crate::types::{CountDirection, TimerConfig, TimerSnapshot};

// ============================================================================
// AppCommand
// ============================================================================

/// Commands accepted by the controller.
#[derive(Debug)]
pub enum AppCommand {
    /// Start, pause, show or hide, from the overlay, tray or CLI
    Surface(SurfaceCommand),
    Toggle,
    Reset,
    SetDirection(CountDirection),
    /// The settings store changed; reload and apply it
    SettingsUpdated,
    /// Persist new settings, then apply them
    SaveSettings(Settings),
    /// Reply with the current snapshot
    Status(oneshot::Sender<TimerSnapshot>),
    Quit,
}

// ============================================================================
// App
// ============================================================================

/// The primary surface controller.
pub struct App {
    engine: TimerEngine,
    bridge: SyncBridge,
    store: Box<dyn PreferencesStore>,
    notifier: Box<dyn Notifier>,
    settings: Settings,
    overlay_visible: bool,
    command_tx: mpsc::UnboundedSender<AppCommand>,
    command_rx: mpsc::UnboundedReceiver<AppCommand>,
    surface_rx: mpsc::UnboundedReceiver<SurfaceCommand>,
    event_rx: mpsc::UnboundedReceiver<TimerEvent>,
    tick_rx: mpsc::UnboundedReceiver<Tick>,
}

impl App {
    /// Creates the controller with a real one-second ticker.
    pub fn new(store: Box<dyn PreferencesStore>, notifier: Box<dyn Notifier>) -> Self {
        Self::with_scheduler(store, notifier, |tick_tx| Box::new(IntervalTicker::new(tick_tx)))
    }

    /// Creates the controller with a custom tick scheduler.
    ///
    /// `make_scheduler` receives the sender its ticks must go to.
    pub fn with_scheduler<F>(
        store: Box<dyn PreferencesStore>,
        notifier: Box<dyn Notifier>,
        make_scheduler: F,
    ) -> Self
    where
        F: FnOnce(mpsc::UnboundedSender<Tick>) -> Box<dyn TickScheduler>,
    {
        let settings = preferences::load_settings(store.as_ref());
        let config = timer_config_or_default(&settings);

        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (bridge, surface_rx) = SyncBridge::new();

        let engine = TimerEngine::new(config, make_scheduler(tick_tx), event_tx);

        Self {
            engine,
            bridge,
            store,
            notifier,
            settings,
            overlay_visible: true,
            command_tx,
            command_rx,
            surface_rx,
            event_rx,
            tick_rx,
        }
    }

    /// Returns a sender for IPC and tray commands.
    pub fn command_sender(&self) -> mpsc::UnboundedSender<AppCommand> {
        self.command_tx.clone()
    }

    /// Returns a sender for overlay commands.
    pub fn surface_sender(&self) -> mpsc::UnboundedSender<SurfaceCommand> {
        self.bridge.command_sender()
    }

    /// Connects an overlay surface and brings it up to date.
    pub fn attach_overlay(&mut self, overlay_tx: crossbeam_channel::Sender<OverlayMessage>) {
        self.bridge.attach(overlay_tx);
        self.bridge.send_visibility(self.overlay_visible);
        self.bridge
            .broadcast_appearance(&self.settings.cat_theme, self.settings.pet_type);
        self.bridge.broadcast_state(&self.engine.snapshot());
    }

    /// Disconnects the overlay surface.
    pub fn detach_overlay(&mut self) {
        self.bridge.detach();
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Handles one command. Returns false when the app should exit.
    pub fn handle_command(&mut self, command: AppCommand) -> bool {
        tracing::debug!(?command, "handling command");

        match command {
            AppCommand::Surface(cmd) => self.handle_surface(cmd),
            AppCommand::Toggle => self.engine.toggle(),
            AppCommand::Reset => self.engine.reset(),
            AppCommand::SetDirection(direction) => self.engine.set_direction(direction),
            AppCommand::SettingsUpdated => self.reload_settings(),
            AppCommand::SaveSettings(settings) => {
                if let Err(e) = self.save_settings(settings) {
                    tracing::warn!(error = %e, "settings not saved");
                }
            }
            AppCommand::Status(reply) => {
                if reply.send(self.engine.snapshot()).is_err() {
                    tracing::debug!("status requester went away");
                }
            }
            AppCommand::Quit => {
                tracing::info!("quit requested");
                self.engine.pause();
                self.drain_events();
                return false;
            }
        }

        self.drain_events();
        true
    }

    /// Handles a command from the overlay or tray.
    pub fn handle_surface(&mut self, command: SurfaceCommand) {
        match command {
            SurfaceCommand::RequestStart => self.engine.start(),
            SurfaceCommand::RequestPause => self.engine.pause(),
            SurfaceCommand::RequestShow => self.set_overlay_visible(true),
            SurfaceCommand::RequestHide => self.set_overlay_visible(false),
        }
        self.drain_events();
    }

    /// Advances the engine by one tick.
    pub fn on_tick(&mut self) {
        self.engine.tick();
        self.drain_events();
    }

    /// Handles every engine event that is already queued.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::StateChanged(snapshot) => {
                tracing::debug!(title = %display::title(&snapshot), "state changed");
                self.bridge.broadcast_state(&snapshot);
            }
            TimerEvent::DisplayUpdate { remaining_seconds, .. } => {
                tracing::trace!(remaining_seconds, "display update");
            }
            TimerEvent::IntervalComplete { completed, next } => {
                tracing::info!(%completed, %next, "interval complete");
                self.notifier
                    .notify(NOTIFICATION_TITLE, INTERVAL_COMPLETE_MESSAGE);
            }
        }
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        if self.overlay_visible == visible {
            return;
        }
        self.overlay_visible = visible;
        tracing::info!(visible, "overlay visibility changed");
        self.bridge.send_visibility(visible);
        if visible {
            // The overlay may have missed broadcasts while hidden.
            self.bridge.broadcast_state(&self.engine.snapshot());
        }
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    /// Reloads settings from the store and applies them.
    pub fn reload_settings(&mut self) {
        let settings = preferences::load_settings(self.store.as_ref());
        self.apply_settings(settings);
    }

    /// Persists `settings` in one store write, then applies them.
    ///
    /// On error neither the store nor the running app changes.
    pub fn save_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        preferences::save_settings(self.store.as_mut(), &settings)?;
        self.apply_settings(settings);
        Ok(())
    }

    fn apply_settings(&mut self, settings: Settings) {
        let config = timer_config_or_default(&settings);
        self.engine.apply_config(config);
        self.bridge
            .broadcast_appearance(&settings.cat_theme, settings.pet_type);
        self.settings = settings;
        self.drain_events();
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.engine.snapshot()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    // ------------------------------------------------------------------------
    // Event loop
    // ------------------------------------------------------------------------

    /// Runs the controller until `Quit` arrives or every input closes.
    pub async fn run(mut self) {
        tracing::info!(title = %display::title(&self.snapshot()), "controller started");

        loop {
            tokio::select! {
                Some(command) = self.command_rx.recv() => {
                    if !self.handle_command(command) {
                        break;
                    }
                }
                Some(command) = self.surface_rx.recv() => self.handle_surface(command),
                Some(Tick) = self.tick_rx.recv() => self.on_tick(),
                Some(event) = self.event_rx.recv() => self.handle_event(event),
                else => break,
            }
        }

        self.bridge.detach();
        tracing::info!("controller stopped");
    }
}

fn timer_config_or_default(settings: &Settings) -> TimerConfig {
    settings.to_timer_config().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "unusable settings, using defaults");
        TimerConfig::default()
    })
}

// ============================================================================
// Tests
// ============================================================================
