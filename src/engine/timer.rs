//! Timer engine for PomodoroCat.
//!
//! This module provides the core timer functionality:
//! - Mode transitions (Work → Break | LongBreak → Work)
//! - Countdown and count-up progression
//! - Accumulated break bookkeeping
//! - Event firing for state sync, display refresh and completion alerts

use tokio::sync::mpsc;

use crate::types::{CountDirection, TimerConfig, TimerMode, TimerSnapshot, TimerState};

use super::ticker::TickScheduler;

// ============================================================================
// TimerEvent
// ============================================================================

/// Notifications emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Coarse change: running flag, mode or configuration changed
    StateChanged(TimerSnapshot),
    /// One second elapsed; the clock needs redrawing
    DisplayUpdate {
        mode: TimerMode,
        remaining_seconds: u32,
        direction: CountDirection,
    },
    /// A countdown interval ran out
    IntervalComplete {
        /// Mode that just finished
        completed: TimerMode,
        /// Mode the engine switched to
        next: TimerMode,
    },
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the authoritative timer state.
///
/// No operation is fallible: configuration is validated before it reaches
/// the engine, and a dropped event receiver only means nobody is listening.
pub struct TimerEngine {
    config: TimerConfig,
    state: TimerState,
    ticker: Box<dyn TickScheduler>,
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates an engine in its initial state: paused work interval, session 1.
    pub fn new(
        config: TimerConfig,
        ticker: Box<dyn TickScheduler>,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        let state = TimerState::new(&config);
        Self {
            config,
            state,
            ticker,
            event_tx,
        }
    }

    /// Starts the recurring tick. No-op if already running.
    pub fn start(&mut self) {
        if self.state.is_running {
            return;
        }

        self.state.is_running = true;
        self.ticker.schedule();
        tracing::debug!(mode = %self.state.mode, remaining = self.state.remaining_seconds, "timer started");
        self.emit_state_changed();
    }

    /// Stops the recurring tick, keeping the remaining time. No-op if not running.
    pub fn pause(&mut self) {
        if !self.state.is_running {
            return;
        }

        self.state.is_running = false;
        self.ticker.cancel();
        tracing::debug!(mode = %self.state.mode, remaining = self.state.remaining_seconds, "timer paused");
        self.emit_state_changed();
    }

    /// Pauses a running timer, starts a paused one.
    pub fn toggle(&mut self) {
        if self.state.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Stops the timer and rewinds the current interval.
    ///
    /// Mode and session count are kept.
    pub fn reset(&mut self) {
        self.ticker.cancel();
        self.state.is_running = false;
        self.state.remaining_seconds = self.state.origin(&self.config);
        tracing::debug!(mode = %self.state.mode, "timer reset");
        self.emit_state_changed();
    }

    /// Advances the clock by one second.
    ///
    /// Ignored while not running, so a tick that was already queued when the
    /// timer was paused has no effect.
    pub fn tick(&mut self) {
        if !self.state.is_running {
            tracing::trace!("ignoring tick while paused");
            return;
        }

        if self.state.advance() {
            self.complete_interval();
        }

        self.emit(TimerEvent::DisplayUpdate {
            mode: self.state.mode,
            remaining_seconds: self.state.remaining_seconds,
            direction: self.state.direction,
        });
    }

    /// Handles an exhausted countdown: switches mode and stops at the boundary.
    fn complete_interval(&mut self) {
        let completed = self.state.enter_next_interval(&self.config);
        self.ticker.cancel();
        let next = self.state.mode;

        tracing::info!(
            completed = %completed,
            next = %next,
            session = self.state.session_count,
            accumulated_break = self.state.accumulated_break_seconds,
            "interval complete"
        );

        self.emit(TimerEvent::IntervalComplete { completed, next });
        self.emit_state_changed();
    }

    /// Replaces the configuration.
    ///
    /// A paused timer is rewound to the new length of the current mode; a
    /// running one keeps counting and picks the new durations up at the next
    /// interval. Mode and session count are never touched.
    pub fn apply_config(&mut self, config: TimerConfig) {
        self.config = config;
        if !self.state.is_running {
            self.state.remaining_seconds = self.state.origin(&self.config);
        }
        tracing::debug!(
            work = self.config.work_duration,
            short_break = self.config.break_duration,
            long_break = self.config.long_break_duration,
            sessions = self.config.sessions_before_long_break,
            "configuration applied"
        );
        self.emit_state_changed();
    }

    /// Switches the counting direction, effective from the next tick.
    ///
    /// A started interval keeps its current value. An idle interval that was
    /// never started is moved to the new direction's origin, so count-up
    /// begins at zero.
    pub fn set_direction(&mut self, direction: CountDirection) {
        if self.state.direction == direction {
            return;
        }

        let untouched =
            !self.state.is_running && self.state.remaining_seconds == self.state.origin(&self.config);
        self.state.direction = direction;
        tracing::debug!(direction = %direction, untouched, "count direction changed");

        if untouched {
            self.state.remaining_seconds = self.state.origin(&self.config);
            self.emit(TimerEvent::DisplayUpdate {
                mode: self.state.mode,
                remaining_seconds: self.state.remaining_seconds,
                direction,
            });
        }
    }

    /// Returns the current timer state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Returns a serializable snapshot of state and configuration.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::capture(&self.state, &self.config)
    }

    /// Returns true while the tick scheduler holds an active task.
    pub fn has_active_tick(&self) -> bool {
        self.ticker.is_active()
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }

    fn emit_state_changed(&self) {
        self.emit(TimerEvent::StateChanged(self.snapshot()));
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::debug!("timer event receiver closed, event dropped");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
