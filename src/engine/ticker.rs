//! One-second tick scheduling for the timer engine.
//!
//! The engine never sleeps itself. It asks a [`TickScheduler`] to start or
//! stop a recurring one-second signal, and the owner of the engine feeds each
//! [`Tick`] back into `TimerEngine::tick`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

/// Period of the recurring tick.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Marker message sent once per elapsed second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

// ============================================================================
// TickScheduler
// ============================================================================

/// Owns the recurring tick task of a timer engine.
///
/// Implementations must keep at most one task alive: `schedule` while a task
/// is already active is a no-op.
pub trait TickScheduler: Send {
    /// Begins the recurring one-second tick.
    fn schedule(&mut self);

    /// Cancels the recurring tick, if any.
    fn cancel(&mut self);

    /// Returns true while a tick task is active.
    fn is_active(&self) -> bool;
}

// ============================================================================
// IntervalTicker
// ============================================================================

/// Tokio-backed scheduler that sends a [`Tick`] every second.
///
/// Must be used from within a tokio runtime.
pub struct IntervalTicker {
    tick_tx: mpsc::UnboundedSender<Tick>,
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl IntervalTicker {
    /// Creates a ticker that delivers ticks on `tick_tx`.
    pub fn new(tick_tx: mpsc::UnboundedSender<Tick>) -> Self {
        Self::with_period(tick_tx, TICK_PERIOD)
    }

    /// Creates a ticker with a custom period.
    pub fn with_period(tick_tx: mpsc::UnboundedSender<Tick>, period: Duration) -> Self {
        Self {
            tick_tx,
            period,
            handle: None,
        }
    }
}

impl TickScheduler for IntervalTicker {
    fn schedule(&mut self) {
        if self.is_active() {
            return;
        }

        let tick_tx = self.tick_tx.clone();
        let period = self.period;
        self.handle = Some(tokio::spawn(async move {
            // The first tick lands one full period after start.
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if tick_tx.send(Tick).is_err() {
                    tracing::debug!("tick receiver dropped, stopping tick task");
                    break;
                }
            }
        }));
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// ManualTicker
// ============================================================================

/// Scheduler that spawns nothing and only records what was asked of it.
///
/// Ticks are delivered by calling `TimerEngine::tick` directly. Clones share
/// the same counters, so a test can keep one clone and hand the other to the
/// engine.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    active: Arc<AtomicUsize>,
    schedules: Arc<AtomicUsize>,
    cancels: Arc<AtomicUsize>,
}

impl ManualTicker {
    /// Creates a new ManualTicker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks currently active (0 or 1).
    pub fn active_tasks(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of tasks that were actually started.
    pub fn schedule_count(&self) -> usize {
        self.schedules.load(Ordering::SeqCst)
    }

    /// Number of tasks that were actually cancelled.
    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl TickScheduler for ManualTicker {
    fn schedule(&mut self) {
        if self.active.load(Ordering::SeqCst) == 0 {
            self.active.store(1, Ordering::SeqCst);
            self.schedules.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn cancel(&mut self) {
        if self.active.swap(0, Ordering::SeqCst) == 1 {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) == 1
    }
}

// ============================================================================
// Tests
// ============================================================================
