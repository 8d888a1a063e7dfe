//! Timer engine module for PomodoroCat.
//!
//! - `timer`: the state machine that owns the authoritative timer state
//! - `ticker`: one-second tick scheduling
//! - `display`: clock and title text derived from the state

pub mod display;
pub mod ticker;
pub mod timer;

pub use ticker::{IntervalTicker, ManualTicker, Tick, TickScheduler};
pub use timer::{TimerEngine, TimerEvent};
