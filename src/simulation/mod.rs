//! Tick loop, movement and the event stream

pub mod events;
pub mod movement;
pub mod tick;

pub use events::{EventLog, LoggedEvent, VillageEvent};
pub use tick::{run_simulation_tick, TickContext};
