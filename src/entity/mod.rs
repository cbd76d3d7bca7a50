pub mod controller;
pub mod npc;
pub mod plan;
pub mod routines;
pub mod tasks;

pub use controller::Assignment;
pub use npc::{Npc, ProductionStats, WorkConfig, WorkTimings};
pub use tasks::{available_tasks, MenuAction, TaskKind};
