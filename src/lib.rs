//! Village Sim - tick-driven village simulation
//!
//! Villagers run occupation-specific work routines (smithing, farming,
//! selling at the market) and can be interrupted by tasks the mayor hands
//! out. Tasks queue up in order and the villager drops back into its routine
//! once the queue is empty.

pub mod command;
pub mod core;
pub mod dialogue;
pub mod ecs;
pub mod economy;
pub mod entity;
pub mod llm;
pub mod simulation;
pub mod world;
