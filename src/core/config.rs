//! Simulation configuration with documented constants
//!
//! All the timings, prices and counts that shape a villager's day are
//! collected here. Every field has a default, so a config file only needs
//! to list the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, VillageError};
use crate::core::types::Gold;

/// Configuration for the simulation systems
///
/// The defaults reproduce the pacing of the hand-tuned village: a smith
/// finishes a batch of five tools in roughly half a minute and then walks
/// to the market.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === CLOCK ===
    /// Simulated seconds advanced by one tick
    pub tick_seconds: f32,

    /// Length of a full day in simulated seconds
    ///
    /// At 120s a day, one in-game hour passes every 5 seconds.
    pub day_length_seconds: f32,

    // === MOVEMENT ===
    /// Walking speed in world units per second
    pub move_speed: f32,

    /// Distance at which a villager counts as having reached a waypoint
    ///
    /// Must be larger than `move_speed * tick_seconds`, otherwise a walker
    /// can overshoot and still land outside the radius. Movement clamps
    /// the final step so overshoot never happens, but the radius still
    /// decides when the next step may begin.
    pub arrival_distance: f32,

    // === DEFAULT WORK ===
    /// Seconds spent at each work station or field waypoint
    pub work_cycle_time: f32,

    /// Work cycles completed before carrying goods to market
    pub cycles_before_selling: u32,

    /// Pause after each completed work cycle
    pub cycle_rest_time: f32,

    /// Seconds spent haggling at the merchant's stall
    pub selling_time: f32,

    /// Earnings credited per tool made in the default routine
    pub tool_value: Gold,

    /// Earnings credited per crop gathered
    pub crop_value: Gold,

    /// Earnings credited per weapon forged
    pub weapon_value: Gold,

    // === PATROL / FOLLOW ===
    /// Total time a patrol task lasts
    pub patrol_duration: f32,

    /// Look-around pause at every patrol point
    ///
    /// Must be positive: a patrol loop with zero pauses and unreachable
    /// points would never spend its time budget.
    pub patrol_pause: f32,

    /// Total time a follow task lasts
    pub follow_duration: f32,

    /// Distance kept behind the mayor while following
    ///
    /// Also the reach of an enemy's chase before it swings.
    pub follow_distance: f32,

    // === TASK COUNTS ===
    /// Cycles of the Craft Tools task
    pub tools_per_task: u32,

    /// Cycles of the Forge Weapons task
    pub weapons_per_task: u32,

    /// Passes over the fields in the Harvest Crops task
    pub harvest_passes: u32,

    // === FORGING ===
    /// Bellows time multiplier while forging weapons
    pub forge_bellows_multiplier: f32,

    /// Anvil time multiplier while forging weapons
    pub forge_anvil_multiplier: f32,

    /// Rest after each forged weapon
    pub forge_rest_time: f32,

    // === MINING ===
    /// Seconds spent at the mine face
    pub mining_time: f32,

    /// Earnings credited per mining trip
    pub mining_earnings: Gold,

    /// Goods (ore) carried back per trip
    pub ore_per_trip: u32,

    // === ENEMY ===
    /// Duration of an enemy's punch
    pub punch_time: f32,

    // === INTERACTION ===
    /// How close the mayor must be to talk to a villager
    pub interaction_radius: f32,

    /// Seed for the world RNG (dialogue choices, tie-breaking)
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // Clock
            tick_seconds: 0.1,
            day_length_seconds: 120.0,

            // Movement
            move_speed: 2.0,
            arrival_distance: 1.0,

            // Default work
            work_cycle_time: 2.0,
            cycles_before_selling: 5,
            cycle_rest_time: 0.5,
            selling_time: 7.0,
            tool_value: 10,
            crop_value: 5,
            weapon_value: 25,

            // Patrol / follow
            patrol_duration: 30.0,
            patrol_pause: 3.0,
            follow_duration: 30.0,
            follow_distance: 3.0,

            // Task counts
            tools_per_task: 5,
            weapons_per_task: 3,
            harvest_passes: 5,

            // Forging
            forge_bellows_multiplier: 1.5,
            forge_anvil_multiplier: 2.0,
            forge_rest_time: 1.0,

            // Mining
            mining_time: 10.0,
            mining_earnings: 15,
            ore_per_trip: 3,

            punch_time: 0.5,
            interaction_radius: 5.0,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing fields keep their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.tick_seconds <= 0.0 {
            return Err(VillageError::InvalidConfig(format!(
                "tick_seconds ({}) must be positive",
                self.tick_seconds
            )));
        }

        if self.move_speed <= 0.0 || self.arrival_distance <= 0.0 {
            return Err(VillageError::InvalidConfig(
                "move_speed and arrival_distance must be positive".into(),
            ));
        }

        if self.patrol_pause <= 0.0 {
            return Err(VillageError::InvalidConfig(format!(
                "patrol_pause ({}) must be positive",
                self.patrol_pause
            )));
        }

        let durations = [
            ("work_cycle_time", self.work_cycle_time),
            ("cycle_rest_time", self.cycle_rest_time),
            ("selling_time", self.selling_time),
            ("patrol_duration", self.patrol_duration),
            ("follow_duration", self.follow_duration),
            ("forge_rest_time", self.forge_rest_time),
            ("mining_time", self.mining_time),
            ("punch_time", self.punch_time),
        ];
        if let Some((name, value)) = durations.iter().find(|(_, v)| *v < 0.0 || !v.is_finite()) {
            return Err(VillageError::InvalidConfig(format!(
                "{name} ({value}) must be a non-negative number"
            )));
        }

        if self.forge_bellows_multiplier <= 0.0 || self.forge_anvil_multiplier <= 0.0 {
            return Err(VillageError::InvalidConfig(
                "forge multipliers must be positive".into(),
            ));
        }

        if self.day_length_seconds < 1.0 {
            return Err(VillageError::InvalidConfig(format!(
                "day_length_seconds ({}) must be at least 1",
                self.day_length_seconds
            )));
        }

        Ok(())
    }
}
