//! Villager record: identity, placement, work layout and production counters

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, VillageError};
use crate::core::types::{Gold, MerchantId, NpcId, NpcType, Vec2};
use crate::entity::controller::NpcController;
use crate::entity::plan::Animation;
use crate::simulation::events::VillageEvent;

/// Per-villager overrides of the global timings
///
/// Unset fields fall back to `SimulationConfig`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkTimings {
    pub move_speed: Option<f32>,
    pub work_cycle_time: Option<f32>,
    pub cycles_before_selling: Option<u32>,
    pub selling_time: Option<f32>,
    pub mining_time: Option<f32>,
    pub mining_earnings: Option<Gold>,
}

impl WorkTimings {
    /// Same rules as `SimulationConfig::validate` for the overridden fields
    pub fn validate(&self) -> Result<()> {
        if let Some(speed) = self.move_speed {
            if !(speed > 0.0 && speed.is_finite()) {
                return Err(VillageError::InvalidConfig(format!(
                    "move_speed ({speed}) must be positive"
                )));
            }
        }

        let durations = [
            ("work_cycle_time", self.work_cycle_time),
            ("selling_time", self.selling_time),
            ("mining_time", self.mining_time),
        ];
        for (name, value) in durations {
            if let Some(value) = value {
                if value < 0.0 || !value.is_finite() {
                    return Err(VillageError::InvalidConfig(format!(
                        "{name} ({value}) must be a non-negative number"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn move_speed(&self, config: &SimulationConfig) -> f32 {
        self.move_speed.unwrap_or(config.move_speed)
    }

    pub fn work_cycle_time(&self, config: &SimulationConfig) -> f32 {
        self.work_cycle_time.unwrap_or(config.work_cycle_time)
    }

    pub fn cycles_before_selling(&self, config: &SimulationConfig) -> u32 {
        self.cycles_before_selling
            .unwrap_or(config.cycles_before_selling)
    }

    pub fn selling_time(&self, config: &SimulationConfig) -> f32 {
        self.selling_time.unwrap_or(config.selling_time)
    }

    pub fn mining_time(&self, config: &SimulationConfig) -> f32 {
        self.mining_time.unwrap_or(config.mining_time)
    }

    pub fn mining_earnings(&self, config: &SimulationConfig) -> Gold {
        self.mining_earnings.unwrap_or(config.mining_earnings)
    }
}

/// Where a villager works and walks
#[derive(Debug, Clone, Default)]
pub struct WorkConfig {
    pub bellows: Option<Vec2>,
    pub anvil: Option<Vec2>,
    pub storage: Option<Vec2>,
    pub field_waypoints: Vec<Vec2>,
    /// Waypoints from the workplace to the market, walked in order
    pub path_to_merchant: Vec<Vec2>,
    pub merchant: Option<MerchantId>,
    pub mine_path: Vec<Vec2>,
    pub mine_point: Option<Vec2>,
    pub patrol_points: Vec<Vec2>,
    pub timings: WorkTimings,
}

/// Running production counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionStats {
    /// Goods waiting to be sold
    pub goods_produced: u32,
    /// Gold earned and not yet handed to the treasury
    pub daily_earnings: Gold,
    pub tools_crafted: u32,
    pub weapons_forged: u32,
    pub crops_harvested: u32,
}

#[derive(Debug, Clone)]
pub struct Npc {
    pub id: NpcId,
    pub name: String,
    pub npc_type: NpcType,
    /// Free-form character sketch used in conversation prompts
    pub persona: Option<String>,
    pub position: Vec2,
    pub heading: Vec2,
    /// Cleared when the body is disabled; moves stall until it is set again
    pub can_move: bool,
    pub work: WorkConfig,
    pub stats: ProductionStats,
    pub animation: Animation,
    pub(crate) controller: NpcController,
    pub(crate) outbox: Vec<VillageEvent>,
}

impl Npc {
    pub fn new(name: impl Into<String>, npc_type: NpcType, position: Vec2) -> Self {
        Self {
            id: NpcId::new(),
            name: name.into(),
            npc_type,
            persona: None,
            position,
            heading: Vec2::new(0.0, 1.0),
            can_move: true,
            work: WorkConfig::default(),
            stats: ProductionStats::default(),
            animation: Animation::Idle,
            controller: NpcController::new(),
            outbox: Vec::new(),
        }
    }

    pub fn with_work(mut self, work: WorkConfig) -> Self {
        self.work = work;
        self
    }

    /// Take the events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<VillageEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub(crate) fn emit(&mut self, event: VillageEvent) {
        self.outbox.push(event);
    }

    pub(crate) fn set_animation(&mut self, animation: Animation) {
        if self.animation != animation {
            self.animation = animation;
            self.emit(VillageEvent::AnimationChanged {
                npc: self.name.clone(),
                animation,
            });
        }
    }

    /// One-line description used in listings and LLM prompts
    pub fn status_line(&self) -> String {
        format!(
            "{} ({}) at {} - {}, {} goods, {} gold",
            self.name,
            self.npc_type,
            self.position,
            self.current_task_name(),
            self.stats.goods_produced,
            self.stats.daily_earnings
        )
    }
}
