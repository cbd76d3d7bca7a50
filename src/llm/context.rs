//! Gather village context for LLM prompts
//!
//! Summarises who lives in the village, what they are doing and how the
//! purse looks, so the order parser can resolve names and occupations.

use crate::core::calendar::TimePeriod;
use crate::core::types::{Gold, NpcType, Tick};
use crate::ecs::world::World;
use crate::entity::controller::WorkPhase;

const MAX_RECENT_EVENTS: usize = 5;

/// A villager the mayor might refer to
#[derive(Debug, Clone)]
pub struct NamedVillager {
    pub name: String,
    pub occupation: NpcType,
    /// Task display name, or "None"
    pub task: String,
    /// working / selling / idle / busy
    pub status: String,
    pub goods: u32,
    pub earnings: Gold,
}

pub struct VillageContext {
    pub day: u64,
    pub period: TimePeriod,
    pub current_tick: Tick,
    pub treasury: Gold,
    pub villagers: Vec<NamedVillager>,
    pub merchants: Vec<(String, Gold)>,
    pub recent_events: Vec<String>,
}

impl VillageContext {
    pub fn from_world(world: &World) -> Self {
        let villagers = world
            .npcs()
            .map(|npc| {
                let status = if npc.is_task_active() {
                    "busy"
                } else {
                    match npc.work_phase() {
                        WorkPhase::Working => "working",
                        WorkPhase::Selling => "selling",
                        WorkPhase::Starting => "idle",
                    }
                };
                NamedVillager {
                    name: npc.name.clone(),
                    occupation: npc.npc_type,
                    task: npc.current_task_name().to_string(),
                    status: status.to_string(),
                    goods: npc.stats.goods_produced,
                    earnings: npc.stats.daily_earnings,
                }
            })
            .collect();

        let mut ctx = Self {
            day: world.calendar.current_day(),
            period: world.calendar.period(),
            current_tick: world.current_tick,
            treasury: world.treasury.gold(),
            villagers,
            merchants: world.merchants.iter().map(|m| (m.name.clone(), m.gold)).collect(),
            recent_events: Vec::new(),
        };
        for logged in world.events.iter().filter(|e| !e.event.is_noise()) {
            ctx.add_event(logged.event.to_string());
        }
        ctx
    }

    pub fn empty() -> Self {
        Self {
            day: 0,
            period: TimePeriod::Night,
            current_tick: 0,
            treasury: 0,
            villagers: vec![],
            merchants: vec![],
            recent_events: vec![],
        }
    }

    pub fn add_event(&mut self, event: impl Into<String>) {
        self.recent_events.push(event.into());
        if self.recent_events.len() > MAX_RECENT_EVENTS {
            self.recent_events.remove(0);
        }
    }

    /// Text block placed in front of the player's order
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Day {} ({:?}), tick {}\n", self.day, self.period, self.current_tick));
        s.push_str(&format!("Treasury: {} gold\n", self.treasury));

        if !self.villagers.is_empty() {
            s.push_str("\nVillagers:\n");
            for v in &self.villagers {
                s.push_str(&format!(
                    "- {} ({}, {}, task: {}, goods: {}, earnings: {})\n",
                    v.name, v.occupation, v.status, v.task, v.goods, v.earnings
                ));
            }
        }

        if !self.merchants.is_empty() {
            s.push_str("\nMerchants:\n");
            for (name, gold) in &self.merchants {
                s.push_str(&format!("- {} ({} gold)\n", name, gold));
            }
        }

        if !self.recent_events.is_empty() {
            s.push_str("\nRecent Events:\n");
            for event in &self.recent_events {
                s.push_str(&format!("- {}\n", event));
            }
        }
        s
    }

    /// Case-insensitive partial name match
    pub fn find_villager(&self, name: &str) -> Option<&NamedVillager> {
        let name_lower = name.to_lowercase();
        self.villagers
            .iter()
            .find(|v| v.name.to_lowercase().contains(&name_lower))
    }
}
