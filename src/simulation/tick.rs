//! Tick system - advances the clock and every villager
//!
//! Villagers are updated one after another. Shared state they touch (the
//! merchants' purses, the mayor's position) is lent to them through a
//! [`TickContext`] for the duration of their update.

use tracing::{debug, info};

use crate::core::config::SimulationConfig;
use crate::core::types::MerchantId;
use crate::ecs::world::{Mayor, World};
use crate::economy::merchant::Merchant;
use crate::simulation::events::VillageEvent;

/// Shared world state lent to a villager while it updates
pub struct TickContext<'a> {
    pub config: &'a SimulationConfig,
    pub merchants: &'a mut [Merchant],
    pub mayor: Option<&'a Mayor>,
}

impl<'a> TickContext<'a> {
    pub fn new(
        config: &'a SimulationConfig,
        merchants: &'a mut [Merchant],
        mayor: Option<&'a Mayor>,
    ) -> Self {
        Self {
            config,
            merchants,
            mayor,
        }
    }

    pub fn merchant_mut(&mut self, id: MerchantId) -> Option<&mut Merchant> {
        self.merchants.get_mut(id.0 as usize)
    }
}

/// Run one simulation tick, returning everything that happened in it
pub fn run_simulation_tick(world: &mut World) -> Vec<VillageEvent> {
    world.current_tick += 1;
    let dt = world.config.tick_seconds;

    let mut events = Vec::new();
    if world.calendar.advance(dt) {
        let day = world.calendar.current_day();
        info!(day, "a new day begins");
        events.push(VillageEvent::DayStarted { day });
    }

    events.extend(world.advance_npcs(dt));
    debug!(tick = world.current_tick, events = events.len(), "tick complete");

    world.events.extend(world.current_tick, events.iter().cloned());
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{NpcType, Vec2};
    use crate::entity::tasks::TaskKind;

    #[test]
    fn test_tick_advances_counter_and_clock() {
        let mut world = World::new(SimulationConfig::default());
        run_simulation_tick(&mut world);
        run_simulation_tick(&mut world);
        assert_eq!(world.current_tick, 2);
        assert!((world.calendar.elapsed_seconds() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_day_started_event() {
        let config = SimulationConfig {
            day_length_seconds: 1.0,
            ..Default::default()
        };
        let mut world = World::new(config);
        let events: Vec<VillageEvent> = (0..11).flat_map(|_| run_simulation_tick(&mut world)).collect();
        assert!(events.contains(&VillageEvent::DayStarted { day: 1 }));
    }

    #[test]
    fn test_tick_drives_tasks_to_completion() {
        let mut world = World::new(SimulationConfig::default());
        let id = world.spawn_npc("Rolf", NpcType::Guard, Vec2::default());
        world.assign_task(id, TaskKind::FollowMayor).unwrap();

        let events = run_simulation_tick(&mut world);
        assert!(events.contains(&VillageEvent::TaskCompleted {
            npc: "Rolf".into(),
            task: TaskKind::FollowMayor,
        }));
        assert!(!world.npc(id).unwrap().is_task_active());
    }
}
