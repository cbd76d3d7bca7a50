//! World - owns villagers, merchants, the treasury and the clock

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::calendar::Calendar;
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, VillageError};
use crate::core::types::{Gold, MerchantId, NpcId, NpcType, Tick, Vec2};
use crate::economy::merchant::{Merchant, MerchantType};
use crate::economy::treasury::Treasury;
use crate::entity::controller::Assignment;
use crate::entity::npc::Npc;
use crate::entity::tasks::TaskKind;
use crate::simulation::events::{EventLog, VillageEvent};
use crate::simulation::tick::TickContext;

/// The player character handing out orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mayor {
    pub name: String,
    pub position: Vec2,
    /// Direction the mayor is looking; followers trail opposite to it
    pub facing: Vec2,
}

impl Mayor {
    pub fn new(name: impl Into<String>, position: Vec2) -> Self {
        Self {
            name: name.into(),
            position,
            facing: Vec2::new(0.0, 1.0),
        }
    }
}

#[derive(Debug)]
pub struct World {
    pub config: SimulationConfig,
    pub calendar: Calendar,
    pub current_tick: Tick,
    npcs: Vec<Npc>,
    npc_registry: AHashMap<NpcId, usize>,
    pub merchants: Vec<Merchant>,
    pub treasury: Treasury,
    pub mayor: Option<Mayor>,
    pub rng: ChaCha8Rng,
    pub events: EventLog,
}

impl World {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            calendar: Calendar::new(config.day_length_seconds),
            current_tick: 0,
            npcs: Vec::new(),
            npc_registry: AHashMap::new(),
            merchants: Vec::new(),
            treasury: Treasury::default(),
            mayor: None,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            events: EventLog::default(),
            config,
        }
    }

    pub fn spawn_npc(&mut self, name: impl Into<String>, npc_type: NpcType, position: Vec2) -> NpcId {
        self.add_npc(Npc::new(name, npc_type, position))
    }

    pub fn add_npc(&mut self, npc: Npc) -> NpcId {
        let id = npc.id;
        self.npc_registry.insert(id, self.npcs.len());
        self.npcs.push(npc);
        id
    }

    pub fn spawn_merchant(
        &mut self,
        name: impl Into<String>,
        merchant_type: MerchantType,
        position: Vec2,
    ) -> MerchantId {
        let id = MerchantId(self.merchants.len() as u32);
        self.merchants.push(Merchant::new(id, name, merchant_type, position));
        id
    }

    pub fn merchant(&self, id: MerchantId) -> Option<&Merchant> {
        self.merchants.get(id.0 as usize)
    }

    pub fn merchant_by_name(&self, name: &str) -> Option<MerchantId> {
        self.merchants
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .map(|m| m.id)
    }

    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.npc_registry.get(&id).map(|&idx| &self.npcs[idx])
    }

    pub fn npc_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        let idx = *self.npc_registry.get(&id)?;
        self.npcs.get_mut(idx)
    }

    pub fn npcs(&self) -> impl Iterator<Item = &Npc> {
        self.npcs.iter()
    }

    /// Case-insensitive lookup by name
    pub fn npc_by_name(&self, name: &str) -> Option<&Npc> {
        let name = name.trim();
        self.npcs.iter().find(|n| n.name.eq_ignore_ascii_case(name))
    }

    pub fn entity_count(&self) -> usize {
        self.npcs.len()
    }

    fn npc_index(&self, id: NpcId) -> Result<usize> {
        self.npc_registry
            .get(&id)
            .copied()
            .ok_or_else(|| VillageError::NpcNotFound(id.0.to_string()))
    }

    pub fn assign_task(&mut self, id: NpcId, task: TaskKind) -> Result<Assignment> {
        let idx = self.npc_index(id)?;
        let assignment = self.npcs[idx].assign_task(task, &self.config);
        self.collect_events();
        Ok(assignment)
    }

    pub fn assign_task_named(&mut self, id: NpcId, name: &str) -> Result<Assignment> {
        let idx = self.npc_index(id)?;
        let assignment = self.npcs[idx].assign_task_named(name, &self.config);
        self.collect_events();
        assignment
    }

    pub fn submit_to_treasury(&mut self, id: NpcId) -> Result<Gold> {
        let idx = self.npc_index(id)?;
        let amount = self.npcs[idx].submit_to_treasury(&mut self.treasury);
        self.collect_events();
        Ok(amount)
    }

    pub fn task_report(&self, id: NpcId) -> Result<String> {
        let idx = self.npc_index(id)?;
        Ok(self.npcs[idx].task_report())
    }

    /// Closest villager within `radius` of the mayor
    pub fn nearest_npc_to_mayor(&self, radius: f32) -> Option<NpcId> {
        let mayor = self.mayor.as_ref()?;
        self.npcs
            .iter()
            .map(|npc| (npc.id, npc.position.distance(&mayor.position)))
            .filter(|(_, dist)| *dist <= radius)
            .min_by_key(|(_, dist)| OrderedFloat(*dist))
            .map(|(id, _)| id)
    }

    /// Tick every villager serially by `dt` seconds
    pub fn advance_npcs(&mut self, dt: f32) -> Vec<VillageEvent> {
        let mut ctx = TickContext::new(&self.config, &mut self.merchants, self.mayor.as_ref());
        let mut events = Vec::new();
        for npc in &mut self.npcs {
            npc.tick(&mut ctx, dt);
            events.extend(npc.drain_events());
        }
        events
    }

    /// Move events raised outside the tick loop into the log
    pub fn collect_events(&mut self) -> Vec<VillageEvent> {
        let events: Vec<VillageEvent> = self.npcs.iter_mut().flat_map(|n| n.drain_events()).collect();
        self.events.extend(self.current_tick, events.iter().cloned());
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(SimulationConfig::default())
    }

    #[test]
    fn test_spawn_and_lookup() {
        let mut world = world();
        let id = world.spawn_npc("Bjorn", NpcType::Blacksmith, Vec2::default());
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.npc(id).map(|n| n.name.as_str()), Some("Bjorn"));
        assert_eq!(world.npc_by_name("bjorn").map(|n| n.id), Some(id));
        assert!(world.npc_by_name("Ada").is_none());
    }

    #[test]
    fn test_unknown_npc_errors() {
        let mut world = world();
        let ghost = NpcId::new();
        assert!(matches!(
            world.assign_task(ghost, TaskKind::PatrolVillage),
            Err(VillageError::NpcNotFound(_))
        ));
    }

    #[test]
    fn test_nearest_npc_to_mayor() {
        let mut world = world();
        let far = world.spawn_npc("Far", NpcType::Guard, Vec2::new(4.0, 0.0));
        let near = world.spawn_npc("Near", NpcType::Guard, Vec2::new(1.0, 1.0));
        world.spawn_npc("Outside", NpcType::Guard, Vec2::new(40.0, 0.0));
        assert_eq!(world.nearest_npc_to_mayor(5.0), None);

        world.mayor = Some(Mayor::new("Mayor", Vec2::default()));
        assert_eq!(world.nearest_npc_to_mayor(5.0), Some(near));
        world.npc_mut(near).unwrap().position = Vec2::new(30.0, 0.0);
        assert_eq!(world.nearest_npc_to_mayor(5.0), Some(far));
    }

    #[test]
    fn test_assign_records_events() {
        let mut world = world();
        let id = world.spawn_npc("Rolf", NpcType::Guard, Vec2::default());
        world.assign_task(id, TaskKind::ReportProduction).unwrap();
        assert!(world
            .events
            .iter()
            .any(|e| matches!(e.event, VillageEvent::TaskCompleted { .. })));
    }

    #[test]
    fn test_merchant_ids_are_indices() {
        let mut world = world();
        let a = world.spawn_merchant("A", MerchantType::General, Vec2::default());
        let b = world.spawn_merchant("B", MerchantType::Farmer, Vec2::default());
        assert_eq!(a, MerchantId(0));
        assert_eq!(world.merchant(b).map(|m| m.name.as_str()), Some("B"));
        assert_eq!(world.merchant_by_name("b"), Some(b));
    }
}
