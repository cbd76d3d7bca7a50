//! Plan builders for default work, market trips and mayor's tasks

use tracing::{debug, warn};

use crate::core::config::SimulationConfig;
use crate::core::types::{NpcType, Vec2};
use crate::economy::merchant::Merchant;
use crate::entity::npc::Npc;
use crate::entity::plan::{Animation, Effect, Plan, Step};
use crate::entity::tasks::TaskKind;

/// Multipliers for the three forge stations
#[derive(Debug, Clone, Copy)]
struct ForgeTimes {
    bellows: f32,
    anvil: f32,
    storage: Option<f32>,
}

fn forge_cycle(npc: &Npc, times: ForgeTimes, effect: Effect, rest: f32) -> Vec<Step> {
    let work = &npc.work;
    let mut steps = Vec::new();
    let stations = [
        (work.bellows, Some(times.bellows), Animation::Bellows),
        (work.anvil, Some(times.anvil), Animation::Anvil),
        (work.storage, times.storage, Animation::Storage),
    ];
    for (point, secs, animation) in stations {
        if let (Some(point), Some(secs)) = (point, secs) {
            steps.push(Step::MoveTo(point));
            steps.push(Step::hold(secs, animation));
        }
    }
    steps.push(Step::Effect(effect));
    steps.push(Step::hold(rest, Animation::Idle));
    steps
}

fn field_pass(npc: &Npc, config: &SimulationConfig, effect: Effect) -> Vec<Step> {
    let hold = npc.work.timings.work_cycle_time(config);
    let mut steps: Vec<Step> = npc
        .work
        .field_waypoints
        .iter()
        .flat_map(|&point| [Step::MoveTo(point), Step::hold(hold, Animation::FieldWork)])
        .collect();
    steps.push(Step::Effect(effect));
    steps.push(Step::hold(config.cycle_rest_time, Animation::Idle));
    steps
}

fn repeat(cycle: Vec<Step>, times: u32) -> Vec<Step> {
    let mut steps = Vec::with_capacity(cycle.len() * times as usize);
    for _ in 0..times {
        steps.extend(cycle.iter().copied());
    }
    steps
}

/// Forge stations this villager has no position for
pub fn missing_stations(npc: &Npc) -> Vec<&'static str> {
    let work = &npc.work;
    [
        ("bellows", work.bellows),
        ("anvil", work.anvil),
        ("storage", work.storage),
    ]
    .into_iter()
    .filter(|(_, point)| point.is_none())
    .map(|(label, _)| label)
    .collect()
}

/// One stretch of occupation work, or `None` for villagers without a
/// routine (merchants, guards, an enemy with nobody to chase)
pub fn work_phase(npc: &Npc, config: &SimulationConfig, mayor_present: bool) -> Option<Plan> {
    match npc.npc_type {
        NpcType::Blacksmith => {
            if missing_stations(npc).len() == 3 {
                debug!(npc = %npc.name, "no forge stations, nothing to work on");
                return None;
            }
            let secs = npc.work.timings.work_cycle_time(config);
            let times = ForgeTimes {
                bellows: secs,
                anvil: secs,
                storage: Some(secs),
            };
            let cycle = forge_cycle(npc, times, Effect::ProduceTool, config.cycle_rest_time);
            let cycles = npc.work.timings.cycles_before_selling(config);
            Some(Plan::new(repeat(cycle, cycles)))
        }
        NpcType::Farmer => {
            if npc.work.field_waypoints.is_empty() {
                warn!(npc = %npc.name, "no field waypoints, working in place");
            }
            let cycle = field_pass(npc, config, Effect::ProduceCrop);
            let cycles = npc.work.timings.cycles_before_selling(config);
            Some(Plan::new(repeat(cycle, cycles)))
        }
        NpcType::Enemy if mayor_present => Some(Plan::new(vec![
            Step::Chase,
            Step::hold(config.punch_time, Animation::Punch),
        ])),
        NpcType::Enemy | NpcType::Merchant | NpcType::Guard => None,
    }
}

/// Walk to the market, sell, walk back
///
/// Needs goods, an assigned merchant that exists and a path to it.
pub fn sell_trip(npc: &Npc, merchants: &[Merchant], config: &SimulationConfig) -> Option<Plan> {
    if npc.stats.goods_produced == 0 || npc.work.path_to_merchant.is_empty() {
        return None;
    }
    let merchant_id = npc.work.merchant?;
    let Some(merchant) = merchants.get(merchant_id.0 as usize) else {
        warn!(npc = %npc.name, merchant = merchant_id.0, "assigned merchant does not exist");
        return None;
    };

    let path = &npc.work.path_to_merchant;
    let mut steps: Vec<Step> = path.iter().map(|&p| Step::MoveTo(p)).collect();
    steps.push(Step::MoveTo(merchant.stand_position()));
    steps.push(Step::hold(
        npc.work.timings.selling_time(config),
        Animation::Sell,
    ));
    steps.push(Step::Effect(Effect::SettleSale(merchant_id)));
    steps.extend(path.iter().rev().map(|&p| Step::MoveTo(p)));
    Some(Plan::new(steps))
}

/// Build the plan for a mayor's task. An empty plan means the task is
/// over as soon as it starts.
pub fn task_plan(task: TaskKind, npc: &Npc, config: &SimulationConfig) -> Plan {
    match task {
        TaskKind::PatrolVillage => {
            if npc.work.patrol_points.is_empty() {
                warn!(npc = %npc.name, "no patrol points, patrol ends at once");
                return Plan::empty();
            }
            let cycle = npc
                .work
                .patrol_points
                .iter()
                .flat_map(|&p| [Step::MoveTo(p), Step::hold(config.patrol_pause, Animation::LookAround)])
                .collect();
            Plan::looping(cycle, config.patrol_duration)
        }
        TaskKind::FollowMayor => Plan::new(vec![Step::FollowMayor {
            remaining: config.follow_duration,
        }]),
        TaskKind::CraftTools => {
            let secs = npc.work.timings.work_cycle_time(config);
            let times = ForgeTimes {
                bellows: secs,
                anvil: secs,
                storage: Some(secs),
            };
            let cycle = forge_cycle(npc, times, Effect::CraftTool, config.cycle_rest_time);
            Plan::new(repeat(cycle, config.tools_per_task))
        }
        TaskKind::ForgeWeapons => {
            let secs = npc.work.timings.work_cycle_time(config);
            let times = ForgeTimes {
                bellows: secs * config.forge_bellows_multiplier,
                anvil: secs * config.forge_anvil_multiplier,
                storage: None,
            };
            let cycle = forge_cycle(npc, times, Effect::ForgeWeapon, config.forge_rest_time);
            Plan::new(repeat(cycle, config.weapons_per_task))
        }
        TaskKind::MineResources => mining_trip(npc, config),
        TaskKind::HarvestCrops => {
            if npc.work.field_waypoints.is_empty() {
                warn!(npc = %npc.name, "no field waypoints, harvesting in place");
            }
            let cycle = field_pass(npc, config, Effect::HarvestCrop);
            Plan::new(repeat(cycle, config.harvest_passes))
        }
        TaskKind::ReportProduction => Plan::empty(),
    }
}

fn mining_trip(npc: &Npc, config: &SimulationConfig) -> Plan {
    let work = &npc.work;
    let Some(mine_point) = work.mine_point else {
        warn!(npc = %npc.name, "no mine point set, cannot mine");
        return Plan::empty();
    };
    if work.mine_path.is_empty() {
        warn!(npc = %npc.name, "no path to the mine, cannot mine");
        return Plan::empty();
    }

    let mut steps: Vec<Step> = work.mine_path.iter().map(|&p| Step::MoveTo(p)).collect();
    steps.push(Step::MoveTo(mine_point));
    steps.push(Step::hold(work.timings.mining_time(config), Animation::Mine));
    steps.push(Step::Effect(Effect::MineOre));
    steps.extend(work.mine_path.iter().rev().map(|&p| Step::MoveTo(p)));
    if let Some(bellows) = work.bellows {
        steps.push(Step::MoveTo(bellows));
    }
    Plan::new(steps)
}

/// Point `distance` units behind someone at `position` facing `facing`
pub fn point_behind(position: Vec2, facing: Vec2, distance: f32) -> Vec2 {
    position - facing.normalize() * distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MerchantId;
    use crate::economy::merchant::MerchantType;
    use crate::entity::npc::WorkConfig;

    fn smith() -> Npc {
        Npc::new("Bjorn", NpcType::Blacksmith, Vec2::default()).with_work(WorkConfig {
            bellows: Some(Vec2::new(-12.0, 10.0)),
            anvil: Some(Vec2::new(-10.0, 12.0)),
            storage: Some(Vec2::new(-8.0, 10.0)),
            path_to_merchant: vec![Vec2::new(-5.0, 5.0), Vec2::new(5.0, 2.0)],
            merchant: Some(MerchantId(0)),
            mine_path: vec![Vec2::new(-15.0, 15.0)],
            mine_point: Some(Vec2::new(-22.0, 30.0)),
            ..Default::default()
        })
    }

    fn count_effects(plan: &mut Plan, effect: Effect) -> usize {
        let mut n = 0;
        while let Some(step) = plan.next_step() {
            if step == Step::Effect(effect) {
                n += 1;
            }
        }
        n
    }

    #[test]
    fn test_blacksmith_phase_has_five_cycles() {
        let config = SimulationConfig::default();
        let mut plan = work_phase(&smith(), &config, false).unwrap();
        // 3 stations x 2 steps + effect + rest
        assert_eq!(plan.queued_steps(), 5 * 8);
        assert_eq!(count_effects(&mut plan, Effect::ProduceTool), 5);
    }

    #[test]
    fn test_smith_without_forge_has_no_routine() {
        let config = SimulationConfig::default();
        let bare = Npc::new("Bjorn", NpcType::Blacksmith, Vec2::default());
        assert_eq!(missing_stations(&bare), vec!["bellows", "anvil", "storage"]);
        assert!(work_phase(&bare, &config, false).is_none());

        let mut partial = smith();
        partial.work.storage = None;
        assert_eq!(missing_stations(&partial), vec!["storage"]);
        assert!(work_phase(&partial, &config, false).is_some());
    }

    #[test]
    fn test_guard_has_no_routine() {
        let config = SimulationConfig::default();
        let guard = Npc::new("Rolf", NpcType::Guard, Vec2::default());
        assert!(work_phase(&guard, &config, true).is_none());
    }

    #[test]
    fn test_enemy_needs_mayor() {
        let config = SimulationConfig::default();
        let enemy = Npc::new("Bandit", NpcType::Enemy, Vec2::default());
        assert!(work_phase(&enemy, &config, false).is_none());
        assert!(work_phase(&enemy, &config, true).is_some());
    }

    #[test]
    fn test_sell_trip_walks_back_in_reverse() {
        let config = SimulationConfig::default();
        let mut npc = smith();
        npc.stats.goods_produced = 5;
        let merchants = vec![Merchant::new(
            MerchantId(0),
            "Stall",
            MerchantType::General,
            Vec2::new(15.0, 0.0),
        )];
        let mut plan = sell_trip(&npc, &merchants, &config).unwrap();
        let steps: Vec<Step> = std::iter::from_fn(|| plan.next_step()).collect();
        assert_eq!(steps[0], Step::MoveTo(Vec2::new(-5.0, 5.0)));
        assert_eq!(steps[2], Step::MoveTo(Vec2::new(15.0, 0.0)));
        assert_eq!(steps[4], Step::Effect(Effect::SettleSale(MerchantId(0))));
        assert_eq!(steps[5], Step::MoveTo(Vec2::new(5.0, 2.0)));
        assert_eq!(steps[6], Step::MoveTo(Vec2::new(-5.0, 5.0)));
    }

    #[test]
    fn test_sell_trip_requires_goods() {
        let config = SimulationConfig::default();
        assert!(sell_trip(&smith(), &[], &config).is_none());
    }

    #[test]
    fn test_forge_uses_multipliers() {
        let config = SimulationConfig::default();
        let mut plan = task_plan(TaskKind::ForgeWeapons, &smith(), &config);
        let steps: Vec<Step> = std::iter::from_fn(|| plan.next_step()).collect();
        assert_eq!(steps[1], Step::hold(3.0, Animation::Bellows));
        assert_eq!(steps[3], Step::hold(4.0, Animation::Anvil));
        assert_eq!(steps[4], Step::Effect(Effect::ForgeWeapon));
        assert_eq!(steps.len(), 3 * 6);
    }

    #[test]
    fn test_mining_without_point_is_empty() {
        let config = SimulationConfig::default();
        let farmer = Npc::new("Ada", NpcType::Farmer, Vec2::default());
        assert!(task_plan(TaskKind::MineResources, &farmer, &config).is_finished());
    }

    #[test]
    fn test_point_behind() {
        let p = point_behind(Vec2::new(0.0, 0.0), Vec2::new(0.0, 2.0), 3.0);
        assert_eq!(p, Vec2::new(0.0, -3.0));
    }
}
