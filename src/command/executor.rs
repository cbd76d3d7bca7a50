//! Command execution - applies resolved orders to villagers

use tracing::{info, warn};

use crate::command::resolver::{OrderResolution, OrderResolver};
use crate::core::types::{Gold, NpcId};
use crate::ecs::world::World;
use crate::entity::controller::Assignment;
use crate::entity::tasks::TaskKind;
use crate::llm::context::VillageContext;
use crate::llm::parser::{OrderAction, ParsedOrder};

/// Executes orders by calling into the villagers' state machines
pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute a parsed order against the world
    pub fn execute(world: &mut World, order: &ParsedOrder) -> ExecutionResult {
        let resolution = OrderResolver::new(world).resolve(order);
        let mut result = ExecutionResult::new(order.action);
        result.messages.extend(resolution.notes.iter().cloned());

        if resolution.subjects.is_empty() && needs_subjects(order.action) {
            result.error = Some("No matching villagers found for command".to_string());
            return result;
        }

        match order.action {
            OrderAction::Assign => assign(world, order, &resolution, &mut result),
            OrderAction::Submit => {
                for subject in &resolution.subjects {
                    match world.submit_to_treasury(subject.npc_id) {
                        Ok(amount) => {
                            result.gold_submitted += amount;
                            result.affected.push((subject.npc_id, subject.name.clone()));
                            result
                                .messages
                                .push(format!("{} submitted {} gold", subject.name, amount));
                        }
                        Err(e) => warn!(npc = %subject.name, error = %e, "submit failed"),
                    }
                }
                result
                    .messages
                    .push(format!("Treasury now holds {} gold", world.treasury.gold()));
            }
            OrderAction::Report => {
                for subject in &resolution.subjects {
                    if let Ok(report) = world.task_report(subject.npc_id) {
                        result.affected.push((subject.npc_id, subject.name.clone()));
                        result.messages.push(format!("{}:\n{}", subject.name, report));
                    }
                }
            }
            OrderAction::Query => {
                result.messages.push(VillageContext::from_world(world).summary());
            }
            OrderAction::Unknown => {
                result.error = Some("Could not understand the order".to_string());
            }
        }
        result
    }
}

fn assign(world: &mut World, order: &ParsedOrder, resolution: &OrderResolution, result: &mut ExecutionResult) {
    let Some(task) = resolution.task else {
        let name = order.task.as_deref().unwrap_or("nothing");
        result.error = Some(format!("Unknown task: {name}"));
        return;
    };

    for subject in &resolution.subjects {
        if !TaskKind::available_for(subject.occupation).contains(&task) {
            result.messages.push(format!(
                "{} is a {} and can't {}",
                subject.name,
                subject.occupation.to_string().to_lowercase(),
                task.display_name().to_lowercase()
            ));
            continue;
        }

        match world.assign_task(subject.npc_id, task) {
            Ok(Assignment::Started(_)) => {
                result.tasks_assigned += 1;
                result.affected.push((subject.npc_id, subject.name.clone()));
                result.messages.push(format!("{} started {}", subject.name, task));
            }
            Ok(Assignment::Queued { position, .. }) => {
                result.tasks_assigned += 1;
                result.affected.push((subject.npc_id, subject.name.clone()));
                result
                    .messages
                    .push(format!("{} queued {} (position {})", subject.name, task, position));
            }
            Err(e) => warn!(npc = %subject.name, error = %e, "assignment failed"),
        }
    }

    if result.tasks_assigned == 0 && result.error.is_none() {
        result.error = Some(format!("Nobody could take on {task}"));
    }
    info!(%task, assigned = result.tasks_assigned, "order executed");
}

/// Result of executing an order
#[derive(Debug)]
pub struct ExecutionResult {
    pub action: OrderAction,
    pub tasks_assigned: usize,
    pub gold_submitted: Gold,
    pub affected: Vec<(NpcId, String)>,
    /// Lines to show the mayor
    pub messages: Vec<String>,
    pub error: Option<String>,
}

impl ExecutionResult {
    fn new(action: OrderAction) -> Self {
        Self {
            action,
            tasks_assigned: 0,
            gold_submitted: 0,
            affected: Vec::new(),
            messages: Vec::new(),
            error: None,
        }
    }
}

fn needs_subjects(action: OrderAction) -> bool {
    !matches!(action, OrderAction::Query | OrderAction::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::{NpcType, Vec2};

    fn village() -> (World, NpcId, NpcId) {
        let mut world = World::new(SimulationConfig::default());
        let bjorn = world.spawn_npc("Bjorn", NpcType::Blacksmith, Vec2::default());
        let rolf = world.spawn_npc("Rolf", NpcType::Guard, Vec2::default());
        world.npc_mut(rolf).unwrap().work.patrol_points = vec![Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0)];
        (world, bjorn, rolf)
    }

    fn order(action: OrderAction, task: Option<&str>, subjects: Option<Vec<&str>>) -> ParsedOrder {
        ParsedOrder {
            action,
            task: task.map(str::to_string),
            subjects: subjects.map(|s| s.into_iter().map(str::to_string).collect()),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_execute_assign_command() {
        let (mut world, _, rolf) = village();
        let result = CommandExecutor::execute(
            &mut world,
            &order(OrderAction::Assign, Some("Patrol Village"), Some(vec!["Rolf"])),
        );

        assert_eq!(result.tasks_assigned, 1);
        assert!(result.error.is_none());
        assert_eq!(world.npc(rolf).unwrap().current_task(), Some(TaskKind::PatrolVillage));
    }

    #[test]
    fn test_assign_second_task_is_queued() {
        let (mut world, bjorn, _) = village();
        let craft = order(OrderAction::Assign, Some("Craft Tools"), Some(vec!["Bjorn"]));
        let forge = order(OrderAction::Assign, Some("Forge Weapons"), Some(vec!["Bjorn"]));
        CommandExecutor::execute(&mut world, &craft);
        let result = CommandExecutor::execute(&mut world, &forge);

        assert_eq!(result.messages, vec!["Bjorn queued Forge Weapons (position 1)".to_string()]);
        assert_eq!(world.npc(bjorn).unwrap().queued_tasks(), vec![TaskKind::ForgeWeapons]);
    }

    #[test]
    fn test_assign_unknown_task() {
        let (mut world, bjorn, _) = village();
        let result = CommandExecutor::execute(
            &mut world,
            &order(OrderAction::Assign, Some("Bake Bread"), Some(vec!["Bjorn"])),
        );

        assert_eq!(result.error.as_deref(), Some("Unknown task: Bake Bread"));
        assert!(!world.npc(bjorn).unwrap().is_task_active());
    }

    #[test]
    fn test_assign_skips_incapable_occupation() {
        let (mut world, _, rolf) = village();
        let result = CommandExecutor::execute(
            &mut world,
            &order(OrderAction::Assign, Some("Forge Weapons"), Some(vec!["Rolf"])),
        );

        assert_eq!(result.tasks_assigned, 0);
        assert!(result.error.is_some());
        assert!(!world.npc(rolf).unwrap().is_task_active());
    }

    #[test]
    fn test_submit_everyone() {
        let (mut world, bjorn, _) = village();
        world.npc_mut(bjorn).unwrap().stats.daily_earnings = 60;

        let result = CommandExecutor::execute(&mut world, &order(OrderAction::Submit, None, Some(vec!["everyone"])));

        assert_eq!(result.gold_submitted, 60);
        assert_eq!(world.treasury.gold(), 1060);
        assert_eq!(world.npc(bjorn).unwrap().stats.daily_earnings, 0);
    }

    #[test]
    fn test_query_needs_no_subjects() {
        let (mut world, _, _) = village();
        let result = CommandExecutor::execute(&mut world, &order(OrderAction::Query, None, None));
        assert!(result.error.is_none());
        assert!(result.messages[0].contains("Treasury: 1000 gold"));
    }

    #[test]
    fn test_no_matching_villagers() {
        let (mut world, _, _) = village();
        let result = CommandExecutor::execute(&mut world, &order(OrderAction::Report, None, Some(vec!["Zed"])));
        assert!(result.error.is_some());
    }
}
