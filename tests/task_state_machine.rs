//! Task queue and default work integration tests

use village_sim::core::config::SimulationConfig;
use village_sim::core::error::VillageError;
use village_sim::core::types::{NpcId, NpcType, Vec2};
use village_sim::ecs::world::World;
use village_sim::entity::controller::WorkPhase;
use village_sim::entity::npc::WorkConfig;
use village_sim::entity::tasks::TaskKind;
use village_sim::entity::{Assignment, Npc};
use village_sim::simulation::events::VillageEvent;
use village_sim::simulation::tick::run_simulation_tick;

fn run_ticks(world: &mut World, ticks: usize) -> Vec<VillageEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(run_simulation_tick(world));
    }
    events
}

fn is_task_event(event: &VillageEvent) -> bool {
    matches!(
        event,
        VillageEvent::TaskStarted { .. }
            | VillageEvent::TaskCompleted { .. }
            | VillageEvent::TaskQueued { .. }
            | VillageEvent::ResumedWork { .. }
    )
}

fn guard_world() -> (World, NpcId) {
    let mut world = World::new(SimulationConfig::default());
    let guard = Npc::new("Rolf", NpcType::Guard, Vec2::default()).with_work(WorkConfig {
        patrol_points: vec![Vec2::new(6.0, 0.0), Vec2::new(6.0, 6.0), Vec2::new(0.0, 6.0)],
        ..Default::default()
    });
    let id = world.add_npc(guard);
    (world, id)
}

fn smith_world() -> (World, NpcId) {
    let mut world = World::new(SimulationConfig::default());
    let stall = world.spawn_merchant(
        "Market Stall",
        village_sim::economy::MerchantType::General,
        Vec2::new(15.0, 0.0),
    );
    let smith = Npc::new("Bjorn", NpcType::Blacksmith, Vec2::new(-10.0, 10.0)).with_work(WorkConfig {
        bellows: Some(Vec2::new(-12.0, 10.0)),
        anvil: Some(Vec2::new(-10.0, 12.0)),
        storage: Some(Vec2::new(-8.0, 10.0)),
        path_to_merchant: vec![Vec2::new(-5.0, 5.0), Vec2::new(5.0, 2.0)],
        merchant: Some(stall),
        ..Default::default()
    });
    let id = world.add_npc(smith);
    (world, id)
}

#[test]
fn test_queued_tasks_run_in_arrival_order() {
    let (mut world, id) = guard_world();

    assert_eq!(
        world.assign_task(id, TaskKind::FollowMayor).unwrap(),
        Assignment::Started(TaskKind::FollowMayor)
    );
    assert_eq!(
        world.assign_task(id, TaskKind::PatrolVillage).unwrap(),
        Assignment::Queued { task: TaskKind::PatrolVillage, position: 1 }
    );
    assert_eq!(
        world.assign_task(id, TaskKind::ReportProduction).unwrap(),
        Assignment::Queued { task: TaskKind::ReportProduction, position: 2 }
    );

    // No mayor: following ends on the first tick, the 30s patrol follows
    let events: Vec<VillageEvent> = run_ticks(&mut world, 320)
        .into_iter()
        .filter(is_task_event)
        .collect();

    let rolf = || "Rolf".to_string();
    assert_eq!(
        events,
        vec![
            VillageEvent::TaskCompleted { npc: rolf(), task: TaskKind::FollowMayor },
            VillageEvent::TaskStarted { npc: rolf(), task: TaskKind::PatrolVillage },
            VillageEvent::TaskCompleted { npc: rolf(), task: TaskKind::PatrolVillage },
            VillageEvent::TaskStarted { npc: rolf(), task: TaskKind::ReportProduction },
            VillageEvent::TaskCompleted { npc: rolf(), task: TaskKind::ReportProduction },
            VillageEvent::ResumedWork { npc: rolf() },
        ]
    );
    assert!(!world.npc(id).unwrap().is_task_active());
}

#[test]
fn test_task_interrupts_and_work_resumes() {
    let (mut world, id) = smith_world();

    run_ticks(&mut world, 100);
    assert_eq!(world.npc(id).unwrap().work_phase(), WorkPhase::Working);
    let tools_before = world.npc(id).unwrap().stats.tools_crafted;

    world.assign_task(id, TaskKind::CraftTools).unwrap();
    assert_eq!(world.npc(id).unwrap().current_task_name(), "Craft Tools");

    let events = run_ticks(&mut world, 2000);
    assert!(events.contains(&VillageEvent::TaskCompleted {
        npc: "Bjorn".into(),
        task: TaskKind::CraftTools
    }));
    assert!(events.contains(&VillageEvent::ResumedWork { npc: "Bjorn".into() }));

    let bjorn = world.npc(id).unwrap();
    assert!(!bjorn.is_task_active());
    assert_ne!(bjorn.work_phase(), WorkPhase::Starting);
    assert!(bjorn.stats.tools_crafted >= tools_before + 5);
}

#[test]
fn test_unknown_task_name_is_rejected() {
    let (mut world, id) = smith_world();
    world.assign_task(id, TaskKind::ForgeWeapons).unwrap();
    let logged = world.events.len();

    let err = world.assign_task_named(id, "Bake Bread").unwrap_err();
    assert!(matches!(err, VillageError::UnknownTask(name) if name == "Bake Bread"));

    let bjorn = world.npc(id).unwrap();
    assert_eq!(bjorn.current_task(), Some(TaskKind::ForgeWeapons));
    assert!(bjorn.queued_tasks().is_empty());
    assert_eq!(world.events.len(), logged);
}

#[test]
fn test_task_names_accept_loose_spelling() {
    let (mut world, id) = smith_world();
    assert_eq!(
        world.assign_task_named(id, "forge_weapons").unwrap(),
        Assignment::Started(TaskKind::ForgeWeapons)
    );
    assert_eq!(
        world.assign_task_named(id, "  Mine  Resources ").unwrap(),
        Assignment::Queued { task: TaskKind::MineResources, position: 1 }
    );
}

#[test]
fn test_active_flag_tracks_current_task() {
    let (mut world, id) = guard_world();
    world.assign_task(id, TaskKind::PatrolVillage).unwrap();

    for _ in 0..400 {
        run_simulation_tick(&mut world);
        let rolf = world.npc(id).unwrap();
        assert_eq!(rolf.is_task_active(), rolf.current_task().is_some());
        assert_eq!(rolf.is_task_active(), rolf.current_task_name() != "None");
    }
    assert!(!world.npc(id).unwrap().is_task_active());
}

#[test]
fn test_unknown_villager() {
    let (mut world, _) = guard_world();
    let err = world.assign_task(NpcId::new(), TaskKind::PatrolVillage).unwrap_err();
    assert!(matches!(err, VillageError::NpcNotFound(_)));
}
