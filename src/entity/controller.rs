//! Villager work/task state machine
//!
//! Every villager is either running its occupation routine or a task the
//! mayor handed out. Tasks interrupt the routine, later tasks wait in a FIFO
//! queue, and once the queue drains the villager goes back to work.
//!
//! Both routines and tasks are compiled into a [`Plan`] which `tick` polls
//! with the seconds available this frame. Instant steps (effects, moves to
//! a point already reached) run even when no time is left; timed steps
//! stay at the front of the plan until their time has been spent.

use tracing::{debug, info, warn};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{GoodsKind, Gold, MerchantId, NpcType};
use crate::economy::treasury::Treasury;
use crate::entity::npc::Npc;
use crate::entity::plan::{Animation, Effect, Plan, Step};
use crate::entity::routines;
use crate::entity::tasks::{TaskKind, TaskQueue};
use crate::simulation::events::VillageEvent;
use crate::simulation::movement::step_towards;
use crate::simulation::tick::TickContext;

/// Upper bound on steps executed per villager per tick
pub const MAX_STEPS_PER_TICK: usize = 64;

const TIME_EPSILON: f32 = 1e-4;

/// Where a villager is in its occupation routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkPhase {
    /// No routine planned yet (fresh, idle, or just back from a task)
    Starting,
    Working,
    Selling,
}

#[derive(Debug, Clone)]
pub struct NpcController {
    tasks: TaskQueue,
    phase: WorkPhase,
    plan: Plan,
}

impl NpcController {
    pub fn new() -> Self {
        Self {
            tasks: TaskQueue::new(),
            phase: WorkPhase::Starting,
            plan: Plan::empty(),
        }
    }
}

impl Default for NpcController {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of handing a task to a villager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Started(TaskKind),
    Queued { task: TaskKind, position: usize },
}

impl Npc {
    /// Hand a task to this villager.
    ///
    /// An idle villager drops its routine and starts right away; a busy one
    /// queues the task behind the ones already waiting.
    pub fn assign_task(&mut self, task: TaskKind, config: &SimulationConfig) -> Assignment {
        match self.controller.tasks.push(task) {
            Some(position) => {
                info!(npc = %self.name, %task, position, "task queued");
                self.emit(VillageEvent::TaskQueued {
                    npc: self.name.clone(),
                    task,
                    position,
                });
                Assignment::Queued { task, position }
            }
            None => {
                info!(npc = %self.name, %task, "task assigned, interrupting default work");
                self.start_current_task(config);
                Assignment::Started(task)
            }
        }
    }

    /// Assign a task by its display name. Unknown names leave the villager
    /// exactly as it was.
    pub fn assign_task_named(&mut self, name: &str, config: &SimulationConfig) -> Result<Assignment> {
        match name.parse::<TaskKind>() {
            Ok(task) => Ok(self.assign_task(task, config)),
            Err(e) => {
                warn!(npc = %self.name, task = name, "unknown task, keeping current activity");
                Err(e)
            }
        }
    }

    pub fn is_task_active(&self) -> bool {
        self.controller.tasks.current().is_some()
    }

    pub fn current_task(&self) -> Option<TaskKind> {
        self.controller.tasks.current()
    }

    pub fn current_task_name(&self) -> &'static str {
        self.current_task().map_or("None", |task| task.display_name())
    }

    pub fn queued_tasks(&self) -> Vec<TaskKind> {
        self.controller.tasks.pending().collect()
    }

    pub fn work_phase(&self) -> WorkPhase {
        self.controller.phase
    }

    pub fn task_report(&self) -> String {
        let stats = &self.stats;
        let mut lines = vec![format!("Current Task: {}", self.current_task_name())];
        match self.npc_type {
            NpcType::Blacksmith => {
                lines.push(format!("Tools Crafted: {}", stats.tools_crafted));
                lines.push(format!("Weapons Forged: {}", stats.weapons_forged));
            }
            NpcType::Farmer => {
                lines.push(format!("Crops Harvested: {}", stats.crops_harvested));
            }
            _ => {}
        }
        lines.push(format!("Daily Earnings: {} gold", stats.daily_earnings));
        lines.push(format!("Goods Ready: {}", stats.goods_produced));
        lines.join("\n")
    }

    /// Hand all of today's earnings to the treasury, returning the amount
    pub fn submit_to_treasury(&mut self, treasury: &mut Treasury) -> Gold {
        let amount = self.stats.daily_earnings;
        if amount == 0 {
            debug!(npc = %self.name, "nothing to submit");
            return 0;
        }
        treasury.add_money(amount);
        self.stats.daily_earnings = 0;
        info!(npc = %self.name, amount, balance = treasury.gold(), "earnings submitted to treasury");
        self.emit(VillageEvent::TreasuryDeposit {
            npc: self.name.clone(),
            amount,
            balance: treasury.gold(),
        });
        amount
    }

    /// Advance whatever this villager is doing by `dt` seconds
    pub fn tick(&mut self, ctx: &mut TickContext<'_>, dt: f32) {
        let mut budget = dt.max(0.0);

        for _ in 0..MAX_STEPS_PER_TICK {
            if self.controller.plan.is_finished() {
                if self.is_task_active() {
                    self.finish_task(ctx.config);
                } else if !self.plan_default_work(ctx) {
                    self.set_animation(Animation::Idle);
                    break;
                }
                continue;
            }

            let cap = self
                .controller
                .plan
                .remaining_time()
                .map_or(budget, |left| left.min(budget));
            let Some(step) = self.controller.plan.next_step() else {
                continue;
            };

            let (unfinished, used) = self.run_step(step, ctx, cap);
            self.controller.plan.record(used);
            budget = (budget - used).max(0.0);

            if let Some(step) = unfinished {
                self.controller.plan.put_back(step);
                if !self.controller.plan.is_finished() {
                    break;
                }
            }
        }
    }

    fn start_current_task(&mut self, config: &SimulationConfig) {
        while let Some(task) = self.controller.tasks.current() {
            self.emit(VillageEvent::TaskStarted {
                npc: self.name.clone(),
                task,
            });
            if task == TaskKind::ReportProduction {
                info!(npc = %self.name, report = %self.task_report(), "production report");
            }

            let plan = routines::task_plan(task, self, config);
            if !plan.is_finished() {
                self.controller.plan = plan;
                return;
            }

            debug!(npc = %self.name, %task, "task finished immediately");
            self.emit(VillageEvent::TaskCompleted {
                npc: self.name.clone(),
                task,
            });
            self.controller.tasks.complete_current();
        }
        self.resume_default_work();
    }

    fn finish_task(&mut self, config: &SimulationConfig) {
        if let Some(task) = self.controller.tasks.current() {
            info!(npc = %self.name, %task, "task completed");
            self.emit(VillageEvent::TaskCompleted {
                npc: self.name.clone(),
                task,
            });
        }
        self.controller.tasks.complete_current();
        self.start_current_task(config);
    }

    fn resume_default_work(&mut self) {
        info!(npc = %self.name, "no tasks left, resuming default work");
        self.controller.phase = WorkPhase::Starting;
        self.controller.plan = Plan::empty();
        self.emit(VillageEvent::ResumedWork {
            npc: self.name.clone(),
        });
    }

    /// Plan the next stretch of routine. Returns false when the villager
    /// has nothing to do.
    fn plan_default_work(&mut self, ctx: &TickContext<'_>) -> bool {
        if self.controller.phase == WorkPhase::Working {
            if let Some(plan) = routines::sell_trip(self, ctx.merchants, ctx.config) {
                info!(npc = %self.name, goods = self.stats.goods_produced, "heading to market");
                self.controller.phase = WorkPhase::Selling;
                self.controller.plan = plan;
                return true;
            }
        }

        match routines::work_phase(self, ctx.config, ctx.mayor.is_some()) {
            Some(plan) => {
                debug!(npc = %self.name, steps = plan.queued_steps(), "starting work phase");
                self.controller.phase = WorkPhase::Working;
                self.controller.plan = plan;
                true
            }
            None => {
                self.controller.phase = WorkPhase::Starting;
                false
            }
        }
    }

    /// Run one step with `budget` seconds. Returns the step if it still
    /// needs time, plus the seconds it used.
    fn run_step(&mut self, step: Step, ctx: &mut TickContext<'_>, budget: f32) -> (Option<Step>, f32) {
        let config = ctx.config;
        let speed = self.work.timings.move_speed(config);

        match step {
            Step::MoveTo(target) => {
                if !self.can_move {
                    return (Some(step), budget);
                }
                let outcome = step_towards(
                    &mut self.position,
                    &mut self.heading,
                    target,
                    speed,
                    config.arrival_distance,
                    budget,
                );
                if outcome.time_used > 0.0 {
                    self.set_animation(Animation::Walk);
                }
                if outcome.arrived {
                    (None, outcome.time_used)
                } else {
                    // A walk that cannot progress still spends the time
                    (Some(step), budget)
                }
            }
            Step::Hold {
                remaining,
                animation,
            } => {
                if remaining <= TIME_EPSILON {
                    return (None, 0.0);
                }
                self.set_animation(animation);
                let used = remaining.min(budget);
                let left = remaining - used;
                if left <= TIME_EPSILON {
                    (None, used)
                } else {
                    (Some(Step::Hold { remaining: left, animation }), used)
                }
            }
            Step::FollowMayor { remaining } => {
                let Some(mayor) = ctx.mayor else {
                    info!(npc = %self.name, "no mayor to follow");
                    return (None, 0.0);
                };
                if remaining <= TIME_EPSILON {
                    return (None, 0.0);
                }
                let used = remaining.min(budget);
                if used <= 0.0 {
                    return (Some(step), 0.0);
                }

                let follow = config.follow_distance;
                if self.can_move && self.position.distance(&mayor.position) > follow {
                    let target = routines::point_behind(mayor.position, mayor.facing, follow);
                    step_towards(
                        &mut self.position,
                        &mut self.heading,
                        target,
                        speed,
                        config.arrival_distance,
                        used,
                    );
                    self.set_animation(Animation::Walk);
                } else {
                    self.set_animation(Animation::Idle);
                }

                let left = remaining - used;
                if left <= TIME_EPSILON {
                    (None, used)
                } else {
                    (Some(Step::FollowMayor { remaining: left }), used)
                }
            }
            Step::Chase => {
                let Some(mayor) = ctx.mayor else {
                    return (None, 0.0);
                };
                if !self.can_move {
                    return (Some(step), budget);
                }
                let outcome = step_towards(
                    &mut self.position,
                    &mut self.heading,
                    mayor.position,
                    speed,
                    config.follow_distance,
                    budget,
                );
                if outcome.time_used > 0.0 {
                    self.set_animation(Animation::Walk);
                }
                if outcome.arrived {
                    (None, outcome.time_used)
                } else {
                    (Some(step), budget)
                }
            }
            Step::Effect(effect) => {
                self.apply_effect(effect, ctx);
                (None, 0.0)
            }
        }
    }

    fn apply_effect(&mut self, effect: Effect, ctx: &mut TickContext<'_>) {
        let config = ctx.config;
        match effect {
            Effect::ProduceTool => {
                self.stats.goods_produced += 1;
                self.stats.tools_crafted += 1;
                self.credit(GoodsKind::Tools, 1, config.tool_value);
            }
            Effect::ProduceCrop => {
                self.stats.goods_produced += 1;
                self.stats.crops_harvested += 1;
                self.credit(GoodsKind::Crops, 1, config.crop_value);
            }
            Effect::CraftTool => {
                self.stats.tools_crafted += 1;
                self.credit(GoodsKind::Tools, 1, config.tool_value);
            }
            Effect::ForgeWeapon => {
                self.stats.weapons_forged += 1;
                self.credit(GoodsKind::Weapons, 1, config.weapon_value);
            }
            Effect::HarvestCrop => {
                self.stats.crops_harvested += 1;
                self.credit(GoodsKind::Crops, 1, config.crop_value);
            }
            Effect::MineOre => {
                let ore = config.ore_per_trip;
                self.stats.goods_produced = self.stats.goods_produced.saturating_add(ore);
                let kind = self.npc_type.goods_kind().unwrap_or(GoodsKind::Tools);
                let earnings = self.work.timings.mining_earnings(config);
                self.credit(kind, ore, earnings);
            }
            Effect::SettleSale(merchant) => self.settle_sale(merchant, ctx),
        }
    }

    fn credit(&mut self, kind: GoodsKind, quantity: u32, earnings: Gold) {
        self.stats.daily_earnings = self.stats.daily_earnings.saturating_add(earnings);
        debug!(
            npc = %self.name,
            %kind,
            quantity,
            earnings = self.stats.daily_earnings,
            "goods produced"
        );
        self.emit(VillageEvent::GoodsProduced {
            npc: self.name.clone(),
            kind,
            quantity,
            earnings,
        });
    }

    /// Sell the goods pile. Goods are cleared only when the merchant pays.
    fn settle_sale(&mut self, merchant_id: MerchantId, ctx: &mut TickContext<'_>) {
        let Some(kind) = self.npc_type.goods_kind() else {
            warn!(npc = %self.name, "this villager has nothing a merchant buys");
            return;
        };
        let quantity = self.stats.goods_produced;
        if quantity == 0 {
            debug!(npc = %self.name, "arrived at market with no goods");
            return;
        }

        let Some(merchant) = ctx.merchant_mut(merchant_id) else {
            warn!(npc = %self.name, merchant = merchant_id.0, "merchant not found, goods kept");
            self.emit(VillageEvent::SaleRejected {
                npc: self.name.clone(),
                merchant: format!("#{}", merchant_id.0),
                reason: "merchant not found".into(),
            });
            return;
        };
        let merchant_name = merchant.name.clone();

        match merchant.receive_goods(kind, quantity) {
            Ok(payment) => {
                self.stats.daily_earnings = self.stats.daily_earnings.saturating_add(payment);
                self.stats.goods_produced = 0;
                info!(npc = %self.name, merchant = %merchant_name, quantity, payment, "goods sold");
                self.emit(VillageEvent::SaleCompleted {
                    npc: self.name.clone(),
                    merchant: merchant_name,
                    kind,
                    quantity,
                    payment,
                });
            }
            Err(e) => {
                warn!(npc = %self.name, merchant = %merchant_name, error = %e, "sale rejected, keeping goods");
                self.emit(VillageEvent::SaleRejected {
                    npc: self.name.clone(),
                    merchant: merchant_name,
                    reason: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::VillageError;
    use crate::core::types::Vec2;
    use crate::ecs::world::Mayor;
    use crate::economy::merchant::{Merchant, MerchantType};
    use crate::entity::npc::WorkConfig;

    fn smith() -> Npc {
        Npc::new("Bjorn", NpcType::Blacksmith, Vec2::new(-10.0, 10.0)).with_work(WorkConfig {
            bellows: Some(Vec2::new(-12.0, 10.0)),
            anvil: Some(Vec2::new(-10.0, 12.0)),
            storage: Some(Vec2::new(-8.0, 10.0)),
            path_to_merchant: vec![Vec2::new(-5.0, 5.0), Vec2::new(5.0, 2.0)],
            merchant: Some(MerchantId(0)),
            ..Default::default()
        })
    }

    fn guard() -> Npc {
        Npc::new("Rolf", NpcType::Guard, Vec2::default()).with_work(WorkConfig {
            patrol_points: vec![Vec2::new(0.0, 5.0), Vec2::new(5.0, 5.0)],
            ..Default::default()
        })
    }

    fn stall(gold: Gold) -> Vec<Merchant> {
        let mut merchant = Merchant::new(MerchantId(0), "Market Stall", MerchantType::General, Vec2::new(15.0, 0.0));
        merchant.gold = gold;
        vec![merchant]
    }

    fn run(
        npc: &mut Npc,
        merchants: &mut [Merchant],
        mayor: Option<&Mayor>,
        config: &SimulationConfig,
        seconds: f32,
    ) -> Vec<VillageEvent> {
        let ticks = (seconds / config.tick_seconds).round() as usize;
        let mut events = Vec::new();
        for _ in 0..ticks {
            let mut ctx = TickContext::new(config, merchants, mayor);
            npc.tick(&mut ctx, config.tick_seconds);
            events.extend(npc.drain_events().into_iter().filter(|e| !e.is_noise()));
        }
        events
    }

    #[test]
    fn test_assign_while_idle_starts() {
        let config = SimulationConfig::default();
        let mut npc = smith();
        assert_eq!(npc.assign_task(TaskKind::CraftTools, &config), Assignment::Started(TaskKind::CraftTools));
        assert!(npc.is_task_active());
        assert_eq!(npc.current_task(), Some(TaskKind::CraftTools));
    }

    #[test]
    fn test_assign_while_busy_queues() {
        let config = SimulationConfig::default();
        let mut npc = smith();
        npc.assign_task(TaskKind::CraftTools, &config);
        assert_eq!(
            npc.assign_task(TaskKind::ForgeWeapons, &config),
            Assignment::Queued { task: TaskKind::ForgeWeapons, position: 1 }
        );
        assert_eq!(
            npc.assign_task(TaskKind::PatrolVillage, &config),
            Assignment::Queued { task: TaskKind::PatrolVillage, position: 2 }
        );
        assert_eq!(npc.queued_tasks(), vec![TaskKind::ForgeWeapons, TaskKind::PatrolVillage]);
    }

    #[test]
    fn test_unknown_task_changes_nothing() {
        let config = SimulationConfig::default();
        let mut npc = smith();
        npc.assign_task(TaskKind::CraftTools, &config);
        npc.drain_events();

        let err = npc.assign_task_named("Juggle Torches", &config).unwrap_err();
        assert!(matches!(err, VillageError::UnknownTask(_)));
        assert_eq!(npc.current_task(), Some(TaskKind::CraftTools));
        assert!(npc.queued_tasks().is_empty());
        assert!(npc.drain_events().is_empty());
    }

    #[test]
    fn test_unknown_task_when_idle_keeps_default_work() {
        let config = SimulationConfig::default();
        let mut npc = smith();
        assert!(npc.assign_task_named("Sing", &config).is_err());
        assert!(!npc.is_task_active());
        assert_eq!(npc.current_task_name(), "None");
    }

    #[test]
    fn test_report_task_completes_immediately() {
        let config = SimulationConfig::default();
        let mut npc = smith();
        assert_eq!(
            npc.assign_task_named("Report Production", &config).unwrap(),
            Assignment::Started(TaskKind::ReportProduction)
        );
        assert!(!npc.is_task_active());
        let events = npc.drain_events();
        assert!(events.contains(&VillageEvent::TaskCompleted {
            npc: "Bjorn".into(),
            task: TaskKind::ReportProduction
        }));
        assert!(events.contains(&VillageEvent::ResumedWork { npc: "Bjorn".into() }));
    }

    #[test]
    fn test_task_report_format() {
        let mut npc = smith();
        npc.stats.tools_crafted = 4;
        npc.stats.daily_earnings = 40;
        npc.stats.goods_produced = 2;
        assert_eq!(
            npc.task_report(),
            "Current Task: None\nTools Crafted: 4\nWeapons Forged: 0\nDaily Earnings: 40 gold\nGoods Ready: 2"
        );

        let farmer = Npc::new("Ada", NpcType::Farmer, Vec2::default());
        assert_eq!(
            farmer.task_report(),
            "Current Task: None\nCrops Harvested: 0\nDaily Earnings: 0 gold\nGoods Ready: 0"
        );
    }

    #[test]
    fn test_submit_to_treasury() {
        let mut treasury = Treasury::new(1000);
        let mut npc = smith();
        npc.stats.daily_earnings = 65;
        assert_eq!(npc.submit_to_treasury(&mut treasury), 65);
        assert_eq!(treasury.gold(), 1065);
        assert_eq!(npc.stats.daily_earnings, 0);

        assert_eq!(npc.submit_to_treasury(&mut treasury), 0);
        assert_eq!(treasury.gold(), 1065);
    }

    #[test]
    fn test_blacksmith_works_then_sells() {
        let config = SimulationConfig::default();
        let mut npc = smith();
        let mut merchants = stall(1000);

        let events = run(&mut npc, &mut merchants, None, &config, 120.0);
        let sale = events.iter().find_map(|e| match e {
            VillageEvent::SaleCompleted { quantity, payment, .. } => Some((*quantity, *payment)),
            _ => None,
        });
        assert_eq!(sale, Some((5, 75)));
        assert_eq!(merchants[0].gold, 925);
        assert!(npc.stats.tools_crafted >= 5);
    }

    #[test]
    fn test_insolvent_merchant_keeps_goods() {
        let config = SimulationConfig::default();
        let mut npc = smith();
        let mut merchants = stall(10);

        let events = run(&mut npc, &mut merchants, None, &config, 120.0);
        assert!(events.iter().any(|e| matches!(e, VillageEvent::SaleRejected { .. })));
        assert!(!events.iter().any(|e| matches!(e, VillageEvent::SaleCompleted { .. })));
        assert!(npc.stats.goods_produced >= 5);
        assert_eq!(merchants[0].gold, 10);
    }

    #[test]
    fn test_patrol_runs_for_its_duration() {
        let config = SimulationConfig::default();
        let mut npc = guard();
        npc.assign_task(TaskKind::PatrolVillage, &config);

        run(&mut npc, &mut [], None, &config, 29.0);
        assert_eq!(npc.current_task(), Some(TaskKind::PatrolVillage));

        let events = run(&mut npc, &mut [], None, &config, 2.0);
        assert!(!npc.is_task_active());
        assert!(events.contains(&VillageEvent::ResumedWork { npc: "Rolf".into() }));
    }

    #[test]
    fn test_follow_without_mayor_ends_next_tick() {
        let config = SimulationConfig::default();
        let mut npc = guard();
        npc.assign_task(TaskKind::FollowMayor, &config);
        npc.assign_task(TaskKind::PatrolVillage, &config);
        npc.drain_events();

        let events = run(&mut npc, &mut [], None, &config, 0.1);
        let completed = events
            .iter()
            .position(|e| matches!(e, VillageEvent::TaskCompleted { task: TaskKind::FollowMayor, .. }));
        let started = events
            .iter()
            .position(|e| matches!(e, VillageEvent::TaskStarted { task: TaskKind::PatrolVillage, .. }));
        assert!(completed.is_some());
        assert!(completed < started);
        assert_eq!(npc.current_task(), Some(TaskKind::PatrolVillage));
    }

    #[test]
    fn test_follow_stays_behind_mayor() {
        let config = SimulationConfig::default();
        let mut npc = guard();
        let mayor = Mayor {
            name: "Mayor".into(),
            position: Vec2::new(20.0, 0.0),
            facing: Vec2::new(1.0, 0.0),
        };
        npc.assign_task(TaskKind::FollowMayor, &config);
        run(&mut npc, &mut [], Some(&mayor), &config, 20.0);
        assert!(npc.position.distance(&mayor.position) <= config.follow_distance + config.arrival_distance + 0.01);
        assert!(npc.position.x < mayor.position.x);
    }

    #[test]
    fn test_stalled_move_makes_no_progress() {
        let config = SimulationConfig::default();
        let mut npc = smith();
        npc.can_move = false;
        let start = npc.position;
        run(&mut npc, &mut stall(1000), None, &config, 5.0);
        assert_eq!(npc.position, start);
        assert_eq!(npc.stats.goods_produced, 0);
    }

    #[test]
    fn test_zero_speed_patrol_still_ends_on_time() {
        let config = SimulationConfig::default();
        let mut npc = guard();
        npc.work.patrol_points = vec![Vec2::new(10.0, 0.0)];
        npc.work.timings.move_speed = Some(0.0);
        npc.assign_task(TaskKind::PatrolVillage, &config);
        npc.assign_task(TaskKind::ReportProduction, &config);

        let events = run(&mut npc, &mut [], None, &config, 31.0);
        assert_eq!(npc.position, Vec2::default());
        assert!(!npc.is_task_active());
        assert!(npc.queued_tasks().is_empty());
        assert!(events.contains(&VillageEvent::TaskCompleted {
            npc: "Rolf".into(),
            task: TaskKind::ReportProduction
        }));
    }

    #[test]
    fn test_enemy_chases_and_punches() {
        let config = SimulationConfig::default();
        let mut enemy = Npc::new("Bandit", NpcType::Enemy, Vec2::new(0.0, 0.0));
        let mayor = Mayor {
            name: "Mayor".into(),
            position: Vec2::new(10.0, 0.0),
            facing: Vec2::new(1.0, 0.0),
        };
        let mut punched = false;
        for _ in 0..60 {
            let mut ctx = TickContext::new(&config, &mut [], Some(&mayor));
            enemy.tick(&mut ctx, config.tick_seconds);
            punched |= enemy.animation == Animation::Punch;
        }
        assert!(punched);
        assert!(enemy.position.distance(&mayor.position) <= config.follow_distance + 0.01);
    }
}
