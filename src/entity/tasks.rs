//! Task kinds and the per-villager task queue

use crate::core::error::VillageError;
use crate::core::types::NpcType;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Orders the mayor can hand out
///
/// Each one interrupts default work, runs for a bounded time or number of
/// cycles, and then hands control back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    PatrolVillage,
    FollowMayor,
    CraftTools,
    ForgeWeapons,
    MineResources,
    HarvestCrops,
    ReportProduction,
}

impl TaskKind {
    pub const ALL: [TaskKind; 7] = [
        TaskKind::PatrolVillage,
        TaskKind::FollowMayor,
        TaskKind::CraftTools,
        TaskKind::ForgeWeapons,
        TaskKind::MineResources,
        TaskKind::HarvestCrops,
        TaskKind::ReportProduction,
    ];

    /// Name shown in menus and reports
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskKind::PatrolVillage => "Patrol Village",
            TaskKind::FollowMayor => "Follow Mayor",
            TaskKind::CraftTools => "Craft Tools",
            TaskKind::ForgeWeapons => "Forge Weapons",
            TaskKind::MineResources => "Mine Resources",
            TaskKind::HarvestCrops => "Harvest Crops",
            TaskKind::ReportProduction => "Report Production",
        }
    }

    /// Single-word alias accepted by the console
    fn short_name(&self) -> &'static str {
        match self {
            TaskKind::PatrolVillage => "patrol",
            TaskKind::FollowMayor => "follow",
            TaskKind::CraftTools => "craft",
            TaskKind::ForgeWeapons => "forge",
            TaskKind::MineResources => "mine",
            TaskKind::HarvestCrops => "harvest",
            TaskKind::ReportProduction => "report",
        }
    }

    /// Tasks an occupation can be ordered to do
    pub fn available_for(npc_type: NpcType) -> &'static [TaskKind] {
        match npc_type {
            NpcType::Farmer => &[
                TaskKind::HarvestCrops,
                TaskKind::PatrolVillage,
                TaskKind::FollowMayor,
                TaskKind::ReportProduction,
            ],
            NpcType::Blacksmith => &[
                TaskKind::CraftTools,
                TaskKind::ForgeWeapons,
                TaskKind::MineResources,
                TaskKind::PatrolVillage,
                TaskKind::FollowMayor,
                TaskKind::ReportProduction,
            ],
            NpcType::Merchant => &[TaskKind::FollowMayor],
            NpcType::Guard => &[TaskKind::PatrolVillage, TaskKind::FollowMayor],
            NpcType::Enemy => &[],
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for TaskKind {
    type Err = VillageError;

    /// Accepts "Craft Tools", "craft_tools", "craft-tools", "CRAFT_TOOLS"
    /// and the short alias "craft", all case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '_' | '-' => ' ',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

        TaskKind::ALL
            .iter()
            .find(|kind| {
                kind.display_name().eq_ignore_ascii_case(&normalized)
                    || kind.short_name() == normalized
            })
            .copied()
            .ok_or_else(|| VillageError::UnknownTask(s.trim().to_string()))
    }
}

/// Entry of the mayor's order menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Task(TaskKind),
    SubmitToTreasury,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Task(kind) => kind.display_name(),
            MenuAction::SubmitToTreasury => "Submit to Treasury",
        }
    }
}

/// Order menu for an occupation: its tasks plus treasury submission for
/// anyone who earns money
pub fn available_tasks(npc_type: NpcType) -> Vec<MenuAction> {
    let mut menu: Vec<MenuAction> = TaskKind::available_for(npc_type)
        .iter()
        .map(|&kind| MenuAction::Task(kind))
        .collect();
    if matches!(
        npc_type,
        NpcType::Farmer | NpcType::Blacksmith | NpcType::Merchant
    ) {
        menu.push(MenuAction::SubmitToTreasury);
    }
    menu
}

/// Active task plus pending ones, drained strictly in arrival order
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    current: Option<TaskKind>,
    queued: VecDeque<TaskKind>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<TaskKind> {
        self.current
    }

    /// Append a task. Starts it right away when nothing is active.
    ///
    /// Returns the 1-based queue position when the task had to wait.
    pub fn push(&mut self, task: TaskKind) -> Option<usize> {
        if self.current.is_none() {
            self.current = Some(task);
            None
        } else {
            self.queued.push_back(task);
            Some(self.queued.len())
        }
    }

    /// Finish the active task and promote the next one
    pub fn complete_current(&mut self) -> Option<TaskKind> {
        self.current = self.queued.pop_front();
        self.current
    }

    pub fn pending(&self) -> impl Iterator<Item = TaskKind> + '_ {
        self.queued.iter().copied()
    }
}
