//! Events raised by villagers and the world, plus the bounded log

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::core::types::{GoodsKind, Gold, Tick};
use crate::entity::plan::Animation;
use crate::entity::tasks::TaskKind;

/// Something observable that happened during a tick or an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VillageEvent {
    // Tasks
    TaskStarted {
        npc: String,
        task: TaskKind,
    },
    TaskQueued {
        npc: String,
        task: TaskKind,
        /// 1-based position in the waiting line
        position: usize,
    },
    TaskCompleted {
        npc: String,
        task: TaskKind,
    },
    /// Queue drained, back to the occupation routine
    ResumedWork {
        npc: String,
    },

    // Production
    GoodsProduced {
        npc: String,
        kind: GoodsKind,
        quantity: u32,
        earnings: Gold,
    },
    AnimationChanged {
        npc: String,
        animation: Animation,
    },

    // Trade
    SaleCompleted {
        npc: String,
        merchant: String,
        kind: GoodsKind,
        quantity: u32,
        payment: Gold,
    },
    SaleRejected {
        npc: String,
        merchant: String,
        reason: String,
    },
    TreasuryDeposit {
        npc: String,
        amount: Gold,
        balance: Gold,
    },

    // Clock
    DayStarted {
        day: u64,
    },
}

impl VillageEvent {
    /// Animation changes are high-volume and hidden from summaries
    pub fn is_noise(&self) -> bool {
        matches!(self, VillageEvent::AnimationChanged { .. })
    }
}

impl fmt::Display for VillageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VillageEvent::TaskStarted { npc, task } => write!(f, "{npc} started {task}"),
            VillageEvent::TaskQueued {
                npc,
                task,
                position,
            } => write!(f, "{npc} queued {task} (position {position})"),
            VillageEvent::TaskCompleted { npc, task } => write!(f, "{npc} completed {task}"),
            VillageEvent::ResumedWork { npc } => write!(f, "{npc} resumed default work"),
            VillageEvent::GoodsProduced {
                npc,
                kind,
                quantity,
                earnings,
            } => write!(f, "{npc} produced {quantity} {kind} (+{earnings} gold)"),
            VillageEvent::AnimationChanged { npc, animation } => {
                write!(f, "{npc} animation {animation:?}")
            }
            VillageEvent::SaleCompleted {
                npc,
                merchant,
                kind,
                quantity,
                payment,
            } => write!(f, "{npc} sold {quantity} {kind} to {merchant} for {payment} gold"),
            VillageEvent::SaleRejected {
                npc,
                merchant,
                reason,
            } => write!(f, "{merchant} refused {npc}'s goods: {reason}"),
            VillageEvent::TreasuryDeposit {
                npc,
                amount,
                balance,
            } => write!(f, "{npc} deposited {amount} gold (treasury: {balance})"),
            VillageEvent::DayStarted { day } => write!(f, "Day {day} begins"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub tick: Tick,
    pub event: VillageEvent,
}

/// Ring buffer of the most recent events
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LoggedEvent>,
    capacity: usize,
}

impl EventLog {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, tick: Tick, event: VillageEvent) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LoggedEvent { tick, event });
    }

    pub fn extend(&mut self, tick: Tick, events: impl IntoIterator<Item = VillageEvent>) {
        for event in events {
            self.push(tick, event);
        }
    }

    /// Up to `n` most recent events, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &LoggedEvent> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggedEvent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
