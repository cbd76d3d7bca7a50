//! Step plans polled by the controller each tick
//!
//! A plan is a queue of steps. Steps that take time (walking, holding an
//! animation, following) stay at the front of the queue until they finish;
//! instant steps apply their effect and are dropped. A looping plan refills
//! itself from its cycle until its time limit has been spent.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::core::types::{MerchantId, Vec2};

/// Animation a villager is currently playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Animation {
    #[default]
    Idle,
    Walk,
    Bellows,
    Anvil,
    Storage,
    FieldWork,
    Sell,
    Mine,
    LookAround,
    Punch,
}

/// Instant changes to a villager's production counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Default smithing cycle: one tool added to the goods pile
    ProduceTool,
    /// Default farming cycle: one crop added to the goods pile
    ProduceCrop,
    CraftTool,
    ForgeWeapon,
    HarvestCrop,
    MineOre,
    SettleSale(MerchantId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    MoveTo(Vec2),
    Hold { remaining: f32, animation: Animation },
    FollowMayor { remaining: f32 },
    Chase,
    Effect(Effect),
}

impl Step {
    pub fn hold(secs: f32, animation: Animation) -> Self {
        Step::Hold {
            remaining: secs,
            animation,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Plan {
    steps: VecDeque<Step>,
    cycle: Vec<Step>,
    time_limit: Option<f32>,
    elapsed: f32,
}

impl Plan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Repeat `cycle` until `time_limit` seconds have been spent
    pub fn looping(cycle: Vec<Step>, time_limit: f32) -> Self {
        Self {
            steps: VecDeque::new(),
            cycle,
            time_limit: Some(time_limit),
            elapsed: 0.0,
        }
    }

    pub fn is_finished(&self) -> bool {
        if let Some(limit) = self.time_limit {
            if self.elapsed >= limit {
                return true;
            }
        }
        self.steps.is_empty() && self.cycle.is_empty()
    }

    /// Seconds left before the time limit, if the plan has one
    pub fn remaining_time(&self) -> Option<f32> {
        self.time_limit.map(|limit| (limit - self.elapsed).max(0.0))
    }

    pub fn next_step(&mut self) -> Option<Step> {
        if self.is_finished() {
            return None;
        }
        if self.steps.is_empty() {
            self.steps.extend(self.cycle.iter().copied());
        }
        self.steps.pop_front()
    }

    /// Return an unfinished step to the front of the queue
    pub fn put_back(&mut self, step: Step) {
        self.steps.push_front(step);
    }

    pub fn record(&mut self, seconds: f32) {
        self.elapsed += seconds;
    }

    /// Steps waiting in the queue, not counting the loop cycle
    pub fn queued_steps(&self) -> usize {
        self.steps.len()
    }
}
