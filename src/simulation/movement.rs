//! Straight-line movement with an arrival radius

use crate::core::types::Vec2;

/// Slack added to the arrival radius to absorb float error
const ARRIVAL_SLACK: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    pub arrived: bool,
    /// Seconds of the budget actually spent walking
    pub time_used: f32,
}

/// Walk from `position` toward `target` for at most `budget` seconds.
///
/// The walker stops on the edge of the arrival radius instead of
/// overshooting, and reports how much of the budget the walk took so the
/// caller can spend the rest on the next step.
pub fn step_towards(
    position: &mut Vec2,
    heading: &mut Vec2,
    target: Vec2,
    speed: f32,
    arrival_distance: f32,
    budget: f32,
) -> MoveOutcome {
    let distance = position.distance(&target);
    if distance <= arrival_distance + ARRIVAL_SLACK {
        return MoveOutcome {
            arrived: true,
            time_used: 0.0,
        };
    }
    if budget <= 0.0 || speed <= 0.0 {
        return MoveOutcome {
            arrived: false,
            time_used: 0.0,
        };
    }

    let direction = (target - *position).normalize();
    *heading = direction;

    let to_cover = distance - arrival_distance;
    let needed = to_cover / speed;
    if needed <= budget {
        *position = *position + direction * to_cover;
        MoveOutcome {
            arrived: true,
            time_used: needed,
        }
    } else {
        *position = *position + direction * (speed * budget);
        MoveOutcome {
            arrived: false,
            time_used: budget,
        }
    }
}
