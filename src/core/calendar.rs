//! Village clock
//!
//! Tracks elapsed simulation seconds and maps them onto days and
//! time-of-day periods.

use serde::{Deserialize, Serialize};

/// Time of day periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    Morning,   // 06:00-12:00
    Afternoon, // 12:00-18:00
    Evening,   // 18:00-22:00
    Night,     // 22:00-06:00
}

impl TimePeriod {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimePeriod::Morning,
            12..=17 => TimePeriod::Afternoon,
            18..=21 => TimePeriod::Evening,
            _ => TimePeriod::Night,
        }
    }
}

/// Calendar advancing in simulation seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    elapsed: f64,
    day_length: f64,
}

impl Calendar {
    pub fn new(day_length_seconds: f32) -> Self {
        Self {
            elapsed: 0.0,
            day_length: f64::from(day_length_seconds.max(1.0)),
        }
    }

    /// Advance the clock, returning true when a new day began
    pub fn advance(&mut self, seconds: f32) -> bool {
        let day_before = self.current_day();
        self.elapsed += f64::from(seconds);
        self.current_day() > day_before
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    pub fn current_day(&self) -> u64 {
        (self.elapsed / self.day_length) as u64
    }

    /// Fraction of the current day in [0, 1)
    pub fn time_of_day(&self) -> f32 {
        ((self.elapsed % self.day_length) / self.day_length) as f32
    }

    pub fn current_hour(&self) -> u32 {
        ((self.time_of_day() * 24.0) as u32).min(23)
    }

    pub fn period(&self) -> TimePeriod {
        TimePeriod::from_hour(self.current_hour())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_boundaries() {
        assert_eq!(TimePeriod::from_hour(6), TimePeriod::Morning);
        assert_eq!(TimePeriod::from_hour(12), TimePeriod::Afternoon);
        assert_eq!(TimePeriod::from_hour(18), TimePeriod::Evening);
        assert_eq!(TimePeriod::from_hour(23), TimePeriod::Night);
        assert_eq!(TimePeriod::from_hour(3), TimePeriod::Night);
    }

    #[test]
    fn test_day_rollover() {
        let mut calendar = Calendar::new(120.0);
        assert!(!calendar.advance(60.0));
        assert_eq!(calendar.current_hour(), 12);
        assert!(calendar.advance(61.0));
        assert_eq!(calendar.current_day(), 1);
    }
}
