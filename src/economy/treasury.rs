//! Village treasury

use tracing::{info, warn};

use crate::core::error::{Result, VillageError};
use crate::core::types::Gold;

pub const DEFAULT_TREASURY_GOLD: Gold = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Treasury {
    gold: Gold,
}

impl Treasury {
    pub fn new(gold: Gold) -> Self {
        Self { gold }
    }

    pub fn gold(&self) -> Gold {
        self.gold
    }

    pub fn add_money(&mut self, amount: Gold) {
        self.gold = self.gold.saturating_add(amount);
        info!(amount, balance = self.gold, "treasury deposit");
    }

    /// Withdraw gold; fails without change when the balance is short
    pub fn spend_money(&mut self, amount: Gold) -> Result<()> {
        if self.gold < amount {
            warn!(amount, balance = self.gold, "treasury cannot cover expense");
            return Err(VillageError::InsufficientTreasury {
                needed: amount,
                available: self.gold,
            });
        }
        self.gold -= amount;
        info!(amount, balance = self.gold, "treasury spend");
        Ok(())
    }
}

impl Default for Treasury {
    fn default() -> Self {
        Self::new(DEFAULT_TREASURY_GOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_spend() {
        let mut treasury = Treasury::default();
        treasury.add_money(50);
        assert_eq!(treasury.gold(), 1050);
        treasury.spend_money(1050).unwrap();
        assert_eq!(treasury.gold(), 0);
    }

    #[test]
    fn test_overspend_rejected() {
        let mut treasury = Treasury::new(10);
        assert!(matches!(
            treasury.spend_money(11),
            Err(VillageError::InsufficientTreasury { needed: 11, available: 10 })
        ));
        assert_eq!(treasury.gold(), 10);
    }
}
