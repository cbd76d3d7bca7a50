//! Market merchants buying goods from villagers

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::{Result, VillageError};
use crate::core::types::{GoodsKind, Gold, MerchantId, Vec2};

/// Share of every payment booked as the merchant's profit, in percent
pub const PROFIT_MARGIN_PERCENT: Gold = 30;

pub const DEFAULT_MERCHANT_GOLD: Gold = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantType {
    #[default]
    General,
    Blacksmith,
    Farmer,
}

/// Gold paid per unit of each goods kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuyPrices {
    pub tool: Gold,
    pub weapon: Gold,
    pub crop: Gold,
}

impl Default for BuyPrices {
    fn default() -> Self {
        Self {
            tool: 15,
            weapon: 40,
            crop: 8,
        }
    }
}

impl BuyPrices {
    pub fn price_for(&self, kind: GoodsKind) -> Gold {
        match kind {
            GoodsKind::Tools => self.tool,
            GoodsKind::Weapons => self.weapon,
            GoodsKind::Crops => self.crop,
        }
    }
}

/// Merchant's cut of a payment, rounded down
fn profit_on(payment: Gold) -> Gold {
    payment / 100 * PROFIT_MARGIN_PERCENT + payment % 100 * PROFIT_MARGIN_PERCENT / 100
}

#[derive(Debug, Clone)]
pub struct Merchant {
    pub id: MerchantId,
    pub name: String,
    pub merchant_type: MerchantType,
    pub position: Vec2,
    /// Where sellers stand; defaults to the stall itself
    pub interaction_point: Option<Vec2>,
    pub gold: Gold,
    pub prices: BuyPrices,
    pub goods_received: u32,
    pub goods_sold: u32,
    pub total_profit: Gold,
}

impl Merchant {
    pub fn new(id: MerchantId, name: impl Into<String>, merchant_type: MerchantType, position: Vec2) -> Self {
        Self {
            id,
            name: name.into(),
            merchant_type,
            position,
            interaction_point: None,
            gold: DEFAULT_MERCHANT_GOLD,
            prices: BuyPrices::default(),
            goods_received: 0,
            goods_sold: 0,
            total_profit: 0,
        }
    }

    pub fn stand_position(&self) -> Vec2 {
        self.interaction_point.unwrap_or(self.position)
    }

    /// Buy `quantity` units, returning the payment.
    ///
    /// Nothing changes when the merchant cannot afford the whole lot.
    pub fn receive_goods(&mut self, kind: GoodsKind, quantity: u32) -> Result<Gold> {
        if quantity == 0 {
            return Err(VillageError::EmptySale);
        }
        let price = self.prices.price_for(kind);
        let Some(payment) = price.checked_mul(quantity).filter(|p| *p <= self.gold) else {
            let needed = price.saturating_mul(quantity);
            warn!(
                merchant = %self.name,
                quantity,
                needed,
                available = self.gold,
                "not enough gold to buy"
            );
            return Err(VillageError::MerchantInsolvent {
                merchant: self.name.clone(),
                quantity,
                needed,
                available: self.gold,
            });
        };

        self.gold -= payment;
        self.goods_received = self.goods_received.saturating_add(quantity);
        self.total_profit = self.total_profit.saturating_add(profit_on(payment));
        info!(merchant = %self.name, %kind, quantity, payment, "bought goods");
        Ok(payment)
    }

    pub fn info(&self) -> String {
        format!(
            "{}\nGold: {}\nGoods Received: {}\nGoods Sold: {}\nTotal Profit: {}\nType: {:?}",
            self.name, self.gold, self.goods_received, self.goods_sold, self.total_profit, self.merchant_type
        )
    }
}
