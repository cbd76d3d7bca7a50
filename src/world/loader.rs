//! Load a village scenario from TOML
//!
//! A scenario lists the treasury, the mayor, the merchants and the
//! villagers with their stations and waypoints. Points are `[x, y]` pairs
//! and villagers reference their merchant by name.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, VillageError};
use crate::core::types::{Gold, NpcType, Vec2};
use crate::ecs::world::{Mayor, World};
use crate::economy::merchant::{BuyPrices, MerchantType, DEFAULT_MERCHANT_GOLD};
use crate::economy::treasury::{Treasury, DEFAULT_TREASURY_GOLD};
use crate::entity::npc::{Npc, WorkConfig, WorkTimings};
use crate::entity::routines::missing_stations;

type Point = [f32; 2];

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub treasury: TreasurySpec,
    pub mayor: Option<MayorSpec>,
    #[serde(default)]
    pub merchants: Vec<MerchantSpec>,
    #[serde(default)]
    pub npcs: Vec<NpcSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreasurySpec {
    pub gold: Gold,
}

impl Default for TreasurySpec {
    fn default() -> Self {
        Self {
            gold: DEFAULT_TREASURY_GOLD,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MayorSpec {
    #[serde(default = "default_mayor_name")]
    pub name: String,
    pub position: Point,
    pub facing: Option<Point>,
}

fn default_mayor_name() -> String {
    "Mayor".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MerchantSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub merchant_type: MerchantType,
    pub position: Point,
    pub interaction_point: Option<Point>,
    pub gold: Option<Gold>,
    #[serde(default)]
    pub prices: BuyPrices,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NpcSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub npc_type: NpcType,
    pub position: Point,
    pub persona: Option<String>,
    pub bellows: Option<Point>,
    pub anvil: Option<Point>,
    pub storage: Option<Point>,
    #[serde(default)]
    pub field_waypoints: Vec<Point>,
    #[serde(default)]
    pub path_to_merchant: Vec<Point>,
    /// Merchant name
    pub merchant: Option<String>,
    #[serde(default)]
    pub mine_path: Vec<Point>,
    pub mine_point: Option<Point>,
    #[serde(default)]
    pub patrol_points: Vec<Point>,
    #[serde(default)]
    pub timings: WorkTimings,
}

fn points(list: &[Point]) -> Vec<Vec2> {
    list.iter().copied().map(Vec2::from).collect()
}

impl ScenarioFile {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Build a world from this scenario
    pub fn into_world(self, config: SimulationConfig) -> Result<World> {
        config.validate()?;
        let mut world = World::new(config);
        world.treasury = Treasury::new(self.treasury.gold);

        world.mayor = self.mayor.map(|m| {
            let mut mayor = Mayor::new(m.name, m.position.into());
            if let Some(facing) = m.facing {
                mayor.facing = facing.into();
            }
            mayor
        });

        for spec in self.merchants {
            if world.merchant_by_name(&spec.name).is_some() {
                return Err(VillageError::Scenario(format!(
                    "duplicate merchant name '{}'",
                    spec.name
                )));
            }
            let id = world.spawn_merchant(spec.name, spec.merchant_type, spec.position.into());
            let merchant = &mut world.merchants[id.0 as usize];
            merchant.interaction_point = spec.interaction_point.map(Vec2::from);
            merchant.gold = spec.gold.unwrap_or(DEFAULT_MERCHANT_GOLD);
            merchant.prices = spec.prices;
        }

        for spec in self.npcs {
            if world.npc_by_name(&spec.name).is_some() {
                return Err(VillageError::Scenario(format!(
                    "duplicate villager name '{}'",
                    spec.name
                )));
            }
            spec.timings.validate().map_err(|e| {
                VillageError::Scenario(format!("villager '{}': {e}", spec.name))
            })?;
            let merchant = match &spec.merchant {
                Some(name) => Some(
                    world
                        .merchant_by_name(name)
                        .ok_or_else(|| VillageError::MerchantNotFound(name.clone()))?,
                ),
                None => None,
            };

            let work = WorkConfig {
                bellows: spec.bellows.map(Vec2::from),
                anvil: spec.anvil.map(Vec2::from),
                storage: spec.storage.map(Vec2::from),
                field_waypoints: points(&spec.field_waypoints),
                path_to_merchant: points(&spec.path_to_merchant),
                merchant,
                mine_path: points(&spec.mine_path),
                mine_point: spec.mine_point.map(Vec2::from),
                patrol_points: points(&spec.patrol_points),
                timings: spec.timings,
            };
            let mut npc = Npc::new(spec.name, spec.npc_type, spec.position.into()).with_work(work);
            npc.persona = spec.persona;
            if npc.npc_type == NpcType::Blacksmith {
                for station in missing_stations(&npc) {
                    warn!(npc = %npc.name, station, "work station not set, skipping it");
                }
            }
            world.add_npc(npc);
        }

        info!(
            npcs = world.entity_count(),
            merchants = world.merchants.len(),
            treasury = world.treasury.gold(),
            "scenario loaded"
        );
        Ok(world)
    }
}

pub fn load_scenario_str(s: &str, config: SimulationConfig) -> Result<World> {
    ScenarioFile::from_toml_str(s)?.into_world(config)
}

pub fn load_scenario(path: impl AsRef<Path>, config: SimulationConfig) -> Result<World> {
    let text = std::fs::read_to_string(path)?;
    load_scenario_str(&text, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
[treasury]
gold = 500

[mayor]
position = [0.0, 0.0]

[[merchants]]
name = "Stall"
position = [10.0, 0.0]
gold = 200
[merchants.prices]
tool = 20

[[npcs]]
name = "Bjorn"
type = "blacksmith"
position = [-10.0, 10.0]
bellows = [-12.0, 10.0]
path_to_merchant = [[-5.0, 5.0]]
merchant = "Stall"
[npcs.timings]
selling_time = 3.0
"#;

    #[test]
    fn test_load_small_scenario() {
        let world = load_scenario_str(SMALL, SimulationConfig::default()).unwrap();
        assert_eq!(world.treasury.gold(), 500);
        assert_eq!(world.mayor.as_ref().map(|m| m.name.as_str()), Some("Mayor"));

        let merchant = &world.merchants[0];
        assert_eq!(merchant.gold, 200);
        assert_eq!(merchant.prices.tool, 20);
        assert_eq!(merchant.prices.crop, 8);

        let bjorn = world.npc_by_name("Bjorn").unwrap();
        assert_eq!(bjorn.work.merchant, Some(merchant.id));
        assert_eq!(bjorn.work.bellows, Some(Vec2::new(-12.0, 10.0)));
        assert_eq!(bjorn.work.timings.selling_time, Some(3.0));
    }

    #[test]
    fn test_unknown_merchant_reference() {
        let text = r#"
[[npcs]]
name = "Ada"
type = "farmer"
position = [0.0, 0.0]
merchant = "Nobody"
"#;
        let err = load_scenario_str(text, SimulationConfig::default()).unwrap_err();
        assert!(matches!(err, VillageError::MerchantNotFound(name) if name == "Nobody"));
    }

    #[test]
    fn test_duplicate_villager_rejected() {
        let text = r#"
[[npcs]]
name = "Ada"
type = "farmer"
position = [0.0, 0.0]

[[npcs]]
name = "ada"
type = "guard"
position = [1.0, 0.0]
"#;
        assert!(matches!(
            load_scenario_str(text, SimulationConfig::default()),
            Err(VillageError::Scenario(_))
        ));
    }

    #[test]
    fn test_zero_speed_override_rejected() {
        let text = r#"
[[npcs]]
name = "Rolf"
type = "guard"
position = [0.0, 0.0]
patrol_points = [[10.0, 0.0]]
[npcs.timings]
move_speed = 0.0
"#;
        let err = load_scenario_str(text, SimulationConfig::default()).unwrap_err();
        assert!(matches!(err, VillageError::Scenario(msg) if msg.contains("Rolf") && msg.contains("move_speed")));
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(matches!(
            load_scenario_str("[[npcs]]\nname = 3", SimulationConfig::default()),
            Err(VillageError::TomlError(_))
        ));
    }
}
