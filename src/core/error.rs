use crate::core::types::Gold;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VillageError {
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("NPC not found: {0}")]
    NpcNotFound(String),

    #[error("Merchant not found: {0}")]
    MerchantNotFound(String),

    #[error("{merchant} cannot pay for {quantity} goods: needs {needed} gold, has {available}")]
    MerchantInsolvent {
        merchant: String,
        quantity: u32,
        needed: Gold,
        available: Gold,
    },

    #[error("Nothing to sell")]
    EmptySale,

    #[error("Treasury cannot cover {needed} gold (has {available})")]
    InsufficientTreasury { needed: Gold, available: Gold },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, VillageError>;
