//! Language model integration: order parsing and villager conversation

pub mod client;
pub mod context;
pub mod conversation;
pub mod parser;

pub use client::{Backend, LlmClient};
pub use context::VillageContext;
pub use conversation::NpcConversation;
pub use parser::{parse_order, OrderAction, ParsedOrder};
