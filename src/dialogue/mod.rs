//! Player-facing conversation without a language model

pub mod scripted;

pub use scripted::{Mood, ScriptedDialogue};
