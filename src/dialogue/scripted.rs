//! Keyword-driven dialogue with a relationship meter
//!
//! Used when no language model is configured. Each entry matches a set of
//! phrases; the first entry with a phrase contained in the player's line
//! answers and nudges the relationship.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::NpcType;

pub const STARTING_RELATIONSHIP: i32 = 50;
pub const MAX_RELATIONSHIP: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Friendly,
    Warm,
    Neutral,
    Cautious,
    Hostile,
}

impl Mood {
    pub fn from_relationship(relationship: i32) -> Self {
        match relationship {
            r if r > 80 => Mood::Friendly,
            r if r > 60 => Mood::Warm,
            r if r > 40 => Mood::Neutral,
            r if r > 20 => Mood::Cautious,
            _ => Mood::Hostile,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DialogueEntry {
    pub keywords: Vec<String>,
    pub response: String,
    pub relationship_change: i32,
}

impl DialogueEntry {
    fn new(keywords: &[&str], response: impl Into<String>, relationship_change: i32) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            response: response.into(),
            relationship_change,
        }
    }

    fn matches(&self, message: &str) -> bool {
        self.keywords.iter().any(|k| message.contains(k.as_str()))
    }
}

const FRIENDLY_LINES: [&str; 5] = [
    "Good to talk with you!",
    "Always happy to chat.",
    "You're becoming part of this village.",
    "The whole square knows your face now.",
    "We understand each other better now.",
];

const NEUTRAL_LINES: [&str; 5] = [
    "Interesting. Tell me more.",
    "This village holds more stories than you'd think.",
    "What brings you here?",
    "Life here is simple but good.",
    "Every day brings new work.",
];

const HOSTILE_LINES: [&str; 5] = [
    "I'm busy.",
    "Make it quick.",
    "What now?",
    "Speak plainly.",
    "I have work to do.",
];

#[derive(Debug, Clone)]
pub struct ScriptedDialogue {
    pub npc_name: String,
    pub occupation: NpcType,
    pub entries: Vec<DialogueEntry>,
    relationship: i32,
}

impl ScriptedDialogue {
    pub fn new(npc_name: impl Into<String>, occupation: NpcType) -> Self {
        let npc_name = npc_name.into();
        let entries = default_entries(&npc_name, occupation);
        Self {
            npc_name,
            occupation,
            entries,
            relationship: STARTING_RELATIONSHIP,
        }
    }

    pub fn relationship(&self) -> i32 {
        self.relationship
    }

    pub fn mood(&self) -> Mood {
        Mood::from_relationship(self.relationship)
    }

    pub fn respond<R: Rng + ?Sized>(&mut self, message: &str, rng: &mut R) -> String {
        let message = message.trim().to_lowercase();

        let matched = self
            .entries
            .iter()
            .find(|entry| entry.matches(&message))
            .map(|entry| (entry.response.clone(), entry.relationship_change));

        match matched {
            Some((response, change)) => {
                self.relationship = (self.relationship + change).clamp(0, MAX_RELATIONSHIP);
                debug!(
                    npc = %self.npc_name,
                    change,
                    relationship = self.relationship,
                    "dialogue keyword matched"
                );
                self.flavor(&response)
            }
            None => self.default_response(rng),
        }
    }

    fn flavor(&self, response: &str) -> String {
        match self.relationship {
            r if r > 75 => format!("{response} Friend."),
            r if r > 50 => response.to_string(),
            r if r > 25 => format!("{response} But be careful."),
            _ => format!("Hmm. {response}"),
        }
    }

    fn default_response<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let lines: &[&str] = match self.relationship {
            r if r > 70 => &FRIENDLY_LINES,
            r if r > 30 => &NEUTRAL_LINES,
            _ => &HOSTILE_LINES,
        };
        lines.choose(rng).copied().unwrap_or("...").to_string()
    }
}

fn work_line(occupation: NpcType) -> &'static str {
    match occupation {
        NpcType::Blacksmith => "I work the forge: tools for the village, weapons when the mayor asks.",
        NpcType::Farmer => "I work the fields and bring the harvest to market.",
        NpcType::Merchant => "I buy what the village makes and sell it on.",
        NpcType::Guard => "I keep watch over the village.",
        NpcType::Enemy => "None of your business.",
    }
}

fn default_entries(npc_name: &str, occupation: NpcType) -> Vec<DialogueEntry> {
    let job = occupation.to_string().to_lowercase();
    vec![
        DialogueEntry::new(
            &["hello", "hi", "hey", "greetings"],
            "Greetings, Mayor. Welcome.",
            5,
        ),
        DialogueEntry::new(
            &["who are you", "your name", "what is your name"],
            format!("I'm {npc_name}, the {job} of this village."),
            3,
        ),
        DialogueEntry::new(
            &["what do you do", "your job", "what is your work"],
            work_line(occupation),
            2,
        ),
        DialogueEntry::new(
            &["village", "this place", "where are we"],
            "The village is both home and hard work. Treat it well.",
            2,
        ),
        DialogueEntry::new(
            &["help", "need help", "assistance"],
            "What do you need? I know these parts well.",
            5,
        ),
        DialogueEntry::new(
            &["danger", "safe", "risk", "dangerous"],
            "Stay on the roads after dark.",
            3,
        ),
        DialogueEntry::new(
            &["weather", "rain", "sun", "climate"],
            "Weather changes fast here. Always be prepared.",
            1,
        ),
        DialogueEntry::new(
            &["bye", "goodbye", "farewell", "see you"],
            "Safe travels, Mayor.",
            2,
        ),
        DialogueEntry::new(
            &["thank", "thanks", "appreciate"],
            "No need for thanks. We help each other here.",
            10,
        ),
        DialogueEntry::new(
            &["stupid", "idiot", "dumb", "hate"],
            "A mayor should show more respect.",
            -20,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(1)
    }

    #[test]
    fn test_greeting_raises_relationship() {
        let mut dialogue = ScriptedDialogue::new("Ada", NpcType::Farmer);
        let reply = dialogue.respond("Hello there", &mut rng());
        assert_eq!(dialogue.relationship(), 55);
        assert_eq!(reply, "Greetings, Mayor. Welcome.");
    }

    #[test]
    fn test_identity_uses_name_and_job() {
        let mut dialogue = ScriptedDialogue::new("Bjorn", NpcType::Blacksmith);
        let reply = dialogue.respond("Who are you?", &mut rng());
        assert!(reply.starts_with("I'm Bjorn, the blacksmith"));
    }

    #[test]
    fn test_relationship_clamped() {
        let mut dialogue = ScriptedDialogue::new("Ada", NpcType::Farmer);
        for _ in 0..10 {
            dialogue.respond("you idiot", &mut rng());
        }
        assert_eq!(dialogue.relationship(), 0);
        assert_eq!(dialogue.mood(), Mood::Hostile);

        for _ in 0..20 {
            dialogue.respond("thanks", &mut rng());
        }
        assert_eq!(dialogue.relationship(), MAX_RELATIONSHIP);
        assert_eq!(dialogue.mood(), Mood::Friendly);
    }

    #[test]
    fn test_mood_flavor() {
        let mut dialogue = ScriptedDialogue::new("Ada", NpcType::Farmer);
        dialogue.respond("idiot", &mut rng());
        // 30: cautious flavor
        assert!(dialogue.respond("weather?", &mut rng()).ends_with("But be careful."));
        dialogue.respond("idiot", &mut rng());
        assert!(dialogue.respond("weather?", &mut rng()).starts_with("Hmm. "));
    }

    #[test]
    fn test_default_response_by_band() {
        let mut dialogue = ScriptedDialogue::new("Ada", NpcType::Farmer);
        let reply = dialogue.respond("qwerty", &mut rng());
        assert!(NEUTRAL_LINES.contains(&reply.as_str()));
        assert_eq!(dialogue.relationship(), STARTING_RELATIONSHIP);
    }

    #[test]
    fn test_mood_bands() {
        assert_eq!(Mood::from_relationship(81), Mood::Friendly);
        assert_eq!(Mood::from_relationship(80), Mood::Warm);
        assert_eq!(Mood::from_relationship(41), Mood::Neutral);
        assert_eq!(Mood::from_relationship(21), Mood::Cautious);
        assert_eq!(Mood::from_relationship(20), Mood::Hostile);
    }
}
