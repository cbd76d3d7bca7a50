//! LLM-backed conversation with a single villager
//!
//! Keeps a short rolling history for the prompt, answers common questions
//! from a cache without a round trip, rate-limits requests and falls back
//! to canned lines when the backend is missing or fails.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::core::types::NpcType;
use crate::llm::client::LlmClient;

#[derive(Debug, Clone)]
pub struct ConversationSettings {
    /// Replies longer than this are cut and end in "..."
    pub max_response_chars: usize,
    /// Lines of history kept
    pub history_limit: usize,
    /// Most recent history lines placed in the prompt
    pub prompt_history: usize,
    pub min_request_interval: Duration,
    /// Player lines shorter than this get their reply cached
    pub cacheable_message_len: usize,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            max_response_chars: 150,
            history_limit: 6,
            prompt_history: 4,
            min_request_interval: Duration::from_secs(2),
            cacheable_message_len: 20,
        }
    }
}

pub struct NpcConversation {
    pub npc_name: String,
    pub occupation: NpcType,
    system_prompt: String,
    history: VecDeque<String>,
    cache: Vec<(String, String)>,
    last_request: Option<Instant>,
    pub settings: ConversationSettings,
}

impl NpcConversation {
    pub fn new(npc_name: impl Into<String>, occupation: NpcType, persona: Option<&str>) -> Self {
        let npc_name = npc_name.into();
        let job = occupation.to_string().to_lowercase();
        let character = persona.map(str::to_string).unwrap_or_else(|| {
            format!(
                "You are {npc_name}, the village {job}. You have lived here all your life. \
                 You speak simply and practically."
            )
        });
        let system_prompt = format!(
            "{character}\nYou are talking to the mayor. Never break character. \
             Respond in 1-2 short sentences."
        );

        let cache = vec![
            ("who are you".to_string(), format!("I'm {npc_name}, the {job} of this village.")),
            ("what is your name".to_string(), format!("They call me {npc_name}.")),
            ("what do you do".to_string(), work_answer(occupation).to_string()),
            ("hello".to_string(), "Good day, Mayor.".to_string()),
            ("how are you".to_string(), "Can't complain. There's always work to do.".to_string()),
            ("where are we".to_string(), "In the village square, Mayor. Your village.".to_string()),
            ("thank you".to_string(), "No need for thanks. We help each other here.".to_string()),
            ("goodbye".to_string(), "Take care, Mayor.".to_string()),
            ("bye".to_string(), "Take care, Mayor.".to_string()),
        ];

        Self {
            npc_name,
            occupation,
            system_prompt,
            history: VecDeque::new(),
            cache,
            last_request: None,
            settings: ConversationSettings::default(),
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn reset(&mut self) {
        self.history.clear();
        debug!(npc = %self.npc_name, "conversation history reset");
    }

    fn push_history(&mut self, line: String) {
        self.history.push_back(line);
        while self.history.len() > self.settings.history_limit {
            self.history.pop_front();
        }
    }

    fn cached(&self, message: &str) -> Option<&str> {
        self.cache
            .iter()
            .find(|(key, _)| message.contains(key.as_str()))
            .map(|(_, reply)| reply.as_str())
    }

    fn build_prompt(&self, message: &str) -> String {
        let skip = self.history.len().saturating_sub(self.settings.prompt_history);
        let mut prompt = String::new();
        for line in self.history.iter().skip(skip) {
            prompt.push_str(line);
            prompt.push('\n');
        }
        prompt.push_str(&format!("Player: {message}\n{}:", self.npc_name));
        prompt
    }

    /// Answer the player. Never fails: problems with the backend produce a
    /// canned reply instead.
    pub async fn respond<R: Rng + ?Sized>(
        &mut self,
        client: Option<&LlmClient>,
        message: &str,
        rng: &mut R,
    ) -> String {
        let message = message.trim().to_lowercase();
        if message.is_empty() {
            return "...".to_string();
        }

        if let Some(reply) = self.cached(&message) {
            debug!(npc = %self.npc_name, "using cached response");
            return reply.to_string();
        }

        let Some(client) = client else {
            return self.local_response(&message, rng);
        };

        if let Some(last) = self.last_request {
            if last.elapsed() < self.settings.min_request_interval {
                debug!(npc = %self.npc_name, "request too soon after the last one");
                return self.local_response(&message, rng);
            }
        }
        self.last_request = Some(Instant::now());

        let prompt = self.build_prompt(&message);
        match client.complete(&self.system_prompt, &prompt).await {
            Ok(raw) => {
                let reply = clean_response(&raw, &self.npc_name, self.settings.max_response_chars);
                self.push_history(format!("Player: {message}"));
                self.push_history(format!("{}: {reply}", self.npc_name));
                if message.chars().count() < self.settings.cacheable_message_len
                    && self.cached(&message).is_none()
                {
                    self.cache.push((message.clone(), reply.clone()));
                }
                reply
            }
            Err(e) => {
                warn!(npc = %self.npc_name, error = %e, "LLM request failed, using local response");
                self.local_response(&message, rng)
            }
        }
    }

    /// Canned reply used when no model answers
    pub fn local_response<R: Rng + ?Sized>(&self, message: &str, rng: &mut R) -> String {
        if message.contains("why") {
            return "Some things in this village just are the way they are.".into();
        }
        if message.contains("how") {
            return "With patience and steady hands.".into();
        }
        if message.contains("when") {
            return "When the work is done, Mayor. Not before.".into();
        }
        if message.contains("where") {
            return "Follow the road to the market; you'll find most of us near it.".into();
        }

        let lines: &[&str] = match self.occupation {
            NpcType::Farmer => &[
                "The soil remembers every season.",
                "Crops grow with care, not just water and sun.",
                "Harvest comes to those who understand the land.",
            ],
            NpcType::Blacksmith => &[
                "The forge never sleeps for long.",
                "Good steel takes time and a hot fire.",
                "Every tool in this village passed over my anvil.",
            ],
            _ => &[
                "Sometimes the journey matters more than the destination.",
                "Patience reveals what haste overlooks.",
                "Every road leads somewhere, eventually.",
            ],
        };
        lines.choose(rng).copied().unwrap_or("...").to_string()
    }
}

fn work_answer(occupation: NpcType) -> &'static str {
    match occupation {
        NpcType::Farmer => "I tend the fields and sell the crops at market.",
        NpcType::Blacksmith => "I make tools at the forge, and weapons when you ask.",
        NpcType::Merchant => "I buy what the village makes.",
        NpcType::Guard => "I keep the village safe.",
        NpcType::Enemy => "That's no concern of yours.",
    }
}

/// Tidy a raw completion: drop prompt echoes and speaker prefixes, strip
/// markdown, collapse spaces and cap the length.
pub fn clean_response(raw: &str, npc_name: &str, max_chars: usize) -> String {
    let mut text = raw.trim();
    if let Some(idx) = text.find("[/INST]") {
        text = text[idx + "[/INST]".len()..].trim();
    }
    let prefix = format!("{npc_name}:");
    if let Some(rest) = text.strip_prefix(prefix.as_str()) {
        text = rest.trim();
    }

    let stripped = text.replace("**", "").replace(['*', '#'], "");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return "...".to_string();
    }

    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(max_chars).collect();
    cut = cut.trim_end().to_string();
    if !cut.ends_with(['.', '!', '?']) {
        cut.push_str("...");
    }
    cut
}
