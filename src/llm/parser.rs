//! Parse the mayor's natural language orders into structured orders
//!
//! The model only translates words into an order. Which villagers can do
//! the work, and how, is decided by the resolver and the villagers' own
//! state machines.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, VillageError};
use crate::entity::tasks::TaskKind;
use crate::llm::client::LlmClient;
use crate::llm::context::VillageContext;

/// What the mayor wants done
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderAction {
    /// Hand a task to one or more villagers
    Assign,
    /// Collect earnings into the treasury
    Submit,
    /// Ask villagers for a production report
    Report,
    /// Ask about the village (no state change)
    Query,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ParsedOrder {
    pub action: OrderAction,
    /// Task name for ASSIGN orders
    pub task: Option<String>,
    /// Names or occupations; `None` means whoever fits
    pub subjects: Option<Vec<String>>,
    /// Parser's confidence in the interpretation (0.0 - 1.0)
    pub confidence: f32,
}

impl ParsedOrder {
    /// The task named by the order, if it names a known one
    pub fn task_kind(&self) -> Option<TaskKind> {
        self.task.as_deref().and_then(|t| t.parse().ok())
    }
}

/// Parse a natural language order with the LLM
pub async fn parse_order(client: &LlmClient, input: &str, context: &VillageContext) -> Result<ParsedOrder> {
    let user_prompt = format!(
        "CONTEXT:\n{}\n\nMAYOR SAYS:\n{}\n\nParse this order into JSON:",
        context.summary(),
        input
    );

    let response = client.complete(PARSE_SYSTEM_PROMPT, &user_prompt).await?;
    parse_order_response(&response)
}

/// Decode the model's reply, tolerating text around the JSON object
pub fn parse_order_response(response: &str) -> Result<ParsedOrder> {
    let json_str = extract_json(response)?;
    serde_json::from_str(json_str).map_err(|e| {
        VillageError::LlmError(format!("Failed to parse order: {} - Response: {}", e, response))
    })
}

/// Extract JSON object from LLM response (handles surrounding text)
pub fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| VillageError::LlmError("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| VillageError::LlmError("No closing brace found in response".into()))?;
    Ok(&response[start..=end])
}

const PARSE_SYSTEM_PROMPT: &str = r#"You are parsing the mayor's orders in a village simulation.
Convert natural language orders into structured JSON.

AVAILABLE ACTIONS:
- ASSIGN: Give villagers a task
- SUBMIT: Villagers hand their earnings to the treasury
- REPORT: Villagers report their production
- QUERY: Ask about the village (not an order)

TASKS (for ASSIGN):
- Patrol Village, Follow Mayor, Craft Tools, Forge Weapons,
  Mine Resources, Harvest Crops, Report Production

Subjects are villager names or occupations (blacksmith, farmer, guard,
merchant). Use null when the order does not say who.

OUTPUT FORMAT (JSON only, no explanation):
{
  "action": "ACTION_TYPE",
  "task": "task name or null",
  "subjects": ["who should do this"] or null,
  "confidence": 0.0-1.0
}

Examples:
"Bjorn, forge some swords" -> {"action": "ASSIGN", "task": "Forge Weapons", "subjects": ["Bjorn"], "confidence": 0.9}
"farmers, bring in the harvest" -> {"action": "ASSIGN", "task": "Harvest Crops", "subjects": ["farmer"], "confidence": 0.9}
"someone walk the walls" -> {"action": "ASSIGN", "task": "Patrol Village", "subjects": null, "confidence": 0.7}
"everyone pay your dues" -> {"action": "SUBMIT", "task": null, "subjects": ["everyone"], "confidence": 0.85}
"how much gold do we have?" -> {"action": "QUERY", "task": null, "subjects": null, "confidence": 0.95}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = "Sure thing:\n{\"action\": \"SUBMIT\"}\nAnything else?";
        assert_eq!(extract_json(response).unwrap(), "{\"action\": \"SUBMIT\"}");
    }

    #[test]
    fn test_extract_json_no_json() {
        assert!(extract_json("I don't understand").is_err());
        assert!(extract_json("} backwards {").is_err());
    }

    #[test]
    fn test_full_order_deserialization() {
        let order = parse_order_response(
            r#"{"action": "ASSIGN", "task": "Forge Weapons", "subjects": ["Bjorn"], "confidence": 0.85}"#,
        )
        .unwrap();
        assert_eq!(order.action, OrderAction::Assign);
        assert_eq!(order.task_kind(), Some(TaskKind::ForgeWeapons));
        assert_eq!(order.subjects, Some(vec!["Bjorn".to_string()]));
        assert!((order.confidence - 0.85).abs() < 0.001);
    }

    #[test]
    fn test_missing_fields_default() {
        let order = parse_order_response(r#"{"action": "QUERY"}"#).unwrap();
        assert_eq!(order.action, OrderAction::Query);
        assert_eq!(order.task, None);
        assert_eq!(order.confidence, 0.0);
    }

    #[test]
    fn test_unknown_task_name() {
        let order = ParsedOrder {
            action: OrderAction::Assign,
            task: Some("Bake Bread".into()),
            ..Default::default()
        };
        assert_eq!(order.task_kind(), None);
    }
}
