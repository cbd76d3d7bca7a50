//! Order resolution - converts ParsedOrder subjects to concrete villagers

use crate::core::types::{NpcId, NpcType};
use crate::ecs::world::World;
use crate::entity::tasks::TaskKind;
use crate::llm::parser::ParsedOrder;

/// Result of resolving an order's subjects and task
#[derive(Debug, Clone)]
pub struct OrderResolution {
    /// Villagers that matched the subject criteria
    pub subjects: Vec<SubjectMatch>,
    /// Task named by the order, if it names a known one
    pub task: Option<TaskKind>,
    /// Subjects that matched nobody
    pub notes: Vec<String>,
}

/// A matched villager and why it matched
#[derive(Debug, Clone)]
pub struct SubjectMatch {
    pub npc_id: NpcId,
    pub name: String,
    pub occupation: NpcType,
    pub match_reason: MatchReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchReason {
    ExactName,
    PartialName,
    Occupation(NpcType),
    /// No subject given; picked because the occupation offers the task
    Capable(TaskKind),
    Everyone,
}

/// Resolves ParsedOrder subjects to villagers in the world
pub struct OrderResolver<'a> {
    world: &'a World,
}

impl<'a> OrderResolver<'a> {
    pub fn new(world: &'a World) -> Self {
        Self { world }
    }

    pub fn resolve(&self, order: &ParsedOrder) -> OrderResolution {
        let task = order.task_kind();
        let mut notes = Vec::new();
        let subjects = self.resolve_subjects(&order.subjects, task, &mut notes);
        OrderResolution {
            subjects,
            task,
            notes,
        }
    }

    fn resolve_subjects(
        &self,
        subjects: &Option<Vec<String>>,
        task: Option<TaskKind>,
        notes: &mut Vec<String>,
    ) -> Vec<SubjectMatch> {
        let Some(specs) = subjects.as_ref().filter(|s| !s.is_empty()) else {
            return match task {
                Some(task) => self.find_capable(task),
                None => self.everyone(),
            };
        };

        let mut matches: Vec<SubjectMatch> = Vec::new();
        for spec in specs {
            let spec_lower = spec.trim().to_lowercase();
            let spec_lower = spec_lower.strip_prefix("the ").unwrap_or(&spec_lower);

            let found = if matches!(spec_lower, "everyone" | "all" | "everybody") {
                self.everyone()
            } else if let Some(occupation) = occupation_from_word(spec_lower) {
                self.find_by_occupation(occupation)
            } else {
                self.find_by_name(spec_lower).into_iter().collect()
            };

            if found.is_empty() {
                notes.push(format!("No villager matches '{}'", spec.trim()));
            }
            for m in found {
                if !matches.iter().any(|existing| existing.npc_id == m.npc_id) {
                    matches.push(m);
                }
            }
        }
        matches
    }

    fn subject(&self, id: NpcId, reason: MatchReason) -> Option<SubjectMatch> {
        self.world.npc(id).map(|npc| SubjectMatch {
            npc_id: npc.id,
            name: npc.name.clone(),
            occupation: npc.npc_type,
            match_reason: reason,
        })
    }

    fn find_by_name(&self, name_lower: &str) -> Option<SubjectMatch> {
        if let Some(npc) = self.world.npc_by_name(name_lower) {
            return self.subject(npc.id, MatchReason::ExactName);
        }

        // Partial match (first name)
        self.world
            .npcs()
            .find(|npc| npc.name.to_lowercase().starts_with(name_lower))
            .and_then(|npc| self.subject(npc.id, MatchReason::PartialName))
    }

    fn find_by_occupation(&self, occupation: NpcType) -> Vec<SubjectMatch> {
        self.world
            .npcs()
            .filter(|npc| npc.npc_type == occupation)
            .filter_map(|npc| self.subject(npc.id, MatchReason::Occupation(occupation)))
            .collect()
    }

    fn find_capable(&self, task: TaskKind) -> Vec<SubjectMatch> {
        self.world
            .npcs()
            .filter(|npc| TaskKind::available_for(npc.npc_type).contains(&task))
            .filter_map(|npc| self.subject(npc.id, MatchReason::Capable(task)))
            .collect()
    }

    fn everyone(&self) -> Vec<SubjectMatch> {
        self.world
            .npcs()
            .filter(|npc| npc.npc_type != NpcType::Enemy)
            .filter_map(|npc| self.subject(npc.id, MatchReason::Everyone))
            .collect()
    }
}

/// "blacksmiths", "Farmer", "smith" and similar
fn occupation_from_word(word: &str) -> Option<NpcType> {
    let singular = word
        .strip_suffix("ies")
        .map(|stem| format!("{stem}y"))
        .or_else(|| word.strip_suffix('s').map(str::to_string))
        .unwrap_or_else(|| word.to_string());

    match singular.as_str() {
        "farmer" => Some(NpcType::Farmer),
        "blacksmith" | "smith" => Some(NpcType::Blacksmith),
        "merchant" | "trader" => Some(NpcType::Merchant),
        "guard" => Some(NpcType::Guard),
        "enemy" => Some(NpcType::Enemy),
        _ => None,
    }
}
