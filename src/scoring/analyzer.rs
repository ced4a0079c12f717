use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::models::{Card, CardType, Keyword, Role};
use crate::rules::SynergyDefinition;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynergyStatus {
    pub name: String,
    pub description: String,
    pub active: bool,
}

/// Structural summary of a card collection, derived from scratch on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckAnalysis {
    pub keywords: BTreeSet<Keyword>,
    pub has_frontline: bool,
    pub has_backline_clear: bool,
    pub has_scaling: bool,
    /// One entry per registered synergy, in registration order.
    pub active_synergies: Vec<SynergyStatus>,
    pub total_cards: usize,
    pub unit_count: usize,
    pub spell_count: usize,
    pub average_value: i32,
    pub card_counts: BTreeMap<String, usize>,
}

impl DeckAnalysis {
    pub fn has_role(&self, role: Role) -> bool {
        match role {
            Role::Frontline => self.has_frontline,
            Role::BacklineClear => self.has_backline_clear,
            Role::Scaling => self.has_scaling,
        }
    }

    pub fn missing_roles(&self) -> Vec<Role> {
        Role::iter().filter(|role| !self.has_role(*role)).collect()
    }

    pub fn copies_of(&self, card_id: &str) -> usize {
        self.card_counts.get(card_id).copied().unwrap_or(0)
    }

    pub fn to_text(&self) -> String {
        let missing = self
            .missing_roles()
            .iter()
            .map(|role| role.to_string())
            .collect::<Vec<_>>();
        let active = self
            .active_synergies
            .iter()
            .filter(|synergy| synergy.active)
            .map(|synergy| synergy.name.as_str())
            .collect::<Vec<_>>();

        format!(
            "{} cards ({} units, {} spells), average value {}\nMissing: {}\nSynergies: {}",
            self.total_cards,
            self.unit_count,
            self.spell_count,
            self.average_value,
            if missing.is_empty() { "-".to_string() } else { missing.join(", ") },
            if active.is_empty() { "-".to_string() } else { active.join(", ") },
        )
    }
}

pub struct DeckAnalyzer<'a> {
    synergies: &'a [SynergyDefinition],
}

impl<'a> DeckAnalyzer<'a> {
    pub fn new(synergies: &'a [SynergyDefinition]) -> Self {
        DeckAnalyzer { synergies }
    }

    pub fn analyze<'c>(&self, cards: impl IntoIterator<Item = &'c Card>) -> DeckAnalysis {
        let mut keywords = BTreeSet::new();
        let mut card_counts = BTreeMap::new();
        let mut unit_count = 0;
        let mut spell_count = 0;
        let mut total_cards = 0;
        let mut value_sum: i64 = 0;

        for card in cards {
            total_cards += 1;
            value_sum += i64::from(card.base_value);
            keywords.extend(card.keywords.iter().cloned());
            *card_counts.entry(card.id.clone()).or_insert(0) += 1;
            match card.card_type {
                CardType::Unit => unit_count += 1,
                CardType::Spell => spell_count += 1,
                _ => {}
            }
        }

        let average_value = if total_cards == 0 {
            0
        } else {
            (value_sum as f64 / total_cards as f64).round() as i32
        };

        let active_synergies = self
            .synergies
            .iter()
            .map(|synergy| SynergyStatus {
                name: synergy.name.clone(),
                description: synergy.description.clone(),
                active: synergy.is_active(&keywords),
            })
            .collect();

        DeckAnalysis {
            has_frontline: Role::Frontline.is_provided_by(&keywords),
            has_backline_clear: Role::BacklineClear.is_provided_by(&keywords),
            has_scaling: Role::Scaling.is_provided_by(&keywords),
            keywords,
            active_synergies,
            total_cards,
            unit_count,
            spell_count,
            average_value,
            card_counts,
        }
    }
}
