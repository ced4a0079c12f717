use serde::{Deserialize, Serialize};

use crate::models::{Card, Keyword, Rarity, Role};
use crate::scoring::DeckAnalysis;

/// Everything a context modifier may look at.
pub struct ModifierInput<'a> {
    pub analysis: &'a DeckAnalysis,
    pub card: &'a Card,
    pub ring: i32,
    pub covenant: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ModifierCondition {
    DeckLacks(Role),
    DeckHas(Role),
    DeckHasKeyword(Keyword),
    DeckSizeAbove(usize),
    CardProvides(Role),
    CardHasKeyword(Keyword),
    CardRarity(Rarity),
    CopiesInDeckAtLeast(usize),
    RingAtLeast(i32),
    RingAtMost(i32),
    CovenantAtLeast(i32),
}

impl ModifierCondition {
    pub fn holds(&self, input: &ModifierInput) -> bool {
        match self {
            ModifierCondition::DeckLacks(role) => !input.analysis.has_role(*role),
            ModifierCondition::DeckHas(role) => input.analysis.has_role(*role),
            ModifierCondition::DeckHasKeyword(keyword) => input.analysis.keywords.contains(keyword),
            ModifierCondition::DeckSizeAbove(size) => input.analysis.total_cards > *size,
            ModifierCondition::CardProvides(role) => input.card.provides(*role),
            ModifierCondition::CardHasKeyword(keyword) => input.card.has_keyword(keyword),
            ModifierCondition::CardRarity(rarity) => input.card.rarity == *rarity,
            ModifierCondition::CopiesInDeckAtLeast(copies) => {
                input.analysis.copies_of(&input.card.id) >= *copies
            }
            ModifierCondition::RingAtLeast(ring) => input.ring >= *ring,
            ModifierCondition::RingAtMost(ring) => input.ring <= *ring,
            ModifierCondition::CovenantAtLeast(covenant) => input.covenant >= *covenant,
        }
    }

    /// Keyword the condition names, if any.
    pub fn keyword(&self) -> Option<&Keyword> {
        match self {
            ModifierCondition::DeckHasKeyword(keyword)
            | ModifierCondition::CardHasKeyword(keyword) => Some(keyword),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextModifierDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub when: Vec<ModifierCondition>,
    pub delta: i32,
}

impl ContextModifierDefinition {
    pub fn applies(&self, input: &ModifierInput) -> bool {
        !self.when.is_empty() && self.when.iter().all(|condition| condition.holds(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardType;
    use crate::scoring::DeckAnalyzer;

    fn tank() -> Card {
        Card::new("tank", "Tank", CardType::Unit, 70, &["tank"]).unwrap()
    }

    fn missing_frontline() -> ContextModifierDefinition {
        serde_json::from_str(
            r#"{
                "name": "missing_frontline",
                "when": [
                    {"kind": "deck_lacks", "value": "frontline"},
                    {"kind": "card_provides", "value": "frontline"}
                ],
                "delta": 15
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_all_conditions_must_hold() {
        let modifier = missing_frontline();
        let card = tank();

        let empty = DeckAnalyzer::new(&[]).analyze(&[]);
        let input = ModifierInput {
            analysis: &empty,
            card: &card,
            ring: 1,
            covenant: 0,
        };
        assert!(modifier.applies(&input));

        let with_tank = DeckAnalyzer::new(&[]).analyze(&[tank()]);
        let input = ModifierInput {
            analysis: &with_tank,
            ..input
        };
        assert!(!modifier.applies(&input));
    }

    #[test]
    fn test_numeric_conditions() {
        let card = tank();
        let analysis = DeckAnalyzer::new(&[]).analyze(&[tank(), tank()]);
        let input = ModifierInput {
            analysis: &analysis,
            card: &card,
            ring: 5,
            covenant: 15,
        };

        assert!(ModifierCondition::RingAtLeast(5).holds(&input));
        assert!(!ModifierCondition::RingAtMost(4).holds(&input));
        assert!(ModifierCondition::CovenantAtLeast(15).holds(&input));
        assert!(ModifierCondition::DeckSizeAbove(1).holds(&input));
        assert!(!ModifierCondition::DeckSizeAbove(2).holds(&input));
        assert!(ModifierCondition::CopiesInDeckAtLeast(2).holds(&input));
        assert!(ModifierCondition::CardRarity(Rarity::Common).holds(&input));

        let rare = tank().with_rarity(Rarity::Rare);
        let input = ModifierInput {
            card: &rare,
            ..input
        };
        assert!(ModifierCondition::CardRarity(Rarity::Rare).holds(&input));
        assert!(!ModifierCondition::CardRarity(Rarity::Common).holds(&input));
    }

    #[test]
    fn test_empty_when_never_applies() {
        let modifier = ContextModifierDefinition {
            name: "always".to_string(),
            description: String::new(),
            when: vec![],
            delta: 100,
        };
        let card = tank();
        let analysis = DeckAnalyzer::new(&[]).analyze(&[]);
        assert!(!modifier.applies(&ModifierInput {
            analysis: &analysis,
            card: &card,
            ring: 1,
            covenant: 0,
        }));
    }

    #[test]
    fn test_unknown_condition_kind_rejected() {
        let parsed: Result<ModifierCondition, _> =
            serde_json::from_str(r#"{"kind": "moon_phase", "value": 3}"#);
        assert!(parsed.is_err());
    }
}
