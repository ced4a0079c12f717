pub mod analyzer;
pub mod calculator;
pub mod ring;

use std::sync::Arc;

pub use analyzer::{DeckAnalysis, DeckAnalyzer, SynergyStatus};
pub use calculator::{ScoreCalculator, MAX_COVENANT, SYNERGY_CAP};

use crate::models::{Card, Champion};

/// Frozen inputs for one or many `compute` calls. The deck is shared, so
/// cloning a context for each concurrent task does not copy cards.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    /// Cards already drafted, not including the candidate.
    pub deck: Arc<[Card]>,
    pub champion: Champion,
    pub champion_path: String,
    pub ring: i32,
    pub covenant: i32,
    /// Session revision the context was captured at; 0 for ad-hoc contexts.
    pub revision: u64,
}

impl ScoringContext {
    pub fn new(
        deck: Vec<Card>,
        champion: Champion,
        champion_path: &str,
        ring: i32,
        covenant: i32,
    ) -> Self {
        ScoringContext {
            deck: deck.into(),
            champion,
            champion_path: champion_path.to_string(),
            ring,
            covenant,
            revision: 0,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardType;

    #[test]
    fn test_clone_shares_deck() {
        let deck = vec![Card::new("a", "A", CardType::Unit, 50, &[]).unwrap()];
        let context = ScoringContext::new(deck, Champion::Ekka, "Spellweaver", 3, 5);
        let copy = context.clone();

        assert!(Arc::ptr_eq(&context.deck, &copy.deck));
        assert_eq!(copy.revision, 0);
        assert_eq!(copy.champion_path, "Spellweaver");
    }
}
