use std::sync::Arc;

use serde::Serialize;

use crate::engine::ScoreBatch;
use crate::error::{DraftError, DraftResult};
use crate::models::{Card, Champion, DeckCard};
use crate::opt::*;
use crate::scoring::{DeckAnalysis, DeckAnalyzer, ScoringContext, MAX_COVENANT};

pub const RUN_ID_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const RUN_ID_LENGTH: usize = 8;
pub const FIRST_RING: i32 = 1;

fn log(s: String) {
    log_if(s.as_str(), DbgFlg::Session);
}

pub fn new_run_id() -> String {
    nanoid::nanoid!(
        RUN_ID_LENGTH,
        &RUN_ID_ALPHABET.chars().collect::<Vec<char>>()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionState {
    Empty,
    InProgress,
}

/// Immutable view of the deck at one revision; clones share the cards.
#[derive(Debug, Clone)]
pub struct DeckSnapshot {
    pub cards: Arc<[Card]>,
    pub revision: u64,
}

/// The draft in progress. Mutation takes `&mut self`, so sharing a session
/// between tasks needs an explicit lock around it.
#[derive(Debug, Clone, Serialize)]
pub struct DraftSession {
    run_id: String,
    champion: Champion,
    champion_path: String,
    current_ring: i32,
    covenant_level: i32,
    cards: Vec<DeckCard>,
    revision: u64,
}

impl Default for DraftSession {
    fn default() -> Self {
        DraftSession::with_run_id(&new_run_id())
    }
}

impl DraftSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_run_id(run_id: &str) -> Self {
        let champion = Champion::default();
        DraftSession {
            run_id: run_id.to_string(),
            champion,
            champion_path: champion.default_path().to_string(),
            current_ring: FIRST_RING,
            covenant_level: 0,
            cards: Vec::new(),
            revision: 0,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn champion(&self) -> Champion {
        self.champion
    }

    pub fn champion_path(&self) -> &str {
        &self.champion_path
    }

    pub fn current_ring(&self) -> i32 {
        self.current_ring
    }

    pub fn covenant_level(&self) -> i32 {
        self.covenant_level
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn cards(&self) -> &[DeckCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn state(&self) -> SessionState {
        if self.cards.is_empty() {
            SessionState::Empty
        } else {
            SessionState::InProgress
        }
    }

    /// Picks a champion by display name or id and moves to its first path.
    pub fn set_champion(&mut self, id: &str) -> DraftResult<()> {
        let champion =
            Champion::parse(id).map_err(|_| DraftError::UnknownChampion(id.to_string()))?;
        self.champion = champion;
        self.champion_path = champion.default_path().to_string();
        self.touch(format!(
            "Champion set to {} ({})",
            self.champion, self.champion_path
        ));
        Ok(())
    }

    /// Stored as given; not checked against the champion's declared paths.
    pub fn set_champion_path(&mut self, path: &str) {
        self.champion_path = path.to_string();
        self.touch(format!("Champion path set to {}", self.champion_path));
    }

    /// Stored as given, even outside 1..=9.
    pub fn set_current_ring(&mut self, ring: i32) {
        self.current_ring = ring;
        self.touch(format!("Ring set to {}", ring));
    }

    pub fn set_covenant_level(&mut self, level: i32) {
        self.covenant_level = level.clamp(0, MAX_COVENANT);
        self.touch(format!("Covenant set to {}", self.covenant_level));
    }

    pub fn add_card(&mut self, card: Card) -> &DeckCard {
        let deck_card = DeckCard {
            draft_order: self.cards.len() + 1,
            ring_number: self.current_ring,
            card,
        };
        self.touch(format!(
            "Added {} as pick {} in ring {}",
            deck_card.card.id, deck_card.draft_order, deck_card.ring_number
        ));
        self.cards.push(deck_card);
        &self.cards[self.cards.len() - 1]
    }

    /// Removes the earliest copy of `card_id`. Returns false when the deck has none.
    pub fn remove_card(&mut self, card_id: &str) -> bool {
        let position = match self.cards.iter().position(|c| c.card.id == card_id) {
            Some(position) => position,
            None => return false,
        };

        self.cards.remove(position);
        for (index, deck_card) in self.cards.iter_mut().enumerate() {
            deck_card.draft_order = index + 1;
        }
        self.touch(format!("Removed {} from pick {}", card_id, position + 1));
        true
    }

    /// Empties the deck and goes back to the first ring; champion, path and covenant stay.
    pub fn clear_deck(&mut self) {
        self.cards.clear();
        self.current_ring = FIRST_RING;
        self.touch("Deck cleared".to_string());
    }

    /// Drafted cards frozen at the current revision.
    pub fn snapshot(&self) -> DeckSnapshot {
        DeckSnapshot {
            cards: self.cards.iter().map(|c| c.card.clone()).collect(),
            revision: self.revision,
        }
    }

    /// Frozen copy of everything scoring needs, tagged with the current revision.
    pub fn scoring_context(&self) -> ScoringContext {
        let snapshot = self.snapshot();
        ScoringContext {
            deck: snapshot.cards,
            champion: self.champion,
            champion_path: self.champion_path.clone(),
            ring: self.current_ring,
            covenant: self.covenant_level,
            revision: snapshot.revision,
        }
    }

    /// False once the session has changed since `batch` captured its context.
    pub fn accepts(&self, batch: &ScoreBatch) -> bool {
        batch.revision() == self.revision
    }

    pub fn analyze(&self, analyzer: &DeckAnalyzer) -> DeckAnalysis {
        analyzer.analyze(self.cards.iter().map(|c| &c.card))
    }

    pub fn to_text(&self) -> String {
        let header = format!(
            "Run {} | {} ({}) | Ring {} | Covenant {} | {} cards",
            self.run_id,
            self.champion,
            self.champion_path,
            self.current_ring,
            self.covenant_level,
            self.cards.len()
        );
        self.cards.iter().fold(header, |mut acc, deck_card| {
            acc.push_str(&format!(
                "\n{:>3}. R{} {}",
                deck_card.draft_order,
                deck_card.ring_number,
                deck_card.card.to_text()
            ));
            acc
        })
    }

    fn touch(&mut self, message: String) {
        self.revision += 1;
        log(format!("[{} r{}] {}", self.run_id, self.revision, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardType;

    fn card(id: &str) -> Card {
        Card::new(id, id, CardType::Unit, 70, &["tank"]).unwrap()
    }

    fn draft_orders(session: &DraftSession) -> Vec<usize> {
        session.cards().iter().map(|c| c.draft_order).collect()
    }

    fn ids(session: &DraftSession) -> Vec<&str> {
        session.cards().iter().map(|c| c.card.id.as_str()).collect()
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = DraftSession::new();
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.current_ring(), 1);
        assert_eq!(session.covenant_level(), 0);
        assert_eq!(session.champion(), Champion::Fel);
        assert_eq!(session.champion_path(), "Unchained");
        assert_eq!(session.run_id().len(), RUN_ID_LENGTH);
        assert!(session.run_id().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_add_card_assigns_order_and_ring() {
        let mut session = DraftSession::new();
        session.add_card(card("a"));
        session.set_current_ring(4);
        let added = session.add_card(card("a"));
        assert_eq!(added.draft_order, 2);
        assert_eq!(added.ring_number, 4);

        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.cards()[0].ring_number, 1);
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_remove_card_renumbers() {
        let mut session = DraftSession::new();
        for id in ["a", "b", "c", "b", "d"] {
            session.add_card(card(id));
        }

        assert!(session.remove_card("b"));
        assert_eq!(ids(&session), vec!["a", "c", "b", "d"]);
        assert_eq!(draft_orders(&session), vec![1, 2, 3, 4]);

        assert!(session.remove_card("a"));
        assert_eq!(ids(&session), vec!["c", "b", "d"]);
        assert_eq!(draft_orders(&session), vec![1, 2, 3]);

        let revision = session.revision();
        assert!(!session.remove_card("zzz"));
        assert_eq!(session.revision(), revision);
    }

    #[test]
    fn test_remove_keeps_ring_numbers() {
        let mut session = DraftSession::new();
        session.add_card(card("a"));
        session.set_current_ring(2);
        session.add_card(card("b"));
        session.remove_card("a");
        assert_eq!(session.cards()[0].ring_number, 2);
        assert_eq!(session.cards()[0].draft_order, 1);
    }

    #[test]
    fn test_clear_deck() {
        let mut session = DraftSession::new();
        session.set_champion("Herzal").unwrap();
        session.set_covenant_level(12);
        session.set_current_ring(7);
        session.add_card(card("a"));
        let run_id = session.run_id().to_string();

        session.clear_deck();

        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.current_ring(), 1);
        assert_eq!(session.champion(), Champion::Herzal);
        assert_eq!(session.covenant_level(), 12);
        assert_eq!(session.run_id(), run_id);
    }

    #[test]
    fn test_set_champion_resets_path() {
        let mut session = DraftSession::new();
        session.set_champion_path("Savior");
        session.set_champion("railforged_heph").unwrap();
        assert_eq!(session.champion(), Champion::Heph);
        assert_eq!(session.champion_path(), "Handy");
    }

    #[test]
    fn test_set_champion_unknown() {
        let mut session = DraftSession::new();
        assert_eq!(
            session.set_champion("Nobody"),
            Err(DraftError::UnknownChampion("Nobody".to_string()))
        );
        assert_eq!(session.champion(), Champion::Fel);
    }

    #[test]
    fn test_path_and_ring_are_stored_verbatim() {
        let mut session = DraftSession::new();
        session.set_champion_path("Not A Real Path");
        session.set_current_ring(15);
        assert_eq!(session.champion_path(), "Not A Real Path");
        assert_eq!(session.current_ring(), 15);

        session.set_current_ring(-2);
        assert_eq!(session.current_ring(), -2);
    }

    #[test]
    fn test_covenant_is_clamped() {
        let mut session = DraftSession::new();
        session.set_covenant_level(40);
        assert_eq!(session.covenant_level(), 25);
        session.set_covenant_level(-3);
        assert_eq!(session.covenant_level(), 0);
    }

    #[test]
    fn test_scoring_context_snapshot() {
        let mut session = DraftSession::new();
        session.add_card(card("a"));
        let context = session.scoring_context();

        session.add_card(card("b"));

        assert_eq!(context.deck.len(), 1);
        assert_eq!(context.revision + 1, session.revision());
        assert_eq!(context.champion_path, "Unchained");
    }

    #[test]
    fn test_snapshot_is_frozen() {
        let mut session = DraftSession::new();
        session.add_card(card("a"));
        session.add_card(card("b"));
        let snapshot = session.snapshot();
        let shared = snapshot.clone();

        session.remove_card("a");

        let ids: Vec<&str> = snapshot.cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(Arc::ptr_eq(&snapshot.cards, &shared.cards));
        assert_eq!(snapshot.revision + 1, session.revision());
        assert_eq!(session.snapshot().cards.len(), 1);
    }

    #[test]
    fn test_every_mutation_bumps_revision() {
        let mut session = DraftSession::new();
        let mut last = session.revision();
        let mut assert_bumped = |session: &DraftSession| {
            assert!(session.revision() > last);
            last = session.revision();
        };

        session.set_champion("Talos").unwrap();
        assert_bumped(&session);
        session.set_champion_path("Flight");
        assert_bumped(&session);
        session.set_current_ring(3);
        assert_bumped(&session);
        session.set_covenant_level(5);
        assert_bumped(&session);
        session.add_card(card("a"));
        assert_bumped(&session);
        session.remove_card("a");
        assert_bumped(&session);
        session.clear_deck();
        assert_bumped(&session);
    }

    #[test]
    fn test_analyze_uses_deck_cards() {
        let mut session = DraftSession::new();
        let analyzer = DeckAnalyzer::new(&[]);
        assert!(!session.analyze(&analyzer).has_frontline);

        session.add_card(card("a"));
        let analysis = session.analyze(&analyzer);
        assert!(analysis.has_frontline);
        assert_eq!(analysis.total_cards, 1);
    }

    #[test]
    fn test_to_text() {
        let mut session = DraftSession::with_run_id("run1");
        session.add_card(card("a"));
        assert_eq!(
            session.to_text(),
            "Run run1 | Fel (Unchained) | Ring 1 | Covenant 0 | 1 cards\n  1. R1 [ Common ] [-] a (Unit, )"
        );
    }
}
