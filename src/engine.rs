use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::card_matcher::{CardMatch, CardMatcher, Detection};
use crate::catalog::{CardCatalog, InMemoryCatalog};
use crate::error::DraftResult;
use crate::models::{Card, Champion, DraftScore};
use crate::opt::*;
use crate::rules::{ContextModifierDefinition, RuleBook, RuleTables, SynergyDefinition};
use crate::scoring::{DeckAnalysis, ScoreCalculator, ScoringContext};

fn log(s: String) {
    log_if(s.as_str(), DbgFlg::Score);
}

/// Scores for one batch request, keyed by card id. Built fresh per call and
/// tagged with the session revision its context was captured at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBatch {
    revision: u64,
    scores: BTreeMap<String, DraftScore>,
}

impl ScoreBatch {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, card_id: &str) -> Option<&DraftScore> {
        self.scores.get(card_id)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn scores(&self) -> &BTreeMap<String, DraftScore> {
        &self.scores
    }

    /// Scores in the order the caller asked for them; ids without a score are skipped.
    pub fn in_request_order<'a, S: AsRef<str>>(
        &'a self,
        card_ids: &'a [S],
    ) -> Vec<(&'a str, &'a DraftScore)> {
        card_ids
            .iter()
            .filter_map(|id| {
                let id = id.as_ref();
                self.scores.get(id).map(|score| (id, score))
            })
            .collect()
    }
}

pub struct DraftEngine {
    catalog: Arc<InMemoryCatalog>,
    rules: Arc<RuleBook>,
    calculator: ScoreCalculator,
    matcher: CardMatcher,
}

impl DraftEngine {
    /// Fails with `InvalidRule` when the rules reference cards or keywords the catalog lacks.
    pub fn new(catalog: InMemoryCatalog, rules: RuleBook) -> DraftResult<Self> {
        rules.validate(&catalog)?;
        let matcher = CardMatcher::new(catalog.get_all());
        let rules = Arc::new(rules);
        Ok(DraftEngine {
            catalog: Arc::new(catalog),
            calculator: ScoreCalculator::new(rules.clone()),
            rules,
            matcher,
        })
    }

    pub fn builtin() -> DraftResult<Self> {
        Self::new(InMemoryCatalog::builtin()?, RuleBook::builtin()?)
    }

    /// Bundled data unless a path overrides it.
    pub fn load(card_data: Option<&Path>, rule_data: Option<&Path>) -> DraftResult<Self> {
        let catalog = match card_data {
            Some(path) => InMemoryCatalog::load_from_path(path)?,
            None => InMemoryCatalog::builtin()?,
        };
        let rules = match rule_data {
            Some(path) => RuleBook::load_from_path(path)?,
            None => RuleBook::builtin()?,
        };
        Self::new(catalog, rules)
    }

    pub fn catalog(&self) -> &InMemoryCatalog {
        &self.catalog
    }

    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    pub fn matcher(&self) -> &CardMatcher {
        &self.matcher
    }

    pub fn compute(&self, card: &Card, context: &ScoringContext) -> DraftResult<DraftScore> {
        self.calculator.compute(card, context)
    }

    /// One-shot scoring by ids. Unknown card, deck or champion ids are `NotFound`.
    pub fn score(
        &self,
        card_id: &str,
        deck_card_ids: &[&str],
        champion_id: &str,
        champion_path: &str,
        ring: i32,
        covenant: i32,
    ) -> DraftResult<DraftScore> {
        let card = self.catalog.get_by_id(card_id)?;
        let deck = deck_card_ids
            .iter()
            .map(|id| self.catalog.get_by_id(id).map(Card::clone))
            .collect::<DraftResult<Vec<_>>>()?;
        let champion = Champion::parse(champion_id)?;

        let context = ScoringContext::new(deck, champion, champion_path, ring, covenant);
        self.calculator.compute(card, &context)
    }

    /// Scores every candidate against the same frozen context, one task each.
    /// Ids that cannot be resolved or scored are left out of the batch.
    pub async fn score_many<S: AsRef<str>>(
        &self,
        card_ids: &[S],
        context: &ScoringContext,
    ) -> ScoreBatch {
        let mut tasks = JoinSet::new();

        for card_id in card_ids {
            let card_id = card_id.as_ref().to_string();
            let catalog = Arc::clone(&self.catalog);
            let calculator = self.calculator.clone();
            let context = context.clone();

            tasks.spawn(async move {
                let result = catalog
                    .get_by_id(&card_id)
                    .and_then(|card| calculator.compute(card, &context));
                (card_id, result)
            });
        }

        let mut scores = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((card_id, Ok(score))) => {
                    scores.insert(card_id, score);
                }
                Ok((card_id, Err(err))) => log(format!("Skipping {}: {}", card_id, err)),
                Err(err) => log(format!("Scoring task failed: {}", err)),
            }
        }

        log(format!(
            "Scored {} of {} candidates at revision {}",
            scores.len(),
            card_ids.len(),
            context.revision
        ));

        ScoreBatch {
            revision: context.revision,
            scores,
        }
    }

    pub fn analyze_deck(&self, cards: &[Card]) -> DeckAnalysis {
        self.calculator.analyzer().analyze(cards)
    }

    /// Matches screen reads to cards, then scores the matched cards as one batch.
    pub async fn score_detections(
        &self,
        detections: &[Detection],
        context: &ScoringContext,
    ) -> (Vec<CardMatch>, ScoreBatch) {
        let matches = self.matcher.match_detections(detections);
        let card_ids: Vec<&str> = matches.iter().map(|m| m.card_id.as_str()).collect();
        let batch = self.score_many(&card_ids, context).await;
        (matches, batch)
    }

    /// Synergies that list at least one of the card's keywords, in table order.
    pub fn synergies_for(&self, card_id: &str) -> DraftResult<Vec<&SynergyDefinition>> {
        let card = self.catalog.get_by_id(card_id)?;
        Ok(self
            .rules
            .synergies()
            .iter()
            .filter(|synergy| synergy.requires.iter().any(|keyword| card.has_keyword(keyword)))
            .collect())
    }

    pub fn context_modifiers(&self) -> &[ContextModifierDefinition] {
        self.rules.context_modifiers()
    }

    /// Card lookup for user input: exact id first, then by name.
    pub fn resolve_card(&self, id_or_name: &str) -> DraftResult<&Card> {
        self.catalog.resolve(id_or_name)
    }
}
