use std::sync::Arc;

use super::analyzer::DeckAnalyzer;
use super::ring::{ring_delta, RingStage};
use super::ScoringContext;
use crate::error::{DraftError, DraftResult};
use crate::models::draft_score::MAX_SCORE;
use crate::models::{Card, DraftScore, ScoreBreakdown, Tier};
use crate::opt::*;
use crate::rules::{ModifierInput, RuleTables};

pub const SYNERGY_CAP: f64 = 1.5;
pub const MAX_COVENANT: i32 = 25;

fn log(s: String) {
    log_if(s.as_str(), DbgFlg::Score);
}

/// Pure scorer over a shared rule set. Cloning is cheap and clones share the tables.
#[derive(Clone)]
pub struct ScoreCalculator {
    rules: Arc<dyn RuleTables + Send + Sync>,
}

impl ScoreCalculator {
    pub fn new(rules: Arc<dyn RuleTables + Send + Sync>) -> Self {
        ScoreCalculator { rules }
    }

    pub fn analyzer(&self) -> DeckAnalyzer<'_> {
        DeckAnalyzer::new(self.rules.synergies())
    }

    pub fn compute(&self, card: &Card, context: &ScoringContext) -> DraftResult<DraftScore> {
        if !(0..=MAX_COVENANT).contains(&context.covenant) {
            return Err(DraftError::InvalidContext(format!(
                "covenant {} outside 0..={}",
                context.covenant, MAX_COVENANT
            )));
        }

        let mut reasons = Vec::new();

        let base_value = card.base_value;
        if base_value != 0 {
            reasons.push(format!("Base value {}", base_value));
        }

        let synergy_multiplier = self.synergy_multiplier(card, context, &mut reasons);
        let synergy_score = (f64::from(base_value) * synergy_multiplier).round() as i32;

        let context_delta = self.context_delta(card, context, &mut reasons);

        let running_total = synergy_score.saturating_add(context_delta);
        let champion_delta = match self.rules.champion_override(
            context.champion,
            &context.champion_path,
            &card.id,
        ) {
            Some(rule) => {
                let delta = rule.mode.delta(running_total);
                if delta != 0 {
                    reasons.push(format!(
                        "{} favorite: {} ({:+})",
                        context.champion, rule.reason, delta
                    ));
                }
                delta
            }
            None => 0,
        };

        let ring_delta = ring_delta(context.ring, &card.card_type);
        if ring_delta != 0 {
            reasons.push(format!(
                "{} ring {} ({:+})",
                RingStage::of(context.ring),
                card.card_type.to_string().to_lowercase(),
                ring_delta
            ));
        }

        let raw = running_total
            .saturating_add(champion_delta)
            .saturating_add(ring_delta);
        let score = raw.clamp(0, MAX_SCORE);
        if score != raw {
            reasons.push(format!("Clamped from {} to {}", raw, score));
        }

        log(format!(
            "{} scored {} ({} x {:.2} {:+} {:+} {:+})",
            card.id, score, base_value, synergy_multiplier, context_delta, champion_delta, ring_delta
        ));

        Ok(DraftScore {
            score,
            tier: Tier::from_score(score),
            reasons,
            breakdown: ScoreBreakdown {
                base_value,
                synergy_multiplier,
                synergy_score,
                context_delta,
                champion_delta,
                ring_delta,
            },
        })
    }

    /// Sum of every synergy firing over the keywords of `card` and the deck, capped.
    fn synergy_multiplier(
        &self,
        card: &Card,
        context: &ScoringContext,
        reasons: &mut Vec<String>,
    ) -> f64 {
        let mut keywords = card.keywords.clone();
        for deck_card in context.deck.iter() {
            keywords.extend(deck_card.keywords.iter().cloned());
        }

        let mut multiplier = 1.0;
        for synergy in self.rules.synergies() {
            if synergy.is_active(&keywords) {
                multiplier += synergy.bonus;
                reasons.push(format!(
                    "Synergy: {} (+{:.0}%)",
                    synergy.name,
                    synergy.bonus * 100.0
                ));
            }
        }

        if multiplier > SYNERGY_CAP {
            reasons.push(format!(
                "Synergy capped at {:.0}%",
                (SYNERGY_CAP - 1.0) * 100.0
            ));
            SYNERGY_CAP
        } else {
            multiplier
        }
    }

    fn context_delta(&self, card: &Card, context: &ScoringContext, reasons: &mut Vec<String>) -> i32 {
        let analysis = self.analyzer().analyze(context.deck.iter());
        let input = ModifierInput {
            analysis: &analysis,
            card,
            ring: context.ring,
            covenant: context.covenant,
        };

        self.rules
            .context_modifiers()
            .iter()
            .filter(|modifier| modifier.applies(&input))
            .map(|modifier| {
                let label = if modifier.description.is_empty() {
                    &modifier.name
                } else {
                    &modifier.description
                };
                reasons.push(format!("{} ({:+})", label, modifier.delta));
                modifier.delta
            })
            .fold(0, i32::saturating_add)
    }
}
