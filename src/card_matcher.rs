use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strsim::{levenshtein, normalized_levenshtein};

use crate::models::Card;

pub const MIN_MATCH_SCORE: i32 = 60;
pub const MIN_OCR_CONFIDENCE: i32 = 60;

/// A piece of text read off the screen and how sure the reader was (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub text: String,
    pub confidence: i32,
}

impl Detection {
    pub fn new(text: &str, confidence: i32) -> Self {
        Detection {
            text: text.trim().to_string(),
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardMatch {
    pub card_id: String,
    pub card_name: String,
    pub detected_text: String,
    /// Name similarity, 0-100.
    pub match_score: i32,
    pub ocr_confidence: i32,
    /// 40% reader confidence, 60% name similarity, scaled to 0.0-1.0.
    pub overall_confidence: f64,
}

impl CardMatch {
    pub fn overall_confidence(ocr_confidence: i32, match_score: i32) -> f64 {
        (f64::from(ocr_confidence) * 0.4 + f64::from(match_score) * 0.6) / 100.0
    }
}

fn preprocess_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '\'')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Snaps `word` to the closest known name token if it is only a typo away.
fn correct_word(word: &str, dictionary: &HashSet<String>) -> String {
    if dictionary.contains(word) {
        return word.to_string();
    }

    let max_distance = (word.chars().count() / 3).max(1);
    dictionary
        .iter()
        .map(|dict_word| (levenshtein(word, dict_word), dict_word))
        .filter(|(dist, _)| *dist <= max_distance)
        .min_by(|(a_dist, a), (b_dist, b)| a_dist.cmp(b_dist).then_with(|| a.cmp(b)))
        .map(|(_, dict_word)| dict_word.to_string())
        .unwrap_or_else(|| word.to_string())
}

fn similarity(a: &str, b: &str) -> i32 {
    (normalized_levenshtein(a, b) * 100.0).round() as i32
}

struct NameEntry {
    card_id: String,
    card_name: String,
    normalized: String,
}

impl NameEntry {
    fn score(&self, text: &str) -> i32 {
        let whole = similarity(text, &self.normalized);
        let text_words = text.split_whitespace().count();
        let name_words: Vec<&str> = self.normalized.split_whitespace().collect();
        if text_words >= name_words.len() {
            return whole;
        }

        // Partial reads of long names are compared word by word.
        name_words
            .iter()
            .map(|word| similarity(text, word))
            .fold(whole, i32::max)
    }

    fn to_match(&self, text: &str, score: i32) -> CardMatch {
        CardMatch {
            card_id: self.card_id.clone(),
            card_name: self.card_name.clone(),
            detected_text: text.to_string(),
            match_score: score.min(100),
            ocr_confidence: 0,
            overall_confidence: 0.0,
        }
    }
}

/// Resolves noisy card name reads against the catalog.
pub struct CardMatcher {
    names: Vec<NameEntry>,
    name_tokens: HashSet<String>,
    min_match_score: i32,
    min_ocr_confidence: i32,
}

impl CardMatcher {
    pub fn new<'c>(cards: impl IntoIterator<Item = &'c Card>) -> Self {
        let mut names: Vec<NameEntry> = cards
            .into_iter()
            .map(|card| NameEntry {
                card_id: card.id.clone(),
                card_name: card.name.clone(),
                normalized: preprocess_text(&card.name),
            })
            .collect();
        names.sort_by(|a, b| a.normalized.cmp(&b.normalized));

        let name_tokens = names.iter().fold(HashSet::new(), |mut acc, entry| {
            entry.normalized.split_whitespace().for_each(|token| {
                acc.insert(token.to_string());
            });
            acc
        });

        CardMatcher {
            names,
            name_tokens,
            min_match_score: MIN_MATCH_SCORE,
            min_ocr_confidence: MIN_OCR_CONFIDENCE,
        }
    }

    pub fn with_thresholds(mut self, min_match_score: i32, min_ocr_confidence: i32) -> Self {
        self.min_match_score = min_match_score;
        self.min_ocr_confidence = min_ocr_confidence;
        self
    }

    /// Best catalog card for `text`, if any clears the match threshold.
    /// `ocr_confidence` and `overall_confidence` are left for the caller.
    pub fn find_best_match(&self, text: &str) -> Option<CardMatch> {
        let text = preprocess_text(text);
        if text.is_empty() {
            return None;
        }

        let corrected = self.corrected(&text);

        let mut best: Option<(&NameEntry, i32)> = None;
        for entry in &self.names {
            let score = entry.score(&text).max(entry.score(&corrected));
            if score >= self.min_match_score && best.map_or(true, |(_, top)| score > top) {
                best = Some((entry, score));
            }
        }

        best.map(|(entry, score)| entry.to_match(&text, score))
    }

    /// Every card scoring at least `threshold` against `text`, best first.
    /// Used when a read is ambiguous; `overall_confidence` is the name similarity alone.
    pub fn find_all_matches(&self, text: &str, threshold: i32) -> Vec<CardMatch> {
        let text = preprocess_text(text);
        if text.is_empty() {
            return Vec::new();
        }
        let corrected = self.corrected(&text);

        let mut matches: Vec<CardMatch> = self
            .names
            .iter()
            .map(|entry| (entry, entry.score(&text).max(entry.score(&corrected))))
            .filter(|(_, score)| *score >= threshold)
            .map(|(entry, score)| {
                let mut card_match = entry.to_match(&text, score);
                card_match.overall_confidence = f64::from(card_match.match_score) / 100.0;
                card_match
            })
            .collect();

        matches.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then_with(|| a.card_name.cmp(&b.card_name))
        });
        matches
    }

    fn corrected(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|word| correct_word(word, &self.name_tokens))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Matches every confident detection, best overall confidence first.
    pub fn match_detections(&self, detections: &[Detection]) -> Vec<CardMatch> {
        let mut matches: Vec<CardMatch> = detections
            .iter()
            .filter(|detection| detection.confidence >= self.min_ocr_confidence)
            .filter_map(|detection| {
                self.find_best_match(&detection.text).map(|mut card_match| {
                    card_match.detected_text = detection.text.clone();
                    card_match.ocr_confidence = detection.confidence;
                    card_match.overall_confidence =
                        CardMatch::overall_confidence(detection.confidence, card_match.match_score);
                    card_match
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.overall_confidence
                .partial_cmp(&a.overall_confidence)
                .unwrap_or(Ordering::Equal)
        });
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardType;

    fn matcher() -> CardMatcher {
        let cards: Vec<Card> = [
            ("banished_fel", "Fel"),
            ("banished_talos", "Talos"),
            ("banished_just_cause", "Just Cause"),
            ("banished_cleave", "Cleave"),
            ("pyreborne_lord_fenix", "Lord Fenix"),
            ("underlegion_bolete", "Bolete the Guillotine"),
        ]
        .iter()
        .map(|(id, name)| Card::new(id, name, CardType::Unit, 50, &[]).unwrap())
        .collect();
        CardMatcher::new(&cards)
    }

    #[test]
    fn test_overall_confidence() {
        assert!((CardMatch::overall_confidence(80, 80) - 0.8).abs() < 1e-9);
        assert!((CardMatch::overall_confidence(80, 60) - 0.68).abs() < 1e-9);
    }

    #[test]
    fn test_exact_and_case_insensitive() {
        let matcher = matcher();
        let exact = matcher.find_best_match("Fel").unwrap();
        assert_eq!(exact.card_id, "banished_fel");
        assert_eq!(exact.match_score, 100);
        assert_eq!(matcher.find_best_match("  FEL ").unwrap().card_name, "Fel");
    }

    #[test]
    fn test_misspellings() {
        let matcher = matcher();
        assert_eq!(matcher.find_best_match("Fell").unwrap().card_name, "Fel");
        assert_eq!(
            matcher.find_best_match("Jvst Cause").unwrap().card_name,
            "Just Cause"
        );
        assert_eq!(
            matcher.find_best_match("Lord Fenlx!").unwrap().card_id,
            "pyreborne_lord_fenix"
        );
    }

    #[test]
    fn test_partial_reads() {
        let matcher = matcher();
        assert_eq!(
            matcher.find_best_match("Guillotine").unwrap().card_name,
            "Bolete the Guillotine"
        );
        assert_eq!(matcher.find_best_match("Just").unwrap().card_name, "Just Cause");
    }

    #[test]
    fn test_rejects_garbage() {
        let matcher = matcher();
        assert!(matcher.find_best_match("NonExistentCard123").is_none());
        assert!(matcher.find_best_match("").is_none());
        assert!(matcher.find_best_match("%%%").is_none());
    }

    #[test]
    fn test_match_detections_sorted_and_filtered() {
        let matcher = matcher();
        let detections = vec![
            Detection::new("Fell", 70),
            Detection::new("Cleave", 95),
            Detection::new("Talos", 30),
            Detection::new("qqqqqqq", 99),
        ];

        let matches = matcher.match_detections(&detections);
        let ids: Vec<&str> = matches.iter().map(|m| m.card_id.as_str()).collect();
        assert_eq!(ids, vec!["banished_cleave", "banished_fel"]);
        assert_eq!(matches[0].ocr_confidence, 95);
        assert_eq!(matches[1].detected_text, "Fell");
        assert!(matches[0].overall_confidence > matches[1].overall_confidence);
    }

    #[test]
    fn test_find_all_matches() {
        let matcher = matcher();

        let matches = matcher.find_all_matches("Fel", 40);
        assert_eq!(matches[0].card_id, "banished_fel");
        assert_eq!(matches[0].match_score, 100);
        assert!((matches[0].overall_confidence - 1.0).abs() < 1e-9);
        assert!(matches.windows(2).all(|w| w[0].match_score >= w[1].match_score));
        assert!(matches.iter().all(|m| m.match_score >= 40));

        let exact = matcher.find_all_matches("Fel", 100);
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].card_name, "Fel");

        assert!(matcher.find_all_matches("   ", 0).is_empty());
        assert!(matcher.find_all_matches("qqqqqqq", 60).is_empty());
    }

    #[test]
    fn test_find_all_matches_lists_every_close_name() {
        let matcher = matcher();
        let ids: Vec<String> = matcher
            .find_all_matches("Talos", 0)
            .into_iter()
            .map(|m| m.card_id)
            .collect();
        assert_eq!(ids.len(), 6);
        assert_eq!(ids[0], "banished_talos");
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let matcher = matcher().with_thresholds(60, 0);
        let matches = matcher.match_detections(&[Detection::new("Talos", 30)]);
        assert_eq!(matches.len(), 1);
        assert!((matches[0].overall_confidence - 0.72).abs() < 1e-9);
    }
}
