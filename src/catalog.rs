use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use indicium::simple::{Indexable, SearchIndex};
use itertools::Itertools;

use crate::error::{DraftError, DraftResult};
use crate::models::card::MAX_BASE_VALUE;
use crate::models::{Card, Keyword};
use crate::opt::*;

const BUILTIN_CARD_DATA: &str = include_str!("../resource/cards.json");

fn log(s: String) {
    log_if(s.as_str(), DbgFlg::Catalog);
}

/// Read-only card lookup. Implementations are shared immutably between the
/// session and any number of concurrent scoring tasks.
pub trait CardCatalog {
    fn get_by_id(&self, id: &str) -> DraftResult<&Card>;

    fn get_all(&self) -> Vec<&Card>;

    /// Case-insensitive substring match against name, keywords and description.
    fn search(&self, query: &str) -> Vec<&Card>;

    fn get_by_clan(&self, clan: &str) -> Vec<&Card>;

    fn contains(&self, id: &str) -> bool {
        self.get_by_id(id).is_ok()
    }

    /// Every keyword carried by at least one card.
    fn keyword_registry(&self) -> BTreeSet<Keyword> {
        self.get_all()
            .into_iter()
            .flat_map(|card| card.keywords.iter().cloned())
            .collect()
    }
}

impl Indexable for Card {
    fn strings(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}

pub struct InMemoryCatalog {
    cards: HashMap<String, Card>,
    name_index: SearchIndex<String>,
}

impl InMemoryCatalog {
    pub fn new(cards: Vec<Card>) -> DraftResult<Self> {
        let mut card_map = HashMap::new();
        let mut name_index = SearchIndex::default();

        let mut names = HashSet::new();

        for card in cards {
            if card_map.contains_key(&card.id) {
                return Err(DraftError::Data(format!("duplicate card id '{}'", card.id)));
            }
            if !names.insert(card.name.to_lowercase()) {
                return Err(DraftError::Data(format!("duplicate card name '{}'", card.name)));
            }
            if !(0..=MAX_BASE_VALUE).contains(&card.base_value) {
                return Err(DraftError::Data(format!(
                    "card '{}' has base value {} outside 0..={}",
                    card.id, card.base_value, MAX_BASE_VALUE
                )));
            }
            name_index.insert(&card.id, &card);
            card_map.insert(card.id.clone(), card);
        }

        log(format!("Loaded {} cards into the catalog", card_map.len()));

        Ok(InMemoryCatalog {
            cards: card_map,
            name_index,
        })
    }

    pub fn from_json(json: &str) -> DraftResult<Self> {
        let cards: Vec<Card> =
            serde_json::from_str(json).map_err(|err| DraftError::Data(err.to_string()))?;
        Self::new(cards)
    }

    pub fn load_from_path(path: &Path) -> DraftResult<Self> {
        log(format!("Reading card data from {}", path.display()));
        let json = std::fs::read_to_string(path)
            .map_err(|err| DraftError::Data(format!("{}: {}", path.display(), err)))?;
        Self::from_json(&json)
    }

    pub fn builtin() -> DraftResult<Self> {
        Self::from_json(BUILTIN_CARD_DATA)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Resolves a typed or partial card name: exact name first, then a single
    /// hit from the name index.
    pub fn find_by_name(&self, query: &str) -> DraftResult<&Card> {
        let query = query.trim();
        if let Some(card) = self
            .cards
            .values()
            .find(|card| card.name.eq_ignore_ascii_case(query))
        {
            return Ok(card);
        }

        let found_ids = self.name_index.search(query);
        match found_ids.len() {
            1 => self.get_by_id(found_ids[0]),
            0 => Err(DraftError::NotFound(query.to_string())),
            _ => Err(DraftError::AmbiguousName {
                query: query.to_string(),
                candidates: found_ids
                    .iter()
                    .filter_map(|id| self.cards.get(*id))
                    .map(|card| card.name.clone())
                    .sorted()
                    .take(3)
                    .collect(),
            }),
        }
    }

    /// Accepts either a card id or something `find_by_name` can resolve.
    pub fn resolve(&self, id_or_name: &str) -> DraftResult<&Card> {
        self.get_by_id(id_or_name.trim())
            .or_else(|_| self.find_by_name(id_or_name))
    }
}

impl CardCatalog for InMemoryCatalog {
    fn get_by_id(&self, id: &str) -> DraftResult<&Card> {
        self.cards
            .get(id)
            .ok_or_else(|| DraftError::NotFound(id.to_string()))
    }

    fn get_all(&self) -> Vec<&Card> {
        self.cards
            .values()
            .sorted_by(|a, b| a.clan.cmp(&b.clan).then_with(|| a.name.cmp(&b.name)))
            .collect()
    }

    fn search(&self, query: &str) -> Vec<&Card> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        self.cards
            .values()
            .filter(|card| {
                card.name.to_lowercase().contains(&query)
                    || card.description.to_lowercase().contains(&query)
                    || card
                        .keywords
                        .iter()
                        .any(|keyword| keyword.as_str().contains(&query))
            })
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .collect()
    }

    fn get_by_clan(&self, clan: &str) -> Vec<&Card> {
        let clan = clan.trim();
        self.cards
            .values()
            .filter(|card| card.clan.eq_ignore_ascii_case(clan))
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .collect()
    }
}
