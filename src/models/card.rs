use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::keyword::{parse_keywords, Keyword, Role};
use crate::error::DraftResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CardType {
    Unit,
    Spell,
    Champion,
    Equipment,
    Artifact,
    Other(String),
}

impl CardType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "unit" => CardType::Unit,
            "spell" => CardType::Spell,
            "champion" => CardType::Champion,
            "equipment" => CardType::Equipment,
            "artifact" => CardType::Artifact,
            _ => CardType::Other(raw.trim().to_string()),
        }
    }
}

impl Display for CardType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CardType::Unit => write!(f, "Unit"),
            CardType::Spell => write!(f, "Spell"),
            CardType::Champion => write!(f, "Champion"),
            CardType::Equipment => write!(f, "Equipment"),
            CardType::Artifact => write!(f, "Artifact"),
            CardType::Other(name) => write!(f, "{}", name),
        }
    }
}

impl<'de> Deserialize<'de> for CardType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(CardType::parse(&s))
    }
}

impl Serialize for CardType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub enum Rarity {
    Champion,
    Rare,
    Uncommon,
    Common,
}

impl Display for Rarity {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Rarity::Champion => write!(f, "Champion"),
            Rarity::Rare => write!(f, "Rare"),
            Rarity::Uncommon => write!(f, "Uncommon"),
            Rarity::Common => write!(f, "Common"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub clan: String,
    pub card_type: CardType,
    pub rarity: Rarity,
    #[serde(default)]
    pub cost: Option<i32>,
    pub base_value: i32,
    #[serde(default)]
    pub tempo_score: i32,
    #[serde(default)]
    pub value_score: i32,
    #[serde(default)]
    pub keywords: BTreeSet<Keyword>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "base_expansion")]
    pub expansion: String,
}

pub const MAX_BASE_VALUE: i32 = 100;

fn base_expansion() -> String {
    String::from("base")
}

impl Card {
    pub fn new(
        id: &str,
        name: &str,
        card_type: CardType,
        base_value: i32,
        keywords: &[&str],
    ) -> DraftResult<Self> {
        Ok(Card {
            id: id.to_string(),
            name: name.to_string(),
            clan: String::new(),
            card_type,
            rarity: Rarity::Common,
            cost: None,
            base_value,
            tempo_score: 0,
            value_score: 0,
            keywords: parse_keywords(keywords)?,
            description: String::new(),
            expansion: base_expansion(),
        })
    }

    pub fn with_clan(mut self, clan: &str) -> Self {
        self.clan = clan.to_string();
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn has_keyword(&self, keyword: &Keyword) -> bool {
        self.keywords.contains(keyword)
    }

    pub fn provides(&self, role: Role) -> bool {
        role.is_provided_by(&self.keywords)
    }

    pub fn to_text(&self) -> String {
        let cost = self
            .cost
            .map_or_else(|| "-".to_string(), |cost| cost.to_string());
        format!(
            "[{:^8}] [{}] {} ({}, {})",
            self.rarity.to_string(),
            cost,
            self.name,
            self.card_type,
            self.clan
        )
    }
}

/// A card as it sits in the drafted deck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckCard {
    pub card: Card,
    /// 1-based pick position, kept contiguous across removals.
    pub draft_order: usize,
    /// Ring the card was drafted in.
    pub ring_number: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD_JSON: &str = r#"
    {
        "id": "hellhorned_titan_sentry",
        "name": "Titan Sentry",
        "clan": "Hellhorned",
        "card_type": "unit",
        "rarity": "Uncommon",
        "cost": 3,
        "base_value": 79,
        "tempo_score": 6,
        "value_score": 8,
        "keywords": ["Armor", "frontline", "tank", "revenge"],
        "description": "Tank with armor and revenge"
    }"#;

    #[test]
    fn test_deserialize_card() {
        let card: Card = serde_json::from_str(CARD_JSON).unwrap();
        assert_eq!(card.card_type, CardType::Unit);
        assert_eq!(card.rarity, Rarity::Uncommon);
        assert_eq!(card.cost, Some(3));
        assert_eq!(card.expansion, "base");
        assert!(card.has_keyword(&Keyword::parse("armor").unwrap()));
        assert!(card.provides(Role::Frontline));
        assert!(!card.provides(Role::Scaling));
    }

    #[test]
    fn test_card_type_parse() {
        assert_eq!(CardType::parse("SPELL"), CardType::Spell);
        assert_eq!(CardType::parse(" Equipment "), CardType::Equipment);
        assert_eq!(CardType::parse("Room"), CardType::Other("Room".to_string()));
        assert_eq!(CardType::parse("Room").to_string(), "Room");
    }

    #[test]
    fn test_card_serialize_roundtrip_keeps_type_name() {
        let card = Card::new("x", "X", CardType::Artifact, 50, &["combo"]).unwrap();
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["card_type"], "Artifact");
        assert_eq!(json["keywords"][0], "combo");
    }

    #[test]
    fn test_new_rejects_invalid_keyword() {
        assert!(Card::new("x", "X", CardType::Unit, 50, &["front line"]).is_err());
    }

    #[test]
    fn test_to_text() {
        let card = Card::new("cleave", "Cleave", CardType::Spell, 70, &["sweep"])
            .unwrap()
            .with_clan("Banished");
        assert_eq!(card.to_text(), "[ Common ] [-] Cleave (Spell, Banished)");

        let rare = card.with_rarity(Rarity::Rare);
        assert_eq!(rare.to_text(), "[  Rare  ] [-] Cleave (Spell, Banished)");
    }
}
