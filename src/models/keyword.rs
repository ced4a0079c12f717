use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::error::{DraftError, DraftResult};

lazy_static! {
    static ref KEYWORD_PATTERN: Regex =
        Regex::new(r"^[a-z][a-z0-9_]*$").expect("keyword pattern is a valid regex");
}

/// A normalized card tag. Construction trims and lowercases the raw text, so
/// two keywords compare equal regardless of the casing they were written in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Keyword(String);

impl Keyword {
    pub fn parse(raw: &str) -> DraftResult<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        if KEYWORD_PATTERN.is_match(&normalized) {
            Ok(Keyword(normalized))
        } else {
            Err(DraftError::InvalidKeyword(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Keyword {
    type Error = DraftError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Keyword::parse(&raw)
    }
}

impl From<Keyword> for String {
    fn from(keyword: Keyword) -> Self {
        keyword.0
    }
}

pub fn parse_keywords(raw: &[&str]) -> DraftResult<BTreeSet<Keyword>> {
    raw.iter().map(|k| Keyword::parse(k)).collect()
}

/// Structural roles a deck needs filled; each is detected through a fixed keyword set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Frontline,
    BacklineClear,
    Scaling,
}

impl Role {
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Role::Frontline => &["frontline", "tank", "armor"],
            Role::BacklineClear => &["sweep", "explosive", "advance", "aoe"],
            Role::Scaling => &["valor", "decay", "conduit", "pyregel", "dragon_hoard", "forge"],
        }
    }

    pub fn is_provided_by(&self, keywords: &BTreeSet<Keyword>) -> bool {
        keywords
            .iter()
            .any(|keyword| self.keywords().contains(&keyword.as_str()))
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Role::Frontline => write!(f, "frontline"),
            Role::BacklineClear => write!(f, "backline clear"),
            Role::Scaling => write!(f, "scaling"),
        }
    }
}
