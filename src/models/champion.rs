use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::error::DraftError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumString,
    EnumIter,
    AsRefStr,
    strum_macros::Display,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum Champion {
    #[strum(to_string = "Fel", serialize = "banished_fel")]
    Fel,
    #[strum(to_string = "Talos", serialize = "banished_talos")]
    Talos,
    #[strum(to_string = "Lord Fenix", serialize = "lord_fenix")]
    LordFenix,
    #[strum(to_string = "Lady Gilda", serialize = "lady_gilda")]
    LadyGilda,
    #[strum(to_string = "Ekka", serialize = "luna_coven_ekka")]
    Ekka,
    #[strum(to_string = "Bolete the Guillotine", serialize = "bolete")]
    Bolete,
    #[strum(to_string = "Madame Lionsmane", serialize = "madame_lionsmane")]
    MadameLionsmane,
    #[strum(to_string = "Orechi", serialize = "lazarus_league_orechi")]
    Orechi,
    #[strum(to_string = "Rector Flicker", serialize = "rector_flicker")]
    RectorFlicker,
    #[strum(to_string = "Hornbreaker Prince", serialize = "hornbreaker_prince")]
    HornbreakerPrince,
    #[strum(to_string = "Herzal", serialize = "railforged_herzal")]
    Herzal,
    #[strum(to_string = "Heph", serialize = "railforged_heph")]
    Heph,
}

impl Champion {
    /// Declared paths in order; the first one is what a freshly picked champion starts on.
    pub fn paths(&self) -> &'static [&'static str] {
        match self {
            Champion::Fel => &["Unchained", "Savior"],
            Champion::Talos => &["Flight"],
            Champion::LordFenix => &["Standard"],
            Champion::LadyGilda => &["Bloat Matron"],
            Champion::Ekka => &["Spellweaver"],
            Champion::Bolete => &["Standard"],
            Champion::MadameLionsmane => &["Sporesinger"],
            Champion::Orechi => &["Brewmaster"],
            Champion::RectorFlicker => &["Standard"],
            Champion::HornbreakerPrince => &["Standard"],
            Champion::Herzal => &["Blacksmith", "Pyresmith"],
            Champion::Heph => &["Handy", "Metalworker"],
        }
    }

    pub fn default_path(&self) -> &'static str {
        self.paths()[0]
    }

    pub fn has_path(&self, path: &str) -> bool {
        self.paths()
            .iter()
            .any(|declared| declared.eq_ignore_ascii_case(path.trim()))
    }

    pub fn parse(id: &str) -> Result<Self, DraftError> {
        Champion::from_str(id.trim()).map_err(|_| DraftError::NotFound(id.to_string()))
    }
}

impl Default for Champion {
    fn default() -> Self {
        Champion::Fel
    }
}

impl TryFrom<String> for Champion {
    type Error = DraftError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Champion::parse(&id)
    }
}

impl From<Champion> for String {
    fn from(champion: Champion) -> Self {
        champion.to_string()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_parse_by_name_and_id() {
        assert_eq!(Champion::parse("Lord Fenix"), Ok(Champion::LordFenix));
        assert_eq!(Champion::parse("lord fenix"), Ok(Champion::LordFenix));
        assert_eq!(Champion::parse("lord_fenix"), Ok(Champion::LordFenix));
        assert_eq!(Champion::parse(" Heph "), Ok(Champion::Heph));
        assert_eq!(
            Champion::parse("Random"),
            Err(DraftError::NotFound("Random".to_string()))
        );
    }

    #[test]
    fn test_display_uses_roster_name() {
        assert_eq!(Champion::Bolete.to_string(), "Bolete the Guillotine");
        assert_eq!(Champion::Bolete.as_ref(), "Bolete the Guillotine");
    }

    #[test]
    fn test_every_champion_declares_a_path() {
        for champion in Champion::iter() {
            assert!(!champion.paths().is_empty(), "{} has no path", champion);
            assert!(champion.has_path(champion.default_path()));
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&Champion::MadameLionsmane).unwrap();
        assert_eq!(json, r#""Madame Lionsmane""#);
        let parsed: Champion = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Champion::MadameLionsmane);
    }
}
