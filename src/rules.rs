pub mod champion_override;
pub mod modifier;
pub mod synergy;

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

pub use champion_override::{ChampionOverride, OverrideMode};
pub use modifier::{ContextModifierDefinition, ModifierCondition, ModifierInput};
pub use synergy::SynergyDefinition;

use crate::catalog::CardCatalog;
use crate::error::{DraftError, DraftResult};
use crate::models::{Champion, Keyword, Role};
use crate::opt::*;

const BUILTIN_RULE_DATA: &str = include_str!("../resource/rules.json");

/// Largest magnitude a modifier delta or override value may have.
pub const MAX_RULE_DELTA: i32 = 1000;

fn log(s: String) {
    log_if(s.as_str(), DbgFlg::Catalog);
}

/// Read-only scoring tables. Registration order of synergies and modifiers is
/// the order their reasons appear in a score.
pub trait RuleTables {
    fn synergies(&self) -> &[SynergyDefinition];

    fn context_modifiers(&self) -> &[ContextModifierDefinition];

    /// An override declared for exactly `path` wins over one declared for any path.
    fn champion_override(
        &self,
        champion: Champion,
        path: &str,
        card_id: &str,
    ) -> Option<&ChampionOverride>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleBook {
    #[serde(default)]
    pub synergies: Vec<SynergyDefinition>,
    #[serde(default)]
    pub context_modifiers: Vec<ContextModifierDefinition>,
    #[serde(default)]
    pub champion_overrides: Vec<ChampionOverride>,
}

impl RuleBook {
    pub fn from_json(json: &str) -> DraftResult<Self> {
        serde_json::from_str(json).map_err(|err| DraftError::Data(err.to_string()))
    }

    pub fn load_from_path(path: &Path) -> DraftResult<Self> {
        log(format!("Reading rule data from {}", path.display()));
        let json = std::fs::read_to_string(path)
            .map_err(|err| DraftError::Data(format!("{}: {}", path.display(), err)))?;
        Self::from_json(&json)
    }

    pub fn builtin() -> DraftResult<Self> {
        Self::from_json(BUILTIN_RULE_DATA)
    }

    /// Checks every table entry against the catalog: keywords must be known to
    /// some card or role, override targets must exist, paths must be declared.
    pub fn validate(&self, catalog: &dyn CardCatalog) -> DraftResult<()> {
        let mut known = catalog.keyword_registry();
        known.extend(role_keywords());

        for synergy in &self.synergies {
            if synergy.requires.len() < 2 {
                return Err(DraftError::InvalidRule(format!(
                    "synergy '{}' needs at least two keywords",
                    synergy.name
                )));
            }
            if synergy.bonus <= 0.0 {
                return Err(DraftError::InvalidRule(format!(
                    "synergy '{}' has a non-positive bonus",
                    synergy.name
                )));
            }
            check_known(&known, &synergy.name, synergy.requires.iter())?;
        }

        for modifier in &self.context_modifiers {
            if modifier.when.is_empty() {
                return Err(DraftError::InvalidRule(format!(
                    "modifier '{}' has no conditions",
                    modifier.name
                )));
            }
            check_delta(&modifier.name, modifier.delta)?;
            check_known(
                &known,
                &modifier.name,
                modifier.when.iter().filter_map(|condition| condition.keyword()),
            )?;
        }

        for rule in &self.champion_overrides {
            if !catalog.contains(&rule.card_id) {
                return Err(DraftError::InvalidRule(format!(
                    "override for {} targets unknown card '{}'",
                    rule.champion, rule.card_id
                )));
            }
            let (OverrideMode::Add(value) | OverrideMode::Replace(value)) = rule.mode;
            check_delta(&format!("{} override for {}", rule.champion, rule.card_id), value)?;
            if let Some(path) = &rule.path {
                if !rule.champion.has_path(path) {
                    return Err(DraftError::InvalidRule(format!(
                        "{} has no path '{}'",
                        rule.champion, path
                    )));
                }
            }
        }

        log(format!(
            "Validated {} synergies, {} modifiers, {} overrides",
            self.synergies.len(),
            self.context_modifiers.len(),
            self.champion_overrides.len()
        ));
        Ok(())
    }
}

fn role_keywords() -> BTreeSet<Keyword> {
    Role::iter()
        .flat_map(|role| role.keywords().iter())
        .filter_map(|raw| Keyword::parse(raw).ok())
        .collect()
}

fn check_delta(rule_name: &str, value: i32) -> DraftResult<()> {
    if (-MAX_RULE_DELTA..=MAX_RULE_DELTA).contains(&value) {
        Ok(())
    } else {
        Err(DraftError::InvalidRule(format!(
            "'{}' value {} outside -{}..={}",
            rule_name, value, MAX_RULE_DELTA, MAX_RULE_DELTA
        )))
    }
}

fn check_known<'a>(
    known: &BTreeSet<Keyword>,
    rule_name: &str,
    mut keywords: impl Iterator<Item = &'a Keyword>,
) -> DraftResult<()> {
    match keywords.find(|keyword| !known.contains(*keyword)) {
        Some(unknown) => Err(DraftError::InvalidRule(format!(
            "'{}' references unknown keyword '{}'",
            rule_name, unknown
        ))),
        None => Ok(()),
    }
}

impl RuleTables for RuleBook {
    fn synergies(&self) -> &[SynergyDefinition] {
        &self.synergies
    }

    fn context_modifiers(&self) -> &[ContextModifierDefinition] {
        &self.context_modifiers
    }

    fn champion_override(
        &self,
        champion: Champion,
        path: &str,
        card_id: &str,
    ) -> Option<&ChampionOverride> {
        let candidates = self
            .champion_overrides
            .iter()
            .filter(|rule| rule.champion == champion && rule.card_id == card_id);

        let mut any_path = None;
        for rule in candidates {
            if rule.matches_path(path) {
                return Some(rule);
            }
            if rule.is_any_path() && any_path.is_none() {
                any_path = Some(rule);
            }
        }
        any_path
    }
}
