use serde::{Deserialize, Serialize};

use crate::models::Champion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OverrideMode {
    Add(i32),
    Replace(i32),
}

impl OverrideMode {
    /// Delta this override contributes on top of `running_total`.
    pub fn delta(&self, running_total: i32) -> i32 {
        match *self {
            OverrideMode::Add(delta) => delta,
            OverrideMode::Replace(value) => value.saturating_sub(running_total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionOverride {
    pub champion: Champion,
    /// `None` applies to every path of the champion.
    #[serde(default)]
    pub path: Option<String>,
    pub card_id: String,
    pub mode: OverrideMode,
    #[serde(default)]
    pub reason: String,
}

impl ChampionOverride {
    pub fn matches_path(&self, path: &str) -> bool {
        self.path
            .as_deref()
            .map_or(false, |own| own.eq_ignore_ascii_case(path.trim()))
    }

    pub fn is_any_path(&self) -> bool {
        self.path.is_none()
    }
}
