use serde::{Deserialize, Serialize};
use strum_macros::{EnumString, IntoStaticStr};

pub const MAX_SCORE: i32 = 120;
pub const S_TIER_THRESHOLD: i32 = 90;
pub const A_TIER_THRESHOLD: i32 = 80;
pub const B_TIER_THRESHOLD: i32 = 70;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumString,
    IntoStaticStr,
    strum_macros::Display,
    Serialize,
    Deserialize,
)]
pub enum Tier {
    S,
    A,
    B,
    C,
}

impl Tier {
    pub fn from_score(score: i32) -> Self {
        if score >= S_TIER_THRESHOLD {
            Tier::S
        } else if score >= A_TIER_THRESHOLD {
            Tier::A
        } else if score >= B_TIER_THRESHOLD {
            Tier::B
        } else {
            Tier::C
        }
    }
}

/// Per-stage values of a single scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_value: i32,
    pub synergy_multiplier: f64,
    pub synergy_score: i32,
    pub context_delta: i32,
    pub champion_delta: i32,
    pub ring_delta: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftScore {
    pub score: i32,
    pub tier: Tier,
    pub reasons: Vec<String>,
    pub breakdown: ScoreBreakdown,
}

impl DraftScore {
    pub fn to_text(&self) -> String {
        format!("[{}] {:>3}", self.tier, self.score)
    }
}
