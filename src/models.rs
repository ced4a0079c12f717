pub mod card;
pub mod champion;
pub mod draft_score;
pub mod keyword;

pub use card::{Card, CardType, DeckCard, Rarity};
pub use champion::Champion;
pub use draft_score::{DraftScore, ScoreBreakdown, Tier};
pub use keyword::{Keyword, Role};
