pub mod card_matcher;
pub mod catalog;
pub mod cli;
pub mod context;
pub mod engine;
pub mod error;
pub mod models;
pub mod opt;
pub mod rules;
pub mod scoring;
pub mod session;

pub use catalog::{CardCatalog, InMemoryCatalog};
pub use engine::{DraftEngine, ScoreBatch};
pub use error::{DraftError, DraftResult};
pub use session::DraftSession;
