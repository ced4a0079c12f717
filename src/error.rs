use std::fmt::{self, Display, Formatter};

pub type DraftResult<T> = Result<T, DraftError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// Unknown card or champion id.
    NotFound(String),
    /// `set_champion` called with an id outside the roster.
    UnknownChampion(String),
    /// Scoring context outside its normalized domain (covenant not in 0..=25).
    InvalidContext(String),
    InvalidKeyword(String),
    InvalidRule(String),
    AmbiguousName {
        query: String,
        candidates: Vec<String>,
    },
    /// Reference data could not be read or parsed.
    Data(String),
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DraftError::NotFound(id) => write!(f, "'{}' not found", id),
            DraftError::UnknownChampion(id) => write!(f, "Unknown champion '{}'", id),
            DraftError::InvalidContext(msg) => write!(f, "Invalid scoring context: {}", msg),
            DraftError::InvalidKeyword(raw) => write!(f, "Invalid keyword '{}'", raw),
            DraftError::InvalidRule(msg) => write!(f, "Invalid rule: {}", msg),
            DraftError::AmbiguousName { query, candidates } => write!(
                f,
                "'{}' matches multiple cards: {}",
                query,
                candidates
                    .iter()
                    .map(|c| format!("[{}]", c))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            DraftError::Data(msg) => write!(f, "Data error: {}", msg),
        }
    }
}

impl std::error::Error for DraftError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            DraftError::NotFound("banished_fel".to_string()).to_string(),
            "'banished_fel' not found"
        );
        assert_eq!(
            DraftError::AmbiguousName {
                query: "lady".to_string(),
                candidates: vec!["Lady Gilda".to_string(), "Lady of the House".to_string()],
            }
            .to_string(),
            "'lady' matches multiple cards: [Lady Gilda], [Lady of the House]"
        );
    }
}
