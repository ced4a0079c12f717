use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::Keyword;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub requires: Vec<Keyword>,
    pub bonus: f64,
}

impl SynergyDefinition {
    /// Active when every required keyword is present in `keywords`.
    pub fn is_active(&self, keywords: &BTreeSet<Keyword>) -> bool {
        self.requires.iter().all(|keyword| keywords.contains(keyword))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::keyword::parse_keywords;

    fn shift_loop() -> SynergyDefinition {
        serde_json::from_str(
            r#"{"name": "Shift Loop", "requires": ["Shift", "advance"], "bonus": 0.2}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_requires_every_keyword() {
        let synergy = shift_loop();
        assert!(synergy.is_active(&parse_keywords(&["advance", "shift", "tempo"]).unwrap()));
        assert!(!synergy.is_active(&parse_keywords(&["shift"]).unwrap()));
        assert!(!synergy.is_active(&BTreeSet::new()));
    }

    #[test]
    fn test_description_defaults_to_empty() {
        assert_eq!(shift_loop().description, "");
    }
}
