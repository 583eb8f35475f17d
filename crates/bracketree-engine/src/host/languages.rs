use std::cell::RefCell;
use std::collections::HashMap;

use super::{BracketPair, LanguageConfigurationSource};

/// Bracket pairs held in memory.
///
/// Languages without an entry fall back to the default pairs, if any.
#[derive(Debug, Default)]
pub struct StaticLanguageConfiguration {
    languages: RefCell<HashMap<String, Vec<BracketPair>>>,
    fallback: Vec<BracketPair>,
}

impl StaticLanguageConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// `()`, `[]` and `{}` for every language.
    pub fn c_like() -> Self {
        Self {
            languages: RefCell::default(),
            fallback: vec![
                BracketPair::new("{", "}"),
                BracketPair::new("[", "]"),
                BracketPair::new("(", ")"),
            ],
        }
    }

    pub fn with_pairs(languages: &[(&str, &[(&str, &str)])]) -> Self {
        let config = Self::new();
        for (language, pairs) in languages {
            config.set_pairs(language, pairs);
        }
        config
    }

    pub fn set_pairs(&self, language: &str, pairs: &[(&str, &str)]) {
        let pairs = pairs
            .iter()
            .map(|(open, close)| BracketPair::new(*open, *close))
            .collect();
        self.languages.borrow_mut().insert(language.to_string(), pairs);
    }

    pub fn remove(&self, language: &str) {
        self.languages.borrow_mut().remove(language);
    }
}

impl LanguageConfigurationSource for StaticLanguageConfiguration {
    fn bracket_pairs(&self, language: &str) -> Vec<BracketPair> {
        self.languages
            .borrow()
            .get(language)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
