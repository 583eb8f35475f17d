//! # Host Interfaces
//!
//! The engine never owns the document text. Everything it needs from the
//! editor is read through three traits:
//!
//! - **[`TextSource`]**: language, lines and size of the document
//! - **[`ClassificationSource`]**: the background classifier's state and its
//!   per-line token types
//! - **[`LanguageConfigurationSource`]**: bracket pairs per language
//!
//! Changes are pushed into the engine as plain values ([`ContentChangeEvent`],
//! [`LanguageConfigurationChange`], classification line ranges) through the
//! handlers on [`BracketPairsModel`](crate::BracketPairsModel).
//!
//! The reference hosts in this module ([`TextDocument`], [`ClassifiedDocument`],
//! [`StaticLanguageConfiguration`]) back the tests, benches and CLI.

mod classification;
mod document;
mod languages;

use std::borrow::Cow;


pub use classification::{ClassifiedDocument, LineClassification};
pub use document::TextDocument;
pub use languages::StaticLanguageConfiguration;

use crate::length::Length;
use crate::position::Range;
use crate::registry::LanguageId;

/// Read access to the document text.
///
/// Line numbers are 1-based. Line content excludes the `\n` terminator.
pub trait TextSource {
    fn language_id(&self) -> LanguageId;

    fn line_count(&self) -> u32;

    fn line_content(&self, line_number: u32) -> Cow<'_, str>;

    fn line_length(&self, line_number: u32) -> u32 {
        self.line_content(line_number).len() as u32
    }

    /// Total size of the document in bytes.
    fn value_length(&self) -> usize;

    /// Extent of the whole document as a length from its start.
    fn length(&self) -> Length {
        let lines = self.line_count().max(1);
        Length::new(lines - 1, self.line_length(lines))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationState {
    Uninitialized,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardTokenType {
    Other,
    Comment,
    String,
    RegEx,
}

/// A classified run of a line, ending (exclusive) at byte column `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedSpan {
    pub end: u32,
    pub token_type: StandardTokenType,
    pub language: LanguageId,
}

/// The classification of one line as consecutive spans starting at column 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTokens {
    spans: Vec<ClassifiedSpan>,
}

impl LineTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a span; a span continuing the previous one's type and
    /// language extends it instead.
    pub fn push(&mut self, end: u32, token_type: StandardTokenType, language: &LanguageId) {
        if let Some(last) = self.spans.last_mut() {
            if end <= last.end {
                return;
            }
            if last.token_type == token_type && &last.language == language {
                last.end = end;
                return;
            }
        }
        self.spans.push(ClassifiedSpan {
            end,
            token_type,
            language: language.clone(),
        });
    }

    pub fn spans(&self) -> &[ClassifiedSpan] {
        &self.spans
    }

    /// A line classified entirely as `Other` code in `language`.
    pub fn plain(line_length: u32, language: &LanguageId) -> Self {
        let mut tokens = Self::new();
        tokens.push(line_length, StandardTokenType::Other, language);
        tokens
    }
}

/// Read access to the background classifier's results.
pub trait ClassificationSource {
    fn classification_state(&self) -> ClassificationState;

    /// Tokens of a line, or `None` while the line has not been classified.
    fn line_tokens(&self, line_number: u32) -> Option<&LineTokens>;
}

/// An opening/closing bracket text pair from a language configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketPair {
    pub open: String,
    pub close: String,
}

impl BracketPair {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

pub trait LanguageConfigurationSource {
    fn bracket_pairs(&self, language: &str) -> Vec<BracketPair>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageConfigurationChange {
    Language(LanguageId),
    All,
}

/// One replaced range, in 1-based coordinates of the text before the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    pub range: Range,
    pub text: String,
}

/// All replacements of one document mutation, listed from end to start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentChangeEvent {
    pub changes: Vec<ContentChange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_merges_continuations() {
        let rust = LanguageId::new("rust");
        let mut tokens = LineTokens::new();
        tokens.push(3, StandardTokenType::Other, &rust);
        tokens.push(5, StandardTokenType::Other, &rust);
        tokens.push(9, StandardTokenType::String, &rust);
        tokens.push(9, StandardTokenType::Other, &rust);
        assert_eq!(
            tokens
                .spans()
                .iter()
                .map(|s| (s.end, s.token_type))
                .collect::<Vec<_>>(),
            vec![(5, StandardTokenType::Other), (9, StandardTokenType::String)]
        );
    }
}
