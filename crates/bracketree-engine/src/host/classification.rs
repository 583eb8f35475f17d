use std::borrow::Cow;

use super::{
    ClassificationSource, ClassificationState, ContentChange, ContentChangeEvent, LineTokens,
    TextDocument, TextSource,
};
use crate::error::DocumentError;
use crate::position::{Position, Range};
use crate::registry::LanguageId;

/// Per-line classification results as delivered by a background classifier.
///
/// Lines touched by an edit lose their tokens until they are classified again.
#[derive(Debug, Clone)]
pub struct LineClassification {
    state: ClassificationState,
    lines: Vec<Option<LineTokens>>,
}

impl LineClassification {
    pub fn new(line_count: u32) -> Self {
        Self {
            state: ClassificationState::Uninitialized,
            lines: vec![None; line_count as usize],
        }
    }

    pub fn state(&self) -> ClassificationState {
        self.state
    }

    pub fn set_state(&mut self, state: ClassificationState) {
        self.state = state;
    }

    pub fn get(&self, line_number: u32) -> Option<&LineTokens> {
        let idx = line_number.checked_sub(1)? as usize;
        self.lines.get(idx)?.as_ref()
    }

    /// Stores the tokens of a line. Returns whether they differ from before.
    pub fn set_line(&mut self, line_number: u32, tokens: LineTokens) -> bool {
        let Some(slot) = line_number
            .checked_sub(1)
            .and_then(|idx| self.lines.get_mut(idx as usize))
        else {
            return false;
        };
        if slot.as_ref() == Some(&tokens) {
            return false;
        }
        *slot = Some(tokens);
        true
    }

    pub fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }

    /// Drops the tokens of every line a change touched.
    ///
    /// Changes must be listed from end to start, as in a [`ContentChangeEvent`].
    pub fn apply_content_changes(&mut self, event: &ContentChangeEvent) {
        for change in &event.changes {
            let first = change.range.start.line_number.saturating_sub(1) as usize;
            let last = (change.range.end.line_number as usize).min(self.lines.len());
            let inserted = change.text.bytes().filter(|b| *b == b'\n').count() + 1;
            if first > last {
                continue;
            }
            self.lines
                .splice(first..last, std::iter::repeat_n(None, inserted));
        }
    }
}

/// A [`TextDocument`] paired with its line classification.
#[derive(Debug, Clone)]
pub struct ClassifiedDocument {
    text: TextDocument,
    classification: LineClassification,
}

impl ClassifiedDocument {
    pub fn new(language: &str, text: &str) -> Self {
        Self::from_document(TextDocument::new(language, text))
    }

    pub fn from_document(text: TextDocument) -> Self {
        let classification = LineClassification::new(text.line_count());
        Self {
            text,
            classification,
        }
    }

    pub fn document(&self) -> &TextDocument {
        &self.text
    }

    pub fn text(&self) -> String {
        self.text.text()
    }

    pub fn classification(&self) -> &LineClassification {
        &self.classification
    }

    pub fn set_classification_state(&mut self, state: ClassificationState) {
        self.classification.set_state(state);
    }

    pub fn set_line_tokens(&mut self, line_number: u32, tokens: LineTokens) -> bool {
        self.classification.set_line(line_number, tokens)
    }

    pub fn set_language(&mut self, language: &str) {
        self.text.set_language(language);
        self.classification = LineClassification::new(self.text.line_count());
    }

    pub fn apply_changes(
        &mut self,
        changes: Vec<ContentChange>,
    ) -> Result<ContentChangeEvent, DocumentError> {
        let event = self.text.apply_changes(changes)?;
        self.classification.apply_content_changes(&event);
        Ok(event)
    }

    pub fn replace(
        &mut self,
        range: Range,
        text: &str,
    ) -> Result<ContentChangeEvent, DocumentError> {
        let event = self.text.replace(range, text)?;
        self.classification.apply_content_changes(&event);
        Ok(event)
    }

    pub fn insert(
        &mut self,
        at: Position,
        text: &str,
    ) -> Result<ContentChangeEvent, DocumentError> {
        self.replace(Range::caret(at), text)
    }
}

impl TextSource for ClassifiedDocument {
    fn language_id(&self) -> LanguageId {
        self.text.language_id()
    }

    fn line_count(&self) -> u32 {
        self.text.line_count()
    }

    fn line_content(&self, line_number: u32) -> Cow<'_, str> {
        self.text.line_content(line_number)
    }

    fn value_length(&self) -> usize {
        self.text.value_length()
    }
}

impl ClassificationSource for ClassifiedDocument {
    fn classification_state(&self) -> ClassificationState {
        self.classification.state()
    }

    fn line_tokens(&self, line_number: u32) -> Option<&LineTokens> {
        self.classification.get(line_number)
    }
}

/// A plain [`TextDocument`] never has classification.
impl ClassificationSource for TextDocument {
    fn classification_state(&self) -> ClassificationState {
        ClassificationState::Uninitialized
    }

    fn line_tokens(&self, _line_number: u32) -> Option<&LineTokens> {
        None
    }
}
