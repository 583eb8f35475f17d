use std::borrow::Cow;

use xi_rope::{DeltaBuilder, LinesMetric, Rope};

use super::{ContentChange, ContentChangeEvent, TextSource};
use crate::error::DocumentError;
use crate::position::{Position, Range};
use crate::registry::LanguageId;

/// A plain text document backed by an `xi_rope::Rope`.
///
/// Edits are applied as one delta per batch; positions in a batch all refer
/// to the text before the batch.
#[derive(Debug, Clone)]
pub struct TextDocument {
    buffer: Rope,
    language: LanguageId,
    version: u64,
}

impl TextDocument {
    pub fn new(language: &str, text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            language: LanguageId::new(language),
            version: 0,
        }
    }

    pub fn from_bytes(language: &str, bytes: &[u8]) -> Result<Self, DocumentError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::new(language, text))
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_language(&mut self, language: &str) {
        self.language = LanguageId::new(language);
    }

    /// Byte offset of a 1-based position.
    pub fn offset_of(&self, position: Position) -> Result<usize, DocumentError> {
        let out_of_bounds = DocumentError::PositionOutOfBounds { position };
        if position.line_number == 0
            || position.column == 0
            || position.line_number > self.line_count()
        {
            return Err(out_of_bounds);
        }
        let column = (position.column - 1) as usize;
        if column > self.line_length(position.line_number) as usize {
            return Err(out_of_bounds);
        }
        let line_start = self.buffer.offset_of_line((position.line_number - 1) as usize);
        Ok(line_start + column)
    }

    /// 1-based position of a byte offset, clamped to the document end.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.buffer.len());
        let line = self.buffer.line_of_offset(offset);
        let column = offset - self.buffer.offset_of_line(line);
        Position::new(line as u32 + 1, column as u32 + 1)
    }

    /// Full range of the document.
    pub fn full_range(&self) -> Range {
        Range::from_positions(Position::new(1, 1), self.position_at(self.buffer.len()))
    }

    /// Applies a batch of non-overlapping changes.
    ///
    /// Returns the applied batch ordered from end to start, ready to be handed
    /// to the bracket model.
    pub fn apply_changes(
        &mut self,
        changes: Vec<ContentChange>,
    ) -> Result<ContentChangeEvent, DocumentError> {
        let mut located = changes
            .into_iter()
            .map(|change| {
                let start = self.offset_of(change.range.start)?;
                let end = self.offset_of(change.range.end)?;
                if end < start {
                    return Err(DocumentError::PositionOutOfBounds {
                        position: change.range.end,
                    });
                }
                Ok((start, end, change))
            })
            .collect::<Result<Vec<_>, _>>()?;
        located.sort_by_key(|(start, end, _)| (*start, *end));

        let mut builder = DeltaBuilder::new(self.buffer.len());
        let mut previous_end = None;
        for (start, end, change) in &located {
            if previous_end.is_some_and(|prev| prev > *start) {
                return Err(DocumentError::OverlappingChanges {
                    position: change.range.start,
                });
            }
            builder.replace(*start..*end, Rope::from(change.text.as_str()));
            previous_end = Some(*end);
        }
        self.buffer = builder.build().apply(&self.buffer);
        self.version += 1;

        Ok(ContentChangeEvent {
            changes: located.into_iter().rev().map(|(_, _, c)| c).collect(),
        })
    }

    /// Replaces a single range.
    pub fn replace(
        &mut self,
        range: Range,
        text: &str,
    ) -> Result<ContentChangeEvent, DocumentError> {
        self.apply_changes(vec![ContentChange {
            range,
            text: text.to_string(),
        }])
    }

    pub fn insert(
        &mut self,
        at: Position,
        text: &str,
    ) -> Result<ContentChangeEvent, DocumentError> {
        self.replace(Range::caret(at), text)
    }
}

impl TextSource for TextDocument {
    fn language_id(&self) -> LanguageId {
        self.language.clone()
    }

    fn line_count(&self) -> u32 {
        self.buffer.measure::<LinesMetric>() as u32 + 1
    }

    fn line_content(&self, line_number: u32) -> Cow<'_, str> {
        if line_number == 0 || line_number > self.line_count() {
            return Cow::Borrowed("");
        }
        let idx = (line_number - 1) as usize;
        let start = self.buffer.offset_of_line(idx);
        let end = if line_number < self.line_count() {
            self.buffer.offset_of_line(idx + 1) - 1
        } else {
            self.buffer.len()
        };
        self.buffer.slice_to_cow(start..end)
    }

    fn value_length(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::length::Length;
    use pretty_assertions::assert_eq;

    #[test]
    fn lines_exclude_terminators() {
        let doc = TextDocument::new("plain", "ab\r\ncd\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_content(1), "ab\r");
        assert_eq!(doc.line_content(2), "cd");
        assert_eq!(doc.line_content(3), "");
        assert_eq!(doc.length(), Length::of_str("ab\r\ncd\n"));
    }

    #[test]
    fn batch_positions_refer_to_text_before_the_batch() {
        let mut doc = TextDocument::new("plain", "one\ntwo\nthree");
        let event = doc
            .apply_changes(vec![
                ContentChange {
                    range: Range::new(1, 1, 1, 4),
                    text: "1".into(),
                },
                ContentChange {
                    range: Range::new(3, 1, 3, 6),
                    text: "3\n3b".into(),
                },
            ])
            .unwrap();
        assert_eq!(doc.text(), "1\ntwo\n3\n3b");
        assert_eq!(event.changes[0].range.start, Position::new(3, 1));
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn overlapping_changes_are_rejected() {
        let mut doc = TextDocument::new("plain", "abcdef");
        let err = doc
            .apply_changes(vec![
                ContentChange {
                    range: Range::new(1, 1, 1, 4),
                    text: String::new(),
                },
                ContentChange {
                    range: Range::new(1, 3, 1, 5),
                    text: String::new(),
                },
            ])
            .unwrap_err();
        assert!(matches!(err, DocumentError::OverlappingChanges { .. }));
        assert_eq!(doc.text(), "abcdef");
    }

    #[test]
    fn positions_outside_the_document_are_errors() {
        let mut doc = TextDocument::new("plain", "ab\ncd");
        assert!(doc.insert(Position::new(1, 3), "x").is_ok());
        assert!(matches!(
            doc.insert(Position::new(1, 5), "x"),
            Err(DocumentError::PositionOutOfBounds { .. })
        ));
        assert!(doc.insert(Position::new(3, 1), "x").is_err());
    }

    #[test]
    fn position_at_round_trips() {
        let doc = TextDocument::new("plain", "ab\ncd");
        for offset in 0..=5 {
            assert_eq!(doc.offset_of(doc.position_at(offset)).unwrap(), offset);
        }
    }
}
