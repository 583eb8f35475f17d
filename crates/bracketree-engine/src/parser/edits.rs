use crate::error::EditError;
use crate::host::ContentChangeEvent;
use crate::length::Length;

/// One replacement, in coordinates of the document before the batch.
///
/// `start..end` was replaced by text of length `new_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEditInfo {
    pub start: Length,
    pub end: Length,
    pub new_length: Length,
}

impl TextEditInfo {
    pub const fn new(start: Length, end: Length, new_length: Length) -> Self {
        Self {
            start,
            end,
            new_length,
        }
    }

    /// Converts host change notifications, keeping their order.
    pub fn from_content_changes(event: &ContentChangeEvent) -> Vec<TextEditInfo> {
        event
            .changes
            .iter()
            .map(|change| {
                TextEditInfo::new(
                    Length::from_position(change.range.start),
                    Length::from_position(change.range.end),
                    Length::of_str(&change.text),
                )
            })
            .collect()
    }
}

/// A validated set of edits describing one document mutation, in ascending
/// document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBatch {
    edits: Vec<TextEditInfo>,
}

impl EditBatch {
    /// Accepts edits in any order; hosts usually list them from end to start.
    pub fn new(edits: impl IntoIterator<Item = TextEditInfo>) -> Result<Self, EditError> {
        let mut edits: Vec<TextEditInfo> = edits.into_iter().collect();
        if let Some(edit) = edits.iter().find(|e| e.end < e.start) {
            return Err(EditError::Inverted {
                start: edit.start,
                end: edit.end,
            });
        }
        edits.sort_by_key(|e| (e.start, e.end));
        for pair in edits.windows(2) {
            if pair[0].end > pair[1].start {
                return Err(EditError::Overlapping {
                    start: pair[1].start,
                    previous_end: pair[0].end,
                });
            }
        }
        Ok(Self { edits })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_content_changes(event: &ContentChangeEvent) -> Result<Self, EditError> {
        Self::new(TextEditInfo::from_content_changes(event))
    }

    pub fn edits(&self) -> &[TextEditInfo] {
        &self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// The same mutation with every edit grown to cover its lines completely,
    /// up to the start of the following line or `old_length`.
    ///
    /// Hosts drop the classification of every line an edit touches, so a
    /// classification-aware tree must re-tokenize those lines in full.
    /// Edits sharing a line are merged.
    pub fn extended_to_whole_lines(&self, old_length: Length) -> EditBatch {
        let mut extended: Vec<TextEditInfo> = Vec::with_capacity(self.edits.len());
        let mut iter = self.edits.iter().peekable();

        while let Some(first) = iter.next() {
            let start = Length::new(first.start.lines(), 0);
            let mut new_length = Length::diff_non_negative(start, first.start) + first.new_length;
            let mut last = first;
            let mut end = line_end(last.end, old_length);

            loop {
                let line = last.end.lines();
                let Some(next) = iter.next_if(|next| next.start.lines() <= line) else {
                    break;
                };
                new_length += Length::diff_non_negative(last.end, next.start) + next.new_length;
                last = next;
                end = line_end(last.end, old_length);
            }

            new_length += Length::diff_non_negative(last.end, end);
            extended.push(TextEditInfo::new(start, end, new_length));
        }

        EditBatch { edits: extended }
    }
}

/// Start of the line after `end`, clamped to the document.
fn line_end(end: Length, old_length: Length) -> Length {
    Length::new(end.lines() + 1, 0).min(old_length).max(end)
}
