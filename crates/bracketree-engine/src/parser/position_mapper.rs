use super::edits::TextEditInfo;
use crate::length::Length;

/// Maps offsets in the edited document back to offsets in the document the
/// previous tree was built from.
///
/// Queries must come with non-decreasing offsets; the mapper walks the edits
/// once, accumulating how far the text after each passed edit has moved.
pub struct BeforeEditPositionMapper<'a> {
    edits: &'a [TextEditInfo],
    next_edit: usize,
    delta_lines: i64,
    delta_columns: i64,
    /// Old line on which `delta_columns` applies.
    delta_line_in_old: Option<u32>,
}

impl<'a> BeforeEditPositionMapper<'a> {
    pub fn new(edits: &'a [TextEditInfo]) -> Self {
        Self {
            edits,
            next_edit: 0,
            delta_lines: 0,
            delta_columns: 0,
            delta_line_in_old: None,
        }
    }

    /// Offset in the old document of `offset`, which must not lie inside an
    /// edited range.
    pub fn offset_before_change(&mut self, offset: Length) -> Length {
        self.adjust_next_edit(offset);
        self.translate_cur_to_old(offset)
    }

    /// Distance from `offset` to the start of the next edit, or `None` when
    /// no edit follows.
    pub fn distance_to_next_change(&mut self, offset: Length) -> Option<Length> {
        self.adjust_next_edit(offset);
        let next = self.edits.get(self.next_edit)?;
        let next_start = self.translate_old_to_cur(next.start);
        Some(Length::diff_non_negative(offset, next_start))
    }

    fn translate_old_to_cur(&self, old: Length) -> Length {
        let lines = old.lines() as i64 + self.delta_lines;
        let columns = if Some(old.lines()) == self.delta_line_in_old {
            old.columns() as i64 + self.delta_columns
        } else {
            old.columns() as i64
        };
        clamped(lines, columns)
    }

    fn translate_cur_to_old(&self, cur: Length) -> Length {
        let lines = cur.lines() as i64 - self.delta_lines;
        let columns = if Some(lines) == self.delta_line_in_old.map(i64::from) {
            cur.columns() as i64 - self.delta_columns
        } else {
            cur.columns() as i64
        };
        clamped(lines, columns)
    }

    fn adjust_next_edit(&mut self, offset: Length) {
        while let Some(edit) = self.edits.get(self.next_edit) {
            let end_after = self.translate_old_to_cur(edit.start + edit.new_length);
            if end_after > offset {
                break;
            }
            self.next_edit += 1;

            let end_before = self.translate_old_to_cur(edit.end);
            self.delta_lines += end_after.lines() as i64 - end_before.lines() as i64;

            let previous_columns = if self.delta_line_in_old == Some(edit.end.lines()) {
                self.delta_columns
            } else {
                0
            };
            self.delta_columns =
                previous_columns + end_after.columns() as i64 - end_before.columns() as i64;
            self.delta_line_in_old = Some(edit.end.lines());
        }
    }
}

fn clamped(lines: i64, columns: i64) -> Length {
    Length::new(lines.max(0) as u32, columns.max(0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn len(lines: u32, columns: u32) -> Length {
        Length::new(lines, columns)
    }

    #[test]
    fn offsets_before_the_edit_are_unchanged() {
        let edits = [TextEditInfo::new(len(0, 5), len(0, 7), len(0, 0))];
        let mut mapper = BeforeEditPositionMapper::new(&edits);
        assert_eq!(mapper.distance_to_next_change(len(0, 2)), Some(len(0, 3)));
        assert_eq!(mapper.offset_before_change(len(0, 2)), len(0, 2));
    }

    #[test]
    fn same_line_shift_after_a_deletion() {
        // "abcdefgh" -> "abcdeh"
        let edits = [TextEditInfo::new(len(0, 5), len(0, 7), len(0, 0))];
        let mut mapper = BeforeEditPositionMapper::new(&edits);
        assert_eq!(mapper.offset_before_change(len(0, 5)), len(0, 7));
        assert_eq!(mapper.distance_to_next_change(len(0, 5)), None);
    }

    #[test]
    fn inserted_line_break_shifts_the_rest_of_the_line() {
        // "ab|cd\nef" with "X\nY" inserted at the caret -> "abX\nYcd\nef"
        let edits = [TextEditInfo::new(len(0, 2), len(0, 2), len(1, 1))];
        let mut mapper = BeforeEditPositionMapper::new(&edits);
        assert_eq!(mapper.offset_before_change(len(1, 1)), len(0, 2));
        assert_eq!(mapper.offset_before_change(len(1, 3)), len(0, 4));
        assert_eq!(mapper.offset_before_change(len(2, 1)), len(1, 1));
    }

    #[test]
    fn several_edits_accumulate() {
        // "(a)(b)(c)" -> "(aa)(c)": insert at 2, delete 4..7
        let edits = [
            TextEditInfo::new(len(0, 2), len(0, 2), len(0, 1)),
            TextEditInfo::new(len(0, 3), len(0, 6), len(0, 0)),
        ];
        let mut mapper = BeforeEditPositionMapper::new(&edits);
        assert_eq!(mapper.distance_to_next_change(len(0, 0)), Some(len(0, 2)));
        assert_eq!(mapper.offset_before_change(len(0, 3)), len(0, 2));
        assert_eq!(mapper.distance_to_next_change(len(0, 3)), Some(len(0, 1)));
        assert_eq!(mapper.offset_before_change(len(0, 4)), len(0, 6));
        assert_eq!(mapper.distance_to_next_change(len(0, 4)), None);
    }
}
