//! # Relative Lengths
//!
//! Every node in the bracket tree stores a [`Length`] rather than an absolute
//! position. A length is a `(lines, columns)` pair: the number of line breaks
//! the span crosses and the number of bytes after the last line break.
//!
//! Absolute positions only exist during a traversal, where they are computed
//! by summing the lengths of everything to the left of a node. This is what
//! makes subtree reuse possible: an edit before a subtree shifts where the
//! subtree starts, but never what is stored inside it.
//!
//! ## Addition is not commutative
//!
//! ```text
//! (0, 3) + (0, 2) = (0, 5)      "abc" followed by "de"
//! (0, 3) + (1, 2) = (1, 2)      "abc" followed by "\nde"
//! (1, 2) + (0, 3) = (1, 5)      "a\nbc" followed by "def"
//! ```
//!
//! Columns are UTF-8 byte columns and lines are separated by `\n` only; a `\r`
//! before a `\n` is an ordinary trailing column of its line.

use std::fmt;
use std::ops::{Add, AddAssign};


use crate::position::Position;

/// A relative text span measured in line breaks and trailing columns.
///
/// Ordered lexicographically (lines first), which matches document order when
/// two lengths are measured from the same base offset.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Length {
    lines: u32,
    columns: u32,
}

impl Length {
    pub const ZERO: Length = Length {
        lines: 0,
        columns: 0,
    };

    pub const fn new(lines: u32, columns: u32) -> Self {
        Self { lines, columns }
    }

    /// Measures a string.
    pub fn of_str(text: &str) -> Self {
        let mut lines = 0u32;
        let mut last_break = None;
        for (idx, b) in text.bytes().enumerate() {
            if b == b'\n' {
                lines += 1;
                last_break = Some(idx);
            }
        }
        let columns = match last_break {
            Some(idx) => text.len() - idx - 1,
            None => text.len(),
        };
        Self::new(lines, columns as u32)
    }

    pub const fn lines(self) -> u32 {
        self.lines
    }

    pub const fn columns(self) -> u32 {
        self.columns
    }

    pub const fn is_zero(self) -> bool {
        self.lines == 0 && self.columns == 0
    }

    /// The span from `from` to `to`, or zero if `to` is not after `from`.
    pub fn diff_non_negative(from: Length, to: Length) -> Length {
        if to <= from {
            return Length::ZERO;
        }
        if from.lines == to.lines {
            Length::new(0, to.columns - from.columns)
        } else {
            Length::new(to.lines - from.lines, to.columns)
        }
    }

    /// Number of lines touched by a span of this length starting at column 0.
    pub const fn line_count(self) -> u32 {
        self.lines + 1
    }

    /// Interprets this length as an offset from the document start.
    pub fn to_position(self) -> Position {
        Position::new(self.lines + 1, self.columns + 1)
    }

    /// Interprets a 1-based position as an offset from the document start.
    pub fn from_position(position: Position) -> Self {
        Self::new(
            position.line_number.saturating_sub(1),
            position.column.saturating_sub(1),
        )
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        if rhs.lines == 0 {
            Length::new(self.lines, self.columns + rhs.columns)
        } else {
            Length::new(self.lines + rhs.lines, rhs.columns)
        }
    }
}

impl AddAssign for Length {
    fn add_assign(&mut self, rhs: Length) {
        *self = *self + rhs;
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.lines, self.columns)
    }
}
