use std::fmt;


/// A 1-based line/column position, as hosts and consumers see it.
///
/// Columns are 1-based UTF-8 byte columns.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line_number: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line_number: u32, column: u32) -> Self {
        Self {
            line_number,
            column,
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_number, self.column)
    }
}

/// A range between two 1-based positions; `end` is exclusive.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(
        start_line_number: u32,
        start_column: u32,
        end_line_number: u32,
        end_column: u32,
    ) -> Self {
        Self {
            start: Position::new(start_line_number, start_column),
            end: Position::new(end_line_number, end_column),
        }
    }

    pub const fn from_positions(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// An empty range at `position`.
    pub const fn caret(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains_position(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}..{:?})", self.start, self.end)
    }
}

/// An inclusive range of 1-based line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineRange {
    pub start_line_number: u32,
    pub end_line_number: u32,
}

impl LineRange {
    pub const fn new(start_line_number: u32, end_line_number: u32) -> Self {
        Self {
            start_line_number,
            end_line_number,
        }
    }

    pub const fn single(line_number: u32) -> Self {
        Self::new(line_number, line_number)
    }
}
