use thiserror::Error;

use crate::length::Length;
use crate::position::Position;

/// A batch of edits that cannot describe one document mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("edit ends at {end:?} before it starts at {start:?}")]
    Inverted { start: Length, end: Length },

    #[error("edit at {start:?} overlaps the previous edit ending at {previous_end:?}")]
    Overlapping { start: Length, previous_end: Length },
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("position {position:?} is outside the document")]
    PositionOutOfBounds { position: Position },

    #[error("change at {position:?} overlaps another change in the same batch")]
    OverlappingChanges { position: Position },

    #[error("document is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
