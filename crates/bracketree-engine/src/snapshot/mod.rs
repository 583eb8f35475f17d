//! # Tree Inspection
//!
//! Helpers for tests and tools that look at a bracket tree as a whole.
//!
//! ## Modules
//!
//! - **`normalize`**: renders a tree as a compact one-line string for `insta`
//!   snapshots, and flattens it into the sequence of brackets it contains
//! - **`invariants`**: structural checks (lengths add up, 2-3 list shape,
//!   pair families agree, unexpected closers had nothing open to close)
//!
//! Family ids come from a process-wide table and depend on test order, so
//! rendered output shows bracket texts instead of ids.

pub mod invariants;
pub mod normalize;

pub use invariants::check as check_invariants;
pub use normalize::{FlatBracket, FlatRole, flatten, render};
