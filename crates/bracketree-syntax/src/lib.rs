//! # bracketree-syntax
//!
//! A small background classifier for the bracket engine. It marks string
//! literals and comments in C-family text so the classification-aware token
//! stream skips the brackets inside them.
//!
//! ## Pipeline
//!
//! ```text
//! Source Text → Lexer → Tokens → Classifier → LineTokens per line
//!               (Logos)
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use bracketree_engine::{ClassificationSource, ClassificationState, ClassifiedDocument};
//! use bracketree_syntax::classify_document;
//!
//! let mut doc = ClassifiedDocument::new("c", "puts(\")\");\n");
//! let changed = classify_document(&mut doc);
//!
//! assert_eq!(doc.classification_state(), ClassificationState::Completed);
//! assert_eq!(changed.len(), 1);
//! ```
//!
//! Feed the returned ranges to `BracketPairsModel::handle_classification_changed`
//! and then call `handle_classification_state_changed`.

pub mod classifier;
pub mod lexer;

pub use classifier::{Classifier, classify_document};
