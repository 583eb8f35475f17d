pub mod ast;
pub mod error;
pub mod host;
pub mod length;
pub mod model;
pub mod notify;
pub mod parser;
pub mod position;
pub mod query;
pub mod registry;
pub mod snapshot;
pub mod tokenizer;
pub mod tree;

// Re-export key types for easier usage
pub use ast::{AstNode, AstNodeKind, NodeRef};
pub use error::{DocumentError, EditError};
pub use host::*;
pub use length::Length;
pub use model::{BracketPairsModel, BracketPairsOptions, is_document_supported};
pub use notify::{ChangeNotifier, SubscriptionId};
pub use parser::{EditBatch, ParseStats, TextEditInfo, UpdateMode, parse_document};
pub use position::{LineRange, Position, Range};
pub use query::{BracketInfo, BracketPairInfo};
pub use registry::{BracketRegistry, FamilyId, LanguageId};
pub use tree::{BracketPairsTree, TokenizerKind, TreeState};
