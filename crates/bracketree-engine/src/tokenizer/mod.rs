//! # Token Streams
//!
//! The parser consumes a stream of bracket and text tokens through the
//! [`Tokenizer`] trait. Tokens cover the document without gaps: the lengths of
//! all tokens add up to the document length.
//!
//! ## Variants
//!
//! Both variants share one line scanner ([`ScanningTokenizer`]) and differ in
//! which parts of a line they search for brackets:
//!
//! - **[`FastTokenizer`]** searches every line in full using the document
//!   language. Brackets inside strings and comments are reported too.
//! - **[`ClassifiedTokenizer`]** searches only spans the host classified as
//!   code, and picks the bracket set by the span's language so embedded
//!   languages pair correctly. Lines without classification are searched in
//!   full using the document language.
//!
//! ## Restarting
//!
//! [`Tokenizer::skip`] moves the stream forward by an arbitrary length. The
//! parser calls it after taking a subtree from the previous tree, so the
//! scanner restarts at the first line after the reused text.

mod scanner;
mod segments;

pub use scanner::ScanningTokenizer;
pub use segments::{ClassifiedSegments, CodeSegment, RawTextSegments, SegmentSource};

use crate::ast::NodeRef;
use crate::length::Length;
use crate::registry::{BracketIdSet, FamilyId};

pub type FastTokenizer<'a, D> = ScanningTokenizer<'a, RawTextSegments<'a, D>>;
pub type ClassifiedTokenizer<'a, D> = ScanningTokenizer<'a, ClassifiedSegments<'a, D>>;

#[derive(Debug, Clone)]
pub enum TokenKind {
    Text,
    OpeningBracket {
        family: FamilyId,
        node: NodeRef,
    },
    ClosingBracket {
        family: FamilyId,
        closes: BracketIdSet,
        node: NodeRef,
    },
}

#[derive(Debug, Clone)]
pub struct Token {
    pub length: Length,
    pub kind: TokenKind,
}

impl Token {
    pub fn text(length: Length) -> Self {
        Self {
            length,
            kind: TokenKind::Text,
        }
    }

    /// Families a closing token closes; empty for everything else.
    pub fn closes(&self) -> Option<&BracketIdSet> {
        match &self.kind {
            TokenKind::ClosingBracket { closes, .. } => Some(closes),
            _ => None,
        }
    }
}

pub trait Tokenizer {
    /// Offset of the next token.
    fn offset(&self) -> Length;

    /// Length of the whole document.
    fn length(&self) -> Length;

    fn peek(&mut self) -> Option<&Token>;

    fn read(&mut self) -> Option<Token>;

    /// Moves forward by `length` without producing tokens.
    fn skip(&mut self, length: Length);
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::host::{
        ClassificationState, ClassifiedDocument, LineTokens, StandardTokenType,
        StaticLanguageConfiguration, TextDocument,
    };
    use crate::registry::{BracketRegistry, LanguageId};
    use pretty_assertions::assert_eq;

    fn registry() -> BracketRegistry {
        BracketRegistry::new(Rc::new(StaticLanguageConfiguration::c_like()))
    }

    fn describe(tokenizer: &mut impl Tokenizer) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(token) = tokenizer.read() {
            out.push(match &token.kind {
                TokenKind::Text => format!("{:?}", token.length),
                TokenKind::OpeningBracket { node, .. } | TokenKind::ClosingBracket { node, .. } => {
                    node.as_bracket().map(|b| b.text.to_string()).unwrap_or_default()
                }
            });
        }
        out
    }

    #[test]
    fn fast_tokens_cover_the_document() {
        let doc = TextDocument::new("c", "f(a[0])\n  {\"}\"}\n");
        let registry = registry();
        let mut tokenizer = FastTokenizer::new(&doc, &registry);
        assert_eq!(
            describe(&mut tokenizer),
            vec!["0:1", "(", "0:1", "[", "0:1", "]", ")", "1:2", "{", "0:1", "}", "0:1", "}", "1:0"]
        );
        assert_eq!(tokenizer.offset(), doc_length(&doc));
    }

    fn doc_length(doc: &TextDocument) -> Length {
        use crate::host::TextSource;
        doc.length()
    }

    #[test]
    fn classified_tokens_skip_strings() {
        let mut doc = ClassifiedDocument::new("c", "{\"}\"}");
        let c = LanguageId::new("c");
        let mut tokens = LineTokens::new();
        tokens.push(1, StandardTokenType::Other, &c);
        tokens.push(4, StandardTokenType::String, &c);
        tokens.push(5, StandardTokenType::Other, &c);
        doc.set_line_tokens(1, tokens);
        doc.set_classification_state(ClassificationState::Completed);

        let registry = registry();
        let mut tokenizer = ClassifiedTokenizer::new(&doc, &registry);
        assert_eq!(describe(&mut tokenizer), vec!["{", "0:3", "}"]);
    }

    #[test]
    fn embedded_languages_use_their_own_brackets() {
        let config = StaticLanguageConfiguration::with_pairs(&[
            ("html", &[("<", ">")]),
            ("js", &[("(", ")")]),
        ]);
        let registry = BracketRegistry::new(Rc::new(config));
        let mut doc = ClassifiedDocument::new("html", "<a>(x)</a>");
        let mut tokens = LineTokens::new();
        tokens.push(3, StandardTokenType::Other, &LanguageId::new("html"));
        tokens.push(6, StandardTokenType::Other, &LanguageId::new("js"));
        tokens.push(10, StandardTokenType::Other, &LanguageId::new("html"));
        doc.set_line_tokens(1, tokens);

        let mut tokenizer = ClassifiedTokenizer::new(&doc, &registry);
        assert_eq!(
            describe(&mut tokenizer),
            vec!["<", "0:1", ">", "(", "0:1", ")", "<", "0:2", ">"]
        );
    }

    #[test]
    fn skip_restarts_mid_line() {
        let doc = TextDocument::new("c", "(a)\n[b]");
        let registry = registry();
        let mut tokenizer = FastTokenizer::new(&doc, &registry);
        assert!(tokenizer.peek().is_some());
        tokenizer.skip(Length::new(0, 2));
        assert_eq!(tokenizer.offset(), Length::new(0, 2));
        assert_eq!(describe(&mut tokenizer), vec![")", "1:0", "[", "0:1", "]"]);
    }

    #[test]
    fn empty_document_has_no_tokens() {
        let doc = TextDocument::new("c", "");
        let registry = registry();
        let mut tokenizer = FastTokenizer::new(&doc, &registry);
        assert!(tokenizer.peek().is_none());
        assert!(tokenizer.read().is_none());
    }
}
