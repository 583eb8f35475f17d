//! Per-line classification from the lexer's tokens.

use bracketree_engine::{
    ClassificationState, ClassifiedDocument, LanguageId, LineRange, LineTokens, StandardTokenType,
    TextSource,
};

use crate::lexer::{TokenKind, lex};

/// Classifies C-family text for one language.
#[derive(Debug, Clone)]
pub struct Classifier {
    language: LanguageId,
}

impl Classifier {
    pub fn new(language: &str) -> Self {
        Self {
            language: LanguageId::new(language),
        }
    }

    pub fn language(&self) -> &LanguageId {
        &self.language
    }

    /// Tokens of every line of `text`, one entry per line including a final
    /// empty line after a trailing `\n`.
    pub fn classify(&self, text: &str) -> Vec<LineTokens> {
        let mut lines = Vec::new();
        let mut current = LineTokens::new();
        let mut column = 0u32;

        for token in lex(text) {
            let token_type = token_type(token.kind);
            // Block comments may span lines.
            for (i, piece) in token.text.split('\n').enumerate() {
                if i > 0 {
                    lines.push(std::mem::take(&mut current));
                    column = 0;
                }
                if !piece.is_empty() {
                    column += piece.len() as u32;
                    current.push(column, token_type, &self.language);
                }
            }
        }
        lines.push(current);
        lines
    }

    /// Classifies the whole document, stores the results and marks
    /// classification completed.
    ///
    /// Returns the line ranges whose tokens changed, for
    /// `BracketPairsModel::handle_classification_changed`.
    pub fn classify_document(&self, document: &mut ClassifiedDocument) -> Vec<LineRange> {
        let lines = self.classify(&document.text());
        let mut changed: Vec<LineRange> = Vec::new();

        for (line_number, tokens) in (1u32..).zip(lines) {
            if !document.set_line_tokens(line_number, tokens) {
                continue;
            }
            match changed.last_mut() {
                Some(range) if range.end_line_number + 1 == line_number => {
                    range.end_line_number = line_number;
                }
                _ => changed.push(LineRange::single(line_number)),
            }
        }

        document.set_classification_state(ClassificationState::Completed);
        log::debug!(
            "classified {} lines of {}, {} ranges changed",
            document.line_count(),
            self.language,
            changed.len()
        );
        changed
    }
}

/// Classifies `document` in its own language.
pub fn classify_document(document: &mut ClassifiedDocument) -> Vec<LineRange> {
    Classifier::new(&document.language_id()).classify_document(document)
}

fn token_type(kind: TokenKind) -> StandardTokenType {
    if kind.is_comment() {
        StandardTokenType::Comment
    } else if kind.is_string() {
        StandardTokenType::String
    } else {
        StandardTokenType::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracketree_engine::ClassificationSource;
    use pretty_assertions::assert_eq;

    fn spans(tokens: &LineTokens) -> Vec<(u32, StandardTokenType)> {
        tokens.spans().iter().map(|s| (s.end, s.token_type)).collect()
    }

    #[test]
    fn one_entry_per_line() {
        let lines = Classifier::new("c").classify("a\n\nb\n");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].spans().is_empty());
        assert!(lines[3].spans().is_empty());
    }

    #[test]
    fn strings_and_comments_are_classified() {
        let lines = Classifier::new("c").classify("f(\"(\"); // )");
        assert_eq!(
            spans(&lines[0]),
            vec![
                (2, StandardTokenType::Other),
                (5, StandardTokenType::String),
                (8, StandardTokenType::Other),
                (12, StandardTokenType::Comment),
            ]
        );
    }

    #[test]
    fn block_comments_split_at_line_breaks() {
        let lines = Classifier::new("c").classify("x /* (\n  ) */ y");
        assert_eq!(
            spans(&lines[0]),
            vec![(2, StandardTokenType::Other), (6, StandardTokenType::Comment)]
        );
        assert_eq!(
            spans(&lines[1]),
            vec![(6, StandardTokenType::Comment), (8, StandardTokenType::Other)]
        );
    }

    #[test]
    fn classify_document_reports_changed_ranges() {
        let mut doc = ClassifiedDocument::new("c", "a\nb\nc\nd");
        let language = doc.language_id();
        doc.set_line_tokens(2, LineTokens::plain(1, &language));

        let changed = classify_document(&mut doc);
        assert_eq!(changed, vec![LineRange::single(1), LineRange::new(3, 4)]);
        assert_eq!(doc.classification_state(), ClassificationState::Completed);
        assert!(classify_document(&mut doc).is_empty());
    }
}
