//! # Lexer - Finding Strings and Comments
//!
//! A [Logos] lexer for C-family source text. It does not try to understand
//! the language; it only has to tell code apart from string literals and
//! comments, so the bracket engine can ignore brackets inside the latter.
//!
//! [Logos]: https://docs.rs/logos
//!
//! Like every lexer in this workspace it is lossless: every byte of the
//! input ends up in exactly one token.
//!
//! ```
//! use bracketree_syntax::lexer::lex;
//!
//! let input = "f(\"(\"); // )\n";
//! let reconstructed: String = lex(input).iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Token Rules
//!
//! - `//` runs to the end of the line.
//! - `/*` runs to the next `*/`, across lines, or to the end of the input.
//! - `"..."` honours backslash escapes and stops at the end of the line when
//!   unterminated.
//! - `'x'` is a character literal; a lone `'` (a Rust lifetime, say) is code.

use logos::{Lexer, Logos};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"")]
pub enum TokenKind {
    /// Horizontal whitespace, including a `\r` before a line break
    #[regex(r"[ \t\r\f]+")]
    Whitespace,

    #[token("\n")]
    Newline,

    #[regex(r"//[^\n]*")]
    LineComment,

    /// `/*` up to and including the matching `*/`
    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r#""([^"\\\n]|\\[^\n])*"?"#)]
    StringLiteral,

    #[regex(r"'([^'\\\n]|\\[^\n])'")]
    CharLiteral,

    /// A `/` that does not start a comment
    #[token("/")]
    Slash,

    /// Anything else, grouped into runs
    #[regex(r#"[^\s"'/]+"#)]
    Code,
}

fn block_comment(lex: &mut Lexer<TokenKind>) {
    let remainder = lex.remainder();
    let len = remainder.find("*/").map_or(remainder.len(), |end| end + 2);
    lex.bump(len);
}

impl TokenKind {
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    pub fn is_string(self) -> bool {
        matches!(self, TokenKind::StringLiteral | TokenKind::CharLiteral)
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Unrecognised characters become [`TokenKind::Code`].
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        tokens.push(Token {
            kind: result.unwrap_or(TokenKind::Code),
            text: lexer.slice(),
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(kind: TokenKind, text: &str) -> Token<'_> {
        Token { kind, text }
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn lex_call_with_string() {
        assert_eq!(
            lex(r#"f("(", x)"#),
            vec![
                token(TokenKind::Code, "f("),
                token(TokenKind::StringLiteral, r#""(""#),
                token(TokenKind::Code, ","),
                token(TokenKind::Whitespace, " "),
                token(TokenKind::Code, "x)"),
            ]
        );
    }

    #[test]
    fn lex_escaped_quote() {
        assert_eq!(
            lex(r#""a\"b" c"#),
            vec![
                token(TokenKind::StringLiteral, r#""a\"b""#),
                token(TokenKind::Whitespace, " "),
                token(TokenKind::Code, "c"),
            ]
        );
    }

    #[test]
    fn unterminated_string_stops_at_line_end() {
        assert_eq!(
            lex("\"(\n)"),
            vec![
                token(TokenKind::StringLiteral, "\"("),
                token(TokenKind::Newline, "\n"),
                token(TokenKind::Code, ")"),
            ]
        );
    }

    #[test]
    fn lex_comments() {
        assert_eq!(
            lex("a / b // (\n/* {\n} */c"),
            vec![
                token(TokenKind::Code, "a"),
                token(TokenKind::Whitespace, " "),
                token(TokenKind::Slash, "/"),
                token(TokenKind::Whitespace, " "),
                token(TokenKind::Code, "b"),
                token(TokenKind::Whitespace, " "),
                token(TokenKind::LineComment, "// ("),
                token(TokenKind::Newline, "\n"),
                token(TokenKind::BlockComment, "/* {\n} */"),
                token(TokenKind::Code, "c"),
            ]
        );
    }

    #[test]
    fn unterminated_block_comment_runs_to_the_end() {
        assert_eq!(
            lex("x /* (\n)"),
            vec![
                token(TokenKind::Code, "x"),
                token(TokenKind::Whitespace, " "),
                token(TokenKind::BlockComment, "/* (\n)"),
            ]
        );
    }

    #[test]
    fn lifetimes_are_code() {
        let kinds: Vec<TokenKind> = lex("&'a str").into_iter().map(|t| t.kind).collect();
        assert!(!kinds.iter().any(|k| k.is_string()));
        assert_eq!(lex("'('")[0], token(TokenKind::CharLiteral, "'('"));
    }

    #[test]
    fn all_bytes_preserved() {
        let input = "fn main() {\n    let s = \"}\"; /* ( */ // [\n    let c = '{';\r\n}\n";
        let reconstructed: String = lex(input).iter().map(|t| t.text).collect();
        assert_eq!(input, reconstructed);
    }
}
