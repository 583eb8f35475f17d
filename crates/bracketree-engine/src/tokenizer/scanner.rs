use std::rc::Rc;

use super::segments::{ClassifiedSegments, CodeSegment, RawTextSegments, SegmentSource};
use super::{Token, Tokenizer};
use crate::host::{ClassificationSource, TextSource};
use crate::length::Length;
use crate::registry::{BracketRegistry, LanguageBrackets, LanguageId};

/// Line-by-line bracket scanner over a [`SegmentSource`].
///
/// Text between brackets is merged into one text token, across line breaks
/// if needed. When a bracket ends a run of text, the text is returned first
/// and the bracket is kept back for the next read.
pub struct ScanningTokenizer<'a, S> {
    source: S,
    registry: &'a BracketRegistry,
    length: Length,
    line_count: u32,

    /// 0-based index of the loaded line; `line_count` once exhausted.
    line: u32,
    line_text: String,
    line_segments: Vec<CodeSegment>,
    segment_idx: usize,
    column: usize,

    pending: Option<Token>,
    peeked: Option<Token>,
    offset: Length,
    brackets: Option<(LanguageId, Rc<LanguageBrackets>)>,
}

impl<'a, S: SegmentSource> ScanningTokenizer<'a, S> {
    pub fn with_segments(source: S, registry: &'a BracketRegistry) -> Self {
        let line_count = source.line_count().max(1);
        let length = source.document_length();
        let mut tokenizer = Self {
            source,
            registry,
            length,
            line_count,
            line: 0,
            line_text: String::new(),
            line_segments: Vec::new(),
            segment_idx: 0,
            column: 0,
            pending: None,
            peeked: None,
            offset: Length::ZERO,
            brackets: None,
        };
        tokenizer.load_line(0);
        tokenizer
    }

    fn load_line(&mut self, line: u32) {
        self.line = line;
        self.column = 0;
        self.segment_idx = 0;
        if line < self.line_count {
            self.source
                .load_line(line + 1, &mut self.line_text, &mut self.line_segments);
        } else {
            self.line_text.clear();
            self.line_segments.clear();
        }
    }

    fn seek(&mut self, offset: Length) {
        self.pending = None;
        if offset.lines() >= self.line_count {
            self.load_line(self.line_count);
            return;
        }
        if offset.lines() != self.line || self.column > offset.columns() as usize {
            self.load_line(offset.lines());
        }
        self.column = (offset.columns() as usize).min(self.line_text.len());
    }

    fn brackets_for(&mut self, language: &LanguageId) -> Rc<LanguageBrackets> {
        if let Some((cached, brackets)) = &self.brackets {
            if cached == language {
                return brackets.clone();
            }
        }
        let brackets = self.registry.brackets_for_language(language);
        self.brackets = Some((language.clone(), brackets.clone()));
        brackets
    }

    /// Next bracket at or after the current column of the loaded line.
    fn find_bracket(&mut self) -> Option<(usize, usize, Token)> {
        while let Some(segment) = self.line_segments.get(self.segment_idx) {
            if segment.end <= self.column {
                self.segment_idx += 1;
                continue;
            }
            let from = self.column.max(segment.start);
            let to = segment.end;
            let language = segment.language.clone();
            let brackets = self.brackets_for(&language);
            if let Some(found) = brackets.find(&self.line_text, from, to) {
                return Some(found);
            }
            self.segment_idx += 1;
        }
        None
    }

    fn scan(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }

        let mut text = Length::ZERO;
        while self.line < self.line_count {
            if let Some((start, end, bracket)) = self.find_bracket() {
                text += Length::new(0, (start - self.column) as u32);
                self.column = end;
                if text.is_zero() {
                    return Some(bracket);
                }
                self.pending = Some(bracket);
                return Some(Token::text(text));
            }

            let rest = self.line_text.len() - self.column.min(self.line_text.len());
            text += Length::new(0, rest as u32);
            if self.line + 1 < self.line_count {
                text += Length::new(1, 0);
            }
            self.load_line(self.line + 1);
        }

        (!text.is_zero()).then(|| Token::text(text))
    }
}

impl<'a, D: TextSource + ?Sized> ScanningTokenizer<'a, RawTextSegments<'a, D>> {
    pub fn new(document: &'a D, registry: &'a BracketRegistry) -> Self {
        Self::with_segments(RawTextSegments::new(document), registry)
    }
}

impl<'a, D> ScanningTokenizer<'a, ClassifiedSegments<'a, D>>
where
    D: TextSource + ClassificationSource + ?Sized,
{
    pub fn new(document: &'a D, registry: &'a BracketRegistry) -> Self {
        Self::with_segments(ClassifiedSegments::new(document), registry)
    }
}

impl<S: SegmentSource> Tokenizer for ScanningTokenizer<'_, S> {
    fn offset(&self) -> Length {
        self.offset
    }

    fn length(&self) -> Length {
        self.length
    }

    fn peek(&mut self) -> Option<&Token> {
        if self.peeked.is_none() {
            self.peeked = self.scan();
        }
        self.peeked.as_ref()
    }

    fn read(&mut self) -> Option<Token> {
        let token = match self.peeked.take() {
            Some(token) => Some(token),
            None => self.scan(),
        };
        if let Some(token) = &token {
            self.offset += token.length;
        }
        token
    }

    fn skip(&mut self, length: Length) {
        self.peeked = None;
        self.offset += length;
        self.seek(self.offset);
    }
}
