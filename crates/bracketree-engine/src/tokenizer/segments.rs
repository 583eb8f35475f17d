use crate::host::{ClassificationSource, StandardTokenType, TextSource};
use crate::length::Length;
use crate::registry::LanguageId;

/// A byte range of a line to search for brackets, with the language whose
/// bracket set applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSegment {
    pub start: usize,
    pub end: usize,
    pub language: LanguageId,
}

/// Supplies lines and their searchable segments to the scanner.
pub trait SegmentSource {
    fn line_count(&self) -> u32;

    fn document_length(&self) -> Length;

    /// Replaces `text` with the content of a 1-based line and `segments` with
    /// its code segments in ascending order.
    fn load_line(&self, line_number: u32, text: &mut String, segments: &mut Vec<CodeSegment>);
}

/// Every line is one code segment in the document language.
pub struct RawTextSegments<'a, D: ?Sized> {
    document: &'a D,
    language: LanguageId,
}

impl<'a, D: TextSource + ?Sized> RawTextSegments<'a, D> {
    pub fn new(document: &'a D) -> Self {
        Self {
            language: document.language_id(),
            document,
        }
    }
}

impl<D: TextSource + ?Sized> SegmentSource for RawTextSegments<'_, D> {
    fn line_count(&self) -> u32 {
        self.document.line_count()
    }

    fn document_length(&self) -> Length {
        self.document.length()
    }

    fn load_line(&self, line_number: u32, text: &mut String, segments: &mut Vec<CodeSegment>) {
        text.clear();
        text.push_str(&self.document.line_content(line_number));
        segments.clear();
        segments.push(CodeSegment {
            start: 0,
            end: text.len(),
            language: self.language.clone(),
        });
    }
}

/// Only spans classified as [`StandardTokenType::Other`] are searched.
///
/// Adjacent code spans of the same language are merged so multi-character
/// brackets split across classifier spans are still found.
pub struct ClassifiedSegments<'a, D: ?Sized> {
    document: &'a D,
    language: LanguageId,
}

impl<'a, D: TextSource + ClassificationSource + ?Sized> ClassifiedSegments<'a, D> {
    pub fn new(document: &'a D) -> Self {
        Self {
            language: document.language_id(),
            document,
        }
    }
}

impl<D: TextSource + ClassificationSource + ?Sized> SegmentSource for ClassifiedSegments<'_, D> {
    fn line_count(&self) -> u32 {
        self.document.line_count()
    }

    fn document_length(&self) -> Length {
        self.document.length()
    }

    fn load_line(&self, line_number: u32, text: &mut String, segments: &mut Vec<CodeSegment>) {
        text.clear();
        text.push_str(&self.document.line_content(line_number));
        segments.clear();

        let Some(tokens) = self.document.line_tokens(line_number) else {
            push_code(segments, 0, text.len(), &self.language);
            return;
        };

        let mut start = 0;
        for span in tokens.spans() {
            let end = (span.end as usize).min(text.len());
            if end <= start {
                continue;
            }
            if span.token_type == StandardTokenType::Other {
                push_code(segments, start, end, &span.language);
            }
            start = end;
        }
        if start < text.len() {
            push_code(segments, start, text.len(), &self.language);
        }
    }
}

fn push_code(segments: &mut Vec<CodeSegment>, start: usize, end: usize, language: &LanguageId) {
    if let Some(last) = segments.last_mut() {
        if last.end == start && &last.language == language {
            last.end = end;
            return;
        }
    }
    segments.push(CodeSegment {
        start,
        end,
        language: language.clone(),
    });
}
