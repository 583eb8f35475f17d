//! # Bracket Registry
//!
//! Turns per-language bracket pair definitions into the id space the parser
//! matches on.
//!
//! ## Families
//!
//! Every distinct `(language, opening text)` gets a dense [`FamilyId`] from a
//! process-wide [`DenseIdTable`]. Ids are permanent and compared by value, so a
//! `(` opened inside an embedded language can only be closed by a closer whose
//! family set contains that exact id.
//!
//! A closing text maps to the *set* of families it closes. Most languages have
//! one family per closer, but configurations such as `begin`/`end` and
//! `case`/`end` share a closer between families.
//!
//! ## Caching
//!
//! [`BracketRegistry`] compiles a [`LanguageBrackets`] (bracket regex plus
//! token templates) on first use of a language and caches it until the host
//! reports that the language's configuration changed.

mod dense_ids;
mod id_set;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use regex::Regex;
use smol_str::SmolStr;

pub use dense_ids::DenseIdTable;
pub use id_set::BracketIdSet;

use crate::ast::{AstNode, BracketNode};
use crate::host::{BracketPair, LanguageConfigurationSource};
use crate::length::Length;
use crate::tokenizer::{Token, TokenKind};

/// Language identifier as reported by the host document.
pub type LanguageId = SmolStr;

/// Interned identity of an opening bracket text within a language.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FamilyId(u32);

impl FamilyId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One configured bracket pair with its interned family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketEntry {
    pub open: SmolStr,
    pub close: SmolStr,
    pub family: FamilyId,
}

/// What the tokenizer emits when it matches a bracket text.
#[derive(Debug, Clone)]
struct BracketTemplate {
    length: Length,
    kind: TemplateKind,
    node: Rc<AstNode>,
}

#[derive(Debug, Clone)]
enum TemplateKind {
    Opening(FamilyId),
    Closing(FamilyId, BracketIdSet),
}

impl BracketTemplate {
    fn token(&self) -> Token {
        let kind = match &self.kind {
            TemplateKind::Opening(family) => TokenKind::OpeningBracket {
                family: *family,
                node: self.node.clone(),
            },
            TemplateKind::Closing(family, closes) => TokenKind::ClosingBracket {
                family: *family,
                closes: closes.clone(),
                node: self.node.clone(),
            },
        };
        Token {
            length: self.length,
            kind,
        }
    }
}

/// The compiled bracket set of a single language.
pub struct LanguageBrackets {
    language: LanguageId,
    entries: Vec<BracketEntry>,
    templates: HashMap<SmolStr, BracketTemplate>,
    pattern: Option<Regex>,
}

impl LanguageBrackets {
    pub fn new(language: &str, pairs: &[BracketPair], ids: &DenseIdTable) -> Self {
        let language = LanguageId::new(language);
        let mut entries: Vec<BracketEntry> = Vec::new();
        let mut closers: Vec<(SmolStr, FamilyId, BracketIdSet)> = Vec::new();

        for pair in pairs {
            if pair.open.is_empty() || pair.close.is_empty() {
                log::warn!(
                    "ignoring bracket pair {:?}/{:?} for {language}: empty text",
                    pair.open,
                    pair.close
                );
                continue;
            }
            let family = ids.intern(&language, &pair.open);
            if entries
                .iter()
                .any(|e| e.open == pair.open && e.close == pair.close)
            {
                continue;
            }
            entries.push(BracketEntry {
                open: SmolStr::new(&pair.open),
                close: SmolStr::new(&pair.close),
                family,
            });
            match closers.iter_mut().find(|(text, ..)| text == pair.close.as_str()) {
                Some((_, _, closes)) => *closes = closes.with(family),
                None => closers.push((
                    SmolStr::new(&pair.close),
                    family,
                    BracketIdSet::single(family),
                )),
            }
        }

        let mut templates = HashMap::new();
        for entry in &entries {
            let opens = BracketIdSet::single(entry.family);
            let kind = TemplateKind::Opening(entry.family);
            templates.insert(
                entry.open.clone(),
                template(&language, &entry.open, entry.family, opens, kind),
            );
        }
        // A text that both opens and closes is treated as a closer.
        for (text, family, closes) in closers {
            let kind = TemplateKind::Closing(family, closes.clone());
            templates.insert(text.clone(), template(&language, &text, family, closes, kind));
        }

        let pattern = compile_pattern(templates.keys().map(SmolStr::as_str));
        Self {
            language,
            entries,
            templates,
            pattern,
        }
    }

    pub fn language(&self) -> &LanguageId {
        &self.language
    }

    /// The `(open, close, family)` triples in configuration order.
    pub fn pairs(&self) -> &[BracketEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the first bracket in `line[from..to]`.
    ///
    /// Returns the byte range of the match and the token it produces.
    pub fn find(&self, line: &str, from: usize, to: usize) -> Option<(usize, usize, Token)> {
        let pattern = self.pattern.as_ref()?;
        if from >= to {
            return None;
        }
        let haystack = line.get(..to)?;
        let found = pattern.find_at(haystack, from)?;
        let template = self.templates.get(found.as_str())?;
        Some((found.start(), found.end(), template.token()))
    }
}

impl fmt::Debug for LanguageBrackets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageBrackets")
            .field("language", &self.language)
            .field("entries", &self.entries)
            .finish()
    }
}

fn template(
    language: &LanguageId,
    text: &SmolStr,
    family: FamilyId,
    closes: BracketIdSet,
    kind: TemplateKind,
) -> BracketTemplate {
    let length = Length::of_str(text);
    let node = Rc::new(AstNode::Bracket(BracketNode {
        length,
        family,
        closes,
        text: text.clone(),
        language: language.clone(),
    }));
    BracketTemplate { length, kind, node }
}

/// Longest texts first so `begin` wins over `b`; word-like edges get `\b`
/// so `end` does not match inside `append`.
fn compile_pattern<'a>(texts: impl Iterator<Item = &'a str>) -> Option<Regex> {
    let mut texts: Vec<&str> = texts.collect();
    if texts.is_empty() {
        return None;
    }
    texts.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let alternatives: Vec<String> = texts
        .iter()
        .map(|text| {
            let starts_word = text.chars().next().is_some_and(is_word_char);
            let ends_word = text.chars().last().is_some_and(is_word_char);
            format!(
                "{}{}{}",
                if starts_word { r"\b" } else { "" },
                regex::escape(text),
                if ends_word { r"\b" } else { "" }
            )
        })
        .collect();

    match Regex::new(&alternatives.join("|")) {
        Ok(regex) => Some(regex),
        Err(err) => {
            log::warn!("failed to compile bracket pattern: {err}");
            None
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Caches compiled bracket sets per language over a configuration source.
pub struct BracketRegistry {
    source: Rc<dyn LanguageConfigurationSource>,
    ids: &'static DenseIdTable,
    cache: RefCell<HashMap<LanguageId, Rc<LanguageBrackets>>>,
}

impl BracketRegistry {
    pub fn new(source: Rc<dyn LanguageConfigurationSource>) -> Self {
        Self::with_id_table(source, DenseIdTable::global())
    }

    pub fn with_id_table(
        source: Rc<dyn LanguageConfigurationSource>,
        ids: &'static DenseIdTable,
    ) -> Self {
        Self {
            source,
            ids,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Family of `pair` in `language`. Families are keyed by the opening
    /// text, so pairs sharing an opener share a family.
    pub fn intern_id(&self, language: &str, pair: &BracketPair) -> FamilyId {
        self.ids.intern(language, &pair.open)
    }

    pub fn brackets_for_language(&self, language: &str) -> Rc<LanguageBrackets> {
        if let Some(cached) = self.cache.borrow().get(language) {
            return cached.clone();
        }
        let pairs = self.source.bracket_pairs(language);
        let brackets = Rc::new(LanguageBrackets::new(language, &pairs, self.ids));
        log::debug!(
            "compiled {} bracket pairs for {language}",
            brackets.pairs().len()
        );
        self.cache
            .borrow_mut()
            .insert(LanguageId::new(language), brackets.clone());
        brackets
    }

    /// Whether `language` has been compiled since the last invalidation.
    pub fn is_cached(&self, language: &str) -> bool {
        self.cache.borrow().contains_key(language)
    }

    /// Drops the cached bracket set of one language. Returns whether it was cached.
    pub fn on_language_brackets_changed(&self, language: &str) -> bool {
        self.cache.borrow_mut().remove(language).is_some()
    }

    pub fn on_all_languages_changed(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn id_table(&self) -> &'static DenseIdTable {
        self.ids
    }
}
