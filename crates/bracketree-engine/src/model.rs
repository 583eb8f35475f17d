//! # Bracket Pairs Model
//!
//! The per-document entry point. [`BracketPairsModel`] builds its
//! [`BracketPairsTree`] on the first query, keeps it current through the
//! host's change handlers and answers range queries from it.
//!
//! ## Notifications
//!
//! Subscribers are notified whenever a later query could answer differently
//! than an identical earlier one:
//!
//! - an edit or classification update changed the served tree;
//! - classification completed and the initial tree was dropped;
//! - the language, the options or the bracket configuration changed;
//! - the document crossed the size limit in either direction.
//!
//! Nothing is sent until brackets have been requested at least once, and the
//! lazy first build itself is silent.
//!
//! ## Size limit
//!
//! Documents over [`MAX_SUPPORTED_LINES`] lines or [`MAX_SUPPORTED_BYTES`]
//! bytes get no tree. Queries on them return nothing.

use std::rc::Rc;

use crate::error::EditError;
use crate::host::{
    ClassificationSource, ContentChangeEvent, LanguageConfigurationChange,
    LanguageConfigurationSource, TextSource,
};
use crate::notify::{ChangeNotifier, SubscriptionId};
use crate::parser::EditBatch;
use crate::position::{LineRange, Position, Range};
use crate::query::{self, BracketInfo, BracketPairInfo};
use crate::registry::{BracketRegistry, LanguageId};
use crate::tree::{BracketPairsTree, TreeState};

pub const MAX_SUPPORTED_LINES: u32 = 50_000;
pub const MAX_SUPPORTED_BYTES: usize = 50_000 * 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketPairsOptions {
    /// Visible width of a tab when computing indentation.
    pub tab_size: u32,
}

impl Default for BracketPairsOptions {
    fn default() -> Self {
        Self { tab_size: 4 }
    }
}

pub fn is_document_supported<D: TextSource + ?Sized>(document: &D) -> bool {
    document.line_count() <= MAX_SUPPORTED_LINES && document.value_length() <= MAX_SUPPORTED_BYTES
}

pub struct BracketPairsModel {
    registry: BracketRegistry,
    options: BracketPairsOptions,
    language: LanguageId,
    supported: bool,
    brackets_requested: bool,
    tree: Option<BracketPairsTree>,
    notifier: ChangeNotifier,
}

impl BracketPairsModel {
    pub fn new<D: TextSource + ?Sized>(
        document: &D,
        languages: Rc<dyn LanguageConfigurationSource>,
        options: BracketPairsOptions,
    ) -> Self {
        Self::with_registry(document, BracketRegistry::new(languages), options)
    }

    pub fn with_registry<D: TextSource + ?Sized>(
        document: &D,
        registry: BracketRegistry,
        options: BracketPairsOptions,
    ) -> Self {
        let supported = is_document_supported(document);
        if !supported {
            log::debug!(
                "document with {} lines is too large for bracket pairs",
                document.line_count()
            );
        }
        Self {
            registry,
            options,
            language: document.language_id(),
            supported,
            brackets_requested: false,
            tree: None,
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn options(&self) -> BracketPairsOptions {
        self.options
    }

    pub fn registry(&self) -> &BracketRegistry {
        &self.registry
    }

    pub fn is_document_supported(&self) -> bool {
        self.supported
    }

    /// State of the tree, or `None` while none is built.
    pub fn tree_state(&self) -> Option<TreeState> {
        self.tree.as_ref().map(BracketPairsTree::state)
    }

    pub fn tree(&self) -> Option<&BracketPairsTree> {
        self.tree.as_ref()
    }

    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) -> SubscriptionId {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Applies a host edit. `document` must already contain the new text.
    ///
    /// On an invalid batch the tree is dropped and rebuilt on the next query.
    pub fn handle_content_changed<D>(
        &mut self,
        document: &D,
        event: &ContentChangeEvent,
    ) -> Result<(), EditError>
    where
        D: TextSource + ClassificationSource + ?Sized,
    {
        if self.update_support(document) {
            return Ok(());
        }
        let edits = match EditBatch::from_content_changes(event) {
            Ok(edits) => edits,
            Err(err) => {
                self.reset();
                return Err(err);
            }
        };
        if let Some(tree) = self.tree.as_mut() {
            tree.handle_content_changed(document, &self.registry, &edits);
            self.notifier.fire();
        }
        Ok(())
    }

    pub fn handle_classification_state_changed<D>(&mut self, document: &D)
    where
        D: TextSource + ClassificationSource + ?Sized,
    {
        let changed = self
            .tree
            .as_mut()
            .is_some_and(|tree| tree.handle_classification_state_changed(document, &self.registry));
        if changed {
            self.notifier.fire();
        }
    }

    /// The classification of `ranges` changed without a text change.
    pub fn handle_classification_changed<D>(&mut self, document: &D, ranges: &[LineRange])
    where
        D: TextSource + ClassificationSource + ?Sized,
    {
        let registry = &self.registry;
        let changed = self
            .tree
            .as_mut()
            .is_some_and(|tree| tree.handle_classification_changed(document, registry, ranges));
        if changed {
            self.notifier.fire();
        }
    }

    pub fn handle_language_changed<D: TextSource + ?Sized>(&mut self, document: &D) {
        self.language = document.language_id();
        log::debug!("document language changed to {}", self.language);
        // Forget which languages the old tree used.
        self.registry.on_all_languages_changed();
        self.reset();
    }

    pub fn handle_options_changed(&mut self, options: BracketPairsOptions) {
        if options == self.options {
            return;
        }
        self.options = options;
        self.reset();
    }

    pub fn handle_language_configuration_changed(&mut self, change: &LanguageConfigurationChange) {
        match change {
            LanguageConfigurationChange::All => {
                self.registry.on_all_languages_changed();
                self.reset();
            }
            LanguageConfigurationChange::Language(language) => {
                // An embedded language counts as used once it was compiled.
                let used = self.registry.on_language_brackets_changed(language);
                if used || *language == self.language {
                    self.reset();
                }
            }
        }
    }

    pub fn brackets_in_range<D>(&mut self, document: &D, range: Range) -> Vec<BracketInfo>
    where
        D: TextSource + ClassificationSource + ?Sized,
    {
        match self.served_tree(document) {
            Some(tree) => query::brackets_in_range(tree.root(), document.length(), range),
            None => Vec::new(),
        }
    }

    pub fn bracket_pairs_in_range<D>(
        &mut self,
        document: &D,
        range: Range,
        include_min_indentation: bool,
    ) -> Vec<BracketPairInfo>
    where
        D: TextSource + ClassificationSource + ?Sized,
    {
        let tab_size = self.options.tab_size;
        match self.served_tree(document) {
            Some(tree) => query::bracket_pairs_in_range(
                tree.root(),
                document,
                range,
                include_min_indentation,
                tab_size,
            ),
            None => Vec::new(),
        }
    }

    pub fn matching_bracket_pair<D>(
        &mut self,
        document: &D,
        position: Position,
    ) -> Option<BracketPairInfo>
    where
        D: TextSource + ClassificationSource + ?Sized,
    {
        let tree = self.served_tree(document)?;
        query::matching_bracket_pair(tree.root(), document, position)
    }

    pub fn enclosing_pair<D>(&mut self, document: &D, position: Position) -> Option<BracketPairInfo>
    where
        D: TextSource + ClassificationSource + ?Sized,
    {
        let tree = self.served_tree(document)?;
        query::enclosing_pair(tree.root(), document, position)
    }

    fn served_tree<D>(&mut self, document: &D) -> Option<&BracketPairsTree>
    where
        D: TextSource + ClassificationSource + ?Sized,
    {
        if !self.supported {
            return None;
        }
        self.brackets_requested = true;
        let registry = &self.registry;
        Some(
            self.tree
                .get_or_insert_with(|| BracketPairsTree::new(document, registry)),
        )
    }

    /// Re-evaluates the size limit. Returns whether support flipped.
    fn update_support<D: TextSource + ?Sized>(&mut self, document: &D) -> bool {
        let supported = is_document_supported(document);
        if supported == self.supported {
            return false;
        }
        log::debug!(
            "bracket pairs {} for {} lines",
            if supported { "enabled" } else { "disabled" },
            document.line_count()
        );
        self.supported = supported;
        self.tree = None;
        if self.brackets_requested {
            self.notifier.fire();
        }
        true
    }

    /// Drops the tree; the next query rebuilds it.
    fn reset(&mut self) {
        if self.tree.take().is_some() {
            log::debug!("dropped bracket tree");
        }
        if self.brackets_requested && self.supported {
            self.notifier.fire();
        }
    }
}
