use std::cell::Cell;
use std::rc::Rc;

use bracketree_engine::{
    BracketPairsModel, BracketPairsOptions, ClassificationState, ClassifiedDocument,
    LanguageConfigurationChange, LineRange, LineTokens, Position, Range, StandardTokenType,
    StaticLanguageConfiguration, TextDocument, TextSource, TreeState,
};
use pretty_assertions::assert_eq;

fn c_model(doc: &dyn TextSource) -> BracketPairsModel {
    BracketPairsModel::new(
        doc,
        Rc::new(StaticLanguageConfiguration::c_like()),
        BracketPairsOptions::default(),
    )
}

fn notifications(model: &mut BracketPairsModel) -> Rc<Cell<u32>> {
    let count = Rc::new(Cell::new(0));
    model.subscribe({
        let count = count.clone();
        move || count.set(count.get() + 1)
    });
    count
}

#[test]
fn pairs_follow_visual_nesting() {
    let doc = TextDocument::new("c", "f(a[0]){if(x){y}}");
    let mut model = c_model(&doc);

    let pairs: Vec<(Range, u32)> = model
        .bracket_pairs_in_range(&doc, doc.full_range(), false)
        .into_iter()
        .map(|pair| (pair.range, pair.nesting_level))
        .collect();

    assert_eq!(
        pairs,
        vec![
            (Range::new(1, 2, 1, 8), 0),
            (Range::new(1, 4, 1, 7), 1),
            (Range::new(1, 8, 1, 18), 0),
            (Range::new(1, 11, 1, 14), 1),
            (Range::new(1, 14, 1, 17), 1),
        ]
    );
}

#[test]
fn lone_closer_is_unexpected() {
    let doc = TextDocument::new("c", ")");
    let mut model = c_model(&doc);

    let brackets = model.brackets_in_range(&doc, doc.full_range());
    assert_eq!(brackets.len(), 1);
    assert!(brackets[0].is_unmatched);
    assert_eq!(brackets[0].family, None);
    assert_eq!(brackets[0].nesting_level, 0);
    assert!(model.bracket_pairs_in_range(&doc, doc.full_range(), true).is_empty());
}

#[test]
fn oversized_documents_are_unsupported() {
    let doc = TextDocument::new("c", &"{[(x)]}\n".repeat(60_000));
    let mut model = c_model(&doc);

    assert!(!model.is_document_supported());
    assert!(model.brackets_in_range(&doc, doc.full_range()).is_empty());
    assert!(model.bracket_pairs_in_range(&doc, doc.full_range(), true).is_empty());
    assert_eq!(model.tree_state(), None);
}

/// `s = "(";` with the quoted part classified as a string.
fn string_tokens(doc: &ClassifiedDocument) -> LineTokens {
    let language = doc.language_id();
    let mut tokens = LineTokens::new();
    tokens.push(4, StandardTokenType::Other, &language);
    tokens.push(7, StandardTokenType::String, &language);
    tokens.push(8, StandardTokenType::Other, &language);
    tokens
}

#[test]
fn classification_completion_hides_brackets_in_strings() {
    let mut doc = ClassifiedDocument::new("c", "s = \"(\";\nf(s);");
    let mut model = c_model(&doc);
    let count = notifications(&mut model);
    let first_line = Range::new(1, 1, 1, 9);

    let before = model.brackets_in_range(&doc, first_line);
    assert_eq!(before.len(), 1);
    assert!(before[0].is_unmatched);
    assert_eq!(model.tree_state(), Some(TreeState::NoTokens));

    let tokens = string_tokens(&doc);
    doc.set_line_tokens(1, tokens);
    let language = doc.language_id();
    doc.set_line_tokens(2, LineTokens::plain(5, &language));
    doc.set_classification_state(ClassificationState::Completed);
    model.handle_classification_state_changed(&doc);

    assert_eq!(count.get(), 1);
    assert_eq!(model.tree_state(), Some(TreeState::TokensAvailable));
    assert!(model.brackets_in_range(&doc, first_line).is_empty());
    assert_eq!(model.bracket_pairs_in_range(&doc, doc.document().full_range(), false).len(), 1);
}

#[test]
fn classification_updates_feed_the_served_tree_once_completed() {
    let mut doc = ClassifiedDocument::new("c", "s = \"(\";\nf(s);");
    doc.set_classification_state(ClassificationState::Completed);
    let mut model = c_model(&doc);
    let count = notifications(&mut model);
    let first_line = Range::new(1, 1, 1, 9);

    assert_eq!(model.brackets_in_range(&doc, first_line).len(), 1);

    let tokens = string_tokens(&doc);
    doc.set_line_tokens(1, tokens);
    model.handle_classification_changed(&doc, &[LineRange::single(1)]);

    assert_eq!(count.get(), 1);
    assert!(model.brackets_in_range(&doc, first_line).is_empty());
}

#[test]
fn in_progress_classification_keeps_serving_the_initial_tree() {
    let mut doc = ClassifiedDocument::new("c", "s = \"(\";\nf(s);");
    doc.set_classification_state(ClassificationState::InProgress);
    let mut model = c_model(&doc);
    let count = notifications(&mut model);
    let first_line = Range::new(1, 1, 1, 9);

    assert_eq!(model.brackets_in_range(&doc, first_line).len(), 1);
    assert_eq!(model.tree_state(), Some(TreeState::InitialOnly));

    let tokens = string_tokens(&doc);
    doc.set_line_tokens(1, tokens);
    model.handle_classification_changed(&doc, &[LineRange::single(1)]);
    assert_eq!(count.get(), 0);
    assert_eq!(model.brackets_in_range(&doc, first_line).len(), 1);

    doc.set_classification_state(ClassificationState::Completed);
    model.handle_classification_state_changed(&doc);
    assert_eq!(count.get(), 1);
    assert!(model.brackets_in_range(&doc, first_line).is_empty());
}

#[test]
fn edits_are_visible_to_the_next_query() {
    let mut doc = TextDocument::new("c", "a(b)\nc[d]\n");
    let mut model = c_model(&doc);
    assert_eq!(model.brackets_in_range(&doc, doc.full_range()).len(), 4);

    let event = doc.replace(Range::new(2, 2, 2, 3), "{").unwrap();
    model.handle_content_changed(&doc, &event).unwrap();

    let brackets = model.brackets_in_range(&doc, Range::new(2, 1, 2, 5));
    let texts: Vec<(&str, bool)> = brackets
        .iter()
        .map(|b| (b.text.as_str(), b.is_unmatched))
        .collect();
    assert_eq!(texts, vec![("{", true), ("]", true)]);
}

#[test]
fn language_switch_rebuilds_with_the_new_brackets() {
    let languages = Rc::new(StaticLanguageConfiguration::with_pairs(&[
        ("c", &[("(", ")")]),
        ("pascal", &[("begin", "end")]),
    ]));
    let mut doc = TextDocument::new("c", "begin f(x) end");
    let mut model = BracketPairsModel::new(&doc, languages, BracketPairsOptions::default());
    let count = notifications(&mut model);

    let texts = |model: &mut BracketPairsModel, doc: &TextDocument| -> Vec<String> {
        model
            .brackets_in_range(doc, doc.full_range())
            .into_iter()
            .map(|b| b.text.to_string())
            .collect()
    };
    assert_eq!(texts(&mut model, &doc), ["(", ")"]);

    doc.set_language("pascal");
    model.handle_language_changed(&doc);
    assert_eq!(count.get(), 1);
    assert_eq!(texts(&mut model, &doc), ["begin", "end"]);

    model.handle_language_configuration_changed(&LanguageConfigurationChange::Language("c".into()));
    assert_eq!(count.get(), 1);
}

#[test]
fn matching_pair_at_the_caret() {
    let doc = TextDocument::new("c", "if (a) {\n    b[0];\n}\n");
    let mut model = c_model(&doc);

    let pair = model.matching_bracket_pair(&doc, Position::new(3, 2)).unwrap();
    assert_eq!(pair.opening_range, Range::new(1, 8, 1, 9));
    assert_eq!(pair.closing_range, Some(Range::new(3, 1, 3, 2)));

    let enclosing = model.enclosing_pair(&doc, Position::new(2, 5)).unwrap();
    assert_eq!(enclosing.opening_range, Range::new(1, 8, 1, 9));

    let with_indent = model.bracket_pairs_in_range(&doc, Range::new(1, 8, 1, 8), true);
    assert_eq!(with_indent.len(), 1);
    assert_eq!(with_indent[0].min_indentation, Some(0));
}
