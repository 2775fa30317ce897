//! End-to-end behaviour of the live engine: open, edit, observe decorations.

use deflist_engine::editing::{Applied, RescanReason};
use deflist_engine::{LineKind, LineTableOracle, LiveEngine, Span, Style};
use pretty_assertions::assert_eq;
use rstest::rstest;
use xi_rope::Rope;

fn list_rule(text: &str) -> LineKind {
    if text.starts_with("- ") {
        LineKind::ListItem
    } else {
        LineKind::Normal
    }
}

fn open(text: &str) -> LiveEngine<LineTableOracle> {
    let oracle = LineTableOracle::with_rule(&Rope::from(text), list_rule);
    LiveEngine::open(text, oracle)
}

fn styled(engine: &LiveEngine<LineTableOracle>) -> Vec<(usize, Style, Span)> {
    engine
        .decorations()
        .iter()
        .map(|d| (d.line, d.style, d.range))
        .collect()
}

const GLOSSARY: &str = "ice\n:   frozen water\nsnow\n:   frozen flakes";

#[test]
fn term_growing_past_the_limit_loses_its_style() {
    let mut engine = open("ice\n:   frozen water");
    let report = engine.apply_edit(3..3, &"x".repeat(98)).unwrap();

    assert_eq!(report.applied, Applied::Patched { lines: vec![1] });
    assert_eq!(
        styled(&engine),
        vec![
            (2, Style::Marker, Span::new(102, 106)),
            (2, Style::Definition, Span::new(106, 118)),
        ]
    );
}

#[test]
fn term_shrinking_back_under_the_limit_is_styled_again() {
    let long = "t".repeat(101);
    let mut engine = open(&format!("{long}\n:   def"));
    assert!(engine.decorations().for_line(1).is_empty());

    engine.apply_edit(0..1, "").unwrap();
    assert_eq!(styled(&engine)[0], (1, Style::Term, Span::new(0, 100)));
}

#[test]
fn typing_inside_a_definition_only_shifts_decorations() {
    let mut engine = open(GLOSSARY);
    let report = engine.apply_edit(8..8, "very ").unwrap();

    assert!(!report.rescanned());
    assert_eq!(report.applied, Applied::NoOp);

    let fresh = open(&engine.text());
    assert_eq!(engine.decorations(), fresh.decorations());
    assert_eq!(engine.blocks(), fresh.blocks());
}

#[test]
fn rescanning_twice_changes_nothing() {
    let mut engine = open("# not special here\nice\n:   frozen\n\n- a\n- b\n:   c\n");
    engine.rescan();
    let (blocks, decorations) = (engine.blocks().to_vec(), engine.decorations().clone());
    engine.rescan();
    assert_eq!(engine.blocks(), blocks.as_slice());
    assert_eq!(engine.decorations(), &decorations);
}

#[rstest]
#[case::new_line(GLOSSARY, 3..3, "\n", RescanReason::LineCountChanged)]
#[case::blank_line_filled(
    "ice\n:   frozen\n\nsnow\n:   x",
    15..15,
    "a",
    RescanReason::BlanknessChanged
)]
#[case::last_marker_removed("ice\n:   frozen", 4..5, "", RescanReason::MarkerSetEmptied)]
#[case::first_marker_added("ice\nfrozen", 4..4, ":   ", RescanReason::FirstMarkerAdded)]
#[case::header_opened(GLOSSARY, 0..0, "# ", RescanReason::SpecialPatternChanged)]
#[case::across_lines("ice\n:   frozen", 2..5, "E\n:", RescanReason::MultiLineChange)]
fn structural_edits_rescan(
    #[case] text: &str,
    #[case] range: std::ops::Range<usize>,
    #[case] insert: &str,
    #[case] reason: RescanReason,
) {
    let mut engine = open(text);
    let report = engine.apply_edit(range, insert).unwrap();
    assert_eq!(report.applied, Applied::Rescanned(reason));

    let fresh = open(&engine.text());
    assert_eq!(engine.decorations(), fresh.decorations());
}

#[test]
fn marker_added_to_a_definition_list_is_patched_locally() {
    let mut engine = open(GLOSSARY);
    // line 3 ("snow") starts at 21
    let report = engine.apply_edit(21..21, ":   ").unwrap();

    assert_eq!(report.applied, Applied::Patched { lines: vec![3] });
    let line3: Vec<Style> = engine.decorations().for_line(3).iter().map(|d| d.style).collect();
    assert_eq!(line3, vec![Style::Marker, Style::Definition]);
    assert_eq!(engine.decorations().for_line(1)[0].style, Style::Term);
}

#[test]
fn marker_removed_from_a_definition_list_is_patched_locally() {
    let mut engine = open(GLOSSARY);
    // line 4 (":   frozen flakes") starts at 26
    let report = engine.apply_edit(26..27, "").unwrap();

    assert_eq!(report.applied, Applied::Patched { lines: vec![4] });
    assert_eq!(engine.decorations().for_line(4)[0].style, Style::Term);
}

#[test]
fn list_item_toggle_switches_the_line_style() {
    let mut engine = open("ice\n:   frozen\nsnow");
    let report = engine.apply_edit(15..15, "- ").unwrap();

    assert_eq!(report.applied, Applied::Patched { lines: vec![3] });
    assert_eq!(
        engine.decorations().for_line(3)[0].style,
        Style::DefinitionListItem
    );

    engine.apply_edit(15..17, "").unwrap();
    assert_eq!(engine.decorations().for_line(3)[0].style, Style::Term);
}

#[test]
fn scrolling_rescans_only_the_visible_lines() {
    let text = "a\n:   b\n\nc\n:   d\n\ne\n:   f";
    let mut engine = open(text);
    assert_eq!(engine.decorations().len(), 9);

    // "e" starts at 18
    let report = engine.set_viewport([Span::new(18, text.len())]);
    assert_eq!(report.applied, Applied::Rescanned(RescanReason::Viewport));
    let lines: Vec<usize> = engine.decorations().iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![7, 8, 8]);
}

#[test]
fn engines_do_not_share_state() {
    let mut first = open(GLOSSARY);
    let second = open(GLOSSARY);
    first.apply_edit(0..3, "").unwrap();

    assert_ne!(first.decorations(), second.decorations());
    assert_eq!(second.version(), 0);
}

#[test]
fn tree_sitter_oracle_keeps_code_out_of_definition_lists() {
    let engine =
        LiveEngine::from_bytes(b"intro\n:   def\n\n```\nterm\n:   not\n```\n").unwrap();
    let lines: Vec<usize> = engine.decorations().iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 2, 2]);
}

#[test]
fn list_item_typed_above_a_lazy_line_restyles_both() {
    let mut engine = LiveEngine::from_bytes(b"ice\n:   def\nx\nsnow\n:   flakes").unwrap();
    // line 3 ("x") starts at 12
    engine.apply_edit(12..12, "- ").unwrap();
    assert_eq!(
        engine.decorations().for_line(4)[0].style,
        Style::DefinitionListItem
    );

    let fresh = LiveEngine::from_bytes(engine.text().as_bytes()).unwrap();
    assert_eq!(engine.blocks(), fresh.blocks());
    assert_eq!(engine.decorations(), fresh.decorations());
}

#[test]
fn invalid_utf8_is_rejected() {
    assert!(LiveEngine::from_bytes(&[0xff, 0xfe]).is_err());
}
