//! Integration tests for the parsing module.
//!
//! Fixtures (.md) live in `fixtures/` and are scanned with the tree-sitter
//! oracle; the lettered scenarios use a hand-written kind table so they do not
//! depend on the grammar.

mod normalize;

use pretty_assertions::assert_eq;
use xi_rope::Rope;

use crate::parsing::{
    blocks::LineRole,
    line_roles,
    oracle::{LineKind, LineTableOracle, TreeSitterOracle},
    scan_document, scan_ranges,
};

use LineKind::*;

fn fixture(name: &str) -> Rope {
    let path = format!(
        "{}/src/parsing/tests/fixtures/{name}.md",
        env!("CARGO_MANIFEST_DIR")
    );
    let md = std::fs::read_to_string(path).unwrap();
    Rope::from(md.as_str())
}

fn scan_with_table(text: &str, kinds: &[LineKind]) -> (Rope, Vec<crate::parsing::blocks::Block>) {
    let rope = Rope::from(text);
    let oracle = LineTableOracle::from_kinds(&rope, kinds);
    let blocks = scan_document(&rope, &oracle);
    invariants::check(&blocks);
    (rope, blocks)
}

// Fixture-based tests

#[test]
fn fixture_glossary() {
    let rope = fixture("glossary");
    let oracle = TreeSitterOracle::from_rope(&rope).unwrap();
    let blocks = scan_document(&rope, &oracle);
    invariants::check(&blocks);

    assert_eq!(
        normalize::block_shapes(&blocks),
        vec!["1..=1 special", "2..=6 prose dl", "7..=8 prose", "9..=9 prose"]
    );
    assert_eq!(
        normalize::roles(&rope, &blocks),
        vec![
            "- | # Glossary",
            "- | ",
            "term | cryosphere",
            "definition | :   the frozen part of the Earth's surface",
            "term | ice shelf",
            "definition | :   ice that has slid off the land onto the sea",
            "- | ",
            "- | Plain paragraph without markers.",
            "- | ",
        ]
    );
}

#[test]
fn fixture_mixed_regions() {
    let rope = fixture("mixed_regions");
    let oracle = TreeSitterOracle::from_rope(&rope).unwrap();
    let blocks = scan_document(&rope, &oracle);
    invariants::check(&blocks);

    assert_eq!(
        normalize::block_shapes(&blocks),
        vec![
            "1..=2 prose dl",
            "3..=5 special",
            "6..=6 prose dl",
            "7..=7 prose",
            "8..=10 special",
            "11..=15 prose dl",
            "16..=16 prose",
        ]
    );
    assert_eq!(
        normalize::roles(&rope, &blocks),
        vec![
            "term | half-life",
            "definition | :   the time it takes to decay, goes as",
            "- | $$",
            "- | C(t)=C_0/2^{t/T}",
            "- | $$",
            "definition | :   with T the half-life.",
            "- | ",
            "- | ```text",
            "- | :   not a definition",
            "- | ```",
            "- | ",
            "term | layers",
            "definition | :   the parts of a soil profile",
            "list-item | - topsoil",
            "list-item | - subsoil",
            "- | ",
        ]
    );
}

// Lettered scenarios

#[test]
fn scenario_a_terms_and_definitions_alternate() {
    let (rope, blocks) = scan_with_table(
        "cryosphere\n:   the frozen part...\nice shelf\n:   ice that has slid...",
        &[],
    );
    assert_eq!(
        normalize::roles(&rope, &blocks),
        vec![
            "term | cryosphere",
            "definition | :   the frozen part...",
            "term | ice shelf",
            "definition | :   ice that has slid...",
        ]
    );
}

#[test]
fn scenario_b_lone_definition_is_a_definition_list() {
    let (rope, blocks) = scan_with_table(":   a definition on its own", &[]);
    assert_eq!(normalize::block_shapes(&blocks), vec!["1..=1 prose dl"]);
    assert_eq!(
        normalize::roles(&rope, &blocks),
        vec!["definition | :   a definition on its own"]
    );
}

#[test]
fn scenario_c_formula_splits_the_list() {
    let (rope, blocks) = scan_with_table(
        "half-life\n:   ... goes as\n$$\nC(t)=C_0/2^{t/T}\n$$\n:   with T the half-life.",
        &[Normal, Normal, BlockStart, BlockInner, BlockEnd, Normal],
    );
    assert_eq!(
        normalize::block_shapes(&blocks),
        vec!["1..=2 prose dl", "3..=5 special", "6..=6 prose dl"]
    );
    assert_eq!(
        normalize::roles(&rope, &blocks),
        vec![
            "term | half-life",
            "definition | :   ... goes as",
            "- | $$",
            "- | C(t)=C_0/2^{t/T}",
            "- | $$",
            "definition | :   with T the half-life.",
        ]
    );
}

#[test]
fn over_long_line_is_unstyled_but_keeps_neighbours() {
    let long = "x".repeat(101);
    let text = format!("{long}\n:   def\nshort");
    let (rope, blocks) = scan_with_table(&text, &[]);
    assert_eq!(
        normalize::roles(&rope, &blocks),
        vec![
            format!("- | {long}"),
            "definition | :   def".to_string(),
            "term | short".to_string(),
        ]
    );
}

#[test]
fn block_without_marker_is_plain_prose() {
    let (rope, blocks) = scan_with_table("alpha\n- one\n- two", &[Normal, ListItem, ListItem]);
    assert_eq!(normalize::block_shapes(&blocks), vec!["1..=3 prose"]);
    assert!(normalize::roles(&rope, &blocks).iter().all(|r| r.starts_with("- |")));
}

#[test]
fn consecutive_terms_are_independent() {
    let (rope, blocks) = scan_with_table("glacier\nice sheet\n:   large ice mass", &[]);
    assert_eq!(
        normalize::roles(&rope, &blocks),
        vec![
            "term | glacier",
            "term | ice sheet",
            "definition | :   large ice mass",
        ]
    );
}

// Invariant tests

#[test]
fn empty_document_is_one_block() {
    let (_, blocks) = scan_with_table("", &[]);
    assert_eq!(normalize::block_shapes(&blocks), vec!["1..=1 prose"]);
}

#[test]
fn rescanning_is_idempotent() {
    let rope = fixture("mixed_regions");
    let oracle = TreeSitterOracle::from_rope(&rope).unwrap();
    let first = scan_document(&rope, &oracle);
    let second = scan_document(&rope, &oracle);
    assert_eq!(first, second);
}

#[test]
fn disjoint_ranges_match_full_scan_inside_a_fence() {
    let rope = Rope::from("```\na\nb\nc\nd\n```\nterm\n:   def");
    let oracle = TreeSitterOracle::from_rope(&rope).unwrap();

    let full = scan_document(&rope, &oracle);
    let split = scan_ranges(&rope, &oracle, &[1..=2, 5..=8]);
    invariants::check(&split);

    assert_eq!(normalize::block_shapes(&full), vec!["1..=6 special", "7..=8 prose dl"]);
    assert_eq!(normalize::block_shapes(&split), vec!["1..=6 special", "7..=8 prose dl"]);
}

/// Roles of the lines in `ranges`, once from a full scan and once from
/// scanning only those ranges.
fn roles_full_and_split<O: crate::parsing::oracle::Oracle>(
    rope: &Rope,
    oracle: &O,
    ranges: &[std::ops::RangeInclusive<usize>],
) -> (Vec<(usize, Option<LineRole>)>, Vec<(usize, Option<LineRole>)>) {
    let full = scan_document(rope, oracle);
    let split = scan_ranges(rope, oracle, ranges);
    invariants::check(&split);
    let roles = |blocks: &[crate::parsing::blocks::Block]| {
        line_roles(rope, blocks, ranges)
            .into_iter()
            .map(|(line, role)| (line.number, role))
            .collect::<Vec<_>>()
    };
    (roles(&full), roles(&split))
}

#[test]
fn prose_after_a_gap_stays_plain() {
    let rope = Rope::from("ice\n:   frozen\n\nplain prose\n\nlater line");
    let oracle = LineTableOracle::from_kinds(&rope, &[]);
    let (full, split) = roles_full_and_split(&rope, &oracle, &[1..=2, 6..=6]);
    assert_eq!(split, full);
    assert_eq!(split[2], (6, None));
}

#[test]
fn prose_before_a_gap_stays_plain() {
    let rope = Rope::from("plain prose\n\nice\n:   frozen");
    let oracle = LineTableOracle::from_kinds(&rope, &[]);
    let (full, split) = roles_full_and_split(&rope, &oracle, &[1..=1, 3..=4]);
    assert_eq!(split, full);
    assert_eq!(split[0], (1, None));
}

#[test]
fn fence_body_after_a_gap_keeps_the_list_styled() {
    let rope = Rope::from("ice\n:   frozen\n\n```\ncode\nmore\n```\n");
    let oracle = TreeSitterOracle::from_rope(&rope).unwrap();
    let (full, split) = roles_full_and_split(&rope, &oracle, &[1..=2, 6..=6]);
    assert_eq!(split, full);
    assert_eq!(
        split,
        vec![
            (1, Some(LineRole::Term)),
            (2, Some(LineRole::DefinitionText)),
            (6, None),
        ]
    );
}
