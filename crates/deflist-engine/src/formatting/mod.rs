/*!
 * # Static Formatting
 *
 * Rewrites an already-parsed document tree so that runs of marker lines
 * become definition lists. This is the read-only counterpart of the live
 * engine: it works on tree nodes instead of a rope and runs once per render.
 *
 * ## Module Structure
 *
 * - **`node`**: the [`NodeBuilder`] contract and the arena [`Fragment`]
 * - **`splitter`**: logical-line splitting and paragraph formatting
 * - **`lists`**: pulling a definition list out of a list item
 * - **`markdown`**: `pulldown-cmark` front end producing a [`Fragment`]
 * - **`html`**: HTML rendering of a [`Fragment`]
 */

pub mod html;
pub mod lists;
pub mod markdown;
pub mod node;
pub mod splitter;

pub use lists::format_list_item;
pub use node::{Fragment, ListKind, NodeBuilder, NodeId, NodeKind, Tag};
pub use splitter::{format_paragraph, split_logical_lines};

use lists::inline_run;
use splitter::has_marker_line;

/// Result of formatting one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome<N> {
    /// The candidate was rewritten; `nodes` are the top-level nodes created
    /// for it, in document order.
    Formatted { nodes: Vec<N> },
    Unchanged,
}

impl<N> FormatOutcome<N> {
    pub fn is_formatted(&self) -> bool {
        matches!(self, FormatOutcome::Formatted { .. })
    }
}

/// Counts from a [`format_tree`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatSummary {
    pub formatted: usize,
    pub unchanged: usize,
}

/// The list item a paragraph is the inline content of, if any.
fn owning_item<B: NodeBuilder>(b: &B, paragraph: B::Node) -> Option<B::Node> {
    let parent = b.parent(paragraph)?;
    let first = b.children(parent).first().copied();
    (b.tag(parent) == Some(Tag::Item) && first == Some(paragraph)).then_some(parent)
}

/// Formats a single paragraph or list item.
///
/// The first paragraph of a loose list item stands for the item itself.
/// Nodes of any other kind are left alone.
pub fn format_fragment<B: NodeBuilder>(b: &mut B, node: B::Node) -> FormatOutcome<B::Node> {
    match b.tag(node) {
        Some(Tag::Item) => format_list_item(b, node),
        Some(Tag::Paragraph) => match owning_item(b, node) {
            Some(item) => format_list_item(b, item),
            None => format_paragraph(b, node),
        },
        _ => FormatOutcome::Unchanged,
    }
}

/// Nodes under `root` carrying at least one marker line, in document order.
fn candidates<B: NodeBuilder>(b: &B, node: B::Node, out: &mut Vec<B::Node>) {
    for child in b.children(node) {
        match b.tag(child) {
            Some(Tag::Item) => {
                let (_, run) = inline_run(b, child);
                if has_marker_line(b, &run) {
                    out.push(child);
                }
            }
            Some(Tag::Paragraph) => {
                if owning_item(b, child).is_none() && has_marker_line(b, &b.children(child)) {
                    out.push(child);
                }
                continue;
            }
            Some(Tag::CodeBlock(_) | Tag::Html) | None => continue,
            Some(_) => {}
        }
        candidates(b, child, out);
    }
}

/// Formats every candidate under `root`.
///
/// Candidates are collected before any rewriting, so nodes a rewrite moves
/// (the continuation list of a split list) are still visited.
pub fn format_tree<B: NodeBuilder>(b: &mut B, root: B::Node) -> FormatSummary {
    let mut found = Vec::new();
    candidates(b, root, &mut found);

    let mut summary = FormatSummary::default();
    for node in found {
        if format_fragment(b, node).is_formatted() {
            summary.formatted += 1;
        } else {
            summary.unchanged += 1;
        }
    }
    summary
}

/// Parses Markdown, formats its definition lists and renders HTML.
pub fn render_markdown(text: &str) -> String {
    let (mut fragment, root) = markdown::parse(text);
    format_tree(&mut fragment, root);
    html::render(&fragment, root)
}
