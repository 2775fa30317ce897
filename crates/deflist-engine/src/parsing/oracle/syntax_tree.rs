use tree_sitter::{InputEdit, Node, Parser, Point, Tree};
use tree_sitter_md::LANGUAGE;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::error::EngineError;
use crate::parsing::rope::changes::changes_from_delta;

use super::patterns::{MathDelimiter, closes_math, is_image_line, is_table_row, math_delimiter};
use super::{LineKind, NodeTag, Oracle};

/// Oracle backed by the tree-sitter Markdown block grammar.
///
/// The parse tree is flattened into one [`LineKind`] per line after every
/// (re)parse, so `kind_at` is a binary search. Display math is not part of the
/// grammar and is layered on top by a line pass that skips code blocks.
pub struct TreeSitterOracle {
    parser: Parser,
    tree: Option<Tree>,
    line_starts: Vec<usize>,
    kinds: Vec<LineKind>,
}

impl TreeSitterOracle {
    pub fn new(text: &str) -> Result<Self, EngineError> {
        let mut parser = Parser::new();
        parser.set_language(&LANGUAGE.into())?;
        let tree = parser.parse(text, None);

        let mut oracle = Self {
            parser,
            tree,
            line_starts: Vec::new(),
            kinds: Vec::new(),
        };
        oracle.rebuild_table(text);
        Ok(oracle)
    }

    pub fn from_rope(rope: &Rope) -> Result<Self, EngineError> {
        Self::new(&rope.to_string())
    }

    /// Per-line kinds, index 0 being line 1.
    pub fn kinds(&self) -> &[LineKind] {
        &self.kinds
    }

    fn rebuild_table(&mut self, text: &str) {
        self.line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        let lines: Vec<&str> = text
            .split('\n')
            .map(|l| l.trim_end_matches('\r'))
            .collect();

        let mut kinds = vec![LineKind::Normal; self.line_starts.len()];
        if let Some(tree) = &self.tree {
            mark_node(tree.root_node(), &lines, &mut kinds);
        }
        mark_display_math(&lines, &mut kinds);
        self.kinds = kinds;
    }

    /// Converts an xi-rope delta into tree-sitter InputEdits.
    ///
    /// Edits are produced last-to-first so that every edit is expressed in the
    /// coordinates of a document where all earlier ranges are still untouched.
    fn input_edits(&self, new: &Rope, delta: &Delta<RopeInfo>) -> Vec<InputEdit> {
        changes_from_delta(delta)
            .into_iter()
            .rev()
            .map(|change| {
                let start_position = self.point_at(change.old.start);
                let old_end_position = self.point_at(change.old.end);
                let inserted = new.slice_to_cow(change.new.as_range());
                let new_end_position = match inserted.rfind('\n') {
                    Some(last_nl) => Point {
                        row: start_position.row + inserted.matches('\n').count(),
                        column: inserted.len() - last_nl - 1,
                    },
                    None => Point {
                        row: start_position.row,
                        column: start_position.column + inserted.len(),
                    },
                };
                InputEdit {
                    start_byte: change.old.start,
                    old_end_byte: change.old.end,
                    new_end_byte: change.old.start + change.new.len(),
                    start_position,
                    old_end_position,
                    new_end_position,
                }
            })
            .collect()
    }

    /// Row/column of a byte offset in the document the table was built from.
    fn point_at(&self, offset: usize) -> Point {
        let row = self
            .line_starts
            .partition_point(|&s| s <= offset)
            .saturating_sub(1);
        Point {
            row,
            column: offset - self.line_starts.get(row).copied().unwrap_or(0),
        }
    }
}

impl Oracle for TreeSitterOracle {
    fn kind_at(&self, offset: usize) -> Option<LineKind> {
        let idx = self.line_starts.partition_point(|&s| s <= offset);
        idx.checked_sub(1).and_then(|i| self.kinds.get(i).copied())
    }

    fn sync(&mut self, _old: &Rope, new: &Rope, delta: &Delta<RopeInfo>) {
        let text = new.to_string();
        if let Some(mut old_tree) = self.tree.take() {
            // tree.edit() needs the old coordinates, so compute edits before
            // the line table is rebuilt for the new text
            for edit in self.input_edits(new, delta) {
                old_tree.edit(&edit);
            }
            self.tree = self.parser.parse(&text, Some(&old_tree));
        } else {
            self.tree = self.parser.parse(&text, None);
        }
        self.rebuild_table(&text);
    }
}

/// Inclusive row range a node covers. Nodes that swallow their trailing
/// newline end at column 0 of the following row, which is not theirs.
fn rows_of(node: &Node, line_total: usize) -> (usize, usize) {
    let first = node.start_position().row;
    let end = node.end_position();
    let last = if end.column == 0 && end.row > first {
        end.row - 1
    } else {
        end.row
    };
    let cap = line_total.saturating_sub(1);
    (first.min(cap), last.min(cap))
}

fn fill(kinds: &mut [LineKind], first: usize, last: usize, kind: LineKind) {
    for k in &mut kinds[first..=last] {
        *k = kind;
    }
}

/// Like [`fill`], but leaves blank rows alone: containers may extend over the
/// blank line that closes them.
fn fill_text_rows(
    lines: &[&str],
    kinds: &mut [LineKind],
    first: usize,
    last: usize,
    kind: LineKind,
) {
    for row in first..=last {
        if !lines.get(row).is_none_or(|l| l.trim().is_empty()) {
            kinds[row] = kind;
        }
    }
}

fn mark_children(node: Node, lines: &[&str], kinds: &mut [LineKind]) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        mark_node(child, lines, kinds);
    }
}

fn mark_node(node: Node, lines: &[&str], kinds: &mut [LineKind]) {
    if kinds.is_empty() {
        return;
    }
    let (first, last) = rows_of(&node, kinds.len());

    match NodeTag::from_name(node.kind()) {
        NodeTag::Document | NodeTag::Section | NodeTag::List | NodeTag::Other => {
            mark_children(node, lines, kinds);
        }
        NodeTag::ListItem => {
            // nested constructs override the item-wide kind
            fill_text_rows(lines, kinds, first, last, LineKind::ListItem);
            mark_children(node, lines, kinds);
        }
        NodeTag::FencedCode | NodeTag::IndentedCode => {
            fill(kinds, first, last, LineKind::BlockInner);
            kinds[last] = LineKind::BlockEnd;
            kinds[first] = LineKind::BlockStart;
        }
        NodeTag::Heading
        | NodeTag::BlockQuote
        | NodeTag::Table
        | NodeTag::ThematicBreak
        | NodeTag::HtmlBlock => {
            fill_text_rows(lines, kinds, first, last, LineKind::ContiguousBlock);
        }
        NodeTag::Paragraph => {
            for row in first..=last {
                let text = lines.get(row).copied().unwrap_or("");
                if is_image_line(text) || is_table_row(text) {
                    kinds[row] = LineKind::ContiguousBlock;
                }
            }
        }
    }
}

fn is_code(kind: LineKind) -> bool {
    matches!(
        kind,
        LineKind::BlockStart | LineKind::BlockInner | LineKind::BlockEnd
    )
}

/// Layers `$$` formulas over the grammar's view, outside code blocks.
fn mark_display_math(lines: &[&str], kinds: &mut [LineKind]) {
    let mut open = false;
    for (row, text) in lines.iter().enumerate() {
        if row >= kinds.len() || is_code(kinds[row]) {
            continue;
        }
        if open {
            if closes_math(text) {
                kinds[row] = LineKind::BlockEnd;
                open = false;
            } else {
                kinds[row] = LineKind::BlockInner;
            }
            continue;
        }
        match math_delimiter(text) {
            Some(MathDelimiter::Fence) => {
                kinds[row] = LineKind::BlockStart;
                open = true;
            }
            Some(MathDelimiter::Inline) => kinds[row] = LineKind::ContiguousBlock,
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xi_rope::delta::Builder;

    use LineKind::*;

    fn kinds_of(text: &str) -> Vec<LineKind> {
        TreeSitterOracle::new(text).unwrap().kinds().to_vec()
    }

    #[test]
    fn plain_definition_list_is_normal() {
        assert_eq!(
            kinds_of("cryosphere\n:   the frozen part\n"),
            vec![Normal, Normal, Normal]
        );
    }

    #[test]
    fn fenced_code_has_start_inner_end() {
        assert_eq!(
            kinds_of("```\ncode\n\nmore\n```\nafter"),
            vec![BlockStart, BlockInner, BlockInner, BlockInner, BlockEnd, Normal]
        );
    }

    #[test]
    fn headings_and_quotes_are_contiguous() {
        assert_eq!(
            kinds_of("# Title\n\n> quoted\n> more\n\ntext"),
            vec![ContiguousBlock, Normal, ContiguousBlock, ContiguousBlock, Normal, Normal]
        );
    }

    #[test]
    fn thematic_break_is_contiguous() {
        assert_eq!(
            kinds_of("a\n\n***\n\nb"),
            vec![Normal, Normal, ContiguousBlock, Normal, Normal]
        );
    }

    #[test]
    fn list_items_are_reported() {
        let kinds = kinds_of("term\n:   def\n- one\n- two\n");
        assert_eq!(&kinds[..4], &[Normal, Normal, ListItem, ListItem]);
    }

    #[test]
    fn display_math_is_delimited() {
        assert_eq!(
            kinds_of("half-life\n:   goes as\n$$\nC(t)=C_0/2^{t/T}\n$$\n:   with T"),
            vec![Normal, Normal, BlockStart, BlockInner, BlockEnd, Normal]
        );
    }

    #[test]
    fn one_line_math_is_contiguous() {
        assert_eq!(kinds_of("$$x^2$$\ntext"), vec![ContiguousBlock, Normal]);
    }

    #[test]
    fn math_markers_inside_code_are_ignored() {
        assert_eq!(
            kinds_of("```\n$$\n```\ntext"),
            vec![BlockStart, BlockInner, BlockEnd, Normal]
        );
    }

    #[test]
    fn image_line_is_contiguous() {
        assert_eq!(kinds_of("![cat](cat.png)\nterm"), vec![ContiguousBlock, Normal]);
    }

    #[test]
    fn sync_tracks_new_fence() {
        let old = Rope::from("term\n:   def\n");
        let mut oracle = TreeSitterOracle::from_rope(&old).unwrap();

        let mut builder = Builder::new(old.len());
        builder.replace(0..0, Rope::from("```\n"));
        let delta = builder.build();
        let new = delta.apply(&old);
        oracle.sync(&old, &new, &delta);

        assert_eq!(oracle.kind_at(0), Some(BlockStart));
        assert_eq!(oracle.kind_at(5), Some(BlockInner));
    }

    #[test]
    fn miss_past_end_uses_last_line() {
        let oracle = TreeSitterOracle::new("# h").unwrap();
        assert_eq!(oracle.kind_at(100), Some(ContiguousBlock));
    }
}
