//! # Line-kind oracle
//!
//! The scanner never parses fences, headers, quotes or lists itself. It asks an
//! [`Oracle`] what kind of line sits at a byte offset and gets back one of the
//! six [`LineKind`]s. A miss (`None`) is read as [`LineKind::Normal`].
//!
//! ## Implementations
//!
//! - **`syntax_tree`**: [`TreeSitterOracle`], backed by the tree-sitter Markdown
//!   block grammar plus a display-math pass, incrementally reparsed on edits
//! - **`table`**: [`LineTableOracle`], a per-line kind table, optionally
//!   recomputed from a line rule after each edit
//!
//! Parser node names are keyed through [`normalize_kind`] and [`NodeTag`] so
//! nothing depends on numeric node ids.

pub mod patterns;
pub mod syntax_tree;
pub mod table;

use std::sync::LazyLock;

use regex::Regex;
use xi_rope::{Delta, Rope, RopeInfo};

pub use patterns::opens_special_block;
pub use syntax_tree::TreeSitterOracle;
pub use table::LineTableOracle;

/// What the oracle knows about a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// First line of a delimited region (code fence, display math).
    BlockStart,
    /// Last line of a delimited region.
    BlockEnd,
    /// Interior line of a delimited region.
    BlockInner,
    /// Self-describing structural line: header, quote, table row, rule, image.
    ContiguousBlock,
    /// A list item line.
    ListItem,
    /// Plain prose or blank.
    Normal,
}

/// Per-position line classification.
///
/// `sync` is called once per edit, after the engine has the post-edit rope,
/// so stateful implementations can update incrementally.
pub trait Oracle {
    fn kind_at(&self, offset: usize) -> Option<LineKind>;

    fn sync(&mut self, _old: &Rope, _new: &Rope, _delta: &Delta<RopeInfo>) {}
}

impl<O: Oracle + ?Sized> Oracle for Box<O> {
    fn kind_at(&self, offset: usize) -> Option<LineKind> {
        (**self).kind_at(offset)
    }

    fn sync(&mut self, old: &Rope, new: &Rope, delta: &Delta<RopeInfo>) {
        (**self).sync(old, new, delta)
    }
}

/// Resolves an oracle answer, degrading misses to `Normal`.
pub fn kind_or_normal<O: Oracle + ?Sized>(oracle: &O, offset: usize) -> LineKind {
    oracle.kind_at(offset).unwrap_or(LineKind::Normal)
}

static VOLATILE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([_-][0-9]+)+$").expect("static regex"));

/// Strips volatile numeric suffixes from a parser node name
/// (`fenced_code_block_2` → `fenced_code_block`).
pub fn normalize_kind(name: &str) -> &str {
    match VOLATILE_SUFFIX.find(name) {
        Some(m) if m.start() > 0 => &name[..m.start()],
        _ => name,
    }
}

/// Stable node tags the tree walker keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTag {
    Document,
    Section,
    FencedCode,
    IndentedCode,
    Heading,
    BlockQuote,
    Table,
    ThematicBreak,
    HtmlBlock,
    List,
    ListItem,
    Paragraph,
    Other,
}

impl NodeTag {
    pub fn from_name(name: &str) -> Self {
        match normalize_kind(name) {
            "document" => NodeTag::Document,
            "section" => NodeTag::Section,
            "fenced_code_block" => NodeTag::FencedCode,
            "indented_code_block" => NodeTag::IndentedCode,
            "atx_heading" | "setext_heading" => NodeTag::Heading,
            "block_quote" => NodeTag::BlockQuote,
            "pipe_table" => NodeTag::Table,
            "thematic_break" => NodeTag::ThematicBreak,
            "html_block" => NodeTag::HtmlBlock,
            "list" => NodeTag::List,
            "list_item" => NodeTag::ListItem,
            "paragraph" => NodeTag::Paragraph,
            _ => NodeTag::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("fenced_code_block", "fenced_code_block")]
    #[case("fenced_code_block_2", "fenced_code_block")]
    #[case("HyperMD-codeblock-1", "HyperMD-codeblock")]
    #[case("HyperMD-header_1_12", "HyperMD-header")]
    #[case("h1", "h1")]
    #[case("_42", "_42")]
    fn volatile_suffixes_are_stripped(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(normalize_kind(name), expected);
    }

    #[test]
    fn node_tags_ignore_suffixes() {
        assert_eq!(NodeTag::from_name("list_item_7"), NodeTag::ListItem);
        assert_eq!(NodeTag::from_name("setext_heading"), NodeTag::Heading);
        assert_eq!(NodeTag::from_name("minus_metadata"), NodeTag::Other);
    }

    struct Miss;

    impl Oracle for Miss {
        fn kind_at(&self, _offset: usize) -> Option<LineKind> {
            None
        }
    }

    #[test]
    fn miss_degrades_to_normal() {
        assert_eq!(kind_or_normal(&Miss, 3), LineKind::Normal);
    }
}
