use xi_rope::delta::Transformer;
use xi_rope::{Delta, RopeInfo};

use crate::parsing::blocks::LineRole;
use crate::parsing::marker::MARKER_LEN;
use crate::parsing::rope::{Span, TextLine};

/// Style tag carried by a decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Style {
    Term,
    Definition,
    DefinitionListItem,
    Marker,
}

impl Style {
    /// CSS class the editing surface attaches to the range.
    pub fn class_name(self) -> &'static str {
        match self {
            Style::Term => "deflist-term",
            Style::Definition => "deflist-definition",
            Style::DefinitionListItem => "deflist-list-item",
            Style::Marker => "deflist-marker",
        }
    }

    /// Line-level styles absorb text typed at their end; the marker is a fixed
    /// four characters and does not.
    fn grows_at_end(self) -> bool {
        !matches!(self, Style::Marker)
    }
}

/// A styled byte range on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoration {
    /// 1-based line the range belongs to.
    pub line: usize,
    pub range: Span,
    pub style: Style,
}

/// Decorations a line with `role` receives.
///
/// A definition-text line is split into the marker and the content after it;
/// a line holding only the marker gets just the marker range.
pub fn decorations_for_line(line: &TextLine, role: LineRole) -> Vec<Decoration> {
    let deco = |range: Span, style| Decoration {
        line: line.number,
        range,
        style,
    };
    match role {
        LineRole::Term => vec![deco(line.span(), Style::Term)],
        LineRole::DefinitionListItem => vec![deco(line.span(), Style::DefinitionListItem)],
        LineRole::DefinitionText => {
            let content_start = (line.from + MARKER_LEN).min(line.to);
            let mut out = vec![deco(Span::new(line.from, content_start), Style::Marker)];
            if content_start < line.to {
                out.push(deco(Span::new(content_start, line.to), Style::Definition));
            }
            out
        }
    }
}

/// Every decoration of the visible lines, sorted by line then start offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    items: Vec<Decoration>,
}

impl DecorationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from per-line roles, skipping lines without one.
    pub fn from_roles<'a>(
        lines: impl IntoIterator<Item = (&'a TextLine, Option<LineRole>)>,
    ) -> Self {
        let mut items: Vec<Decoration> = lines
            .into_iter()
            .filter_map(|(line, role)| role.map(|r| decorations_for_line(line, r)))
            .flatten()
            .collect();
        items.sort_by_key(|d| (d.line, d.range.start));
        Self { items }
    }

    /// Remaps every range through `delta` (a pure offset shift).
    ///
    /// Starts stay before text inserted at them; ends of line-level styles move
    /// past it. Ranges that collapse to nothing are dropped. Line numbers are
    /// left alone: any edit that changes the line count forces a rebuild.
    pub fn map(&mut self, delta: &Delta<RopeInfo>) {
        let mut transformer = Transformer::new(delta);
        for d in &mut self.items {
            let start = transformer.transform(d.range.start, false);
            let end = transformer.transform(d.range.end, d.style.grows_at_end());
            d.range = Span::new(start, end.max(start));
        }
        self.items.retain(|d| !d.range.is_empty());
    }

    /// Replaces all decorations of `line` with `decorations`.
    pub fn replace_line(&mut self, line: usize, decorations: Vec<Decoration>) {
        let from = self.items.partition_point(|d| d.line < line);
        let to = self.items.partition_point(|d| d.line <= line);
        self.items.splice(from..to, decorations);
    }

    pub fn for_line(&self, line: usize) -> &[Decoration] {
        let from = self.items.partition_point(|d| d.line < line);
        let to = self.items.partition_point(|d| d.line <= line);
        &self.items[from..to]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a DecorationSet {
    type Item = &'a Decoration;
    type IntoIter = std::slice::Iter<'a, Decoration>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
