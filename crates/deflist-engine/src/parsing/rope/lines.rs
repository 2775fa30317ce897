use std::ops::RangeInclusive;

use xi_rope::Rope;

use super::span::Span;

/// A single document line, addressed by its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    /// 1-based line number.
    pub number: usize,
    /// Byte offset of the first character of the line.
    pub from: usize,
    /// Byte offset just past the last character, excluding `\n` / `\r\n`.
    pub to: usize,
    /// The line text without its terminator.
    pub text: String,
}

impl TextLine {
    pub fn span(&self) -> Span {
        Span {
            start: self.from,
            end: self.to,
        }
    }

    /// Whitespace-only lines count as blank for block boundaries.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Number of lines in the rope. A trailing newline opens a final empty line,
/// so the empty document has exactly one line.
pub fn line_count(rope: &Rope) -> usize {
    rope.line_of_offset(rope.len()) + 1
}

/// Returns line `number` (1-based). Numbers past the end clamp to the last line.
pub fn line(rope: &Rope, number: usize) -> TextLine {
    let count = line_count(rope);
    let number = number.clamp(1, count);
    let idx = number - 1;
    let from = rope.offset_of_line(idx);
    let next = if idx + 1 < count {
        rope.offset_of_line(idx + 1)
    } else {
        rope.len()
    };
    let raw = rope.slice_to_cow(from..next);
    let text = raw.trim_end_matches(['\r', '\n']).to_string();
    TextLine {
        number,
        from,
        to: from + text.len(),
        text,
    }
}

/// Returns the line containing `offset` (clamped to the document).
pub fn line_at(rope: &Rope, offset: usize) -> TextLine {
    let offset = offset.min(rope.len());
    line(rope, rope.line_of_offset(offset) + 1)
}

/// Iterates over the lines in `numbers`, clamped to the document.
pub fn lines_in(
    rope: &Rope,
    numbers: RangeInclusive<usize>,
) -> impl Iterator<Item = TextLine> + '_ {
    let count = line_count(rope);
    let first = (*numbers.start()).max(1);
    let last = (*numbers.end()).min(count);
    (first..=last).map(move |n| line(rope, n))
}

/// Iterates over every line in the rope.
pub fn all_lines(rope: &Rope) -> impl Iterator<Item = TextLine> + '_ {
    lines_in(rope, 1..=line_count(rope))
}
