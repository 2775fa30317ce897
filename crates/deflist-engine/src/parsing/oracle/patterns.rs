//! Line patterns the core checks on its own, without asking the oracle.

use std::sync::LazyLock;

use regex::Regex;

/// Lines that open (or are) a special block: fences, display math, quotes,
/// ATX headers, pipe tables and thematic breaks.
static SPECIAL_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^\ {0,3}(?:
            ```|~~~                     # code fence
          | \$\$                        # display math
          | >                           # block quote
          | \#{1,6}(?:[\ \t]|$)         # ATX header
          | \|                          # pipe table
        )
      | ^\ {0,3}(?:
            (?:\*[\ \t]*){3,}
          | (?:-[\ \t]*){3,}
          | (?:_[\ \t]*){3,}
        )$                              # thematic break
        ",
    )
    .expect("static regex")
});

/// A paragraph line consisting of a single image or embed.
static IMAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*!(?:\[[^\]]*\]\([^)]*\)|\[\[[^\]]+\]\])\s*$").expect("static regex")
});

/// A pipe-table row, for grammars built without the table extension.
static TABLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\|.*\|\s*$").expect("static regex"));

pub fn opens_special_block(text: &str) -> bool {
    SPECIAL_OPENER.is_match(text)
}

pub fn is_image_line(text: &str) -> bool {
    IMAGE_LINE.is_match(text)
}

pub fn is_table_row(text: &str) -> bool {
    TABLE_ROW.is_match(text)
}

/// Display-math delimiter shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathDelimiter {
    /// `$$` opening or closing a multi-line formula.
    Fence,
    /// `$$ ... $$` on a single line.
    Inline,
}

pub fn math_delimiter(text: &str) -> Option<MathDelimiter> {
    let t = text.trim();
    if !t.starts_with("$$") {
        return None;
    }
    if t.len() > 4 && t.ends_with("$$") {
        Some(MathDelimiter::Inline)
    } else {
        Some(MathDelimiter::Fence)
    }
}

/// True for a line that closes an open formula (`$$`, or content ending in `$$`).
pub fn closes_math(text: &str) -> bool {
    text.trim_end().ends_with("$$")
}
