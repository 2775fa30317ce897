use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// A maximal run of lines bounded by structural discontinuities.
///
/// Line numbers are 1-based. Blocks emitted by one scan partition the scanned
/// lines: `first_line` values strictly increase and each block ends right
/// before the next one starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub first_line: usize,
    /// Last scanned line that belongs to this block (inclusive).
    pub last_line: usize,
    /// Header, rule, table, quote, code or formula rather than prose.
    pub is_special: bool,
    /// Lines starting with the definition marker.
    pub marker_lines: BTreeSet<usize>,
    /// Lines the oracle reported as list items.
    pub list_lines: BTreeSet<usize>,
}

impl Block {
    pub fn new(first_line: usize, is_special: bool) -> Self {
        Self {
            first_line,
            last_line: first_line,
            is_special,
            marker_lines: BTreeSet::new(),
            list_lines: BTreeSet::new(),
        }
    }

    pub fn has_marker(&self) -> bool {
        !self.marker_lines.is_empty()
    }

    /// Only non-special blocks carrying at least one marker are definition lists.
    pub fn is_definition_list(&self) -> bool {
        !self.is_special && self.has_marker()
    }

    pub fn lines(&self) -> RangeInclusive<usize> {
        self.first_line..=self.last_line
    }

    pub fn contains_line(&self, number: usize) -> bool {
        self.lines().contains(&number)
    }
}

/// Index of the block containing `line`, if any.
pub fn block_index_for_line(blocks: &[Block], line: usize) -> Option<usize> {
    let idx = blocks.partition_point(|b| b.first_line <= line);
    let idx = idx.checked_sub(1)?;
    blocks[idx].contains_line(line).then_some(idx)
}

/// True when `blocks` are non-empty extents in strictly increasing order that
/// never overlap. Gaps are allowed: lines between visible ranges are not scanned.
pub fn check_partition(blocks: &[Block]) -> bool {
    blocks.iter().all(|b| b.first_line <= b.last_line)
        && blocks.windows(2).all(|w| w[0].last_line < w[1].first_line)
}
