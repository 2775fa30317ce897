use xi_rope::{Delta, Rope, RopeInfo};

use crate::parsing::rope::{all_lines, line_count};

use super::{LineKind, Oracle};

/// Derives a line's kind from its text alone.
pub type LineRule = fn(&str) -> LineKind;

/// An oracle over a precomputed per-line kind table.
///
/// With a [`LineRule`] the table is recomputed on every `sync`; without one,
/// kinds stay attached to line numbers and new lines default to `Normal`.
#[derive(Debug, Clone)]
pub struct LineTableOracle {
    line_starts: Vec<usize>,
    kinds: Vec<LineKind>,
    rule: Option<LineRule>,
}

impl LineTableOracle {
    /// Builds a table from explicit kinds, one per line. Missing entries are `Normal`.
    pub fn from_kinds(rope: &Rope, kinds: &[LineKind]) -> Self {
        let line_starts = line_starts(rope);
        let mut kinds = kinds.to_vec();
        kinds.resize(line_starts.len(), LineKind::Normal);
        Self {
            line_starts,
            kinds,
            rule: None,
        }
    }

    /// Builds a table by applying `rule` to every line, now and after each edit.
    pub fn with_rule(rope: &Rope, rule: LineRule) -> Self {
        let mut oracle = Self {
            line_starts: Vec::new(),
            kinds: Vec::new(),
            rule: Some(rule),
        };
        oracle.rebuild(rope);
        oracle
    }

    fn rebuild(&mut self, rope: &Rope) {
        self.line_starts = line_starts(rope);
        match self.rule {
            Some(rule) => {
                self.kinds = all_lines(rope).map(|l| rule(&l.text)).collect();
            }
            None => self.kinds.resize(self.line_starts.len(), LineKind::Normal),
        }
    }
}

impl Oracle for LineTableOracle {
    fn kind_at(&self, offset: usize) -> Option<LineKind> {
        let idx = self.line_starts.partition_point(|&s| s <= offset);
        idx.checked_sub(1).and_then(|i| self.kinds.get(i).copied())
    }

    fn sync(&mut self, _old: &Rope, new: &Rope, _delta: &Delta<RopeInfo>) {
        self.rebuild(new);
    }
}

fn line_starts(rope: &Rope) -> Vec<usize> {
    (0..line_count(rope)).map(|i| rope.offset_of_line(i)).collect()
}
