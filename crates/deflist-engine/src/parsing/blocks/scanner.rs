use crate::parsing::marker::is_marker_line;
use crate::parsing::oracle::LineKind;

use super::types::Block;

/// One line as fed to the scanner: its number, text and oracle kind.
#[derive(Debug, Clone, Copy)]
pub struct ScannedLine<'a> {
    pub number: usize,
    pub text: &'a str,
    pub kind: LineKind,
}

impl<'a> ScannedLine<'a> {
    pub fn new(number: usize, text: &'a str, kind: LineKind) -> Self {
        Self { number, text, kind }
    }
}

/// Single left-to-right pass that cuts scanned lines into [`Block`]s.
///
/// Lines must arrive in increasing order but need not be consecutive. A line
/// after a gap opens a fresh block, unless it carries on a delimited region
/// that is still open, so a range boundary inside a code fence does not split
/// the fence.
#[derive(Debug, Default)]
pub struct BlockScanner {
    blocks: Vec<Block>,
    /// Number of the last line pushed.
    previous: Option<usize>,
    /// Inside a run of header/quote/table/rule/image lines.
    in_contiguous: bool,
    /// A `BlockEnd` was seen; the next line opens a new block.
    break_pending: bool,
    /// The current block holds something other than blank lines.
    has_content: bool,
}

impl BlockScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: &ScannedLine<'_>) {
        let n = line.number;
        let after_gap = self.previous.is_some_and(|p| n > p + 1);
        self.previous = Some(n);

        if self.blocks.is_empty() || self.break_pending {
            self.open(n, false);
            self.break_pending = false;
        } else if after_gap && !self.continues_region(line.kind) {
            self.in_contiguous = false;
            self.open(n, false);
        }

        match line.kind {
            LineKind::BlockStart => {
                self.in_contiguous = false;
                self.open_special_here(n);
                self.has_content = true;
            }
            LineKind::BlockInner => {
                self.in_contiguous = false;
                self.enter_region(n);
            }
            LineKind::BlockEnd => {
                self.in_contiguous = false;
                self.enter_region(n);
                self.break_pending = true;
            }
            LineKind::ContiguousBlock => {
                if !self.in_contiguous {
                    self.in_contiguous = true;
                    self.open_special_here(n);
                }
                self.has_content = true;
            }
            LineKind::Normal | LineKind::ListItem => self.push_prose(line),
        }

        self.current().last_line = n;
    }

    pub fn finish(self) -> Vec<Block> {
        self.blocks
    }

    /// The block lines are currently being added to.
    pub fn current_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// True when `kind` carries on a delimited region the current block holds.
    fn continues_region(&self, kind: LineKind) -> bool {
        matches!(kind, LineKind::BlockInner | LineKind::BlockEnd)
            && !self.in_contiguous
            && self.current_block().is_some_and(|b| b.is_special)
    }

    /// Puts an inner or closing region line into a special block. A region
    /// whose opener was never seen does not take over prose before it.
    fn enter_region(&mut self, n: usize) {
        if !self.current().is_special && self.has_content {
            self.open(n, true);
        } else {
            self.current().is_special = true;
        }
        self.has_content = true;
    }

    fn push_prose(&mut self, line: &ScannedLine<'_>) {
        let n = line.number;
        let blank = line.text.trim().is_empty();
        let at_block_start = self.current().first_line == n;

        if self.in_contiguous {
            self.in_contiguous = false;
            self.open(n, false);
        } else if !at_block_start && self.current().is_special {
            // a delimited region that never reported its end
            self.open(n, false);
        } else if blank && !at_block_start && self.has_content {
            self.open(n, false);
        }

        if blank {
            return;
        }
        self.has_content = true;

        let block = self.current();
        if is_marker_line(line.text) {
            block.marker_lines.insert(n);
        }
        if line.kind == LineKind::ListItem {
            block.list_lines.insert(n);
        }
    }

    fn open_special_here(&mut self, n: usize) {
        if self.current().first_line != n {
            self.open(n, true);
        } else {
            self.current().is_special = true;
        }
    }

    fn open(&mut self, n: usize, is_special: bool) {
        self.blocks.push(Block::new(n, is_special));
        self.has_content = false;
    }

    fn current(&mut self) -> &mut Block {
        if self.blocks.is_empty() {
            self.blocks.push(Block::new(1, false));
        }
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }
}

/// Scans a sequence of lines in one pass.
pub fn scan_lines<'a>(lines: impl IntoIterator<Item = ScannedLine<'a>>) -> Vec<Block> {
    let mut scanner = BlockScanner::new();
    for line in lines {
        scanner.push(&line);
    }
    scanner.finish()
}
