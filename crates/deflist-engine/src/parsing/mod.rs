pub mod blocks;
pub mod marker;
pub mod oracle;
pub mod rope;

#[cfg(test)]
mod tests;

use std::ops::RangeInclusive;

use xi_rope::Rope;

use blocks::{Block, BlockScanner, LineRole, ScannedLine, block_index_for_line, classify_line};
use oracle::{Oracle, kind_or_normal};
use rope::{TextLine, line_count, lines_in};

/// Scans the given 1-based line ranges, in order. Only a delimited region
/// left open at the end of one range carries into the next.
pub fn scan_ranges<O: Oracle + ?Sized>(
    rope: &Rope,
    oracle: &O,
    ranges: &[RangeInclusive<usize>],
) -> Vec<Block> {
    let mut scanner = BlockScanner::new();
    for range in ranges {
        for line in lines_in(rope, range.clone()) {
            let kind = kind_or_normal(oracle, line.from);
            scanner.push(&ScannedLine::new(line.number, &line.text, kind));
        }
    }
    scanner.finish()
}

/// Scans every line of the document.
pub fn scan_document<O: Oracle + ?Sized>(rope: &Rope, oracle: &O) -> Vec<Block> {
    scan_ranges(rope, oracle, &[1..=line_count(rope)])
}

/// Roles of the scanned lines in `ranges`, in document order.
pub fn line_roles(
    rope: &Rope,
    blocks: &[Block],
    ranges: &[RangeInclusive<usize>],
) -> Vec<(TextLine, Option<LineRole>)> {
    ranges
        .iter()
        .flat_map(|range| lines_in(rope, range.clone()))
        .map(|line| {
            let role = block_index_for_line(blocks, line.number)
                .and_then(|i| classify_line(&blocks[i], line.number, &line.text));
            (line, role)
        })
        .collect()
}
