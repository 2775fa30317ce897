use std::ops::{Range, RangeInclusive};

use tracing::{debug, trace};
use xi_rope::delta::{Builder, Transformer};
use xi_rope::{Delta, Rope, RopeInfo};

use crate::error::EngineError;
use crate::parsing::blocks::{Block, check_partition};
use crate::parsing::oracle::{Oracle, TreeSitterOracle};
use crate::parsing::rope::{Span, line_at, line_count};
use crate::parsing::{line_roles, scan_ranges};

use super::decorations::DecorationSet;
use super::update::{RescanReason, UpdateInput, UpdateOutcome, plan_update};

/// What an update call ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Decorations were only shifted.
    NoOp,
    /// These lines got new decorations.
    Patched { lines: Vec<usize> },
    Rescanned(RescanReason),
}

/// Result of one update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub applied: Applied,
    /// Document version after the call.
    pub version: u64,
}

impl UpdateReport {
    pub fn rescanned(&self) -> bool {
        matches!(self.applied, Applied::Rescanned(_))
    }
}

/// Live definition-list engine bound to one open document.
///
/// Owns the document text, the oracle, and the derived blocks and
/// decorations. Every edit goes through [`LiveEngine::apply`], which keeps the
/// derived state consistent with the text before it returns:
///
/// 1. decorations and viewport are remapped through the delta
/// 2. the oracle is synced to the new text
/// 3. the updater plans a no-op, a local patch or a full rescan
/// 4. the plan is applied
///
/// A full rescan only covers the visible lines. With no viewport set the
/// whole document is visible.
///
/// ```rust
/// # use deflist_engine::editing::LiveEngine;
/// let mut engine = LiveEngine::from_bytes(b"ice\n:   frozen water").unwrap();
/// assert_eq!(engine.decorations().len(), 3);
///
/// let report = engine.apply_edit(12..12, "clear ").unwrap();
/// assert!(!report.rescanned());
/// assert_eq!(engine.text(), "ice\n:   frozclear en water");
/// ```
pub struct LiveEngine<O: Oracle> {
    rope: Rope,
    oracle: O,
    blocks: Vec<Block>,
    decorations: DecorationSet,
    /// Visible byte ranges; `None` means the whole document.
    viewport: Option<Vec<Span>>,
    version: u64,
}

impl LiveEngine<TreeSitterOracle> {
    /// Opens a document from raw bytes with the tree-sitter oracle.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        let text = std::str::from_utf8(bytes)?;
        let oracle = TreeSitterOracle::new(text)?;
        Ok(Self::open(text, oracle))
    }
}

impl<O: Oracle> LiveEngine<O> {
    /// Opens a document. `oracle` must describe `text`.
    pub fn open(text: &str, oracle: O) -> Self {
        let mut engine = Self {
            rope: Rope::from(text),
            oracle,
            blocks: Vec::new(),
            decorations: DecorationSet::new(),
            viewport: None,
            version: 0,
        };
        engine.full_rescan(RescanReason::Initial);
        engine
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Sets the visible byte ranges and rescans them.
    pub fn set_viewport(&mut self, ranges: impl IntoIterator<Item = Span>) -> UpdateReport {
        let len = self.rope.len();
        self.viewport = Some(
            ranges
                .into_iter()
                .map(|s| Span::new(s.start.min(len), s.end.min(len)))
                .collect(),
        );
        self.rescan_for(RescanReason::Viewport)
    }

    /// Makes the whole document visible again.
    pub fn clear_viewport(&mut self) -> UpdateReport {
        self.viewport = None;
        self.rescan_for(RescanReason::Viewport)
    }

    /// Visible lines as sorted, merged 1-based ranges.
    pub fn visible_lines(&self) -> Vec<RangeInclusive<usize>> {
        let Some(viewport) = &self.viewport else {
            return vec![1..=line_count(&self.rope)];
        };
        let mut ranges: Vec<(usize, usize)> = viewport
            .iter()
            .map(|s| {
                let first = line_at(&self.rope, s.start).number;
                let last = line_at(&self.rope, s.end.max(s.start)).number;
                (first, last)
            })
            .collect();
        ranges.sort_unstable();

        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
        for (first, last) in ranges {
            match merged.last_mut() {
                Some(prev) if first <= prev.1 + 1 => prev.1 = prev.1.max(last),
                _ => merged.push((first, last)),
            }
        }
        merged.into_iter().map(|(a, b)| a..=b).collect()
    }

    /// Discards incremental state and rescans the visible lines.
    pub fn rescan(&mut self) -> UpdateReport {
        self.rescan_for(RescanReason::Initial)
    }

    /// Replaces `range` with `text`.
    pub fn apply_edit(
        &mut self,
        range: Range<usize>,
        text: &str,
    ) -> Result<UpdateReport, EngineError> {
        let len = self.rope.len();
        if range.start > range.end || range.end > len {
            return Err(EngineError::EditOutOfBounds {
                start: range.start,
                end: range.end,
                len,
            });
        }
        for offset in [range.start, range.end] {
            if !self.is_char_boundary(offset) {
                return Err(EngineError::NotCharBoundary { offset });
            }
        }

        let mut builder = Builder::new(len);
        builder.replace(range, Rope::from(text));
        self.apply(&builder.build())
    }

    /// Applies one coalesced edit and brings blocks and decorations up to date.
    pub fn apply(&mut self, delta: &Delta<RopeInfo>) -> Result<UpdateReport, EngineError> {
        if delta.base_len != self.rope.len() {
            return Err(EngineError::StaleDelta {
                base_len: delta.base_len,
                len: self.rope.len(),
            });
        }

        let new = delta.apply(&self.rope);
        self.decorations.map(delta);
        self.remap_viewport(delta, new.len());
        self.oracle.sync(&self.rope, &new, delta);

        let outcome = plan_update(&UpdateInput {
            old: &self.rope,
            new: &new,
            delta,
            blocks: &self.blocks,
            decorations: &self.decorations,
            oracle: &self.oracle,
        });
        self.rope = new;
        self.version += 1;

        let applied = match outcome {
            UpdateOutcome::NoOp => {
                trace!(version = self.version, "offset remap only");
                Applied::NoOp
            }
            UpdateOutcome::LocalPatch(patch) => {
                trace!(
                    version = self.version,
                    blocks = patch.blocks.len(),
                    lines = patch.lines.len(),
                    "local patch"
                );
                for (index, block) in patch.blocks {
                    if let Some(slot) = self.blocks.get_mut(index) {
                        *slot = block;
                    }
                }
                let mut lines = Vec::with_capacity(patch.lines.len());
                for line_patch in patch.lines {
                    lines.push(line_patch.line);
                    self.decorations
                        .replace_line(line_patch.line, line_patch.decorations);
                }
                Applied::Patched { lines }
            }
            UpdateOutcome::FullRescan(reason) => {
                self.full_rescan(reason);
                Applied::Rescanned(reason)
            }
        };

        Ok(UpdateReport {
            applied,
            version: self.version,
        })
    }

    fn rescan_for(&mut self, reason: RescanReason) -> UpdateReport {
        self.full_rescan(reason);
        UpdateReport {
            applied: Applied::Rescanned(reason),
            version: self.version,
        }
    }

    fn full_rescan(&mut self, reason: RescanReason) {
        let ranges = self.visible_lines();
        self.blocks = scan_ranges(&self.rope, &self.oracle, &ranges);
        debug_assert!(check_partition(&self.blocks));

        let roles = line_roles(&self.rope, &self.blocks, &ranges);
        self.decorations = DecorationSet::from_roles(roles.iter().map(|(l, r)| (l, *r)));
        debug!(
            %reason,
            version = self.version,
            blocks = self.blocks.len(),
            decorations = self.decorations.len(),
            "full rescan"
        );
    }

    fn remap_viewport(&mut self, delta: &Delta<RopeInfo>, new_len: usize) {
        let Some(viewport) = &mut self.viewport else {
            return;
        };
        let mut transformer = Transformer::new(delta);
        for span in viewport.iter_mut() {
            let start = transformer.transform(span.start, false).min(new_len);
            let end = transformer.transform(span.end, true).min(new_len);
            *span = Span::new(start, end.max(start));
        }
    }

    fn is_char_boundary(&self, offset: usize) -> bool {
        let line = line_at(&self.rope, offset);
        let col = offset - line.from;
        // offsets inside the line terminator are ASCII boundaries
        col > line.text.len() || line.text.is_char_boundary(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::editing::Style;
    use crate::parsing::oracle::{LineKind, LineTableOracle};

    fn engine(text: &str) -> LiveEngine<LineTableOracle> {
        let rope = Rope::from(text);
        let oracle = LineTableOracle::with_rule(&rope, |_| LineKind::Normal);
        LiveEngine::open(text, oracle)
    }

    fn styles(engine: &LiveEngine<LineTableOracle>) -> Vec<(usize, Style)> {
        engine
            .decorations()
            .iter()
            .map(|d| (d.line, d.style))
            .collect()
    }

    #[test]
    fn opening_decorates_the_whole_document() {
        let e = engine("ice\n:   frozen water");
        assert_eq!(
            styles(&e),
            vec![(1, Style::Term), (2, Style::Marker), (2, Style::Definition)]
        );
        assert_eq!(e.version(), 0);
    }

    #[test]
    fn viewport_limits_the_rescan() {
        let mut e = engine("a\n:   b\n\nc\n:   d\n\ne\n:   f");
        // lines 4..=5
        let report = e.set_viewport([Span::new(9, 16)]);
        assert_eq!(report.applied, Applied::Rescanned(RescanReason::Viewport));
        assert_eq!(e.visible_lines(), vec![4..=5]);
        assert_eq!(
            styles(&e),
            vec![(4, Style::Term), (5, Style::Marker), (5, Style::Definition)]
        );

        e.clear_viewport();
        assert_eq!(e.decorations().len(), 9);
    }

    #[test]
    fn overlapping_viewport_ranges_are_merged() {
        let mut e = engine("1\n2\n3\n4\n5\n6\n7\n8");
        e.set_viewport([Span::new(8, 10), Span::new(0, 3), Span::new(4, 5)]);
        assert_eq!(e.visible_lines(), vec![1..=3, 5..=6]);
    }

    #[test]
    fn viewport_follows_edits_above_it() {
        let mut e = engine("x\n\nice\n:   frozen");
        e.set_viewport([Span::new(3, 16)]);
        assert_eq!(e.visible_lines(), vec![3..=4]);

        e.apply_edit(0..0, "top\n").unwrap();
        assert_eq!(e.visible_lines(), vec![4..=5]);
        assert_eq!(
            styles(&e),
            vec![(4, Style::Term), (5, Style::Marker), (5, Style::Definition)]
        );
    }

    #[test]
    fn every_edit_bumps_the_version() {
        let mut e = engine("ice\n:   frozen");
        let first = e.apply_edit(0..0, "s").unwrap();
        let second = e.apply_edit(0..1, "").unwrap();
        assert_eq!((first.version, second.version), (1, 2));
        assert_eq!(e.text(), "ice\n:   frozen");
    }

    #[test]
    fn out_of_bounds_edit_is_rejected() {
        let mut e = engine("ice");
        assert!(matches!(
            e.apply_edit(2..9, "x"),
            Err(EngineError::EditOutOfBounds { start: 2, end: 9, len: 3 })
        ));
        assert_eq!(e.version(), 0);
    }

    #[test]
    fn edit_inside_a_character_is_rejected() {
        let mut e = engine("né");
        assert!(matches!(
            e.apply_edit(2..2, "x"),
            Err(EngineError::NotCharBoundary { offset: 2 })
        ));
    }

    #[test]
    fn stale_delta_is_rejected() {
        let mut e = engine("ice");
        let mut builder = Builder::new(10);
        builder.replace(0..0, Rope::from("x"));
        assert!(matches!(
            e.apply(&builder.build()),
            Err(EngineError::StaleDelta { base_len: 10, len: 3 })
        ));
    }
}
