//! Decides how much work an edit needs: nothing, a local patch, or a full rescan.
//!
//! The planner only reads state. It runs after the decorations have been
//! remapped through the edit and the oracle has been synced, and the engine
//! applies whatever it returns.

use std::collections::BTreeMap;
use std::fmt;

use xi_rope::{Delta, Rope, RopeInfo};

use crate::parsing::blocks::{Block, LineRole, block_index_for_line, role_of};
use crate::parsing::marker::{in_marker_zone, is_marker_line};
use crate::parsing::oracle::{LineKind, Oracle, kind_or_normal, opens_special_block};
use crate::parsing::rope::{Change, TextLine, changes_from_delta, line, line_at, line_count};

use super::decorations::{Decoration, DecorationSet, decorations_for_line};

/// Why the planner gave up on a local update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RescanReason {
    LineCountChanged,
    BlanknessChanged,
    SpecialPatternChanged,
    MarkerSetEmptied,
    FirstMarkerAdded,
    MultiLineChange,
    Viewport,
    Initial,
}

impl fmt::Display for RescanReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RescanReason::LineCountChanged => "line count changed",
            RescanReason::BlanknessChanged => "line became blank or non-blank",
            RescanReason::SpecialPatternChanged => "special block pattern changed",
            RescanReason::MarkerSetEmptied => "last marker of a block removed",
            RescanReason::FirstMarkerAdded => "first marker of a block added",
            RescanReason::MultiLineChange => "change spans several lines",
            RescanReason::Viewport => "viewport changed",
            RescanReason::Initial => "initial scan",
        };
        f.write_str(s)
    }
}

/// New decorations for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePatch {
    pub line: usize,
    pub role: Option<LineRole>,
    pub decorations: Vec<Decoration>,
}

/// Block bookkeeping and line decorations to replace in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalPatch {
    /// Updated blocks, keyed by their index in the block list.
    pub blocks: Vec<(usize, Block)>,
    pub lines: Vec<LinePatch>,
}

impl LocalPatch {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.lines.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The remap alone keeps everything consistent.
    NoOp,
    LocalPatch(LocalPatch),
    FullRescan(RescanReason),
}

/// Everything the planner looks at for one edit.
pub struct UpdateInput<'a, O: Oracle + ?Sized> {
    pub old: &'a Rope,
    pub new: &'a Rope,
    pub delta: &'a Delta<RopeInfo>,
    pub blocks: &'a [Block],
    /// Decorations already remapped through `delta`.
    pub decorations: &'a DecorationSet,
    /// Oracle already synced to `new`.
    pub oracle: &'a O,
}

fn is_structural(kind: LineKind) -> bool {
    !matches!(kind, LineKind::Normal | LineKind::ListItem)
}

/// Plans the update for one coalesced edit.
pub fn plan_update<O: Oracle + ?Sized>(input: &UpdateInput<'_, O>) -> UpdateOutcome {
    if line_count(input.old) != line_count(input.new) {
        return UpdateOutcome::FullRescan(RescanReason::LineCountChanged);
    }

    let mut touched: BTreeMap<usize, Block> = BTreeMap::new();
    let mut lines: BTreeMap<usize, LinePatch> = BTreeMap::new();

    for change in changes_from_delta(input.delta) {
        if let Err(reason) = plan_change(input, &change, &mut touched, &mut lines) {
            return UpdateOutcome::FullRescan(reason);
        }
    }

    let patch = LocalPatch {
        blocks: touched
            .into_iter()
            .filter(|(i, b)| input.blocks.get(*i) != Some(b))
            .collect(),
        lines: lines.into_values().collect(),
    };
    if patch.is_empty() {
        UpdateOutcome::NoOp
    } else {
        UpdateOutcome::LocalPatch(patch)
    }
}

fn plan_change<O: Oracle + ?Sized>(
    input: &UpdateInput<'_, O>,
    change: &Change,
    touched: &mut BTreeMap<usize, Block>,
    lines: &mut BTreeMap<usize, LinePatch>,
) -> Result<(), RescanReason> {
    let old_first = line_at(input.old, change.old.start).number;
    let old_last = line_at(input.old, change.old.end).number;
    let new_line = line_at(input.new, change.new.end);
    if old_first != old_last || line_at(input.new, change.new.start).number != new_line.number {
        return Err(RescanReason::MultiLineChange);
    }

    let n = new_line.number;
    let old_line = line(input.old, n);
    let new_text = new_line.text.as_str();
    let pattern_toggled = opens_special_block(&old_line.text) != opens_special_block(new_text);

    let Some(index) = block_index_for_line(input.blocks, n) else {
        // an opener off screen can still reshape what is visible
        return if pattern_toggled {
            Err(RescanReason::SpecialPatternChanged)
        } else {
            Ok(())
        };
    };
    let mut block = touched
        .get(&index)
        .cloned()
        .unwrap_or_else(|| input.blocks[index].clone());

    if old_line.is_blank() != new_line.is_blank() {
        return Err(RescanReason::BlanknessChanged);
    }

    let kind = kind_or_normal(input.oracle, new_line.from);
    if pattern_toggled || is_structural(kind) != block.is_special {
        return Err(RescanReason::SpecialPatternChanged);
    }
    if block.is_special {
        return Ok(());
    }

    if in_marker_zone(new_line.from, change.new.start) {
        let had = is_marker_line(&old_line.text);
        let has = is_marker_line(new_text);
        if had && !has {
            block.marker_lines.remove(&n);
            if block.marker_lines.is_empty() {
                return Err(RescanReason::MarkerSetEmptied);
            }
        } else if has && !had {
            if block.marker_lines.is_empty() {
                return Err(RescanReason::FirstMarkerAdded);
            }
            block.marker_lines.insert(n);
        }
    }

    set_list_line(&mut block, n, kind == LineKind::ListItem);
    recheck_line(input, &block, &new_line, lines);

    // the synced oracle may have moved other lines in or out of a list
    for other in block.lines().filter(|&m| m != n) {
        let other_line = line(input.new, other);
        if other_line.is_blank() {
            continue;
        }
        let kind = kind_or_normal(input.oracle, other_line.from);
        if is_structural(kind) {
            return Err(RescanReason::SpecialPatternChanged);
        }
        if set_list_line(&mut block, other, kind == LineKind::ListItem) {
            recheck_line(input, &block, &other_line, lines);
        }
    }

    touched.insert(index, block);
    Ok(())
}

/// Records whether line `n` is a list item. Returns true when that changed.
fn set_list_line(block: &mut Block, n: usize, is_list: bool) -> bool {
    if is_list {
        block.list_lines.insert(n)
    } else {
        block.list_lines.remove(&n)
    }
}

/// Queues a patch for `text_line` when its decorations no longer match its role.
fn recheck_line<O: Oracle + ?Sized>(
    input: &UpdateInput<'_, O>,
    block: &Block,
    text_line: &TextLine,
    lines: &mut BTreeMap<usize, LinePatch>,
) {
    if !block.is_definition_list() {
        return;
    }
    let n = text_line.number;
    let role = role_of(&text_line.text, block.list_lines.contains(&n));
    let expected = role
        .map(|r| decorations_for_line(text_line, r))
        .unwrap_or_default();
    if input.decorations.for_line(n) != expected.as_slice() {
        lines.insert(
            n,
            LinePatch {
                line: n,
                role,
                decorations: expected,
            },
        );
    }
}
