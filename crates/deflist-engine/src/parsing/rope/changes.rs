use xi_rope::delta::DeltaElement;
use xi_rope::{Delta, RopeInfo};

use super::span::Span;

/// One contiguous changed range of an edit.
///
/// `old` is the replaced range in the pre-edit document, `new` is the range the
/// replacement occupies in the post-edit document. A pure insertion has an
/// empty `old`, a pure deletion an empty `new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub old: Span,
    pub new: Span,
}

impl Change {
    /// Net change in document length caused by this range.
    pub fn len_delta(&self) -> isize {
        self.new.len() as isize - self.old.len() as isize
    }
}

/// Splits a delta into its contiguous changed ranges, in document order.
///
/// Key concepts:
/// - xi-rope Delta: sequence of Copy(from, to) and Insert(text) operations
/// - Gaps between Copy operations indicate deletions
/// - An insert directly adjacent to a deletion belongs to the same change
pub fn changes_from_delta(delta: &Delta<RopeInfo>) -> Vec<Change> {
    let mut out = Vec::new();
    let mut old_pos = 0usize;
    let mut new_pos = 0usize;
    // (old_start, new_start) of the change being accumulated
    let mut open: Option<(usize, usize)> = None;

    for op in &delta.els {
        match op {
            DeltaElement::Copy(from, to) => {
                if *from > old_pos && open.is_none() {
                    open = Some((old_pos, new_pos));
                }
                if let Some((old_start, new_start)) = open.take() {
                    out.push(Change {
                        old: Span::new(old_start, *from),
                        new: Span::new(new_start, new_pos),
                    });
                }
                new_pos += to - from;
                old_pos = *to;
            }
            DeltaElement::Insert(inserted) => {
                if open.is_none() {
                    open = Some((old_pos, new_pos));
                }
                new_pos += inserted.len();
            }
        }
    }

    if old_pos < delta.base_len && open.is_none() {
        open = Some((old_pos, new_pos));
    }
    if let Some((old_start, new_start)) = open {
        out.push(Change {
            old: Span::new(old_start, delta.base_len),
            new: Span::new(new_start, new_pos),
        });
    }

    out
}
