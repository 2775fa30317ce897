use tracing::warn;

use super::FormatOutcome;
use super::node::{ListKind, NodeBuilder, NodeKind, Tag};
use super::splitter::{build_entries, marker_line_index, split_logical_lines};

/// The inline content of a list item: the item's first paragraph in a loose
/// list, or its leading inline children in a tight one.
pub fn inline_run<B: NodeBuilder>(b: &B, item: B::Node) -> (B::Node, Vec<B::Node>) {
    let children = b.children(item);
    if let Some(&first) = children.first() {
        if b.tag(first) == Some(Tag::Paragraph) {
            return (first, b.children(first));
        }
    }
    let run = children
        .into_iter()
        .take_while(|&c| match b.kind(c) {
            NodeKind::Element(tag) => tag.is_inline(),
            NodeKind::Text | NodeKind::Break { .. } => true,
        })
        .collect();
    (item, run)
}

/// Pulls a definition list out of a list item.
///
/// The text before the first marker line stays in the item. The rest becomes
/// definition lists inserted right after the enclosing list, and the items
/// that followed this one move to a new list of the same kind placed after
/// those. Nested blocks of the item stay where they are.
///
/// An item whose first marker line is its very first line has nothing to keep
/// and is left alone.
pub fn format_list_item<B: NodeBuilder>(b: &mut B, item: B::Node) -> FormatOutcome<B::Node> {
    let Some(list) = b.parent(item) else {
        return FormatOutcome::Unchanged;
    };
    let Some(Tag::List(kind)) = b.tag(list) else {
        return FormatOutcome::Unchanged;
    };

    let (container, run) = inline_run(b, item);
    let k = match marker_line_index(b, &run) {
        None => return FormatOutcome::Unchanged,
        Some(0) => {
            warn!(?item, "marker on the first line of a list item, left unmodified");
            return FormatOutcome::Unchanged;
        }
        Some(k) => k,
    };
    let anchor = b.children(container).into_iter().find(|c| !run.contains(c));

    let mut head = split_logical_lines(b, &run);
    let tail = head.split_off(k);
    for &n in head.iter().flatten() {
        b.detach(n);
    }

    let mut kept = Vec::new();
    for (i, line) in head.into_iter().enumerate() {
        if i > 0 {
            kept.push(b.create_break(false));
        }
        kept.extend(line);
    }
    for n in kept {
        match anchor {
            Some(a) => b.insert_before(a, n),
            None => b.append_child(container, n),
        }
    }

    let mut nodes = build_entries(b, tail);
    let mut last = list;
    for &n in &nodes {
        b.insert_after(last, n);
        last = n;
    }

    let following = b.following_siblings(item);
    if !following.is_empty() {
        let continued = match kind {
            ListKind::Bullet => ListKind::Bullet,
            ListKind::Ordered { start } => {
                let index = b.children(list).iter().position(|&c| c == item).unwrap_or(0);
                ListKind::Ordered {
                    start: start + index as u64 + 1,
                }
            }
        };
        let rest = b.create_element(Tag::List(continued));
        for n in following {
            b.append_child(rest, n);
        }
        b.insert_after(last, rest);
        nodes.push(rest);
    }

    FormatOutcome::Formatted { nodes }
}
