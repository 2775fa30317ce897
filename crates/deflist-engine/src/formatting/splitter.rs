use std::mem::discriminant;
use std::sync::LazyLock;

use regex::Regex;

use crate::parsing::blocks::{LineRole, role_of};
use crate::parsing::marker::{MARKER_LEN, is_marker_line};

use super::FormatOutcome;
use super::node::{ListKind, NodeBuilder, NodeKind, Tag};

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|(\d{1,9})[.)])(?:\s+|$)").expect("static regex"));

/// Kind and prefix length of a line opening a list item, such as `- a` or `2. b`.
fn list_marker(text: &str) -> Option<(ListKind, usize)> {
    let caps = LIST_MARKER.captures(text)?;
    let kind = match caps.get(1) {
        Some(digits) => ListKind::Ordered {
            start: digits.as_str().parse().ok()?,
        },
        None => ListKind::Bullet,
    };
    Some((kind, caps.get(0)?.end()))
}

/// Splits an inline run into logical lines.
///
/// Break nodes end a line and are detached. Text containing `\n` is cut at
/// each newline. An inline element (emphasis, link...) that straddles a break
/// is cut too: its first part keeps the original node and every later part
/// gets a shallow clone, so each line has well-formed markup.
pub fn split_logical_lines<B: NodeBuilder>(b: &mut B, nodes: &[B::Node]) -> Vec<Vec<B::Node>> {
    let mut lines = vec![Vec::new()];
    for &node in nodes {
        match b.kind(node) {
            NodeKind::Break { .. } => {
                b.detach(node);
                lines.push(Vec::new());
            }
            NodeKind::Text => split_text(b, node, &mut lines),
            NodeKind::Element(tag) if tag.is_inline() => split_inline(b, node, &mut lines),
            NodeKind::Element(_) => current(&mut lines).push(node),
        }
    }
    lines
}

fn current<N>(lines: &mut Vec<Vec<N>>) -> &mut Vec<N> {
    if lines.is_empty() {
        lines.push(Vec::new());
    }
    let last = lines.len() - 1;
    &mut lines[last]
}

fn split_text<B: NodeBuilder>(b: &mut B, node: B::Node, lines: &mut Vec<Vec<B::Node>>) {
    let text = b.text(node).unwrap_or_default().to_string();
    if !text.contains('\n') {
        current(lines).push(node);
        return;
    }
    let mut parts = text.split('\n');
    match parts.next() {
        Some(first) if !first.is_empty() => {
            b.set_text(node, first);
            current(lines).push(node);
        }
        _ => b.detach(node),
    }
    for part in parts {
        lines.push(Vec::new());
        if !part.is_empty() {
            let t = b.create_text(part);
            current(lines).push(t);
        }
    }
}

fn split_inline<B: NodeBuilder>(b: &mut B, node: B::Node, lines: &mut Vec<Vec<B::Node>>) {
    let children = b.children(node);
    let parts = split_logical_lines(b, &children);
    if parts.len() == 1 {
        current(lines).push(node);
        return;
    }
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            lines.push(Vec::new());
        }
        if part.is_empty() {
            if i == 0 {
                b.detach(node);
            }
            continue;
        }
        let element = if i == 0 {
            for child in b.children(node) {
                b.detach(child);
            }
            node
        } else {
            b.clone_shallow(node)
        };
        for child in part {
            b.append_child(element, child);
        }
        current(lines).push(element);
    }
}

/// Text of the nodes of one logical line.
pub fn line_text<B: NodeBuilder>(b: &B, line: &[B::Node]) -> String {
    line.iter().map(|&n| b.plain_text(n)).collect()
}

/// True when any logical line of `nodes` starts with the marker.
pub fn has_marker_line<B: NodeBuilder>(b: &B, nodes: &[B::Node]) -> bool {
    marker_line_index(b, nodes).is_some()
}

/// Index of the first logical line of `nodes` starting with the marker.
pub fn marker_line_index<B: NodeBuilder>(b: &B, nodes: &[B::Node]) -> Option<usize> {
    line_text(b, nodes).split('\n').position(is_marker_line)
}

/// Removes the first `n` bytes of text below `nodes`. Returns what is left to
/// remove when the text ran out.
fn strip_leading<B: NodeBuilder>(b: &mut B, nodes: &[B::Node], mut n: usize) -> usize {
    for &node in nodes {
        if n == 0 {
            break;
        }
        match b.kind(node) {
            NodeKind::Text => {
                let text = b.text(node).unwrap_or_default().to_string();
                let cut = n.min(text.len());
                b.set_text(node, &text[cut..]);
                n -= cut;
            }
            NodeKind::Element(_) => {
                let children = b.children(node);
                n = strip_leading(b, &children, n);
            }
            NodeKind::Break { .. } => {}
        }
    }
    n
}

/// Groups logical lines into definition lists, in order.
///
/// Marker lines become `Definition`s with the marker removed, short lines
/// become `Term`s, and consecutive entries share one `DefinitionList`. List
/// lines that follow a definition become items of a list nested in it. An
/// over-long plain line is emitted as a `Paragraph` of its own, which closes
/// the current list. Blank lines are dropped.
pub fn build_entries<B: NodeBuilder>(b: &mut B, lines: Vec<Vec<B::Node>>) -> Vec<B::Node> {
    let mut out = Vec::new();
    let mut list: Option<B::Node> = None;
    let mut definition: Option<B::Node> = None;
    let mut nested: Option<(B::Node, ListKind)> = None;

    for line in lines {
        let text = line_text(b, &line);
        if let (Some(dd), Some((kind, prefix))) = (definition, list_marker(&text)) {
            strip_leading(b, &line, prefix);
            let ul = match nested {
                Some((ul, open)) if discriminant(&open) == discriminant(&kind) => ul,
                _ => {
                    let ul = b.create_element(Tag::List(kind));
                    b.append_child(dd, ul);
                    nested = Some((ul, kind));
                    ul
                }
            };
            let li = b.create_element(Tag::Item);
            for n in line {
                b.append_child(li, n);
            }
            b.append_child(ul, li);
            continue;
        }

        let tag = match role_of(&text, false) {
            Some(LineRole::DefinitionText) => {
                strip_leading(b, &line, MARKER_LEN);
                Tag::Definition
            }
            Some(LineRole::Term | LineRole::DefinitionListItem) => Tag::Term,
            None if text.trim().is_empty() => {
                for n in line {
                    b.detach(n);
                }
                continue;
            }
            None => {
                let p = b.create_element(Tag::Paragraph);
                for n in line {
                    b.append_child(p, n);
                }
                out.push(p);
                list = None;
                definition = None;
                nested = None;
                continue;
            }
        };

        let dl = match list {
            Some(dl) => dl,
            None => {
                let dl = b.create_element(Tag::DefinitionList);
                out.push(dl);
                list = Some(dl);
                dl
            }
        };
        let entry = b.create_element(tag.clone());
        for n in line {
            b.append_child(entry, n);
        }
        b.append_child(dl, entry);
        definition = (tag == Tag::Definition).then_some(entry);
        nested = None;
    }
    out
}

/// Puts `nodes` where `old` is, in order. With no nodes, `old` is just removed.
pub(crate) fn put_in_place<B: NodeBuilder>(b: &mut B, old: B::Node, nodes: &[B::Node]) {
    let Some((&first, rest)) = nodes.split_first() else {
        b.detach(old);
        return;
    };
    b.replace(old, first);
    let mut prev = first;
    for &n in rest {
        b.insert_after(prev, n);
        prev = n;
    }
}

/// Replaces a paragraph carrying marker lines with its definition lists.
pub fn format_paragraph<B: NodeBuilder>(b: &mut B, paragraph: B::Node) -> FormatOutcome<B::Node> {
    let children = b.children(paragraph);
    if !has_marker_line(b, &children) {
        return FormatOutcome::Unchanged;
    }
    let lines = split_logical_lines(b, &children);
    let nodes = build_entries(b, lines);
    put_in_place(b, paragraph, &nodes);
    FormatOutcome::Formatted { nodes }
}
