use crate::parsing::marker::is_marker_line;

use super::types::Block;

/// Longest line, in characters, still treated as a term.
pub const TERM_MAX_CHARS: usize = 100;

/// Role of a line inside a definition-list block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineRole {
    Term,
    DefinitionText,
    DefinitionListItem,
}

/// The three-way rule shared by the live engine and the static formatter.
///
/// Marker beats list item beats term. Blank lines and over-long plain lines
/// get no role and stay unstyled.
pub fn role_of(text: &str, is_list_item: bool) -> Option<LineRole> {
    if text.trim().is_empty() {
        return None;
    }
    if is_marker_line(text) {
        return Some(LineRole::DefinitionText);
    }
    if is_list_item {
        return Some(LineRole::DefinitionListItem);
    }
    if text.chars().count() <= TERM_MAX_CHARS {
        Some(LineRole::Term)
    } else {
        None
    }
}

/// Role of line `number` with `text`, inside `block`.
///
/// Lines outside definition-list blocks never get a role.
pub fn classify_line(block: &Block, number: usize, text: &str) -> Option<LineRole> {
    if !block.is_definition_list() {
        return None;
    }
    role_of(text, block.list_lines.contains(&number))
}
