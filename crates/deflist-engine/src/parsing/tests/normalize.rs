use xi_rope::Rope;

use crate::parsing::{
    blocks::{Block, LineRole},
    line_roles,
    rope::line_count,
};

/// Renders every line's role as `"<role> | <text>"` for readable comparisons.
///
/// Lines without a role render as `"-"`.
pub fn roles(rope: &Rope, blocks: &[Block]) -> Vec<String> {
    line_roles(rope, blocks, &[1..=line_count(rope)])
        .into_iter()
        .map(|(line, role)| {
            let tag = match role {
                Some(LineRole::Term) => "term",
                Some(LineRole::DefinitionText) => "definition",
                Some(LineRole::DefinitionListItem) => "list-item",
                None => "-",
            };
            format!("{tag} | {}", line.text)
        })
        .collect()
}

/// Renders each block as `"<first>..=<last> <prose|special>[ dl]"`.
pub fn block_shapes(blocks: &[Block]) -> Vec<String> {
    blocks
        .iter()
        .map(|b| {
            let kind = if b.is_special { "special" } else { "prose" };
            let dl = if b.is_definition_list() { " dl" } else { "" };
            format!("{}..={} {kind}{dl}", b.first_line, b.last_line)
        })
        .collect()
}
