use html_escape::{encode_double_quoted_attribute, encode_text};

use super::node::{ListKind, NodeBuilder, NodeKind, Tag};

/// Renders the tree under `root` (the root itself excluded) as HTML.
pub fn render<B: NodeBuilder>(b: &B, root: B::Node) -> String {
    let mut out = String::new();
    for child in b.children(root) {
        render_node(b, child, &mut out);
    }
    out
}

fn render_children<B: NodeBuilder>(b: &B, node: B::Node, out: &mut String) {
    for child in b.children(node) {
        render_node(b, child, out);
    }
}

fn wrap<B: NodeBuilder>(b: &B, node: B::Node, open: &str, close: &str, out: &mut String) {
    out.push_str(open);
    render_children(b, node, out);
    out.push_str(close);
}

fn render_node<B: NodeBuilder>(b: &B, node: B::Node, out: &mut String) {
    let tag = match b.kind(node) {
        NodeKind::Text => {
            out.push_str(&encode_text(b.text(node).unwrap_or_default()));
            return;
        }
        NodeKind::Break { hard: true } => {
            out.push_str("<br />\n");
            return;
        }
        NodeKind::Break { hard: false } => {
            out.push('\n');
            return;
        }
        NodeKind::Element(tag) => tag,
    };

    match tag {
        Tag::Document => render_children(b, node, out),
        Tag::Paragraph => wrap(b, node, "<p>", "</p>\n", out),
        Tag::Heading(level) => {
            let open = format!("<h{level}>");
            let close = format!("</h{level}>\n");
            wrap(b, node, &open, &close, out);
        }
        Tag::BlockQuote => wrap(b, node, "<blockquote>\n", "</blockquote>\n", out),
        Tag::CodeBlock(lang) => {
            match lang {
                Some(lang) => {
                    out.push_str("<pre><code class=\"language-");
                    out.push_str(&encode_double_quoted_attribute(&lang));
                    out.push_str("\">");
                }
                None => out.push_str("<pre><code>"),
            }
            out.push_str(&encode_text(&b.plain_text(node)));
            out.push_str("</code></pre>\n");
        }
        Tag::List(ListKind::Bullet) => wrap(b, node, "<ul>\n", "</ul>\n", out),
        Tag::List(ListKind::Ordered { start: 1 }) => wrap(b, node, "<ol>\n", "</ol>\n", out),
        Tag::List(ListKind::Ordered { start }) => {
            let open = format!("<ol start=\"{start}\">\n");
            wrap(b, node, &open, "</ol>\n", out);
        }
        Tag::Item => wrap(b, node, "<li>", "</li>\n", out),
        Tag::DefinitionList => wrap(b, node, "<dl>\n", "</dl>\n", out),
        Tag::Term => wrap(b, node, "<dt>", "</dt>\n", out),
        Tag::Definition => wrap(b, node, "<dd>", "</dd>\n", out),
        Tag::Emphasis => wrap(b, node, "<em>", "</em>", out),
        Tag::Strong => wrap(b, node, "<strong>", "</strong>", out),
        Tag::Strikethrough => wrap(b, node, "<del>", "</del>", out),
        Tag::Code => {
            out.push_str("<code>");
            out.push_str(&encode_text(&b.plain_text(node)));
            out.push_str("</code>");
        }
        Tag::Link { dest, title } => {
            out.push_str("<a href=\"");
            out.push_str(&encode_double_quoted_attribute(&dest));
            out.push('"');
            push_title(&title, out);
            out.push('>');
            render_children(b, node, out);
            out.push_str("</a>");
        }
        Tag::Image { dest, title } => {
            out.push_str("<img src=\"");
            out.push_str(&encode_double_quoted_attribute(&dest));
            out.push_str("\" alt=\"");
            out.push_str(&encode_double_quoted_attribute(&b.plain_text(node)));
            out.push('"');
            push_title(&title, out);
            out.push_str(" />");
        }
        Tag::Rule => out.push_str("<hr />\n"),
        // raw HTML passes through untouched
        Tag::Html => out.push_str(&b.plain_text(node)),
        Tag::Other(name) => {
            let open = format!("<{name}>");
            let close = format!("</{name}>\n");
            wrap(b, node, &open, &close, out);
        }
    }
}

fn push_title(title: &str, out: &mut String) {
    if !title.is_empty() {
        out.push_str(" title=\"");
        out.push_str(&encode_double_quoted_attribute(title));
        out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::formatting::markdown::parse;

    fn html(md: &str) -> String {
        let (f, root) = parse(md);
        render(&f, root)
    }

    #[test]
    fn text_is_escaped() {
        insta::assert_snapshot!(html("a < b & c\n").trim_end(), @"<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn inline_markup_and_links() {
        let out = html("*ice* and **snow** with [a link](https://example.com \"t\")\n");
        assert_eq!(
            out.trim_end(),
            concat!(
                "<p><em>ice</em> and <strong>snow</strong> with ",
                r#"<a href="https://example.com" title="t">a link</a></p>"#
            )
        );
    }

    #[test]
    fn ordered_list_start_is_kept() {
        insta::assert_snapshot!(html("3. three\n4. four\n").trim_end(), @r#"
        <ol start="3">
        <li>three</li>
        <li>four</li>
        </ol>
        "#);
    }

    #[test]
    fn code_block_has_language_class() {
        assert_eq!(
            html("```sh\necho <hi>\n```\n"),
            "<pre><code class=\"language-sh\">echo &lt;hi&gt;\n</code></pre>\n"
        );
    }
}
