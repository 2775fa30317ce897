use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag as MdTag, TextMergeStream};

use super::node::{Fragment, ListKind, NodeBuilder, NodeId, Tag};

/// Parses Markdown into a [`Fragment`] the formatter can work on.
///
/// Soft and hard line breaks become break nodes so logical lines survive
/// parsing. Definition lists are not a pulldown-cmark extension here: the
/// marker lines arrive as plain paragraph text.
pub fn parse(text: &str) -> (Fragment, NodeId) {
    let mut builder = TreeBuilder::new();
    let parser = Parser::new_ext(text, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    for event in TextMergeStream::new(parser) {
        builder.process_event(event);
    }
    builder.finish()
}

/// Turns the flat event stream into a tree, one open element per stack entry.
struct TreeBuilder {
    fragment: Fragment,
    root: NodeId,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        let mut fragment = Fragment::new();
        let root = fragment.create_root();
        Self {
            fragment,
            root,
            stack: vec![root],
        }
    }

    fn top(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(self.root)
    }

    fn append(&mut self, node: NodeId) {
        let parent = self.top();
        self.fragment.append_child(parent, node);
    }

    /// Appends an element holding a single text child.
    fn append_with_text(&mut self, tag: Tag, text: &str) {
        let element = self.fragment.create_element(tag);
        let t = self.fragment.create_text(text);
        self.fragment.append_child(element, t);
        self.append(element);
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => {
                let element = self.fragment.create_element(map_tag(tag));
                self.append(element);
                self.stack.push(element);
            }
            Event::End(_) => {
                if self.stack.len() > 1 {
                    self.stack.pop();
                }
            }
            Event::Text(text) => {
                let t = self.fragment.create_text(&text);
                self.append(t);
            }
            Event::Code(code) => self.append_with_text(Tag::Code, &code),
            Event::Html(html) | Event::InlineHtml(html) => self.append_with_text(Tag::Html, &html),
            Event::SoftBreak => {
                let br = self.fragment.create_break(false);
                self.append(br);
            }
            Event::HardBreak => {
                let br = self.fragment.create_break(true);
                self.append(br);
            }
            Event::Rule => {
                let rule = self.fragment.create_element(Tag::Rule);
                self.append(rule);
            }
            Event::TaskListMarker(done) => {
                let t = self.fragment.create_text(if done { "[x] " } else { "[ ] " });
                self.append(t);
            }
            _ => {}
        }
    }

    fn finish(self) -> (Fragment, NodeId) {
        (self.fragment, self.root)
    }
}

fn map_tag(tag: MdTag) -> Tag {
    match tag {
        MdTag::Paragraph => Tag::Paragraph,
        MdTag::Heading { level, .. } => Tag::Heading(level as u8),
        MdTag::BlockQuote(_) => Tag::BlockQuote,
        MdTag::CodeBlock(kind) => Tag::CodeBlock(match kind {
            CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
            _ => None,
        }),
        MdTag::HtmlBlock => Tag::Html,
        MdTag::List(None) => Tag::List(ListKind::Bullet),
        MdTag::List(Some(start)) => Tag::List(ListKind::Ordered { start }),
        MdTag::Item => Tag::Item,
        MdTag::Emphasis => Tag::Emphasis,
        MdTag::Strong => Tag::Strong,
        MdTag::Strikethrough => Tag::Strikethrough,
        MdTag::Link {
            dest_url, title, ..
        } => Tag::Link {
            dest: dest_url.to_string(),
            title: title.to_string(),
        },
        MdTag::Image {
            dest_url, title, ..
        } => Tag::Image {
            dest: dest_url.to_string(),
            title: title.to_string(),
        },
        MdTag::Table(_) => Tag::Other("table".to_string()),
        MdTag::TableHead => Tag::Other("thead".to_string()),
        MdTag::TableRow => Tag::Other("tr".to_string()),
        MdTag::TableCell => Tag::Other("td".to_string()),
        _ => Tag::Other("div".to_string()),
    }
}
