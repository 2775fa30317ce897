use std::fmt;

/// How a list is numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Ordered { start: u64 },
}

/// Element tags the formatter reads and produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Document,
    Paragraph,
    Heading(u8),
    BlockQuote,
    CodeBlock(Option<String>),
    List(ListKind),
    Item,
    DefinitionList,
    Term,
    Definition,
    Emphasis,
    Strong,
    Strikethrough,
    Code,
    Link { dest: String, title: String },
    Image { dest: String, title: String },
    Rule,
    Html,
    /// Anything else, by HTML element name.
    Other(String),
}

impl Tag {
    /// Inline tags live inside a line of text; everything else is a block.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Tag::Emphasis
                | Tag::Strong
                | Tag::Strikethrough
                | Tag::Code
                | Tag::Link { .. }
                | Tag::Image { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Tag),
    Text,
    /// A line break inside a run; `hard` for explicit breaks.
    Break { hard: bool },
}

/// Tree construction primitives the static formatter needs.
///
/// Any document tree that can answer these questions and perform these
/// mutations can be formatted. Every inserting method first detaches the node
/// from wherever it currently is.
pub trait NodeBuilder {
    type Node: Copy + Eq + fmt::Debug;

    fn kind(&self, node: Self::Node) -> NodeKind;
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    /// Content of a text node; `None` for elements and breaks.
    fn text(&self, node: Self::Node) -> Option<&str>;

    fn create_element(&mut self, tag: Tag) -> Self::Node;
    fn create_text(&mut self, text: &str) -> Self::Node;
    fn create_break(&mut self, hard: bool) -> Self::Node;
    /// Copies a node without its children.
    fn clone_shallow(&mut self, node: Self::Node) -> Self::Node;

    fn append_child(&mut self, parent: Self::Node, child: Self::Node);
    fn insert_before(&mut self, reference: Self::Node, node: Self::Node);
    fn insert_after(&mut self, reference: Self::Node, node: Self::Node);
    /// Puts `new` where `old` is and detaches `old`.
    fn replace(&mut self, old: Self::Node, new: Self::Node);
    fn detach(&mut self, node: Self::Node);
    fn set_text(&mut self, node: Self::Node, text: &str);

    fn tag(&self, node: Self::Node) -> Option<Tag> {
        match self.kind(node) {
            NodeKind::Element(tag) => Some(tag),
            _ => None,
        }
    }

    /// Concatenated text below `node`, with breaks as `\n`.
    fn plain_text(&self, node: Self::Node) -> String {
        let mut out = String::new();
        collect_text(self, node, &mut out);
        out
    }

    /// Siblings after `node`, in order.
    fn following_siblings(&self, node: Self::Node) -> Vec<Self::Node> {
        let Some(parent) = self.parent(node) else {
            return Vec::new();
        };
        let siblings = self.children(parent);
        match siblings.iter().position(|&n| n == node) {
            Some(i) => siblings[i + 1..].to_vec(),
            None => Vec::new(),
        }
    }
}

fn collect_text<B: NodeBuilder + ?Sized>(b: &B, node: B::Node, out: &mut String) {
    match b.kind(node) {
        NodeKind::Text => out.push_str(b.text(node).unwrap_or_default()),
        NodeKind::Break { .. } => out.push('\n'),
        NodeKind::Element(_) => {
            for child in b.children(node) {
                collect_text(b, child, out);
            }
        }
    }
}

/// Handle to a node of a [`Fragment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document tree.
///
/// Detached nodes stay in the arena; they are simply unreachable from the root.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    nodes: Vec<NodeData>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached `Document` element to build under.
    pub fn create_root(&mut self) -> NodeId {
        self.create_element(Tag::Document)
    }

    fn push(&mut self, kind: NodeKind, text: &str) -> NodeId {
        self.nodes.push(NodeData {
            kind,
            text: text.to_string(),
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn position_in_parent(&self, node: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.nodes[node.0].parent?;
        let index = self.nodes[parent.0].children.iter().position(|&c| c == node)?;
        Some((parent, index))
    }

    fn insert_at(&mut self, parent: NodeId, index: usize, node: NodeId) {
        self.nodes[parent.0].children.insert(index, node);
        self.nodes[node.0].parent = Some(parent);
    }
}

impl NodeBuilder for Fragment {
    type Node = NodeId;

    fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.0].kind.clone()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes[node.0].children.clone()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        let data = &self.nodes[node.0];
        matches!(data.kind, NodeKind::Text).then_some(data.text.as_str())
    }

    fn create_element(&mut self, tag: Tag) -> NodeId {
        self.push(NodeKind::Element(tag), "")
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text, text)
    }

    fn create_break(&mut self, hard: bool) -> NodeId {
        self.push(NodeKind::Break { hard }, "")
    }

    fn clone_shallow(&mut self, node: NodeId) -> NodeId {
        let data = &self.nodes[node.0];
        let (kind, text) = (data.kind.clone(), data.text.clone());
        self.push(kind, &text)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let index = self.nodes[parent.0].children.len();
        self.insert_at(parent, index, child);
    }

    fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        self.detach(node);
        if let Some((parent, index)) = self.position_in_parent(reference) {
            self.insert_at(parent, index, node);
        }
    }

    fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        self.detach(node);
        if let Some((parent, index)) = self.position_in_parent(reference) {
            self.insert_at(parent, index + 1, node);
        }
    }

    fn replace(&mut self, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        self.insert_before(old, new);
        self.detach(old);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some((parent, index)) = self.position_in_parent(node) {
            self.nodes[parent.0].children.remove(index);
        }
        self.nodes[node.0].parent = None;
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        self.nodes[node.0].text = text.to_string();
    }
}
