//! An owned, mutable document tree.
//!
//! The rendered page HTML is parsed with [`scraper`] once, then copied into this
//! arena so the extraction pipeline can prune and rewrite it destructively
//! without fighting the parser's internal tree. Nodes are addressed by
//! [`NodeId`] indices; detached subtrees simply become unreachable garbage in
//! the arena, which is fine for a structure that lives for a single lookup.

use std::collections::BTreeMap;

use ego_tree::NodeRef;
use scraper::{Html, Node as ScraperNode};

/// A handle to a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The kind of a node: an element with a tag name, or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element node such as `h2`, `li` or `table`.
    Element {
        /// The lowercase tag name.
        tag: String,
    },
    /// A text node.
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An ordered, rooted document tree with arena-style node storage.
///
/// Every relation is an ownership edge down the tree; a node has at most one
/// parent and cycles are impossible by construction since nodes are only ever
/// appended below existing nodes.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Tree {
    /// Creates an empty tree with a synthetic document root.
    #[must_use]
    pub fn new() -> Tree {
        let root_data = NodeData {
            kind: NodeKind::Element {
                tag: String::from("#document"),
            },
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            parent: None,
            children: Vec::new(),
        };

        Tree {
            nodes: vec![root_data],
            root: NodeId(0),
        }
    }

    /// Parses an HTML fragment and copies it into a new tree.
    ///
    /// Comments, doctypes and processing instructions are dropped; everything
    /// else is preserved, including whitespace-only text nodes.
    #[must_use]
    pub fn from_html(html: &str) -> Tree {
        let fragment = Html::parse_fragment(html);
        let mut tree = Tree::new();
        let root = tree.root();

        // Fragment parsing wraps the content in a synthetic `html` element;
        // unwrap it so the payload's own nodes become direct children of the
        // root.
        let fragment_root = fragment.tree.root();
        let content_parent = fragment_root
            .children()
            .find(|c| matches!(c.value(), ScraperNode::Element(el) if el.name() == "html"))
            .unwrap_or(fragment_root);

        for child in content_parent.children() {
            copy_scraper_node(&mut tree, root, child);
        }

        tree
    }

    /// Returns the synthetic root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    /// Returns the tag name if the node is an element.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Returns the heading level (1 = least nested) if the node is a heading
    /// element, `h1` through `h5`.
    #[must_use]
    pub fn heading_level(&self, id: NodeId) -> Option<u8> {
        match self.tag(id)? {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            _ => None,
        }
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attrs.get(name).map(String::as_str)
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        self.node_mut(id).attrs.insert(name.to_string(), value.into());
    }

    /// Removes an attribute, returning its previous value.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.node_mut(id).attrs.remove(name)
    }

    /// Returns `true` if the node carries the given class.
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id).classes.iter().any(|c| c == class)
    }

    /// Adds a class to the node unless it is already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            self.node_mut(id).classes.push(class.to_string());
        }
    }

    /// Returns the node's children in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Returns the node's parent, if it is attached.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Returns the next sibling of `id`, computed positionally from the
    /// parent's child list.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&s| s == id)?;

        siblings.get(pos + 1).copied()
    }

    /// Creates a detached element node.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData {
            kind: NodeKind::Element {
                tag: tag.to_string(),
            },
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            parent: None,
            children: Vec::new(),
        })
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData {
            kind: NodeKind::Text(text.into()),
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            parent: None,
            children: Vec::new(),
        })
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(data);

        id
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Detaches a node from its parent. The subtree stays in the arena but is
    /// no longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|&c| c != id);
            self.node_mut(id).parent = None;
        }
    }

    /// Replaces the root's children with exactly the given nodes, in order,
    /// detaching each from its previous parent. Everything else becomes
    /// unreachable.
    pub fn retain_at_root(&mut self, keep: &[NodeId]) {
        let root = self.root;
        let old = std::mem::take(&mut self.node_mut(root).children);

        for id in old {
            self.node_mut(id).parent = None;
        }
        for &id in keep {
            self.append(root, id);
        }
    }

    /// Returns the subtree rooted at `id` in pre-order, including `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];

        while let Some(next) = stack.pop() {
            out.push(next);
            for &child in self.children(next).iter().rev() {
                stack.push(child);
            }
        }

        out
    }

    /// Concatenates the text content of the subtree rooted at `id`.
    #[must_use]
    pub fn text_of(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);

        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.node(id).kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Detaches every node in the tree carrying the given class.
    ///
    /// Used to strip per-section edit links and footnote reference markers
    /// before extraction.
    pub fn remove_by_class(&mut self, class: &str) {
        let doomed: Vec<NodeId> = self
            .descendants(self.root)
            .into_iter()
            .filter(|&id| self.has_class(id, class))
            .collect();

        for id in doomed {
            self.detach(id);
        }
    }

    /// Finds the first node, in pre-order, whose `id` attribute equals `anchor`.
    #[must_use]
    pub fn find_by_anchor(&self, anchor: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&id| self.attr(id, "id") == Some(anchor))
    }

    /// Walks from `id` up through its ancestors (including `id` itself) and
    /// returns the first heading node.
    #[must_use]
    pub fn enclosing_heading(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);

        while let Some(node) = current {
            if self.heading_level(node).is_some() {
                return Some(node);
            }
            current = self.parent(node);
        }

        None
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

fn copy_scraper_node(tree: &mut Tree, parent: NodeId, node: NodeRef<'_, ScraperNode>) {
    match node.value() {
        ScraperNode::Element(element) => {
            let id = tree.create_element(element.name());

            for (name, value) in element.attrs() {
                if name == "class" {
                    continue;
                }
                tree.set_attr(id, name, value);
            }
            for class in element.classes() {
                tree.add_class(id, class);
            }

            tree.append(parent, id);

            for child in node.children() {
                copy_scraper_node(tree, id, child);
            }
        }
        ScraperNode::Text(text) => {
            let id = tree.create_text(&text[..]);
            tree.append(parent, id);
        }
        // Comments, doctypes and processing instructions carry nothing the
        // pipeline needs.
        _ => {}
    }
}
