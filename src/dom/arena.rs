//! Arena-based tag tree shared by the HTML and XML front ends.
//!
//! Nodes live in one contiguous vector; parent/child/sibling links are
//! indices into it. Both html5ever and the quick-xml builder parse into
//! this layout, so every extraction rule queries a single representation.

use html5ever::QualName;

/// Namespace URI of the XLink vocabulary (`xlink:href`).
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaNodeId(pub u32);

impl ArenaNodeId {
    /// Sentinel value for no node.
    pub const NONE: ArenaNodeId = ArenaNodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the arena DOM.
#[derive(Debug, Clone)]
pub enum ArenaNodeData {
    Document,
    Element { name: QualName, attrs: Vec<Attribute> },
    Text(String),
    /// Comments and processing instructions; kept so the tree sink has a
    /// handle to return, never queried.
    Comment,
}

/// Element attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// Match against `local` or `prefix:local`.
    ///
    /// A bare name only matches attributes outside any namespace. The
    /// `xlink` prefix also matches attributes bound to [`XLINK_NS`] under
    /// a different prefix.
    fn matches(&self, query: &str) -> bool {
        let (prefix, local) = match query.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, query),
        };
        if self.name.local.as_ref() != local {
            return false;
        }
        match prefix {
            None => self.name.prefix.is_none() && self.name.ns.is_empty(),
            Some(prefix) => {
                self.name.prefix.as_deref() == Some(prefix)
                    || (prefix == "xlink" && &*self.name.ns == XLINK_NS)
            }
        }
    }
}

/// A node in the arena DOM.
#[derive(Debug)]
pub struct ArenaNode {
    pub data: ArenaNodeData,
    pub parent: ArenaNodeId,
    pub first_child: ArenaNodeId,
    pub last_child: ArenaNodeId,
    pub prev_sibling: ArenaNodeId,
    pub next_sibling: ArenaNodeId,
}

impl ArenaNode {
    fn new(data: ArenaNodeData) -> Self {
        Self {
            data,
            parent: ArenaNodeId::NONE,
            first_child: ArenaNodeId::NONE,
            last_child: ArenaNodeId::NONE,
            prev_sibling: ArenaNodeId::NONE,
            next_sibling: ArenaNodeId::NONE,
        }
    }
}

/// Arena-based DOM tree.
pub struct ArenaDom {
    nodes: Vec<ArenaNode>,
    document: ArenaNodeId,
}

impl ArenaDom {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: ArenaNodeId::NONE,
        };
        dom.document = dom.alloc(ArenaNode::new(ArenaNodeData::Document));
        dom
    }

    fn alloc(&mut self, node: ArenaNode) -> ArenaNodeId {
        let id = ArenaNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> ArenaNodeId {
        self.document
    }

    pub fn get(&self, id: ArenaNodeId) -> Option<&ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: ArenaNodeId) -> Option<&mut ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Element { name, attrs }))
    }

    pub fn create_text(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Text(text)))
    }

    pub fn create_comment(&mut self) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Comment))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = ArenaNodeId::NONE;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: ArenaNodeId, new_node: ArenaNodeId) {
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text to an existing text node, or create new if last child isn't text.
    pub fn append_text(&mut self, parent: ArenaNodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let ArenaNodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Unlink a node from its parent and siblings.
    pub fn detach(&mut self, target: ArenaNodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = ArenaNodeId::NONE;
            node.prev_sibling = ArenaNodeId::NONE;
            node.next_sibling = ArenaNodeId::NONE;
        }
    }

    /// Number of nodes, including the document root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the DOM is empty (only has document root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: ArenaNodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(ArenaNodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// All nodes below `root` in document order (depth first, `root` excluded).
    pub fn descendants(&self, root: ArenaNodeId) -> Vec<ArenaNodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<ArenaNodeId> = self.children(root).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let mark = stack.len();
            stack.extend(self.children(id));
            stack[mark..].reverse();
        }
        out
    }

    /// Get element's local name (tag).
    pub fn element_name(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        })
    }

    /// Get an attribute value by `local` or `prefix:local` name.
    pub fn get_attr(&self, id: ArenaNodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.matches(attr_name))
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of every text node below `id`.
    pub fn text_content(&self, id: ArenaNodeId) -> String {
        let mut out = String::new();
        if let Some(ArenaNodeData::Text(text)) = self.get(id).map(|n| &n.data) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(ArenaNodeData::Text(text)) = self.get(node).map(|n| &n.data) {
                out.push_str(text);
            }
        }
        out
    }
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a ArenaDom,
    current: ArenaNodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(ArenaNodeId::NONE);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use html5ever::{LocalName, Namespace, Prefix, ns};

    use super::*;

    fn qual(local: &str) -> QualName {
        QualName::new(None, ns!(), LocalName::from(local))
    }

    #[test]
    fn test_descendants_in_document_order() {
        let mut dom = ArenaDom::new();
        let a = dom.create_element(qual("a"), Vec::new());
        let b = dom.create_element(qual("b"), Vec::new());
        let c = dom.create_element(qual("c"), Vec::new());
        let d = dom.create_element(qual("d"), Vec::new());
        let doc = dom.document();
        dom.append(doc, a);
        dom.append(a, b);
        dom.append(b, c);
        dom.append(a, d);

        let names: Vec<_> = dom
            .descendants(doc)
            .into_iter()
            .filter_map(|id| dom.element_name(id))
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_text_content_concatenates() {
        let mut dom = ArenaDom::new();
        let style = dom.create_element(qual("style"), Vec::new());
        dom.append(dom.document(), style);
        dom.append_text(style, "a { ");
        dom.append_text(style, "b }");
        assert_eq!(dom.text_content(style), "a { b }");
        assert_eq!(dom.children(style).count(), 1);
    }

    #[test]
    fn test_detach_and_insert_before() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let first = dom.create_element(qual("first"), Vec::new());
        let second = dom.create_element(qual("second"), Vec::new());
        dom.append(doc, second);
        dom.insert_before(second, first);
        let names: Vec<_> = dom.children(doc).filter_map(|id| dom.element_name(id)).collect();
        assert_eq!(names, vec!["first", "second"]);

        dom.detach(first);
        let names: Vec<_> = dom.children(doc).filter_map(|id| dom.element_name(id)).collect();
        assert_eq!(names, vec!["second"]);
    }

    #[test]
    fn test_attribute_matching() {
        let mut dom = ArenaDom::new();
        let attrs = vec![
            Attribute {
                name: QualName::new(
                    Some(Prefix::from("xl")),
                    Namespace::from(XLINK_NS),
                    LocalName::from("href"),
                ),
                value: "linked.png".into(),
            },
            Attribute {
                name: qual("width"),
                value: "10".into(),
            },
        ];
        let image = dom.create_element(qual("image"), attrs);

        assert_eq!(dom.get_attr(image, "xlink:href"), Some("linked.png"));
        assert_eq!(dom.get_attr(image, "xl:href"), Some("linked.png"));
        assert_eq!(dom.get_attr(image, "href"), None);
        assert_eq!(dom.get_attr(image, "width"), Some("10"));
    }
}
