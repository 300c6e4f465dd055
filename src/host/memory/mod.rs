//! An in-process host tree.
//!
//! [`MemoryHost`] keeps nodes as reference counted cells, with a `body` element acting as the
//! document root. It has no layout or styling, but it does everything the engine asks of a host,
//! and it can fire events on demand through [`MemoryHost::dispatch()`].

mod markup;

use std::{
    cell::RefCell,
    fmt::Debug,
    rc::{Rc, Weak},
};

use super::{Host, Listener, NodeKind};
use crate::{Error, Result};

enum Data {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

struct NodeData {
    data: Data,
    children: Vec<MemoryNode>,
    parent: Weak<RefCell<NodeData>>,
    listeners: Vec<(String, Listener)>,
}

/// Handle to a node in a [`MemoryHost`] tree. Cloning the handle does not clone the node, and two
/// handles are equal only if they point at the same node.
#[derive(Clone)]
pub struct MemoryNode(Rc<RefCell<NodeData>>);

impl MemoryNode {
    fn new(data: Data) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            data,
            children: Vec::new(),
            parent: Weak::new(),
            listeners: Vec::new(),
        })))
    }

    pub(crate) fn element(tag: &str) -> Self {
        Self::new(Data::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    pub(crate) fn text(content: &str) -> Self {
        Self::new(Data::Text(content.to_string()))
    }

    pub(crate) fn comment(content: &str) -> Self {
        Self::new(Data::Comment(content.to_string()))
    }

    fn parent(&self) -> Option<MemoryNode> {
        self.0.borrow().parent.upgrade().map(MemoryNode)
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        let mut node = self.0.borrow_mut();
        let Data::Element { attributes, .. } = &mut node.data else {
            return Err(Error::host("attributes can only be set on elements"));
        };

        match attributes.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }

        Ok(())
    }

    fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent
                .0
                .borrow_mut()
                .children
                .retain(|child| child != self);
        }

        self.0.borrow_mut().parent = Weak::new();
    }

    fn append(&self, child: &MemoryNode) -> Result<()> {
        if child == self || self.ancestors().any(|ancestor| &ancestor == child) {
            return Err(Error::host("cannot append a node into itself"));
        }

        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());

        Ok(())
    }

    fn ancestors(&self) -> impl Iterator<Item = MemoryNode> {
        std::iter::successors(self.parent(), MemoryNode::parent)
    }

    fn write_markup(&self, out: &mut String) {
        let node = self.0.borrow();

        match &node.data {
            Data::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push_str(&format!(" {name}=\"{}\"", markup::escape(value)));
                }
                out.push('>');

                if markup::is_void(tag) && node.children.is_empty() {
                    return;
                }

                node.children
                    .iter()
                    .for_each(|child| child.write_markup(out));

                out.push_str(&format!("</{tag}>"));
            }
            Data::Text(content) => out.push_str(&markup::escape(content)),
            Data::Comment(content) => out.push_str(&format!("<!--{content}-->")),
        }
    }
}

impl PartialEq for MemoryNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MemoryNode {}

impl Debug for MemoryNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0.borrow().data {
            Data::Element { tag, .. } => write!(f, "<{tag}>"),
            Data::Text(content) => write!(f, "{content:?}"),
            Data::Comment(_) => write!(f, "<!---->"),
        }
    }
}

/// A [`Host`] that lives entirely in memory.
pub struct MemoryHost {
    body: MemoryNode,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            body: MemoryNode::element("body"),
        }
    }

    /// The document root. Only nodes attached under it can be found with [`Host::find()`].
    pub fn body(&self) -> &MemoryNode {
        &self.body
    }

    /// Fire `event` on `node`, invoking every listener subscribed to it in subscription order.
    /// Returns how many listeners ran. Events do not bubble.
    pub fn dispatch(&self, node: &MemoryNode, event: &str) -> usize {
        // Collect first, so that listeners are free to mutate the tree (including this node)
        let listeners = node
            .0
            .borrow()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, listener)| Rc::clone(listener))
            .collect::<Vec<_>>();

        listeners.iter().for_each(|listener| listener());

        listeners.len()
    }

    pub fn listener_count(&self, node: &MemoryNode, event: &str) -> usize {
        node.0
            .borrow()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Serialise a node and its subtree back into markup.
    pub fn to_markup(&self, node: &MemoryNode) -> String {
        let mut out = String::new();
        node.write_markup(&mut out);
        out
    }

    /// Serialise only the children of a node.
    pub fn inner_markup(&self, node: &MemoryNode) -> String {
        let mut out = String::new();
        self.children(node)
            .iter()
            .for_each(|child| child.write_markup(&mut out));
        out
    }

    /// Depth first search below `root` for the first element with the given tag.
    pub fn query(&self, root: &MemoryNode, tag: &str) -> Option<MemoryNode> {
        self.children(root).into_iter().find_map(|child| {
            if self.kind(&child) == NodeKind::Element(tag.to_string()) {
                Some(child)
            } else {
                self.query(&child, tag)
            }
        })
    }

    fn find_below(&self, root: &MemoryNode, id: &str) -> Option<MemoryNode> {
        self.children(root).into_iter().find_map(|child| {
            if self.attribute(&child, "id").as_deref() == Some(id) {
                Some(child)
            } else {
                self.find_below(&child, id)
            }
        })
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MemoryHost {
    type Node = MemoryNode;

    fn parse(&self, markup: &str) -> Result<MemoryNode> {
        markup::parse(markup)
    }

    fn find(&self, id: &str) -> Option<MemoryNode> {
        self.find_below(&self.body, id)
    }

    fn create_element(&self, tag: &str) -> Result<MemoryNode> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(Error::host(format!("invalid tag name `{tag}`")));
        }

        Ok(MemoryNode::element(tag))
    }

    fn create_text(&self, content: &str) -> MemoryNode {
        MemoryNode::text(content)
    }

    fn kind(&self, node: &MemoryNode) -> NodeKind {
        match &node.0.borrow().data {
            Data::Element { tag, .. } => NodeKind::Element(tag.clone()),
            Data::Text(content) => NodeKind::Text(content.clone()),
            Data::Comment(_) => NodeKind::Other,
        }
    }

    fn attributes(&self, node: &MemoryNode) -> Vec<(String, String)> {
        match &node.0.borrow().data {
            Data::Element { attributes, .. } => attributes.clone(),
            _ => Vec::new(),
        }
    }

    fn attribute(&self, node: &MemoryNode, name: &str) -> Option<String> {
        match &node.0.borrow().data {
            Data::Element { attributes, .. } => attributes
                .iter()
                .find(|(existing, _)| existing == name)
                .map(|(_, value)| value.clone()),
            _ => None,
        }
    }

    fn set_attribute(&self, node: &MemoryNode, name: &str, value: &str) -> Result<()> {
        node.set_attribute(name, value)
    }

    fn set_text(&self, node: &MemoryNode, content: &str) -> Result<()> {
        match &mut node.0.borrow_mut().data {
            Data::Text(existing) => {
                *existing = content.to_string();
                Ok(())
            }
            _ => Err(Error::host("only text nodes have text content")),
        }
    }

    fn children(&self, node: &MemoryNode) -> Vec<MemoryNode> {
        node.0.borrow().children.clone()
    }

    fn parent(&self, node: &MemoryNode) -> Option<MemoryNode> {
        node.parent()
    }

    fn append_child(&self, parent: &MemoryNode, child: &MemoryNode) -> Result<()> {
        if matches!(parent.0.borrow().data, Data::Text(_) | Data::Comment(_)) {
            return Err(Error::host(format!("{parent:?} cannot have children")));
        }

        parent.append(child)
    }

    fn remove_child(&self, parent: &MemoryNode, child: &MemoryNode) -> Result<()> {
        if child.parent().as_ref() != Some(parent) {
            return Err(Error::host(format!("{child:?} is not a child of {parent:?}")));
        }

        child.detach();
        Ok(())
    }

    fn listen(&self, node: &MemoryNode, event: &str, callback: Listener) -> Result<()> {
        node.0
            .borrow_mut()
            .listeners
            .push((event.to_string(), callback));
        Ok(())
    }
}
