//! The platform a [`crate::App`] renders into.
//!
//! Nothing in the engine touches a concrete node tree directly. Everything it needs (creating
//! nodes, reading and writing attributes, inserting children, subscribing to events, parsing
//! markup) goes through [`Host`], so the same skeletons can be mounted into a browser document
//! ([`DomHost`]) or an in-process tree ([`MemoryHost`]).

mod dom;
pub mod memory;

use std::{fmt::Debug, rc::Rc};

pub use dom::DomHost;
pub use memory::{MemoryHost, MemoryNode};

use crate::Result;

/// Callback registered against a host node for a named event.
pub type Listener = Rc<dyn Fn()>;

/// What a host node is, as far as the engine cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with the given (lower case) tag name.
    Element(String),

    /// A text node with its current contents.
    Text(String),

    /// Comments, processing instructions and anything else the engine skips over.
    Other,
}

pub trait Host {
    /// Handle to a node in the host tree. Equality must be node identity.
    type Node: Clone + PartialEq + Debug + 'static;

    /// Parse a markup string. The returned node is a detached container, its children being the
    /// top level nodes of the markup in document order.
    fn parse(&self, markup: &str) -> Result<Self::Node>;

    /// Look up a node by its `id` attribute.
    fn find(&self, id: &str) -> Option<Self::Node>;

    fn create_element(&self, tag: &str) -> Result<Self::Node>;

    fn create_text(&self, content: &str) -> Self::Node;

    fn kind(&self, node: &Self::Node) -> NodeKind;

    /// All attributes specified on an element, in document order. Empty for non-elements.
    fn attributes(&self, node: &Self::Node) -> Vec<(String, String)>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<()>;

    /// Replace the contents of a text node.
    fn set_text(&self, node: &Self::Node, content: &str) -> Result<()>;

    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Insert `child` as the last child of `parent`, detaching it from any previous parent.
    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<()>;

    fn remove_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<()>;

    /// Subscribe `callback` to `event` on `node`. Each call adds a new subscription.
    fn listen(&self, node: &Self::Node, event: &str, callback: Listener) -> Result<()>;
}
