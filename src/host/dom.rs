use js_sys::Function;
use wasm_bindgen::{prelude::Closure, JsCast, JsValue};
use web_sys::{Document, Element, Event, Node};

use super::{Host, Listener, NodeKind};
use crate::{Error, Result};

/// [`Host`] backed by the browser document, through [`web_sys`].
pub struct DomHost {
    /// A reference to the [`Document`], so that nodes can be created as required.
    document: Document,
}

impl DomHost {
    /// Attach to the document of the global `window`. Also configures the panic hook to log to
    /// `console.error`.
    pub fn new() -> Result<Self> {
        console_error_panic_hook::set_once();

        let document = web_sys::window()
            .ok_or_else(|| Error::host("no global `window` exists"))?
            .document()
            .ok_or_else(|| Error::host("should have a document on window"))?;

        Ok(Self { document })
    }

    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    fn element<'a>(&self, node: &'a Node) -> Result<&'a Element> {
        node.dyn_ref::<Element>()
            .ok_or_else(|| Error::host(format!("{node:?} is not an element")))
    }
}

/// Carry a thrown JS value across as a host error.
fn js_error(value: JsValue) -> Error {
    Error::host(
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}")),
    )
}

impl Host for DomHost {
    type Node = Node;

    fn parse(&self, markup: &str) -> Result<Node> {
        let container = self.document.create_element("div").map_err(js_error)?;
        container.set_inner_html(markup);

        Ok(container.into())
    }

    fn find(&self, id: &str) -> Option<Node> {
        self.document.get_element_by_id(id).map(Into::into)
    }

    fn create_element(&self, tag: &str) -> Result<Node> {
        self.document
            .create_element(tag)
            .map(Into::into)
            .map_err(js_error)
    }

    fn create_text(&self, content: &str) -> Node {
        self.document.create_text_node(content).into()
    }

    fn kind(&self, node: &Node) -> NodeKind {
        match node.node_type() {
            Node::ELEMENT_NODE => node
                .dyn_ref::<Element>()
                .map(|element| NodeKind::Element(element.tag_name().to_ascii_lowercase()))
                .unwrap_or(NodeKind::Other),
            Node::TEXT_NODE => NodeKind::Text(node.text_content().unwrap_or_default()),
            _ => NodeKind::Other,
        }
    }

    fn attributes(&self, node: &Node) -> Vec<(String, String)> {
        let Some(element) = node.dyn_ref::<Element>() else {
            return Vec::new();
        };

        element
            .get_attribute_names()
            .iter()
            .filter_map(|name| name.as_string())
            .filter_map(|name| {
                let value = element.get_attribute(&name)?;
                Some((name, value))
            })
            .collect()
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn set_attribute(&self, node: &Node, name: &str, value: &str) -> Result<()> {
        self.element(node)?
            .set_attribute(name, value)
            .map_err(js_error)
    }

    fn set_text(&self, node: &Node, content: &str) -> Result<()> {
        if node.node_type() != Node::TEXT_NODE {
            return Err(Error::host(format!("{node:?} is not a text node")));
        }

        node.set_text_content(Some(content));
        Ok(())
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.get(i)).collect()
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn append_child(&self, parent: &Node, child: &Node) -> Result<()> {
        parent.append_child(child).map(|_| ()).map_err(js_error)
    }

    fn remove_child(&self, parent: &Node, child: &Node) -> Result<()> {
        parent.remove_child(child).map(|_| ()).map_err(js_error)
    }

    fn listen(&self, node: &Node, event: &str, callback: Listener) -> Result<()> {
        // Ownership of the closure passes to JS, it lives as long as the listener does
        let function: Function = Closure::<dyn Fn(Event)>::new(move |_event: Event| callback())
            .into_js_value()
            .unchecked_into();

        node.add_event_listener_with_callback(event, &function)
            .map_err(js_error)
    }
}
