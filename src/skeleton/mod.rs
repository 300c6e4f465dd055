//! Skeletons: the immutable template a subtree is mounted from and later updated against.
//!
//! A skeleton mirrors the host nodes it was built from, minus whitespace only text. Attribute and
//! text values keep their placeholders, they are only resolved against state when mounted or
//! updated, so one skeleton can back every instance of a component.

mod builder;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use builder::{build, build_markup, is_event_attribute, resolve_handler, MethodNamespace};

/// Marks an element as the mount point of a component instance, naming the component.
pub const COMPONENT_ATTRIBUTE: &str = "data-component";

/// Marks an element as the mount point of a component instance, naming the instance key.
pub const KEY_ATTRIBUTE: &str = "data-key";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Skeleton {
    /// A text leaf, possibly containing placeholders.
    Text(String),

    Node(SkeletonNode),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonNode {
    pub tag: String,

    pub attrs: BTreeMap<String, Attr>,

    /// Children in host order. Mounted subtrees correspond to this index for index.
    pub children: Vec<Skeleton>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attr {
    /// Plain attribute value, possibly containing placeholders.
    Value(String),

    /// Event attribute, bound to a method of the owning component when mounted.
    Event(Handler),
}

/// A method of the owning component, subscribed to a host event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handler {
    /// Host event name, eg `click` for an `onclick` attribute.
    pub event: String,

    /// Name of the method to invoke.
    pub method: String,
}

impl Skeleton {
    pub fn as_node(&self) -> Option<&SkeletonNode> {
        match self {
            Skeleton::Node(node) => Some(node),
            Skeleton::Text(_) => None,
        }
    }

    /// Total number of skeleton nodes, text leaves included.
    pub fn node_count(&self) -> usize {
        match self {
            Skeleton::Text(_) => 1,
            Skeleton::Node(node) => {
                1 + node
                    .children
                    .iter()
                    .map(Skeleton::node_count)
                    .sum::<usize>()
            }
        }
    }
}

impl SkeletonNode {
    /// Plain attribute values, skipping event handlers.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().filter_map(|(name, attr)| match attr {
            Attr::Value(value) => Some((name.as_str(), value.as_str())),
            Attr::Event(_) => None,
        })
    }

    pub fn handlers(&self) -> impl Iterator<Item = &Handler> {
        self.attrs.values().filter_map(|attr| match attr {
            Attr::Event(handler) => Some(handler),
            Attr::Value(_) => None,
        })
    }

    /// The raw `(component, key)` pair if this node is a component placeholder.
    pub fn placeholder(&self) -> Option<(&str, &str)> {
        match (
            self.attrs.get(COMPONENT_ATTRIBUTE),
            self.attrs.get(KEY_ATTRIBUTE),
        ) {
            (Some(Attr::Value(component)), Some(Attr::Value(key))) => {
                Some((component.as_str(), key.as_str()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn counter() -> Skeleton {
        Skeleton::Node(SkeletonNode {
            tag: "button".into(),
            attrs: BTreeMap::from([
                ("class".into(), Attr::Value("n-{{count}}".into())),
                (
                    "onclick".into(),
                    Attr::Event(Handler {
                        event: "click".into(),
                        method: "increment".into(),
                    }),
                ),
            ]),
            children: vec![Skeleton::Text("{{count}}".into())],
        })
    }

    #[test]
    fn serialises_as_plain_data() {
        let value = serde_json::to_value(counter()).unwrap();

        assert_eq!(
            value,
            json!({
                "tag": "button",
                "attrs": {
                    "class": "n-{{count}}",
                    "onclick": { "event": "click", "method": "increment" },
                },
                "children": ["{{count}}"],
            })
        );
        assert_eq!(serde_json::from_value::<Skeleton>(value).unwrap(), counter());
    }

    #[test]
    fn splits_values_from_handlers() {
        let skeleton = counter();
        let node = skeleton.as_node().unwrap();

        assert_eq!(node.values().collect::<Vec<_>>(), vec![("class", "n-{{count}}")]);
        assert_eq!(node.handlers().count(), 1);
        assert_eq!(node.placeholder(), None);
        assert_eq!(skeleton.node_count(), 2);
    }

    #[test]
    fn placeholder_needs_both_markers() {
        let mut node = SkeletonNode {
            tag: "div".into(),
            attrs: BTreeMap::from([(COMPONENT_ATTRIBUTE.into(), Attr::Value("counter".into()))]),
            children: Vec::new(),
        };
        assert_eq!(node.placeholder(), None);

        node.attrs
            .insert(KEY_ATTRIBUTE.into(), Attr::Value("first".into()));
        assert_eq!(node.placeholder(), Some(("counter", "first")));
    }
}
