use tracing::{trace, warn};

use super::{Attr, Handler, Skeleton, SkeletonNode};
use crate::{
    host::{Host, NodeKind},
    interpolate::first_placeholder,
    Error, Result,
};

/// The methods an event attribute may be bound to. Implemented by component definitions, whose
/// methods are resolved once when their skeleton is built.
pub trait MethodNamespace {
    /// Name of the owning component, for diagnostics.
    fn owner(&self) -> &str;

    fn has_method(&self, name: &str) -> bool;
}

/// Whether an attribute subscribes to an event, eg `onclick`.
pub fn is_event_attribute(name: &str) -> bool {
    name.len() > 2 && name.starts_with("on")
}

/// Resolve the value of an event attribute to a method name. The value may be the bare name
/// (`increment`), a placeholder (`{{increment}}`, only the first one counts), or the name under the
/// `methods` namespace (`methods.increment`).
pub fn resolve_handler(namespace: &dyn MethodNamespace, value: &str) -> Result<String> {
    let path = first_placeholder(value).unwrap_or_else(|| value.trim());
    let name = path.strip_prefix("methods.").unwrap_or(path);

    if let Some(segment) = name.split('.').next().filter(|_| name.contains('.')) {
        // Methods are not nested, so the first segment can't be followed
        return Err(Error::lookup(path, segment));
    }

    if !namespace.has_method(name) {
        return Err(Error::lookup(path, name));
    }

    trace!(component = namespace.owner(), method = name, "resolved handler");
    Ok(name.to_string())
}

/// Build the skeleton of a host node. Whitespace only text and non element nodes (comments and
/// the like) produce [`None`].
///
/// Event attributes are resolved against `owner` straight away. Without an owner there is nothing
/// to bind them to, so they are kept as plain attributes.
pub fn build<H>(
    host: &H,
    node: &H::Node,
    owner: Option<&dyn MethodNamespace>,
) -> Result<Option<Skeleton>>
where
    H: Host + ?Sized,
{
    let tag = match host.kind(node) {
        NodeKind::Text(text) if text.trim().is_empty() => return Ok(None),
        NodeKind::Text(text) => return Ok(Some(Skeleton::Text(text))),
        NodeKind::Other => return Ok(None),
        NodeKind::Element(tag) => tag,
    };

    let mut skeleton = SkeletonNode {
        tag,
        attrs: Default::default(),
        children: Vec::new(),
    };

    for (name, value) in host.attributes(node) {
        let attr = match owner {
            Some(owner) if is_event_attribute(&name) => Attr::Event(Handler {
                event: name[2..].to_string(),
                method: resolve_handler(owner, &value)?,
            }),
            None if is_event_attribute(&name) => {
                warn!(attribute = %name, "event attribute outside of a component, kept verbatim");
                Attr::Value(value)
            }
            _ => Attr::Value(value),
        };

        skeleton.attrs.insert(name, attr);
    }

    for child in host.children(node) {
        if let Some(child) = build(host, &child, owner)? {
            skeleton.children.push(child);
        }
    }

    trace!(tag = %skeleton.tag, children = skeleton.children.len(), "built skeleton node");

    Ok(Some(Skeleton::Node(skeleton)))
}

/// Parse `markup` with the host and build a skeleton for each top level node that produces one.
pub fn build_markup<H>(
    host: &H,
    markup: &str,
    owner: Option<&dyn MethodNamespace>,
) -> Result<Vec<Skeleton>>
where
    H: Host + ?Sized,
{
    let container = host.parse(markup)?;

    host.children(&container)
        .iter()
        .filter_map(|child| build(host, child, owner).transpose())
        .collect()
}
