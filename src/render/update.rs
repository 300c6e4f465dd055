use serde_json::Value;
use tracing::trace;

use crate::{
    host::{Host, NodeKind},
    interpolate::interpolate,
    skeleton::Skeleton,
    util::NodePath,
    Error, Result,
};

/// Push `state` into a subtree previously mounted from `skeleton`, rooted at `node`.
///
/// Host child `i` is paired with skeleton child `i`. Event subscriptions are left as they are, and
/// component placeholders are not descended into, their instance owns that subtree. Any
/// divergence between the host subtree and the skeleton (child count, node kind, or tag) fails
/// with [`Error::StructuralMismatch`].
pub fn update<H>(host: &H, node: &H::Node, skeleton: &Skeleton, state: &Value) -> Result<()>
where
    H: Host + ?Sized,
{
    walk(host, node, skeleton, state, &NodePath::root())
}

fn walk<H>(
    host: &H,
    node: &H::Node,
    skeleton: &Skeleton,
    state: &Value,
    path: &NodePath,
) -> Result<()>
where
    H: Host + ?Sized,
{
    let skeleton = match (skeleton, host.kind(node)) {
        (Skeleton::Text(text), NodeKind::Text(current)) => {
            let text = interpolate(text, state)?;

            if text != current {
                trace!(%path, "updating text");
                host.set_text(node, &text)?;
            }

            return Ok(());
        }
        (Skeleton::Node(skeleton), NodeKind::Element(tag)) if skeleton.tag == tag => skeleton,
        (skeleton, found) => {
            return Err(Error::mismatch(path, describe(skeleton), describe_kind(&found)));
        }
    };

    for (name, value) in skeleton.values() {
        host.set_attribute(node, name, &interpolate(value, state)?)?;
    }

    if skeleton.placeholder().is_some() {
        return Ok(());
    }

    let children = host.children(node);
    if children.len() != skeleton.children.len() {
        return Err(Error::mismatch(
            path,
            format!("{} children", skeleton.children.len()),
            format!("{} children", children.len()),
        ));
    }

    children
        .iter()
        .zip(&skeleton.children)
        .enumerate()
        .try_for_each(|(i, (child, child_skeleton))| {
            walk(host, child, child_skeleton, state, &path.child(i))
        })
}

fn describe(skeleton: &Skeleton) -> String {
    match skeleton {
        Skeleton::Text(_) => "text".to_string(),
        Skeleton::Node(node) => format!("<{}>", node.tag),
    }
}

fn describe_kind(kind: &NodeKind) -> String {
    match kind {
        NodeKind::Text(_) => "text".to_string(),
        NodeKind::Element(tag) => format!("<{tag}>"),
        NodeKind::Other => "a non element node".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        component::InstanceId,
        host::{MemoryHost, MemoryNode},
        render::{mount, Scope},
        skeleton::build_markup,
        App,
    };

    const MARKUP: &str = r#"<div class="{{kind}}"><span>{{count}}</span><i>static</i></div>"#;

    fn mounted(app: &App<MemoryHost>, state: &serde_json::Value) -> (Skeleton, MemoryNode) {
        let host = app.host();
        let skeleton = build_markup(host, MARKUP, None).unwrap().remove(0);
        let parent = host.create_element("section").unwrap();
        let id = InstanceId::new("test", "a");

        mount(app, &parent, &skeleton, Some(&Scope { id: &id, state })).unwrap();
        let root = host.children(&parent).remove(0);

        (skeleton, root)
    }

    #[test]
    fn rewrites_values_in_place() {
        let app = App::new(MemoryHost::new());
        let host = app.host();
        let (skeleton, root) = mounted(&app, &json!({ "kind": "a", "count": 0 }));
        let span = host.children(&root)[0].clone();
        let text = host.children(&span)[0].clone();

        update(host, &root, &skeleton, &json!({ "kind": "b", "count": 5 })).unwrap();

        assert_eq!(
            host.to_markup(&root),
            r#"<div class="b"><span>5</span><i>static</i></div>"#
        );
        assert_eq!(host.children(&root)[0], span);
        assert_eq!(host.children(&span)[0], text);
    }

    #[test]
    fn extra_host_child_is_a_mismatch() {
        let app = App::new(MemoryHost::new());
        let host = app.host();
        let (skeleton, root) = mounted(&app, &json!({ "kind": "a", "count": 0 }));

        let stray = host.create_element("b").unwrap();
        host.append_child(&root, &stray).unwrap();

        assert_eq!(
            update(host, &root, &skeleton, &json!({ "kind": "a", "count": 1 })),
            Err(Error::mismatch("root", "2 children", "3 children"))
        );
    }

    #[test]
    fn replaced_child_is_a_mismatch() {
        let app = App::new(MemoryHost::new());
        let host = app.host();
        let (skeleton, root) = mounted(&app, &json!({ "kind": "a", "count": 0 }));

        let span = host.children(&root)[0].clone();
        let text = host.children(&span)[0].clone();
        host.remove_child(&span, &text).unwrap();
        host.append_child(&span, &host.create_element("em").unwrap())
            .unwrap();

        assert_eq!(
            update(host, &root, &skeleton, &json!({ "kind": "a", "count": 1 })),
            Err(Error::mismatch("0.0", "text", "<em>"))
        );
    }
}
