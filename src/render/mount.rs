use std::rc::Rc;

use tracing::{error, trace, warn};

use super::Scope;
use crate::{
    app::Owner,
    component::InstanceId,
    host::Host,
    skeleton::{Attr, Handler, Skeleton},
    App, Result,
};

/// Instantiate `skeleton` as the last child of `parent`.
///
/// With a `scope`, every text and attribute value is interpolated against the instance's state and
/// event attributes are subscribed to. Without one (page level) values are inserted as they are.
///
/// Elements that carry both component placeholder markers get an instance of that component
/// mounted inside them, in place of their own children.
///
/// A failure part way through leaves whatever was already built attached.
pub fn mount<H>(
    app: &App<H>,
    parent: &H::Node,
    skeleton: &Skeleton,
    scope: Option<&Scope>,
) -> Result<()>
where
    H: Host + 'static,
{
    let host = app.host();

    let node = match skeleton {
        Skeleton::Text(text) => {
            let text = host.create_text(&Scope::resolve(scope, text)?);
            return host.append_child(parent, &text);
        }
        Skeleton::Node(node) => node,
    };

    let element = host.create_element(&node.tag)?;

    for (name, attr) in &node.attrs {
        match attr {
            Attr::Value(value) => {
                host.set_attribute(&element, name, &Scope::resolve(scope, value)?)?;
            }
            Attr::Event(handler) => match scope {
                Some(scope) => subscribe(app, &element, handler, scope.id)?,
                None => warn!(attribute = %name, "event handler without an instance, skipped"),
            },
        }
    }

    if let Some((component, key)) = node.placeholder() {
        let component = Scope::resolve(scope, component)?;
        let key = Scope::resolve(scope, key)?;

        trace!(tag = %node.tag, %component, %key, "mounting placeholder");
        let owner = scope.map_or(Owner::Page, |scope| Owner::Instance(scope.id));
        app.mount_instance(&component, &key, &element, owner)?;
    } else {
        for child in &node.children {
            mount(app, &element, child, scope)?;
        }
    }

    trace!(tag = %node.tag, "mounted node");

    host.append_child(parent, &element)
}

/// Subscribe `element` to the handler's event. The handler is looked up by name, and handed a
/// fresh context of the instance, each time the event fires.
fn subscribe<H>(app: &App<H>, element: &H::Node, handler: &Handler, id: &InstanceId) -> Result<()>
where
    H: Host + 'static,
{
    let app_ref = app.downgrade();
    let id = id.clone();
    let method = handler.method.clone();

    trace!(event = %handler.event, %method, %id, "subscribing handler");

    app.host().listen(
        element,
        &handler.event,
        Rc::new(move || {
            // The app is gone, so is everything it mounted
            let Some(app) = app_ref.upgrade() else { return };

            if let Err(e) = app.invoke(&id, &method) {
                error!(%id, %method, error = %e, "event handler failed");
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        host::{Host, MemoryHost},
        skeleton::build_markup,
    };

    fn skeleton(host: &MemoryHost, markup: &str) -> Skeleton {
        build_markup(host, markup, None).unwrap().remove(0)
    }

    #[test]
    fn mounts_with_interpolation_in_scope() {
        let app = App::new(MemoryHost::new());
        let host = app.host();
        let parent = host.create_element("div").unwrap();
        let id = InstanceId::new("card", "a");
        let state = json!({ "title": "hi", "kind": "big" });

        let skeleton = skeleton(host, r#"<h1 class="{{kind}}">{{title}}!</h1>"#);
        mount(&app, &parent, &skeleton, Some(&Scope { id: &id, state: &state })).unwrap();

        assert_eq!(host.inner_markup(&parent), r#"<h1 class="big">hi!</h1>"#);
    }

    #[test]
    fn page_level_mount_keeps_placeholders_verbatim() {
        let app = App::new(MemoryHost::new());
        let host = app.host();
        let parent = host.create_element("div").unwrap();

        let skeleton = skeleton(host, r#"<p title="{{x}}">{{y}}</p>"#);
        mount(&app, &parent, &skeleton, None).unwrap();

        assert_eq!(host.inner_markup(&parent), r#"<p title="{{x}}">{{y}}</p>"#);
    }

    #[test]
    fn lookup_failure_stops_the_mount() {
        let app = App::new(MemoryHost::new());
        let host = app.host();
        let parent = host.create_element("div").unwrap();
        let id = InstanceId::new("card", "a");
        let state = json!({ "a": 1 });

        let skeleton = skeleton(host, "<ul><li>{{a}}</li><li>{{b}}</li></ul>");
        let result = mount(&app, &parent, &skeleton, Some(&Scope { id: &id, state: &state }));

        assert!(matches!(result, Err(crate::Error::Lookup { .. })));
        // The failing <ul> was never appended to the parent
        assert!(host.children(&parent).is_empty());
    }
}
