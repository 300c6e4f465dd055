mod context;
mod hooks;
mod identifier;

use std::{cell::OnceCell, collections::HashMap, rc::Rc};

use serde_json::Value;
use tracing::{debug, warn};

pub use self::context::Context;
pub use self::hooks::{Hook, HookFn, Hooks};
pub use self::identifier::InstanceId;
use crate::{
    host::Host,
    interpolate::lookup,
    skeleton::{build_markup, MethodNamespace, Skeleton},
    util::HashMapList,
    Error, Result,
};

/// An event handler, invoked with the context of the instance whose node fired the event.
pub type MethodFn<H> = Rc<dyn Fn(&Context<H>) -> Result<()>>;

/// Called when the value at a watched state path changes, with the value it held before.
pub type WatchFn<H> = Rc<dyn Fn(&Context<H>, &Value) -> Result<()>>;

/// Produces the markup for a component.
pub type RenderFn = Rc<dyn Fn() -> String>;

/// Everything needed to mount instances of a component.
///
/// The skeleton is built from [`Self::render`] the first time an instance is mounted, then cached
/// here and shared by every instance. It holds no instance data: values are interpolated against
/// each instance's own state, and event attributes only record a method *name*, which is looked up
/// and called with the instance's context when the event fires.
pub struct ComponentDefinition<H>
where
    H: Host + 'static,
{
    name: String,
    initial_state: Value,
    methods: HashMap<String, MethodFn<H>>,
    render: RenderFn,
    hooks: Hooks<Context<H>>,

    /// Attributes of the node an instance is mounted into, copied into its initial state.
    attributes: Vec<String>,

    watch: HashMapList<String, WatchFn<H>>,
    skeleton: OnceCell<Skeleton>,
}

impl<H> ComponentDefinition<H>
where
    H: Host + 'static,
{
    pub fn new<S, R>(name: S, render: R) -> Self
    where
        S: AsRef<str>,
        R: 'static + Fn() -> String,
    {
        Self {
            name: name.as_ref().to_string(),
            initial_state: Value::Object(Default::default()),
            methods: HashMap::new(),
            render: Rc::new(render),
            hooks: Hooks::default(),
            attributes: Vec::new(),
            watch: HashMapList::new(),
            skeleton: OnceCell::new(),
        }
    }

    /// State every instance starts from.
    pub fn with_state(mut self, state: Value) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_method<S, F>(mut self, name: S, method: F) -> Self
    where
        S: AsRef<str>,
        F: 'static + Fn(&Context<H>) -> Result<()>,
    {
        self.methods
            .insert(name.as_ref().to_string(), Rc::new(method));
        self
    }

    /// Copy these attributes off the node an instance is mounted into, as strings, into the
    /// instance's initial state.
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    /// Run `watcher` whenever a state change alters the value at `path`.
    pub fn watch<S, F>(mut self, path: S, watcher: F) -> Self
    where
        S: AsRef<str>,
        F: 'static + Fn(&Context<H>, &Value) -> Result<()>,
    {
        self.watch
            .insert(path.as_ref().to_string(), Rc::new(watcher));
        self
    }

    pub fn on<F>(mut self, hook: Hook, f: F) -> Self
    where
        F: 'static + Fn(&Context<H>) -> Result<()>,
    {
        self.hooks.set(hook, f);
        self
    }

    pub fn on_created<F>(self, f: F) -> Self
    where
        F: 'static + Fn(&Context<H>) -> Result<()>,
    {
        self.on(Hook::Created, f)
    }

    pub fn on_connected<F>(self, f: F) -> Self
    where
        F: 'static + Fn(&Context<H>) -> Result<()>,
    {
        self.on(Hook::Connected, f)
    }

    pub fn on_disconnected<F>(self, f: F) -> Self
    where
        F: 'static + Fn(&Context<H>) -> Result<()>,
    {
        self.on(Hook::Disconnected, f)
    }

    pub fn on_updated<F>(self, f: F) -> Self
    where
        F: 'static + Fn(&Context<H>) -> Result<()>,
    {
        self.on(Hook::Updated, f)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hooks(&self) -> &Hooks<Context<H>> {
        &self.hooks
    }

    pub fn method(&self, name: &str) -> Option<&MethodFn<H>> {
        self.methods.get(name)
    }

    /// The cached skeleton, if an instance has been mounted yet.
    pub fn cached_skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.get()
    }

    /// The component's skeleton, building and caching it on first use. The render output must
    /// have exactly one root node.
    pub fn skeleton(&self, host: &H) -> Result<&Skeleton> {
        if let Some(skeleton) = self.skeleton.get() {
            return Ok(skeleton);
        }

        let markup = (self.render)();
        let [root]: [Skeleton; 1] =
            build_markup(host, &markup, Some(self))?
                .try_into()
                .map_err(|roots: Vec<Skeleton>| Error::InvalidRender {
                    component: self.name.clone(),
                    roots: roots.len(),
                })?;

        debug!(component = %self.name, nodes = root.node_count(), "cached skeleton");

        Ok(self.skeleton.get_or_init(|| root))
    }

    /// State for a new instance, mounted into `target`.
    pub(crate) fn initial_state(&self, host: &H, target: &H::Node) -> Value {
        let mut state = self.initial_state.clone();

        if self.attributes.is_empty() {
            return state;
        }

        let Value::Object(fields) = &mut state else {
            warn!(component = %self.name, "attributes ignored, initial state is not an object");
            return state;
        };

        for name in &self.attributes {
            if let Some(value) = host.attribute(target, name) {
                fields.insert(name.clone(), Value::String(value));
            }
        }

        state
    }

    /// Call every watcher whose path reads differently in `previous` and `current`. A path that
    /// doesn't resolve reads as `null`.
    pub(crate) fn fire_watchers(
        &self,
        context: &Context<H>,
        previous: &Value,
        current: &Value,
    ) -> Result<()> {
        for (path, watcher) in &self.watch {
            let before = lookup(previous, path).unwrap_or(&Value::Null);
            let after = lookup(current, path).unwrap_or(&Value::Null);

            if before != after {
                debug!(component = %self.name, path = %path, "watched value changed");
                watcher(context, before)?;
            }
        }

        Ok(())
    }
}

impl<H> MethodNamespace for ComponentDefinition<H>
where
    H: Host + 'static,
{
    fn owner(&self) -> &str {
        &self.name
    }

    fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use super::*;
    use crate::host::{Host, MemoryHost};

    #[test]
    fn skeleton_is_built_once() {
        let renders = Rc::new(Cell::new(0));
        let definition = ComponentDefinition::<MemoryHost>::new("counter", {
            let renders = Rc::clone(&renders);
            move || {
                renders.set(renders.get() + 1);
                "<span>{{count}}</span>".to_string()
            }
        });
        let host = MemoryHost::new();

        assert!(definition.cached_skeleton().is_none());
        let first = definition.skeleton(&host).unwrap().clone();
        let second = definition.skeleton(&host).unwrap();

        assert_eq!(&first, second);
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn render_needs_a_single_root() {
        let host = MemoryHost::new();
        let definition =
            ComponentDefinition::<MemoryHost>::new("pair", || "<p>a</p><p>b</p>".to_string());

        assert_eq!(
            definition.skeleton(&host),
            Err(Error::InvalidRender {
                component: "pair".into(),
                roots: 2
            })
        );
        assert!(definition.cached_skeleton().is_none());
    }

    #[test]
    fn failed_handler_resolution_is_not_cached() {
        let host = MemoryHost::new();
        let definition = ComponentDefinition::<MemoryHost>::new("broken", || {
            r#"<button onclick="{{nothing}}"></button>"#.to_string()
        });

        assert_eq!(
            definition.skeleton(&host),
            Err(Error::lookup("nothing", "nothing"))
        );
        assert!(definition.cached_skeleton().is_none());
    }

    #[test]
    fn attributes_seed_initial_state() {
        let host = MemoryHost::new();
        let target = host.create_element("div").unwrap();
        host.set_attribute(&target, "title", "hello").unwrap();

        let definition = ComponentDefinition::<MemoryHost>::new("card", String::new)
            .with_state(json!({ "title": "default", "open": false }))
            .with_attributes(["title", "subtitle"]);

        assert_eq!(
            definition.initial_state(&host, &target),
            json!({ "title": "hello", "open": false })
        );
    }
}
