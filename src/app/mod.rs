//! The application: registered components, live instances, the active page, and the lifecycle
//! that ties them together.

mod page;
mod registry;

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use serde_json::Value;
use tracing::{debug, instrument};

pub use page::Page;
use registry::Registry;

use crate::{
    component::{ComponentDefinition, Context, Hook, InstanceId},
    error::Missing,
    host::Host,
    render::{self, Scope},
    Error, Result,
};

/// Tag of the node every instance is wrapped in.
pub const WRAPPER_TAG: &str = "div";

/// Who an instance is being mounted for.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Owner<'a> {
    /// A placeholder in the active page.
    Page,

    /// A placeholder in another instance's subtree.
    Instance(&'a InstanceId),

    /// A direct call to [`App::render()`].
    Caller,
}

struct AppInner<H>
where
    H: Host + 'static,
{
    host: H,
    registry: Registry<H>,
    page: RefCell<Option<Rc<Page<H>>>>,

    /// Instances mounted by the outermost mount in progress, in tree order, waiting on their
    /// `connected` hook.
    connecting: RefCell<Option<Vec<InstanceId>>>,
}

/// Handle to an application. Cloning the handle shares the application.
///
/// Every entry point runs to completion before returning, hooks included. Hooks and handlers may
/// call straight back into the app (eg `set_state` from an `updated` hook), which recurses.
pub struct App<H>(Rc<AppInner<H>>)
where
    H: Host + 'static;

/// A handle that doesn't keep the application alive, held by event subscriptions.
pub(crate) struct WeakApp<H>(Weak<AppInner<H>>)
where
    H: Host + 'static;

impl<H> WeakApp<H>
where
    H: Host + 'static,
{
    pub fn upgrade(&self) -> Option<App<H>> {
        self.0.upgrade().map(App)
    }
}

impl<H> Clone for App<H>
where
    H: Host + 'static,
{
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<H> App<H>
where
    H: Host + 'static,
{
    pub fn new(host: H) -> Self {
        Self(Rc::new(AppInner {
            host,
            registry: Registry::new(),
            page: RefCell::new(None),
            connecting: RefCell::new(None),
        }))
    }

    pub fn host(&self) -> &H {
        &self.0.host
    }

    pub(crate) fn downgrade(&self) -> WeakApp<H> {
        WeakApp(Rc::downgrade(&self.0))
    }

    /// Register a component definition. A later definition with the same name replaces it.
    pub fn register(&self, definition: ComponentDefinition<H>) -> &Self {
        debug!(component = definition.name(), "registering component");
        self.0.registry.define(definition);
        self
    }

    pub fn definition(&self, name: &str) -> Result<Rc<ComponentDefinition<H>>> {
        self.0.registry.definition(name)
    }

    /// Make `page` the active page, replacing any previous one. Nothing is mounted until
    /// [`Self::run()`].
    pub fn register_page(&self, page: Page<H>) -> &Self {
        debug!(page = page.name(), path = page.path(), "registering page");
        *self.0.page.borrow_mut() = Some(Rc::new(page));
        self
    }

    pub fn page(&self) -> Option<Rc<Page<H>>> {
        self.0.page.borrow().clone()
    }

    /// Mount the active page into the node with id `container`.
    ///
    /// Fires the page's `created` hook, mounts every top level node of the page (and with them,
    /// an instance for every component placeholder), then fires `connected`.
    #[instrument(skip(self))]
    pub fn run(&self, container: &str) -> Result<()> {
        let page = self.page().ok_or(Error::RegistryMiss(Missing::Page))?;
        let target = self
            .host()
            .find(container)
            .ok_or_else(|| Error::RegistryMiss(Missing::Container(container.to_string())))?;

        page.hooks().fire(Hook::Created, self)?;

        self.connecting(|| {
            for skeleton in page.skeleton(self.host())? {
                render::mount(self, &target, skeleton, None)?;

                if let Some(node) = self.host().children(&target).pop() {
                    page.mounted.borrow_mut().push(node);
                }
            }

            Ok(())
        })?;

        debug!(page = page.name(), instances = page.elements.borrow().len(), "page mounted");

        page.hooks().fire(Hook::Connected, self)
    }

    /// Tear down the active page: disconnect its instances, remove its nodes, then fire its
    /// `disconnected` hook.
    #[instrument(skip(self))]
    pub fn stop(&self) -> Result<()> {
        let page = self.page().ok_or(Error::RegistryMiss(Missing::Page))?;

        let elements = page.elements();
        for id in elements.values() {
            if self.0.registry.contains(id) {
                self.disconnect(&id.component, &id.key)?;
            }
        }

        let mounted = std::mem::take(&mut *page.mounted.borrow_mut());
        for node in mounted {
            if let Some(parent) = self.host().parent(&node) {
                self.host().remove_child(&parent, &node)?;
            }
        }

        page.hooks().fire(Hook::Disconnected, self)
    }

    /// Mount a new instance of `component`, under `key`, as the last child of `parent`.
    pub fn render(&self, component: &str, key: &str, parent: &H::Node) -> Result<()> {
        self.mount_instance(component, key, parent, Owner::Caller)
    }

    /// Run `mount`, then fire `connected` for every instance it mounted, once all of their nodes
    /// are in place. Mounts nested inside `mount` join the outermost one.
    ///
    /// On failure the queued instances stay mounted but never see `connected`.
    fn connecting(&self, mount: impl FnOnce() -> Result<()>) -> Result<()> {
        if self.0.connecting.borrow().is_some() {
            return mount();
        }

        *self.0.connecting.borrow_mut() = Some(Vec::new());
        let result = mount();
        let queued = self.0.connecting.borrow_mut().take().unwrap_or_default();
        result?;

        for id in queued {
            // An earlier hook may have disconnected it already
            if !self.0.registry.contains(&id) {
                continue;
            }

            self.definition(&id.component)?
                .hooks()
                .fire(Hook::Connected, &self.context(&id)?)?;
        }

        Ok(())
    }

    /// Mount an instance, recording it against the page or instance that owns the placeholder.
    ///
    /// The instance is registered before its `created` hook, then its subtree is mounted into a
    /// fresh wrapper node and the wrapper appended to `parent`. `connected` fires once the
    /// outermost mount this is part of has finished.
    #[instrument(skip(self, parent, owner))]
    pub(crate) fn mount_instance(
        &self,
        component: &str,
        key: &str,
        parent: &H::Node,
        owner: Owner,
    ) -> Result<()> {
        self.connecting(|| self.mount_detached(component, key, parent, owner))
    }

    fn mount_detached(
        &self,
        component: &str,
        key: &str,
        parent: &H::Node,
        owner: Owner,
    ) -> Result<()> {
        let host = self.host();
        let definition = self.definition(component)?;
        let skeleton = definition.skeleton(host)?;
        let id = InstanceId::new(component, key);

        let host_root = host.create_element(WRAPPER_TAG)?;
        self.0.registry.insert(
            id.clone(),
            definition.initial_state(host, parent),
            host_root.clone(),
        )?;

        match owner {
            Owner::Instance(owner) => self.0.registry.adopt(owner, id.clone())?,
            Owner::Page => {
                if let Some(page) = self.page() {
                    page.elements
                        .borrow_mut()
                        .insert(key.to_string(), id.clone());
                }
            }
            Owner::Caller => {}
        }

        definition.hooks().fire(Hook::Created, &self.context(&id)?)?;

        if let Some(queue) = self.0.connecting.borrow_mut().as_mut() {
            queue.push(id.clone());
        }

        // `created` may already have replaced the state
        let state = self.0.registry.state(&id)?;
        render::mount(self, &host_root, skeleton, Some(&Scope { id: &id, state: &state }))?;
        host.append_child(parent, &host_root)?;

        debug!(%id, "instance mounted");

        Ok(())
    }

    /// Replace an instance's state wholesale, push it into the instance's host nodes, then fire
    /// any affected watchers and the `updated` hook.
    ///
    /// Before the instance's subtree exists (from within its `created` hook) the state is only
    /// stored, it is picked up by the mount that follows.
    #[instrument(skip(self, state))]
    pub fn set_state(&self, component: &str, key: &str, state: Value) -> Result<()> {
        let host = self.host();
        let definition = self.definition(component)?;
        let id = InstanceId::new(component, key);

        let previous = self.0.registry.replace_state(&id, state.clone())?;
        let host_root = self.0.registry.host_root(&id)?;

        let Some(root) = host.children(&host_root).into_iter().next() else {
            debug!(%id, "instance not rendered yet, state stored");
            return Ok(());
        };

        render::update(host, &root, definition.skeleton(host)?, &state)?;

        let context = self.context(&id)?;
        definition.fire_watchers(&context, &previous, &state)?;
        definition.hooks().fire(Hook::Updated, &context)
    }

    /// Remove an instance's nodes from the host tree, disconnect any instances mounted within it,
    /// fire its `disconnected` hook, and forget it.
    #[instrument(skip(self))]
    pub fn disconnect(&self, component: &str, key: &str) -> Result<()> {
        let host = self.host();
        let definition = self.definition(component)?;
        let id = InstanceId::new(component, key);
        let host_root = self.0.registry.host_root(&id)?;

        if let Some(parent) = host.parent(&host_root) {
            host.remove_child(&parent, &host_root)?;
        }

        for child in self.0.registry.children(&id)? {
            if self.0.registry.contains(&child) {
                self.disconnect(&child.component, &child.key)?;
            }
        }

        let result = definition
            .hooks()
            .fire(Hook::Disconnected, &self.context(&id)?);

        self.0.registry.release(&id);
        if let Some(page) = self.page() {
            page.elements
                .borrow_mut()
                .retain(|_, existing| existing != &id);
        }

        debug!(%id, "instance disconnected");

        result
    }

    /// Invoke a method of an instance, as its event subscription does.
    pub fn invoke(&self, id: &InstanceId, method: &str) -> Result<()> {
        let definition = self.definition(&id.component)?;
        let method_fn = definition
            .method(method)
            .cloned()
            .ok_or_else(|| Error::lookup(method, method))?;

        method_fn(&self.context(id)?)
    }

    /// A bound context for the instance, reflecting its current state.
    pub fn context(&self, id: &InstanceId) -> Result<Context<H>> {
        let state = self.0.registry.state(id)?;
        let host_root = self.0.registry.host_root(id)?;

        Ok(Context {
            id: id.clone(),
            root: self.host().children(&host_root).into_iter().next(),
            state,
            app: self.clone(),
        })
    }

    pub fn state(&self, component: &str, key: &str) -> Result<Value> {
        self.0.registry.state(&InstanceId::new(component, key))
    }

    /// The rendered root node of an instance (the first child of its wrapper).
    pub fn root(&self, component: &str, key: &str) -> Result<Option<H::Node>> {
        self.context(&InstanceId::new(component, key))
            .map(|context| context.root)
    }

    /// Ids of every live instance, sorted.
    pub fn instances(&self) -> Vec<InstanceId> {
        self.0.registry.ids()
    }
}
