use std::{
    cell::{OnceCell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use tracing::debug;

use super::App;
use crate::{
    component::{Hook, Hooks, InstanceId},
    host::Host,
    skeleton::{build_markup, Skeleton},
    Result,
};

/// The top level markup of an application. Component placeholders within it are where instances
/// get mounted.
pub struct Page<H>
where
    H: Host + 'static,
{
    path: String,
    name: String,
    contents: Rc<dyn Fn() -> String>,
    hooks: Hooks<App<H>>,

    /// Built once, on the first run.
    skeleton: OnceCell<Vec<Skeleton>>,

    /// Instances mounted from the page's own placeholders, by instance key.
    pub(super) elements: RefCell<BTreeMap<String, InstanceId>>,

    /// Top level host nodes mounted by the last run.
    pub(super) mounted: RefCell<Vec<H::Node>>,
}

impl<H> Page<H>
where
    H: Host + 'static,
{
    pub fn new<P, N, C>(path: P, name: N, contents: C) -> Self
    where
        P: AsRef<str>,
        N: AsRef<str>,
        C: 'static + Fn() -> String,
    {
        Self {
            path: path.as_ref().to_string(),
            name: name.as_ref().to_string(),
            contents: Rc::new(contents),
            hooks: Hooks::default(),
            skeleton: OnceCell::new(),
            elements: RefCell::new(BTreeMap::new()),
            mounted: RefCell::new(Vec::new()),
        }
    }

    pub fn on<F>(mut self, hook: Hook, f: F) -> Self
    where
        F: 'static + Fn(&App<H>) -> Result<()>,
    {
        self.hooks.set(hook, f);
        self
    }

    /// Runs before anything is mounted.
    pub fn on_created<F>(self, f: F) -> Self
    where
        F: 'static + Fn(&App<H>) -> Result<()>,
    {
        self.on(Hook::Created, f)
    }

    /// Runs once the page, and every instance on it, is mounted.
    pub fn on_connected<F>(self, f: F) -> Self
    where
        F: 'static + Fn(&App<H>) -> Result<()>,
    {
        self.on(Hook::Connected, f)
    }

    /// Runs when the page is stopped, after its nodes are removed.
    pub fn on_disconnected<F>(self, f: F) -> Self
    where
        F: 'static + Fn(&App<H>) -> Result<()>,
    {
        self.on(Hook::Disconnected, f)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hooks(&self) -> &Hooks<App<H>> {
        &self.hooks
    }

    /// Instances mounted from this page's placeholders, by key.
    pub fn elements(&self) -> BTreeMap<String, InstanceId> {
        self.elements.borrow().clone()
    }

    /// Page skeletons have no owning component, so event attributes in page markup are plain
    /// attributes.
    pub fn skeleton(&self, host: &H) -> Result<&[Skeleton]> {
        if let Some(skeleton) = self.skeleton.get() {
            return Ok(skeleton);
        }

        let skeleton = build_markup(host, &(self.contents)(), None)?;
        debug!(page = %self.name, roots = skeleton.len(), "built page skeleton");

        Ok(self.skeleton.get_or_init(|| skeleton))
    }
}
