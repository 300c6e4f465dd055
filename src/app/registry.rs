use std::{cell::RefCell, collections::HashMap, rc::Rc};

use serde_json::Value;
use tracing::warn;

use crate::{
    component::{ComponentDefinition, InstanceId},
    host::Host,
    Error, Result,
};

/// A live instance of a component.
pub(crate) struct Instance<H>
where
    H: Host,
{
    /// Current state, replaced wholesale on every state change.
    pub state: Value,

    /// Wrapper node created at mount time. Its first child is the instance's rendered root.
    pub host_root: H::Node,

    /// Instances mounted from placeholders inside this instance's subtree.
    pub children: Vec<InstanceId>,
}

/// Component definitions and live instances. Every borrow is released before a method returns, so
/// hooks and handlers are free to call back into the [`crate::App`].
pub(crate) struct Registry<H>
where
    H: Host + 'static,
{
    definitions: RefCell<HashMap<String, Rc<ComponentDefinition<H>>>>,
    instances: RefCell<HashMap<InstanceId, Instance<H>>>,
}

impl<H> Registry<H>
where
    H: Host + 'static,
{
    pub fn new() -> Self {
        Self {
            definitions: RefCell::new(HashMap::new()),
            instances: RefCell::new(HashMap::new()),
        }
    }

    pub fn define(&self, definition: ComponentDefinition<H>) {
        let name = definition.name().to_string();

        if self
            .definitions
            .borrow_mut()
            .insert(name.clone(), Rc::new(definition))
            .is_some()
        {
            warn!(component = %name, "component redefined, live instances keep the old skeleton");
        }
    }

    pub fn definition(&self, name: &str) -> Result<Rc<ComponentDefinition<H>>> {
        self.definitions
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::missing_component(name))
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.instances.borrow().contains_key(id)
    }

    pub fn insert(&self, id: InstanceId, state: Value, host_root: H::Node) -> Result<()> {
        let mut instances = self.instances.borrow_mut();

        if instances.contains_key(&id) {
            return Err(Error::DuplicateInstance {
                component: id.component,
                key: id.key,
            });
        }

        instances.insert(
            id,
            Instance {
                state,
                host_root,
                children: Vec::new(),
            },
        );

        Ok(())
    }

    fn with<T>(&self, id: &InstanceId, f: impl FnOnce(&mut Instance<H>) -> T) -> Result<T> {
        self.instances
            .borrow_mut()
            .get_mut(id)
            .map(f)
            .ok_or_else(|| Error::missing_instance(&id.component, &id.key))
    }

    pub fn state(&self, id: &InstanceId) -> Result<Value> {
        self.with(id, |instance| instance.state.clone())
    }

    pub fn host_root(&self, id: &InstanceId) -> Result<H::Node> {
        self.with(id, |instance| instance.host_root.clone())
    }

    /// Swap in a new state, returning the previous one.
    pub fn replace_state(&self, id: &InstanceId, state: Value) -> Result<Value> {
        self.with(id, |instance| std::mem::replace(&mut instance.state, state))
    }

    /// Record `child` as mounted within `parent`'s subtree.
    pub fn adopt(&self, parent: &InstanceId, child: InstanceId) -> Result<()> {
        self.with(parent, |instance| instance.children.push(child))
    }

    pub fn children(&self, id: &InstanceId) -> Result<Vec<InstanceId>> {
        self.with(id, |instance| instance.children.clone())
    }

    /// Forget an instance, including any record of it being mounted within another.
    pub fn release(&self, id: &InstanceId) -> Option<Instance<H>> {
        let mut instances = self.instances.borrow_mut();

        instances
            .values_mut()
            .for_each(|instance| instance.children.retain(|child| child != id));

        instances.remove(id)
    }

    /// Ids of every live instance, sorted.
    pub fn ids(&self) -> Vec<InstanceId> {
        let mut ids = self.instances.borrow().keys().cloned().collect::<Vec<_>>();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::host::{Host, MemoryHost};

    #[test]
    fn misses_are_loud() {
        let registry = Registry::<MemoryHost>::new();
        let id = InstanceId::new("counter", "a");

        assert_eq!(
            registry.definition("counter").err(),
            Some(Error::missing_component("counter"))
        );
        assert_eq!(
            registry.state(&id),
            Err(Error::missing_instance("counter", "a"))
        );
    }

    #[test]
    fn state_is_replaced_not_merged() {
        let host = MemoryHost::new();
        let registry = Registry::<MemoryHost>::new();
        let id = InstanceId::new("counter", "a");

        registry
            .insert(id.clone(), json!({ "a": 1, "b": 2 }), host.create_element("div").unwrap())
            .unwrap();

        let previous = registry.replace_state(&id, json!({ "a": 3 })).unwrap();
        assert_eq!(previous, json!({ "a": 1, "b": 2 }));
        assert_eq!(registry.state(&id).unwrap(), json!({ "a": 3 }));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let host = MemoryHost::new();
        let registry = Registry::<MemoryHost>::new();
        let id = InstanceId::new("counter", "a");

        registry
            .insert(id.clone(), json!({}), host.create_element("div").unwrap())
            .unwrap();

        assert_eq!(
            registry.insert(id, json!({}), host.create_element("div").unwrap()),
            Err(Error::DuplicateInstance {
                component: "counter".into(),
                key: "a".into()
            })
        );
    }
}
