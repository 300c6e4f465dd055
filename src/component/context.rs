use serde_json::Value;

use super::InstanceId;
use crate::{host::Host, interpolate::lookup, App, Result};

/// What hooks and event handlers of an instance get to see: who they are, the state at the time
/// of the call, the rendered root node, and a way to replace the state.
pub struct Context<H>
where
    H: Host + 'static,
{
    pub(crate) id: InstanceId,
    pub(crate) root: Option<H::Node>,
    pub(crate) state: Value,
    pub(crate) app: App<H>,
}

impl<H> Context<H>
where
    H: Host + 'static,
{
    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn component(&self) -> &str {
        &self.id.component
    }

    pub fn key(&self) -> &str {
        &self.id.key
    }

    /// The instance's rendered root node. [`None`] until the instance's subtree has been mounted,
    /// so it is absent in `created` hooks.
    pub fn root(&self) -> Option<&H::Node> {
        self.root.as_ref()
    }

    /// State as it was when this context was handed out.
    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Read a dotted path out of [`Self::state()`].
    pub fn get(&self, path: &str) -> Result<&Value> {
        lookup(&self.state, path)
    }

    pub fn app(&self) -> &App<H> {
        &self.app
    }

    /// Replace this instance's state wholesale and re-render it. See [`App::set_state()`].
    pub fn set_state(&self, state: Value) -> Result<()> {
        self.app.set_state(&self.id.component, &self.id.key, state)
    }
}
