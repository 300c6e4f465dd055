use std::rc::Rc;

use crate::Result;

/// A lifecycle callback, receiving the context of whatever it is attached to.
pub type HookFn<C> = Rc<dyn Fn(&C) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Registered, but nothing is mounted yet.
    Created,

    /// Fully mounted and inserted into its host parent.
    Connected,

    /// Removed from its host parent.
    Disconnected,

    /// State replaced and pushed into the host nodes.
    Updated,
}

/// Optional lifecycle callbacks. Only the ones that are present get called.
pub struct Hooks<C> {
    pub created: Option<HookFn<C>>,
    pub connected: Option<HookFn<C>>,
    pub disconnected: Option<HookFn<C>>,
    pub updated: Option<HookFn<C>>,
}

impl<C> Hooks<C> {
    pub fn set<F>(&mut self, hook: Hook, f: F)
    where
        F: 'static + Fn(&C) -> Result<()>,
    {
        let slot = match hook {
            Hook::Created => &mut self.created,
            Hook::Connected => &mut self.connected,
            Hook::Disconnected => &mut self.disconnected,
            Hook::Updated => &mut self.updated,
        };

        *slot = Some(Rc::new(f));
    }

    pub fn get(&self, hook: Hook) -> Option<&HookFn<C>> {
        match hook {
            Hook::Created => self.created.as_ref(),
            Hook::Connected => self.connected.as_ref(),
            Hook::Disconnected => self.disconnected.as_ref(),
            Hook::Updated => self.updated.as_ref(),
        }
    }

    /// Call `hook` if it is present.
    pub fn fire(&self, hook: Hook, context: &C) -> Result<()> {
        match self.get(hook) {
            Some(f) => f(context),
            None => Ok(()),
        }
    }
}

impl<C> Default for Hooks<C> {
    fn default() -> Self {
        Self {
            created: None,
            connected: None,
            disconnected: None,
            updated: None,
        }
    }
}

impl<C> Clone for Hooks<C> {
    fn clone(&self) -> Self {
        Self {
            created: self.created.clone(),
            connected: self.connected.clone(),
            disconnected: self.disconnected.clone(),
            updated: self.updated.clone(),
        }
    }
}
