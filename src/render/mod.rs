//! Turning skeletons into host nodes, and keeping those nodes in step with state.
//!
//! [`mount()`] creates a fresh subtree from a skeleton. [`update()`] later walks that same
//! subtree alongside the same skeleton, child index by child index, rewriting text and attribute
//! values in place. Nothing is created, removed, or reordered by an update, so the two only line
//! up while the subtree is left exactly as [`mount()`] made it.

mod mount;
mod update;

use serde_json::Value;

pub use mount::mount;
pub use update::update;

use crate::{component::InstanceId, interpolate::interpolate, Result};

/// The instance a skeleton is being mounted for.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub id: &'a InstanceId,
    pub state: &'a Value,
}

impl Scope<'_> {
    /// Interpolate `text` against the instance's state. Outside of an instance (at page level),
    /// text is used verbatim.
    pub(crate) fn resolve(scope: Option<&Self>, text: &str) -> Result<String> {
        match scope {
            Some(scope) => interpolate(text, scope.state),
            None => Ok(text.to_string()),
        }
    }
}
