use std::fmt::Display;

/// Identifies a live instance: the component it was mounted from, and its key.
#[derive(Clone, Hash, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub struct InstanceId {
    pub component: String,
    pub key: String,
}

impl InstanceId {
    pub fn new(component: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            key: key.into(),
        }
    }
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.component, self.key)
    }
}
