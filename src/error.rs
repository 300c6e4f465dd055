use std::fmt::Display;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Something that was expected to be registered, but wasn't.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// No component definition with this name.
    Component(String),

    /// No live instance with this key for the component.
    Instance { component: String, key: String },

    /// No host node with this identifier to mount into.
    Container(String),

    /// [`crate::App::run()`] was called before a page was registered.
    Page,
}

impl Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Missing::Component(name) => write!(f, "component `{name}` is not registered"),
            Missing::Instance { component, key } => {
                write!(f, "component `{component}` has no instance `{key}`")
            }
            Missing::Container(id) => write!(f, "no container with id `{id}`"),
            Missing::Page => write!(f, "no page has been registered"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("lookup of `{path}` failed: `{segment}` is undefined")]
    Lookup { path: String, segment: String },

    #[error("placeholders in `{text}` never settle")]
    Unsettled { text: String },

    #[error("registry miss: {0}")]
    RegistryMiss(Missing),

    #[error("structural mismatch at `{path}`: expected {expected}, found {found}")]
    StructuralMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("component `{component}` already has a live instance `{key}`")]
    DuplicateInstance { component: String, key: String },

    #[error("component `{component}` must render exactly one root node, found {roots}")]
    InvalidRender { component: String, roots: usize },

    #[error("markup error at {position}: {message}")]
    Markup { position: usize, message: String },

    #[error("host error: {0}")]
    Host(String),
}

impl Error {
    pub fn lookup(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::Lookup {
            path: path.into(),
            segment: segment.into(),
        }
    }

    pub fn missing_component(name: impl Into<String>) -> Self {
        Self::RegistryMiss(Missing::Component(name.into()))
    }

    pub fn missing_instance(component: impl Into<String>, key: impl Into<String>) -> Self {
        Self::RegistryMiss(Missing::Instance {
            component: component.into(),
            key: key.into(),
        })
    }

    pub fn mismatch(
        path: impl Display,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::StructuralMismatch {
            path: path.to_string(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn markup(position: usize, message: impl Into<String>) -> Self {
        Self::Markup {
            position,
            message: message.into(),
        }
    }

    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_miss_names_the_missing_thing() {
        let error = Error::missing_instance("counter", "a");
        assert_eq!(
            error.to_string(),
            "registry miss: component `counter` has no instance `a`"
        );
    }

    #[test]
    fn mismatch_reports_path() {
        let error = Error::mismatch("0.2", "3 children", "2 children");
        assert_eq!(
            error.to_string(),
            "structural mismatch at `0.2`: expected 3 children, found 2 children"
        );
    }
}
