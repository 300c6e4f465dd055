use std::fmt::Display;

/// Position of a host node relative to the root of a walk, as the child index taken at each
/// level. Used to point at the offending node when host and skeleton disagree.
#[derive(Clone, Hash, PartialEq, Eq, Debug, Default)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut child = self.clone();
        child.0.push(index);
        child
    }
}

impl AsRef<[usize]> for NodePath {
    fn as_ref(&self) -> &[usize] {
        self.0.as_ref()
    }
}

impl Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "root");
        }

        write!(
            f,
            "{}",
            self.0
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(".")
        )
    }
}
