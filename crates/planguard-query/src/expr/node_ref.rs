//! Identity references to expression nodes.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A reference compared and hashed by address, not by value.
///
/// Two structurally equal sub-expressions at different positions of a tree
/// are different nodes, so per-node analysis results are keyed by identity.
pub struct NodeRef<'a, T>(&'a T);

impl<'a, T> NodeRef<'a, T> {
    /// Wraps a node reference.
    #[must_use]
    pub fn of(node: &'a T) -> Self {
        Self(node)
    }

    /// Returns the referenced node.
    #[must_use]
    pub fn node(&self) -> &'a T {
        self.0
    }
}

impl<T> Clone for NodeRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<'_, T> {}

impl<T> PartialEq for NodeRef<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl<T> Eq for NodeRef<'_, T> {}

impl<T> Hash for NodeRef<'_, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.0, state);
    }
}

impl<T: fmt::Debug> fmt::Debug for NodeRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({:p}: {:?})", self.0, self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn identity_not_value() {
        let nodes = [1, 1];
        let first = NodeRef::of(&nodes[0]);
        let second = NodeRef::of(&nodes[1]);

        assert_ne!(first, second);
        assert_eq!(first, NodeRef::of(&nodes[0]));

        let mut map = HashMap::new();
        map.insert(first, "first");
        map.insert(second, "second");
        assert_eq!(map.len(), 2);
        assert_eq!(map[&NodeRef::of(&nodes[1])], "second");
    }
}
