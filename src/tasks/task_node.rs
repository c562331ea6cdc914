use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A machine and the total load assigned to it.
///
/// Two nodes are the same machine when their names match; the load is
/// payload and takes no part in hashing or equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNode {
    pub name: String,
    #[serde(default)]
    pub load: u64,
}

impl TaskNode {
    pub fn new<N: Into<String>>(name: N, load: u64) -> Self {
        Self {
            name: name.into(),
            load,
        }
    }

    /// A node that only carries a name, for lookups.
    pub(crate) fn probe(name: &str) -> Self {
        Self::new(name, 0)
    }
}

/// Letters, digits and underscores, not starting with a digit.
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Hash for TaskNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

impl PartialEq for TaskNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TaskNode {}

/// Heap entry ordering machines by load, then by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct LoadEntry {
    pub(crate) load: u64,
    pub(crate) name: String,
}

impl From<&TaskNode> for LoadEntry {
    fn from(node: &TaskNode) -> Self {
        Self {
            load: node.load,
            name: node.name.clone(),
        }
    }
}

impl From<LoadEntry> for TaskNode {
    fn from(entry: LoadEntry) -> Self {
        Self {
            name: entry.name,
            load: entry.load,
        }
    }
}
