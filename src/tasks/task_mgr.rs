use serde::Serialize;

use crate::containers::{BucketSet, IndexedMinHeap, Iter};

use super::{
    task_node::{is_valid_name, LoadEntry, TaskNode},
    TaskError,
};

/// Machines indexed twice: by name in a `BucketSet`, and by load in an
/// `IndexedMinHeap`. Both always hold the same machines with the same loads.
pub struct TaskMgr {
    by_name: BucketSet<TaskNode>,
    by_load: IndexedMinHeap<LoadEntry>,
}

/// Serializable view of a `TaskMgr`, machines sorted by load.
#[derive(Debug, Serialize)]
pub struct TaskSnapshot {
    pub buckets: usize,
    pub machines: Vec<TaskNode>,
}

impl TaskMgr {
    pub(crate) fn with_buckets(bucket_count: usize) -> Result<Self, TaskError> {
        Ok(Self {
            by_name: BucketSet::new(bucket_count)?,
            by_load: IndexedMinHeap::new(),
        })
    }

    /// Registers a machine. Returns `false` if one with the same name exists.
    ///
    /// Names are letters, digits and underscores, not starting with a digit.
    pub fn add<N: Into<String>>(&mut self, name: N, load: u64) -> Result<bool, TaskError> {
        let node = TaskNode::new(name, load);
        if node.name.is_empty() {
            return Err(TaskError::EmptyName);
        }
        if !is_valid_name(&node.name) {
            return Err(TaskError::IllegalName(node.name));
        }
        let entry = LoadEntry::from(&node);
        if !self.by_name.insert(node) {
            debug!("machine {:?} already registered", entry.name);
            return Ok(false);
        }
        debug!("machine {:?} added with load {}", entry.name, entry.load);
        self.by_load.insert(entry);
        Ok(true)
    }

    /// Adds every node, returning how many were new.
    pub fn add_many<I>(&mut self, nodes: I) -> Result<usize, TaskError>
    where
        I: IntoIterator<Item = TaskNode>,
    {
        let mut added = 0;
        for node in nodes {
            if self.add(node.name, node.load)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Gives `load` to the least loaded machine and returns its new state.
    pub fn assign(&mut self, load: u64) -> Result<TaskNode, TaskError> {
        let min = self.by_load.peek_min().ok_or(TaskError::NoMachines)?;
        let total = min
            .load
            .checked_add(load)
            .ok_or_else(|| TaskError::LoadOverflow(min.name.clone()))?;

        let mut entry = self.by_load.delete_min()?;
        entry.load = total;
        let node = TaskNode::from(entry.clone());
        self.by_load.insert(entry);
        let replaced = self.by_name.upsert(node.clone());
        debug_assert!(replaced, "name index lost machine {:?}", node.name);

        info!("assigned load {load} to {:?}, now at {total}", node.name);
        Ok(node)
    }

    /// Removes the named machine from both indexes.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(stored) = self.by_name.take(&TaskNode::probe(name)) else {
            return false;
        };
        let removed = self
            .by_load
            .iter()
            .position(|entry| entry.name == stored.name)
            .and_then(|pos| self.by_load.delete_at(pos).ok());
        if removed.is_none() {
            error!("machine {name:?} was missing from the load index");
        }
        debug!("machine {name:?} removed");
        true
    }

    /// The registered machine with this name, load included.
    pub fn query(&self, name: &str) -> Option<TaskNode> {
        let mut node = TaskNode::probe(name);
        self.by_name.lookup_canonical(&mut node).then_some(node)
    }

    /// The least loaded machine.
    pub fn min(&self) -> Option<TaskNode> {
        self.by_load.peek_min().cloned().map(TaskNode::from)
    }

    pub fn len(&self) -> usize {
        self.by_load.size()
    }

    pub fn is_empty(&self) -> bool {
        self.by_load.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_name.clear();
        self.by_load.clear();
    }

    pub fn num_buckets(&self) -> usize {
        self.by_name.num_buckets()
    }

    /// Machines in name-index order.
    pub fn iter_by_name(&self) -> Iter<'_, TaskNode> {
        self.by_name.iter()
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            buckets: self.num_buckets(),
            machines: self
                .by_load
                .clone()
                .into_sorted_vec()
                .into_iter()
                .map(TaskNode::from)
                .collect(),
        }
    }
}
