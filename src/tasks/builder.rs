use std::marker::PhantomData;

use super::{TaskError, TaskMgr, TaskNode};

pub trait TaskMgrBuilderState {}

/// The builder's initial state
pub struct Empty {}
impl TaskMgrBuilderState for Empty {}

/// The builder has a bucket count and may be built
pub struct WithBuckets {}
impl TaskMgrBuilderState for WithBuckets {}

/// A builder that implements the Typestate pattern to construct a `TaskMgr`.
pub struct TaskMgrBuilder<State: TaskMgrBuilderState> {
    bucket_count: usize,
    machines: Vec<TaskNode>,
    state: PhantomData<State>,
}

impl TaskMgrBuilder<Empty> {
    pub fn new() -> Self {
        TaskMgrBuilder {
            bucket_count: 0,
            machines: Vec::new(),
            state: PhantomData,
        }
    }

    /// The bucket count of the name index. It is fixed for the manager's lifetime.
    pub fn with_buckets(self, bucket_count: usize) -> TaskMgrBuilder<WithBuckets> {
        TaskMgrBuilder {
            bucket_count,
            machines: self.machines,
            state: PhantomData,
        }
    }
}

impl Default for TaskMgrBuilder<Empty> {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskMgrBuilder<WithBuckets> {
    /// Machines registered at build time. Later duplicates are dropped.
    pub fn with_machines<I>(mut self, machines: I) -> Self
    where
        I: IntoIterator<Item = TaskNode>,
    {
        self.machines.extend(machines);
        self
    }

    /// Can only be called once the bucket count is known.
    pub fn build(self) -> Result<TaskMgr, TaskError> {
        let mut mgr = TaskMgr::with_buckets(self.bucket_count)?;
        let wanted = self.machines.len();
        let added = mgr.add_many(self.machines)?;
        if added < wanted {
            warn!("{} duplicate machine(s) ignored", wanted - added);
        }
        info!(
            "task manager ready: {} machine(s) over {} bucket(s)",
            added, self.bucket_count
        );
        Ok(mgr)
    }
}
