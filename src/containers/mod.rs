pub mod bucket_set;
pub mod cursor;
pub mod min_heap;

use thiserror::Error;

pub use bucket_set::{BucketSet, Iter};
pub use cursor::Cursor;
pub use min_heap::IndexedMinHeap;

/// Contract violations reported by the containers.
///
/// "Not found" and "already present" are not errors; those come back as `bool`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerError {
    #[error("bucket count must be greater than zero")]
    ZeroBuckets,
    #[error("index {index} is out of range for a heap of size {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("the heap is empty")]
    EmptyHeap,
    #[error("cursor is already at the end")]
    CursorPastEnd,
    #[error("cursor is already at the first element")]
    CursorBeforeBegin,
}
