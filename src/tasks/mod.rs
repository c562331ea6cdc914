pub mod builder;
pub mod shell;
pub mod task_mgr;
mod task_node;

use thiserror::Error;

use crate::containers::ContainerError;

pub use builder::TaskMgrBuilder;
pub use shell::{Command, Shell, ShellError};
pub use task_mgr::{TaskMgr, TaskSnapshot};
pub use task_node::TaskNode;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("machine name must not be empty")]
    EmptyName,
    #[error("illegal machine name \"{0}\"")]
    IllegalName(String),
    #[error("no machine is registered")]
    NoMachines,
    #[error("load of machine \"{0}\" would overflow")]
    LoadOverflow(String),
    #[error("machine \"{0}\" does not exist")]
    NotFound(String),
    #[error("machine \"{0}\" already exists")]
    AlreadyExists(String),
    #[error(transparent)]
    Container(#[from] ContainerError),
}
