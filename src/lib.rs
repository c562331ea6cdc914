pub mod cli;
pub mod containers;
pub mod tasks;

#[macro_use]
extern crate log;
