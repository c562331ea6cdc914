use std::{fs::File, io::BufReader, path::{Path, PathBuf}};

use clap::Parser;
use thiserror::Error;

use crate::tasks::TaskNode;



#[derive(Error, Debug)]
pub enum CliError {
    #[error("bucket count must be greater than zero")]
    BucketsNotGreaterThanZeroError,
    #[error("cannot read task manifest {}: {source}", .path.display())]
    ManifestIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed task manifest {}: {source}", .path.display())]
    ManifestFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}



/// Balances tasks over machines kept in a fixed-bucket hash set and a min heap,
/// driven by a command script :)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Number of buckets in the machine name index, fixed for the whole run
    #[arg(short, long, default_value_t = 97)]
    pub buckets: usize,

    /// Number of idle machines to create at start, named machine0, machine1, ...
    #[arg(short, long, default_value_t = 0)]
    pub machines: usize,

    /// JSON manifest of initial machines: [{"name": "...", "load": 0}, ...]
    #[arg(short, long)]
    pub tasks: Option<PathBuf>,

    /// Command script to run, stdin when absent
    #[arg(short, long)]
    pub script: Option<PathBuf>,
}

impl Args {
    /// Checks what clap cannot express.
    pub fn validate(&self) -> Result<(), CliError> {
        if !(self.buckets > 0) {
            return Err(CliError::BucketsNotGreaterThanZeroError);
        }
        Ok(())
    }

    /// The idle machines plus whatever the manifest lists.
    pub fn initial_machines(&self) -> Result<Vec<TaskNode>, CliError> {
        let mut machines: Vec<TaskNode> = (0..self.machines)
            .map(|i| TaskNode::new(format!("machine{i}"), 0))
            .collect();
        if let Some(path) = &self.tasks {
            machines.extend(load_manifest(path)?);
        }
        Ok(machines)
    }
}

pub fn load_manifest(path: &Path) -> Result<Vec<TaskNode>, CliError> {
    let file = File::open(path).map_err(|source| CliError::ManifestIo {
        path: path.to_path_buf(),
        source,
    })?;
    let machines: Vec<TaskNode> = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        CliError::ManifestFormat {
            path: path.to_path_buf(),
            source,
        }
    })?;
    debug!("loaded {} machine(s) from {}", machines.len(), path.display());
    Ok(machines)
}
