#[macro_use]
extern crate log;
extern crate pretty_env_logger;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader};

use clap::Parser;
use bucketheap::cli::Args;
use bucketheap::tasks::{Shell, TaskMgrBuilder};



fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let args = Args::parse();

    // Ensure arguments are valid
    args.validate()?;
    let machines = args.initial_machines()?;

    let mgr = TaskMgrBuilder::new()
        .with_buckets(args.buckets)
        .with_machines(machines)
        .build()?;

    // Run the script, or whatever arrives on stdin
    let stdout = io::stdout();
    let mut shell = Shell::new(mgr, stdout.lock());
    let failed = match &args.script {
        Some(path) => shell.run(BufReader::new(File::open(path)?))?,
        None => shell.run(io::stdin().lock())?,
    };
    if failed > 0 {
        warn!("{failed} command(s) failed");
    }
    Ok(())
}
