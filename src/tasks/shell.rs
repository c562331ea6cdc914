use std::{
    io::{BufRead, Write},
    str::FromStr,
};

use thiserror::Error;

use super::{task_node::is_valid_name, TaskError, TaskMgr};

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("missing option")]
    MissingOption,
    #[error("missing option after ({0})")]
    MissingOptionAfter(String),
    #[error("illegal option ({0})")]
    IllegalOption(String),
    #[error("extra option ({0})")]
    ExtraOption(String),
    #[error("illegal command ({0})")]
    UnknownCommand(String),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ShellError {
    /// Errors from the output side end the session; everything else only
    /// fails the current line.
    fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Io(_))
    }
}

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New { name: String, load: u64 },
    Assign { load: u64, repeat: usize },
    Remove { name: String },
    Query { name: String },
    Min,
    Print { json: bool },
    Count,
    Clear,
}

/// Keywords with the number of leading characters that must be typed.
const KEYWORDS: [(&str, usize); 8] = [
    ("NEW", 1),
    ("ASSIGN", 1),
    ("REMOVE", 1),
    ("QUERY", 1),
    ("MIN", 1),
    ("PRINT", 1),
    ("COUNT", 2),
    ("CLEAR", 2),
];

/// Case-insensitive match of `token` against a prefix of `keyword` at least
/// `mandatory` characters long.
fn matches_keyword(keyword: &str, token: &str, mandatory: usize) -> bool {
    token.len() >= mandatory
        && token.len() <= keyword.len()
        && keyword[..token.len()].eq_ignore_ascii_case(token)
}

fn parse_name(token: &str) -> Result<String, ShellError> {
    if is_valid_name(token) {
        Ok(token.to_string())
    } else {
        Err(ShellError::IllegalOption(token.to_string()))
    }
}

fn parse_load(token: &str) -> Result<u64, ShellError> {
    token
        .parse()
        .map_err(|_| ShellError::IllegalOption(token.to_string()))
}

fn no_extra(options: &[&str]) -> Result<(), ShellError> {
    match options.first() {
        Some(extra) => Err(ShellError::ExtraOption(extra.to_string())),
        None => Ok(()),
    }
}

fn single_name(options: &[&str]) -> Result<String, ShellError> {
    let (name, rest) = options.split_first().ok_or(ShellError::MissingOption)?;
    no_extra(rest)?;
    parse_name(name)
}

fn parse_assign(options: &[&str]) -> Result<Command, ShellError> {
    let mut load = None;
    let mut repeat = None;
    let mut tokens = options.iter();
    while let Some(token) = tokens.next() {
        if matches_keyword("-REPEAT", token, 2) {
            if repeat.is_some() {
                return Err(ShellError::ExtraOption(token.to_string()));
            }
            let count = tokens
                .next()
                .ok_or_else(|| ShellError::MissingOptionAfter(token.to_string()))?;
            let count: usize = count
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ShellError::IllegalOption(count.to_string()))?;
            repeat = Some(count);
        } else if load.is_none() {
            load = Some(parse_load(token)?);
        } else {
            return Err(ShellError::ExtraOption(token.to_string()));
        }
    }
    Ok(Command::Assign {
        load: load.ok_or(ShellError::MissingOption)?,
        repeat: repeat.unwrap_or(1),
    })
}

impl FromStr for Command {
    type Err = ShellError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (keyword, options) = tokens.split_first().ok_or(ShellError::MissingOption)?;
        let (name, _) = KEYWORDS
            .iter()
            .find(|(name, mandatory)| matches_keyword(name, keyword, *mandatory))
            .ok_or_else(|| ShellError::UnknownCommand(keyword.to_string()))?;

        match *name {
            "NEW" => match options {
                [] => Err(ShellError::MissingOption),
                [name] => Err(ShellError::MissingOptionAfter(name.to_string())),
                [name, load, rest @ ..] => {
                    no_extra(rest)?;
                    Ok(Command::New {
                        name: parse_name(name)?,
                        load: parse_load(load)?,
                    })
                }
            },
            "ASSIGN" => parse_assign(options),
            "REMOVE" => Ok(Command::Remove {
                name: single_name(options)?,
            }),
            "QUERY" => Ok(Command::Query {
                name: single_name(options)?,
            }),
            "PRINT" => match options {
                [] => Ok(Command::Print { json: false }),
                [format, rest @ ..] if format.eq_ignore_ascii_case("json") => {
                    no_extra(rest)?;
                    Ok(Command::Print { json: true })
                }
                [other, ..] => Err(ShellError::IllegalOption(other.to_string())),
            },
            other => {
                no_extra(options)?;
                Ok(match other {
                    "MIN" => Command::Min,
                    "COUNT" => Command::Count,
                    _ => Command::Clear,
                })
            }
        }
    }
}

/// Line-oriented command interpreter over a `TaskMgr`.
pub struct Shell<W: Write> {
    mgr: TaskMgr,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(mgr: TaskMgr, out: W) -> Self {
        Self { mgr, out }
    }

    pub fn mgr(&self) -> &TaskMgr {
        &self.mgr
    }

    pub fn into_inner(self) -> (TaskMgr, W) {
        (self.mgr, self.out)
    }

    pub fn execute(&mut self, command: Command) -> Result<(), ShellError> {
        trace!("executing {command:?}");
        match command {
            Command::New { name, load } => {
                if !self.mgr.add(name.as_str(), load)? {
                    return Err(TaskError::AlreadyExists(name).into());
                }
                writeln!(self.out, "Machine \"{name}\" added with load {load}.")?;
            }
            Command::Assign { load, repeat } => {
                for _ in 0..repeat {
                    let node = self.mgr.assign(load)?;
                    writeln!(
                        self.out,
                        "Task assigned to \"{}\", load is now {}.",
                        node.name, node.load
                    )?;
                }
            }
            Command::Remove { name } => {
                if !self.mgr.remove(&name) {
                    return Err(TaskError::NotFound(name).into());
                }
                writeln!(self.out, "Machine \"{name}\" removed.")?;
            }
            Command::Query { name } => {
                let node = self.mgr.query(&name).ok_or(TaskError::NotFound(name))?;
                writeln!(self.out, "{} {}", node.name, node.load)?;
            }
            Command::Min => {
                let node = self.mgr.min().ok_or(TaskError::NoMachines)?;
                writeln!(
                    self.out,
                    "The least loaded machine is {} ({}).",
                    node.name, node.load
                )?;
            }
            Command::Print { json: true } => {
                let rendered = serde_json::to_string_pretty(&self.mgr.snapshot())?;
                writeln!(self.out, "{rendered}")?;
            }
            Command::Print { json: false } => {
                for node in self.mgr.iter_by_name() {
                    writeln!(self.out, "{} {}", node.name, node.load)?;
                }
            }
            Command::Count => match self.mgr.len() {
                0 => writeln!(self.out, "There is no machine.")?,
                1 => writeln!(self.out, "There is 1 machine.")?,
                n => writeln!(self.out, "There are {n} machines.")?,
            },
            Command::Clear => self.mgr.clear(),
        }
        Ok(())
    }

    /// Parses and executes one line. Blank lines and `//` comments are skipped.
    pub fn run_line(&mut self, line: &str) -> Result<(), ShellError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            return Ok(());
        }
        let command = line.parse()?;
        self.execute(command)
    }

    /// Runs every line of `input`, reporting failed commands to the output
    /// and carrying on. Bytes that are not UTF-8 are replaced, so such a
    /// line fails like any other bad command. Returns how many lines failed.
    pub fn run<R: BufRead>(&mut self, mut input: R) -> Result<usize, ShellError> {
        let mut failed = 0;
        let mut number = 0;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            number += 1;
            let line = String::from_utf8_lossy(&buf);
            match self.run_line(&line) {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("line {number}: {e}");
                    writeln!(self.out, "Error: {e}")?;
                    failed += 1;
                }
            }
        }
        self.out.flush()?;
        Ok(failed)
    }
}
