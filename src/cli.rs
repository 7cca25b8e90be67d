//! Command-line parsing.

use std::ffi::OsString;
use std::path::PathBuf;

use lexopt::prelude::*;

pub const USAGE: &str = "Usage: nanoserve [-l port] [-s path] [-c config.yaml] [--legacy]";

/// Flags given on the command line. `None` means "not given", so lower
/// configuration layers keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub port: Option<u16>,
    pub root_path: Option<String>,
    pub config_file: Option<PathBuf>,
    pub legacy: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Serve(Args),
    Help,
}

/// Parses arguments, excluding the program name.
pub fn parse_args<I>(args: I) -> Result<Command, lexopt::Error>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let mut parser = lexopt::Parser::from_args(args);
    let mut parsed = Args::default();

    while let Some(arg) = parser.next()? {
        match arg {
            Short('l') | Long("listen") => {
                parsed.port = Some(parser.value()?.parse()?);
            }
            Short('s') | Long("serve") => {
                parsed.root_path = Some(parser.value()?.string()?);
            }
            Short('c') | Long("config") => {
                parsed.config_file = Some(parser.value()?.into());
            }
            Long("legacy") => parsed.legacy = true,
            Short('h') | Long("help") => return Ok(Command::Help),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Command::Serve(parsed))
}
