//! Command-line configuration.
//!
//! Flags are scanned out of the argument list first; whatever positionals
//! remain select the command.

use std::path::{Path, PathBuf};

use crate::diagnostics::DEFAULT_MAX_ERRORS;

pub const DEFAULT_CACHE_DIR: &str = "target/ember-cache";
pub const CACHE_DIR_ENV: &str = "EMBER_CACHE_DIR";
pub const SOURCE_EXTENSION: &str = "em";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(PathBuf),
    Tokens(PathBuf),
    Bytecode(PathBuf),
    Check(Vec<PathBuf>),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub command: Command,
    pub trace: bool,
    pub no_cache: bool,
    pub json: bool,
    pub cache_dir: PathBuf,
    pub max_errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{flag} expects a value")]
    MissingValue { flag: &'static str },
    #[error("--max-errors expects a non-negative integer, got `{0}`")]
    InvalidMaxErrors(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("file must have .em extension: {0}")]
    NotEmberFile(String),
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
}

impl Config {
    /// Parses `args` (without the program name). `env_cache_dir` is the
    /// value of `EMBER_CACHE_DIR`, which `--cache-dir` overrides.
    pub fn from_args(
        mut args: Vec<String>,
        env_cache_dir: Option<String>,
    ) -> Result<Self, ConfigError> {
        let trace = take_flag(&mut args, "--trace");
        let no_cache = take_flag(&mut args, "--no-cache");
        let json = take_flag(&mut args, "--json");
        let cache_dir = take_value(&mut args, "--cache-dir")?
            .or(env_cache_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));
        let max_errors = match take_value(&mut args, "--max-errors")? {
            Some(value) => value
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidMaxErrors(value))?,
            None => DEFAULT_MAX_ERRORS,
        };

        let command = parse_command(&args)?;
        Ok(Self {
            command,
            trace,
            no_cache,
            json,
            cache_dir,
            max_errors,
        })
    }
}

fn parse_command(args: &[String]) -> Result<Command, ConfigError> {
    let Some(first) = args.first() else {
        return Ok(Command::Help);
    };
    if is_ember_file(first) {
        return Ok(Command::Run(PathBuf::from(first)));
    }

    let rest = &args[1..];
    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "run" => source_arg(rest, "ember run <file.em>").map(Command::Run),
        "tokens" => source_arg(rest, "ember tokens <file.em>").map(Command::Tokens),
        "bytecode" => source_arg(rest, "ember bytecode <file.em> [--json]").map(Command::Bytecode),
        "check" => {
            if rest.is_empty() {
                return Err(ConfigError::Usage("ember check <file.em>..."));
            }
            rest.iter()
                .map(|path| checked_path(path))
                .collect::<Result<Vec<_>, _>>()
                .map(Command::Check)
        }
        other => Err(ConfigError::UnknownCommand(other.to_string())),
    }
}

fn source_arg(rest: &[String], usage: &'static str) -> Result<PathBuf, ConfigError> {
    match rest.first() {
        Some(path) => checked_path(path),
        None => Err(ConfigError::Usage(usage)),
    }
}

fn checked_path(path: &str) -> Result<PathBuf, ConfigError> {
    if is_ember_file(path) {
        Ok(PathBuf::from(path))
    } else {
        Err(ConfigError::NotEmberFile(path.to_string()))
    }
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    let before = args.len();
    args.retain(|arg| arg != flag);
    args.len() != before
}

fn take_value(args: &mut Vec<String>, flag: &'static str) -> Result<Option<String>, ConfigError> {
    let mut value = None;
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag {
            if i + 1 >= args.len() {
                return Err(ConfigError::MissingValue { flag });
            }
            value = Some(args.remove(i + 1));
            args.remove(i);
            continue;
        }
        i += 1;
    }
    Ok(value)
}

pub fn is_ember_file(path: &str) -> bool {
    Path::new(path).extension().and_then(|ext| ext.to_str()) == Some(SOURCE_EXTENSION)
}

pub fn help_text() -> &'static str {
    "\
Ember CLI

Usage:
  ember <file.em>
  ember run <file.em>
  ember tokens <file.em>
  ember bytecode <file.em> [--json]
  ember check <file.em>...
  ember help

Flags:
  --trace            Log every executed instruction (target ember::vm)
  --no-cache         Do not read or write the module cache
  --cache-dir <dir>  Module cache directory (default: target/ember-cache, env: EMBER_CACHE_DIR)
  --max-errors <n>   Limit displayed errors (default: 50)
  --json             With `bytecode`, print the module as JSON
  -h, --help         Show this help message

Logging:
  EMBER_LOG          tracing filter, e.g. `ember=debug` (default: warn)
"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn bare_source_path_runs_it() {
        let config = Config::from_args(args(&["main.em"]), None).expect("config");
        assert_eq!(config.command, Command::Run(PathBuf::from("main.em")));
        assert_eq!(config.max_errors, DEFAULT_MAX_ERRORS);
        assert_eq!(config.cache_dir, PathBuf::from(DEFAULT_CACHE_DIR));
        assert!(!config.trace);
    }

    #[test]
    fn flags_are_removed_wherever_they_appear() {
        let config = Config::from_args(
            args(&["--trace", "bytecode", "--max-errors", "3", "a.em", "--json"]),
            None,
        )
        .expect("config");
        assert_eq!(config.command, Command::Bytecode(PathBuf::from("a.em")));
        assert!(config.trace && config.json);
        assert_eq!(config.max_errors, 3);
    }

    #[test]
    fn cache_dir_flag_overrides_environment() {
        let from_env =
            Config::from_args(args(&["run", "a.em"]), Some("/tmp/env".into())).expect("config");
        assert_eq!(from_env.cache_dir, PathBuf::from("/tmp/env"));

        let from_flag = Config::from_args(
            args(&["run", "a.em", "--cache-dir", "/tmp/flag"]),
            Some("/tmp/env".into()),
        )
        .expect("config");
        assert_eq!(from_flag.cache_dir, PathBuf::from("/tmp/flag"));
    }

    #[test]
    fn check_takes_many_files() {
        let config = Config::from_args(args(&["check", "a.em", "b.em"]), None).expect("config");
        assert_eq!(
            config.command,
            Command::Check(vec![PathBuf::from("a.em"), PathBuf::from("b.em")])
        );
    }

    #[test]
    fn malformed_arguments_are_reported() {
        assert_eq!(
            Config::from_args(args(&["run"]), None),
            Err(ConfigError::Usage("ember run <file.em>"))
        );
        assert_eq!(
            Config::from_args(args(&["a.em", "--max-errors", "x"]), None),
            Err(ConfigError::InvalidMaxErrors("x".into()))
        );
        assert_eq!(
            Config::from_args(args(&["run", "a.txt"]), None),
            Err(ConfigError::NotEmberFile("a.txt".into()))
        );
        assert_eq!(
            Config::from_args(args(&["a.em", "--cache-dir"]), None),
            Err(ConfigError::MissingValue { flag: "--cache-dir" })
        );
        assert_eq!(
            Config::from_args(args(&["frobnicate"]), None),
            Err(ConfigError::UnknownCommand("frobnicate".into()))
        );
        assert_eq!(
            Config::from_args(Vec::new(), None).map(|c| c.command),
            Ok(Command::Help)
        );
    }
}
