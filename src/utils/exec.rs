//! External command execution.
//!
//! Runs collaborator tools such as `sass` and relays their output through
//! [`log!`](crate::log), skipping noise lines.

use crate::log;
use anyhow::{Context, Result, bail};
use regex::Regex;
use std::{
    borrow::Cow,
    ffi::OsString,
    path::Path,
    process::{Child, Command, Output, Stdio},
    sync::LazyLock,
};

/// Whether the program in `cmd[0]` can be found on `PATH`.
pub fn is_installed(cmd: &[String]) -> bool {
    cmd.first().is_some_and(|program| which::which(program).is_ok())
}

/// Execute a command to completion and log its output.
///
/// # Errors
/// Returns error if command fails to execute or returns non-zero exit code.
pub fn exec(
    root: Option<&Path>,
    cmd: &[String],
    args: &[OsString],
    filter: &FilterRule,
) -> Result<Output> {
    let (name, mut command) = prepare(root, cmd, args)?;

    let output = command
        .output()
        .with_context(|| format!("Failed to execute `{name}`"))?;

    if !output.status.success() {
        bail!(format_error(&name, &output, filter));
    }

    filter.log(&name, &String::from_utf8_lossy(&output.stdout));
    filter.log(&name, &String::from_utf8_lossy(&output.stderr));
    Ok(output)
}

/// Spawn a long-running command in the background.
///
/// Stdout is discarded and stderr inherited, so the tool's own error
/// reports still reach the terminal. The caller owns the child.
pub fn spawn(root: Option<&Path>, cmd: &[String], args: &[OsString]) -> Result<Child> {
    let (name, mut command) = prepare(root, cmd, args)?;

    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit());

    command
        .spawn()
        .with_context(|| format!("Failed to spawn `{name}`"))
}

fn prepare(root: Option<&Path>, cmd: &[String], args: &[OsString]) -> Result<(String, Command)> {
    let Some((program, rest)) = cmd.split_first() else {
        bail!("Empty command");
    };

    let mut command = Command::new(program);
    command
        .args(rest)
        .args(args.iter().filter(|arg| !arg.is_empty()));

    if let Some(dir) = root {
        command.current_dir(dir);
    }

    Ok((program.clone(), command))
}

// ============================================================================
// Output Filtering
// ============================================================================

fn strip_ansi(s: &str) -> Cow<'_, str> {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\x1b\[[0-9;]*m").expect("ANSI escape pattern is valid")
    });
    RE.replace_all(s, "")
}

/// Lines starting with any of these prefixes are not logged.
pub struct FilterRule {
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Lines worth showing, with color codes removed before matching.
    fn keep<'a>(&self, output: &'a str) -> Vec<&'a str> {
        output
            .lines()
            .filter(|line| !self.should_skip(strip_ansi(line).trim()))
            .collect()
    }

    fn log(&self, name: &str, output: &str) {
        let lines = self.keep(output);
        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Dart Sass chatter that carries no information on a successful run.
pub const SASS_FILTER: FilterRule = FilterRule::new(&["Compiled ", "Sass is watching"]);

fn format_error(name: &str, output: &Output, filter: &FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut details: Vec<&str> = filter.keep(&stderr);
    details.extend(filter.keep(&stdout));

    format!(
        "Command `{name}` failed with {}\n{}",
        output.status,
        details.join("\n")
    )
}
