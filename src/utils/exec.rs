//! External command execution.
//!
//! Builder-style API used by processors that shell out (the SCSS compiler).
//!
//! # Example
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! Cmd::new("sass").arg(&source).arg(&dest).run()?;
//! ```

use crate::log;
use anyhow::{Context, Result};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    process::{Command, Output},
    sync::LazyLock,
};

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument. Empty arguments are dropped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Execute the command, failing on launch errors and non-zero exit.
    ///
    /// Anything the tool printed to stderr on success is forwarded to the log.
    pub fn run(self) -> Result<Output> {
        let name = self.program.to_string_lossy().to_string();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute `{name}`"))?;

        if !output.status.success() {
            anyhow::bail!(format_error(&name, &output));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<_> = stderr
            .lines()
            .map(|line| strip_ansi(line).trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        if !lines.is_empty() {
            log!(&name; "{}", lines.join("\n"));
        }

        Ok(output)
    }
}

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI pattern"));
    RE.replace_all(s, "")
}

/// Format error message for failed command.
fn format_error(name: &str, output: &Output) -> String {
    let stderr = strip_ansi(&String::from_utf8_lossy(&output.stderr)).into_owned();
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut msg = format!("Command `{name}` failed with {}", output.status);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(stderr);
    }

    let stdout = stdout.trim();
    if !stdout.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout);
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31merror\x1b[0m: x"), "error: x");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn test_empty_args_dropped() {
        let cmd = Cmd::new("sass").arg("").arg("in.scss");
        assert_eq!(cmd.args, vec![OsString::from("in.scss")]);
    }

    #[test]
    fn test_missing_program_fails() {
        let err = Cmd::new("pagewright-no-such-binary").run().unwrap_err();
        assert!(format!("{err:#}").contains("pagewright-no-such-binary"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_fails() {
        let err = Cmd::new("sh").arg("-c").arg("echo boom >&2; exit 3").run().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("failed"));
        assert!(msg.contains("boom"));
    }
}
