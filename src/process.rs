//! External command execution.
//!
//! Every tool the pipeline drives (git, autotools, make) goes through a
//! [`ProcessRunner`]. [`SystemRunner`] spawns real processes; tests swap in a
//! scripted runner that records invocations instead.
//!
//! ```rust,ignore
//! use apertium_builder::process::{run_checked, Cmd, SystemRunner};
//!
//! let runner = SystemRunner;
//! run_checked(&runner, &Cmd::new("make").args(["-j", "4"]).current_dir(&repo))?;
//! ```

use anyhow::Result;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::info;

use crate::error::PipelineError;

/// Description of a single external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    capture: bool,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            capture: false,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Capture stdout/stderr instead of streaming them to the terminal.
    pub fn capture(mut self) -> Self {
        self.capture = true;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn is_captured(&self) -> bool {
        self.capture
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn failure(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external commands, blocking until they exit.
///
/// `Err` means the command could not be started at all; a non-zero exit is
/// reported through [`CmdOutput::code`].
pub trait ProcessRunner {
    fn run(&self, cmd: &Cmd) -> io::Result<CmdOutput>;
}

/// Spawns real processes with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, cmd: &Cmd) -> io::Result<CmdOutput> {
        info!("$ {}", cmd);

        let mut command = Command::new(cmd.program());
        command.args(cmd.get_args());
        if let Some(dir) = cmd.cwd() {
            command.current_dir(dir);
        }

        if cmd.is_captured() {
            let output = command.stdin(Stdio::null()).output()?;
            Ok(CmdOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        } else {
            let status = command.status()?;
            Ok(CmdOutput {
                code: status.code(),
                ..CmdOutput::default()
            })
        }
    }
}

/// Run a command and turn spawn failures and non-zero exits into
/// [`PipelineError::Process`].
pub fn run_checked(runner: &dyn ProcessRunner, cmd: &Cmd) -> Result<CmdOutput> {
    let output = runner.run(cmd).map_err(|e| PipelineError::Process {
        command: cmd.to_string(),
        code: None,
        detail: e.to_string(),
    })?;

    if output.is_success() {
        return Ok(output);
    }

    Err(PipelineError::Process {
        command: cmd.to_string(),
        code: output.code,
        detail: output.stderr.clone(),
    }
    .into())
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedRunner;
    use super::*;

    #[test]
    fn test_cmd_display_joins_args() {
        let cmd = Cmd::new("git").args(["clone", "--depth", "1"]).arg("repo");
        assert_eq!(cmd.to_string(), "git clone --depth 1 repo");
    }

    #[test]
    fn test_run_checked_success() {
        let runner = ScriptedRunner::new();
        let out = run_checked(&runner, &Cmd::new("true")).unwrap();
        assert!(out.is_success());
        assert_eq!(runner.command_lines(), vec!["true"]);
    }

    #[test]
    fn test_run_checked_nonzero_exit() {
        let runner = ScriptedRunner::with_handler(|_| Ok(CmdOutput::failure(3)));
        let err = run_checked(&runner, &Cmd::new("make").arg("-j2")).unwrap_err();

        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::Process { command, code, .. }) => {
                assert_eq!(command, "make -j2");
                assert_eq!(*code, Some(3));
            }
            other => panic!("expected process error, got {other:?}"),
        }
    }

    #[test]
    fn test_run_checked_spawn_failure() {
        let runner = ScriptedRunner::with_handler(|_| {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
        });
        let err = run_checked(&runner, &Cmd::new("./autogen.sh")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Process { code: None, .. })
        ));
    }

    #[test]
    fn test_system_runner_captures_output() {
        let out = SystemRunner
            .run(&Cmd::new("sh").args(["-c", "echo hello"]).capture())
            .unwrap();
        assert!(out.is_success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn test_system_runner_reports_exit_code() {
        let out = SystemRunner
            .run(&Cmd::new("sh").args(["-c", "exit 7"]).capture())
            .unwrap();
        assert_eq!(out.code, Some(7));
    }
}
