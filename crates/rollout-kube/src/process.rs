//! Running collaborator executables
//!
//! Commands run to completion before the caller continues. An explicit
//! kubeconfig is passed to the child through `KUBECONFIG` without touching
//! this process's environment.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

use crate::error::{OrchestrationError, Result};

/// Captured result of a finished command
#[derive(Debug)]
pub(crate) struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Spawns one collaborator executable
#[derive(Debug, Clone)]
pub(crate) struct CommandRunner {
    program: PathBuf,
    kubeconfig: Option<PathBuf>,
}

impl CommandRunner {
    pub fn new(program: impl Into<PathBuf>, kubeconfig: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            kubeconfig,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run and capture output regardless of exit status
    pub async fn output(&self, args: &[String]) -> Result<CommandOutput> {
        tracing::debug!("Running command: {}", self.display(args));

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(kubeconfig) = &self.kubeconfig {
            command.env("KUBECONFIG", kubeconfig);
        }

        let output = command
            .output()
            .await
            .map_err(|source| OrchestrationError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        Ok(CommandOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run and fail on a non-zero exit, returning stdout
    pub async fn run(&self, args: &[String]) -> Result<String> {
        let output = self.output(args).await?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(self.failure(args, &output))
        }
    }

    pub fn failure(&self, args: &[String], output: &CommandOutput) -> OrchestrationError {
        OrchestrationError::CommandFailed {
            command: self.display(args),
            status: output.status.to_string(),
            stderr: output.stderr.trim().to_string(),
        }
    }

    fn display(&self, args: &[String]) -> String {
        let mut line = self.program.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let runner = CommandRunner::new("echo", None);
        let out = runner.run(&["hello".to_string()]).await.unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_command_failed() {
        let runner = CommandRunner::new("false", None);
        let err = runner.run(&[]).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::CommandFailed { .. }));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let runner = CommandRunner::new("/definitely/not/a/program", None);
        let err = runner.run(&[]).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_kubeconfig_reaches_child_only() {
        let runner = CommandRunner::new("sh", Some(PathBuf::from("/tmp/test-kubeconfig")));
        let out = runner
            .run(&["-c".to_string(), "printf %s \"$KUBECONFIG\"".to_string()])
            .await
            .unwrap();
        assert_eq!(out, "/tmp/test-kubeconfig");
    }
}
