/// Command execution for the external gcloud and kubectl tools
use anyhow::{Context, Result};
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::process::Command;
use tracing::debug;

use crate::error::DeployError;

/// Ordered argument vector for one external invocation, program first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandSpec {
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Program to invoke
    pub fn program(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or_default()
    }

    /// Full argument vector, including the program
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.args.join(" "))
    }
}

/// Runs a built command, reporting failure as a deployment error
///
/// Deployment logic is generic over this so tests and dry runs can observe
/// the commands without invoking real tooling.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor {
    async fn execute(&self, command: &CommandSpec) -> Result<(), DeployError>;
}

/// Executor that spawns the real process
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    kubeconfig: Option<PathBuf>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point both gcloud and kubectl at a dedicated kubeconfig file
    pub fn with_kubeconfig(mut self, path: PathBuf) -> Self {
        self.kubeconfig = Some(path);
        self
    }
}

impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, command: &CommandSpec) -> Result<(), DeployError> {
        let Some((program, args)) = command.args().split_first() else {
            return Err(DeployError::CommandExecution {
                command: command.to_string(),
                cause: "empty command".to_string(),
            });
        };

        debug!(command = %command, "Executing command");

        let mut builder = CommandBuilder::new(program)
            .args(args)
            .context(format!("Failed to execute {}", program));
        if let Some(path) = &self.kubeconfig {
            builder = builder.kubeconfig(path);
        }

        let stdout = builder
            .run()
            .await
            .map_err(|e| DeployError::CommandExecution {
                command: command.to_string(),
                cause: format!("{:#}", e).trim().to_string(),
            })?;

        if !stdout.trim().is_empty() {
            debug!("{}", stdout.trim());
        }

        Ok(())
    }
}

/// Executor that records commands instead of running them
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    commands: Mutex<Vec<CommandSpec>>,
    fail_program: Option<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every command whose program matches, after recording it
    #[cfg(test)]
    pub fn failing_on(mut self, program: impl Into<String>) -> Self {
        self.fail_program = Some(program.into());
        self
    }

    /// Commands seen so far, in execution order
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.recorded().clone()
    }

    // Pushes never leave the list half-written, so a poisoned lock still holds
    // every recorded command.
    fn recorded(&self) -> MutexGuard<'_, Vec<CommandSpec>> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl CommandExecutor for RecordingExecutor {
    async fn execute(&self, command: &CommandSpec) -> Result<(), DeployError> {
        self.recorded().push(command.clone());

        if self.fail_program.as_deref() == Some(command.program()) {
            return Err(DeployError::CommandExecution {
                command: command.to_string(),
                cause: "exit status: 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Result from command execution with captured output
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub status: ExitStatus,
}

impl CommandOutput {
    /// Create from tokio Command output
    fn from_output(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            status: output.status,
        }
    }

    /// Return Ok if successful, otherwise error with stderr (or the exit status when stderr is empty)
    pub fn into_result(self) -> Result<String> {
        if self.success {
            Ok(self.stdout)
        } else if self.stderr.trim().is_empty() {
            anyhow::bail!("{}", self.status)
        } else {
            anyhow::bail!("{}", self.stderr)
        }
    }
}

/// Builder for executing external commands with common patterns
pub struct CommandBuilder {
    command: Command,
    context_msg: Option<String>,
}

impl CommandBuilder {
    /// Create a new command builder
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        let mut command = Command::new(program);
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        Self {
            command,
            context_msg: None,
        }
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.command.args(args);
        self
    }

    /// Set an environment variable
    pub fn env<K, V>(mut self, key: K, val: V) -> Self
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.command.env(key, val);
        self
    }

    /// Set KUBECONFIG environment variable
    pub fn kubeconfig(self, path: &Path) -> Self {
        self.env("KUBECONFIG", path)
    }

    /// Set context message for error reporting
    pub fn context<S: Into<String>>(mut self, msg: S) -> Self {
        self.context_msg = Some(msg.into());
        self
    }

    /// Execute and return raw output
    pub async fn output(mut self) -> Result<CommandOutput> {
        let output = if let Some(ctx) = &self.context_msg {
            self.command.output().await.context(ctx.clone())?
        } else {
            self.command.output().await?
        };
        Ok(CommandOutput::from_output(output))
    }

    /// Execute and return stdout on success, error on failure
    pub async fn run(self) -> Result<String> {
        self.output().await?.into_result()
    }
}

/// Check if a command-line tool is installed
pub async fn check_tool_installed(
    tool_name: &str,
    version_args: &[&str],
    install_url: &str,
) -> Result<()> {
    let output = CommandBuilder::new(tool_name)
        .args(version_args)
        .output()
        .await;

    match output {
        Ok(out) if out.success => Ok(()),
        _ => anyhow::bail!(
            "{} is not installed or not in PATH. Please install from {}",
            tool_name,
            install_url
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_display() {
        let spec = CommandSpec::new(["kubectl", "apply", "-f", "foo/bar/abc.yaml"]);
        assert_eq!(spec.program(), "kubectl");
        assert_eq!(spec.to_string(), "kubectl apply -f foo/bar/abc.yaml");
        assert_eq!(
            serde_json::to_string(&spec).unwrap(),
            r#"["kubectl","apply","-f","foo/bar/abc.yaml"]"#
        );
    }

    #[tokio::test]
    async fn test_process_executor_success() {
        let executor = ProcessExecutor::new();
        let result = executor.execute(&CommandSpec::new(["echo", "test"])).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_process_executor_reports_stderr() {
        let executor = ProcessExecutor::new();
        let spec = CommandSpec::new(["sh", "-c", "echo boom >&2; exit 3"]);

        match executor.execute(&spec).await {
            Err(DeployError::CommandExecution { command, cause }) => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(cause, "boom");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_process_executor_reports_exit_status() {
        let executor = ProcessExecutor::new();
        let spec = CommandSpec::new(["sh", "-c", "exit 3"]);

        let err = executor.execute(&spec).await.unwrap_err();
        assert_eq!(err.to_string(), "command `sh -c exit 3` failed: exit status: 3");
    }

    #[tokio::test]
    async fn test_process_executor_missing_binary() {
        let executor = ProcessExecutor::new();
        let spec = CommandSpec::new(["definitely-not-a-real-binary-gke-deploy"]);

        let err = executor.execute(&spec).await.unwrap_err();
        assert!(matches!(err, DeployError::CommandExecution { .. }));
    }

    #[tokio::test]
    async fn test_process_executor_empty_command() {
        let executor = ProcessExecutor::new();
        let err = executor
            .execute(&CommandSpec::new(Vec::<String>::new()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty command"));
    }

    #[tokio::test]
    async fn test_command_builder_kubeconfig() {
        let output = CommandBuilder::new("sh")
            .args(["-c", "echo $KUBECONFIG"])
            .kubeconfig(Path::new("/tmp/gke-deploy-kubeconfig"))
            .output()
            .await
            .unwrap();

        assert!(output.success);
        assert!(output.stdout.contains("/tmp/gke-deploy-kubeconfig"));
    }

    #[tokio::test]
    async fn test_recording_executor_failure() {
        let executor = RecordingExecutor::new().failing_on("kubectl");

        assert!(executor
            .execute(&CommandSpec::new(["gcloud", "version"]))
            .await
            .is_ok());
        assert!(executor
            .execute(&CommandSpec::new(["kubectl", "version"]))
            .await
            .is_err());
        assert_eq!(executor.commands().len(), 2);
    }

    #[tokio::test]
    async fn test_recording_executor_survives_poisoned_lock() {
        let executor = RecordingExecutor::new();
        executor
            .execute(&CommandSpec::new(["gcloud", "version"]))
            .await
            .unwrap();

        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = executor.commands.lock().unwrap();
            panic!("poison the command list");
        }));
        assert!(poisoned.is_err());
        assert!(executor.commands.is_poisoned());

        executor
            .execute(&CommandSpec::new(["kubectl", "version"]))
            .await
            .unwrap();
        let programs: Vec<String> = executor
            .commands()
            .iter()
            .map(|c| c.program().to_string())
            .collect();
        assert_eq!(programs, ["gcloud", "kubectl"]);
    }
}
