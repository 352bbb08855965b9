/// Runner for the repository's shell test suite
///
/// The suite is a bash driver script. On Windows hosts with WSL the script is
/// executed inside WSL after translating the repository root; everywhere else
/// it runs through the configured shell directly. Success is judged solely by
/// the script's exit code.

pub mod wsl;

use std::fmt;
use std::process::{Command, Output, Stdio};
use std::str::FromStr;

use thiserror::Error;

use crate::config::BridgeConfig;
use wsl::{to_bridge_path, WslLayer};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("unknown test mode '{0}', expected one of: all, unit, integration")]
    UnknownMode(String),

    #[error("test driver script not found at {0}")]
    MissingScript(String),

    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Suite selector passed to the driver script as its only argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMode {
    All,
    Unit,
    Integration,
}

impl TestMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestMode::All => "all",
            TestMode::Unit => "unit",
            TestMode::Integration => "integration",
        }
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestMode {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TestMode::All),
            "unit" => Ok(TestMode::Unit),
            "integration" => Ok(TestMode::Integration),
            other => Err(BridgeError::UnknownMode(other.to_string())),
        }
    }
}

/// Outcome of one driver invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRun {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl TestRun {
    fn from_output(output: Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Message attached to a failed assertion
    pub fn failure_report(&self, label: &str) -> String {
        format!("{} failed:\n{}\n{}", label, self.stdout, self.stderr)
    }
}

pub struct TestBridge {
    config: BridgeConfig,
    layer: WslLayer,
}

impl TestBridge {
    pub fn new(config: BridgeConfig, layer: WslLayer) -> Self {
        Self { config, layer }
    }

    /// Bridge for `config`, probing the host for WSL
    pub fn detect(config: BridgeConfig) -> Self {
        let layer = WslLayer::detect(&config);
        Self::new(config, layer)
    }

    pub fn run_mode(&self, mode: TestMode) -> Result<TestRun, BridgeError> {
        self.run_tests(&[mode.as_str()])
    }

    /// Run the driver script with `args`, blocking until it exits.
    /// No timeout and no retry.
    pub fn run_tests(&self, args: &[&str]) -> Result<TestRun, BridgeError> {
        let script_path = self.config.script_path();
        if !script_path.is_file() {
            return Err(BridgeError::MissingScript(script_path.display().to_string()));
        }

        let mut cmd = self.build_command(args);
        let program = cmd.get_program().to_string_lossy().into_owned();
        tracing::info!(%program, args=?args, wsl=self.layer.is_active(), "running test driver");

        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| BridgeError::Launch { program, source })?;

        let run = TestRun::from_output(output);
        if !run.success() {
            tracing::warn!(exit_code=?run.exit_code, "test driver reported failure");
        }
        Ok(run)
    }

    fn build_command(&self, args: &[&str]) -> Command {
        match self.layer.launcher() {
            Some(launcher) => {
                let mut cmd = Command::new(launcher);
                cmd.args(["--", self.config.shell.as_str(), "-lc"])
                    .arg(self.wsl_command_line(args));
                cmd
            }
            None => {
                let mut cmd = Command::new(&self.config.shell);
                cmd.arg(self.config.script_path())
                    .args(args)
                    .current_dir(&self.config.repo_root);
                cmd
            }
        }
    }

    /// `cd <root> && <shell> <script> <args...>` as one shell-quoted line
    pub fn wsl_command_line(&self, args: &[&str]) -> String {
        let root = to_bridge_path(&self.config.repo_root, &self.layer);
        let mut script_cmd = format!(
            "{} {}",
            shell_words::quote(&self.config.shell),
            shell_words::quote(&self.config.script_rel)
        );
        if !args.is_empty() {
            script_cmd.push(' ');
            script_cmd.push_str(&shell_words::join(args));
        }
        format!("cd {} && {}", shell_words::quote(&root), script_cmd)
    }
}
