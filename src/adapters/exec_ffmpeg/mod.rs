//! FFmpeg execution adapter
//!
//! Runs the external transcoder as a tokio child process. Every failure
//! mode (missing binary, unwritable log, non-zero exit) surfaces as a
//! `false` return or an `Err`, never as a panic.

use std::fs::File;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::errors::*;
use crate::ports::*;

/// FFmpeg-based execution adapter
#[derive(Debug, Default, Clone)]
pub struct FfmpegToolAdapter;

impl FfmpegToolAdapter {
    pub fn new() -> Self {
        Self
    }

    fn command(argv: &[String]) -> Result<Command, DomainError> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            DomainError::InvocationFailure("Empty argument vector".to_string())
        })?;
        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);
        Ok(command)
    }

    fn redirect_to(command: &mut Command, log_file: &Path) -> Result<(), DomainError> {
        let stdout = File::create(log_file).map_err(|e| {
            DomainError::FsFail(format!(
                "Cannot open tool log {}: {}",
                log_file.display(),
                e
            ))
        })?;
        let stderr = stdout.try_clone()?;
        command.stdout(Stdio::from(stdout)).stderr(Stdio::from(stderr));
        Ok(())
    }
}

#[async_trait]
impl ToolPort for FfmpegToolAdapter {
    async fn run(&self, argv: &[String], log_file: Option<&Path>) -> bool {
        let mut command = match Self::command(argv) {
            Ok(command) => command,
            Err(e) => {
                tracing::error!("{}", e);
                return false;
            }
        };

        match log_file {
            Some(path) => {
                if let Err(e) = Self::redirect_to(&mut command, path) {
                    tracing::error!("{}", e);
                    return false;
                }
            }
            None => {
                command.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
        }

        tracing::debug!(command = %argv.join(" "), "Running tool");
        // output() drains both pipes
        match command.output().await {
            Ok(output) => {
                if !output.status.success() {
                    tracing::debug!(status = %output.status, program = %argv[0], "Tool exited with failure");
                }
                output.status.success()
            }
            Err(e) => {
                tracing::error!("Failed to start {}: {}", argv[0], e);
                false
            }
        }
    }

    async fn capture(&self, argv: &[String]) -> Result<ToolOutput, DomainError> {
        let mut command = Self::command(argv)?;
        command.stdout(Stdio::piped()).stderr(Stdio::piped());

        tracing::debug!(command = %argv.join(" "), "Capturing tool output");
        let output = command.output().await.map_err(|e| {
            DomainError::InvocationFailure(format!("Failed to start {}: {}", argv[0], e))
        })?;

        Ok(ToolOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
