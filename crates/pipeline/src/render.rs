//! Slide rendering through the Marp command-line tool.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;

/// Default command used to invoke the render tool.
pub const DEFAULT_MARP_COMMAND: &str = "npx @marp-team/marp-cli";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("render tool not found: {0}")]
    NotFound(std::io::Error),

    #[error("render tool failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("render tool produced no output at {0}")]
    MissingOutput(PathBuf),

    #[error("render command is empty")]
    EmptyCommand,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Target artifact of one render invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Pdf,
    Html,
}

impl RenderFormat {
    pub fn flag(self) -> &'static str {
        match self {
            Self::Pdf => "--pdf",
            Self::Html => "--html",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
        }
    }
}

/// Converts a slide markup file into a PDF or HTML artifact.
#[async_trait]
pub trait SlideRenderer: Send + Sync {
    async fn render(
        &self,
        markdown: &Path,
        output: &Path,
        format: RenderFormat,
        theme: &str,
    ) -> Result<(), RenderError>;
}

/// Runs `<program> <args..> <md> --pdf|--html --output <out> --theme <theme>
/// --allow-local-files`.
///
/// The child is killed when the render future is dropped, so a cancelled or
/// timed-out deck does not leave the tool running.
#[derive(Debug, Clone)]
pub struct MarpRenderer {
    program: String,
    leading_args: Vec<String>,
}

impl MarpRenderer {
    pub fn new(program: impl Into<String>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    /// Parse a whitespace-separated command line such as
    /// `npx @marp-team/marp-cli`.
    pub fn from_command_line(command: &str) -> Result<Self, RenderError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(RenderError::EmptyCommand)?;
        Ok(Self::new(program, parts.collect()))
    }
}

impl Default for MarpRenderer {
    fn default() -> Self {
        Self::new("npx", vec!["@marp-team/marp-cli".to_string()])
    }
}

#[async_trait]
impl SlideRenderer for MarpRenderer {
    async fn render(
        &self,
        markdown: &Path,
        output: &Path,
        format: RenderFormat,
        theme: &str,
    ) -> Result<(), RenderError> {
        let result = tokio::process::Command::new(&self.program)
            .args(&self.leading_args)
            .arg(markdown)
            .arg(format.flag())
            .arg("--output")
            .arg(output)
            .args(["--theme", theme, "--allow-local-files"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => RenderError::NotFound(e),
                _ => RenderError::Io(e),
            })?;

        if !result.status.success() {
            return Err(RenderError::ExecutionFailed {
                exit_code: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        if !tokio::fs::try_exists(output).await? {
            return Err(RenderError::MissingOutput(output.to_path_buf()));
        }

        tracing::debug!(output = %output.display(), format = format.extension(), "Slides rendered");
        Ok(())
    }
}
