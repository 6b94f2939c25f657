// src/exec/tool.rs

//! External tool invocation.
//!
//! Actions never spawn processes themselves; they describe a
//! [`ToolInvocation`] and hand it to a [`ToolRunner`]. Production code uses
//! [`ProcessToolRunner`]; tests record invocations and script the results.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// A single run of an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory (the project root).
    pub cwd: PathBuf,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Human-readable command line, for logs and error messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// What came back from a finished tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "termination by signal".to_string(),
        }
    }

    /// Last `max_lines` lines of stderr followed by stdout.
    pub fn tail(&self, max_lines: usize) -> String {
        let lines: Vec<&str> = self
            .stderr
            .lines()
            .chain(self.stdout.lines())
            .filter(|l| !l.trim().is_empty())
            .collect();
        let skip = lines.len().saturating_sub(max_lines);
        lines[skip..].join("\n")
    }
}

/// Trait abstracting how external tools are run.
pub trait ToolRunner: Send + Sync {
    /// Run the tool to completion.
    ///
    /// `Err` means the tool could not be run at all (e.g. not installed);
    /// a tool that ran and failed is an `Ok` with a non-zero code.
    fn invoke(
        &self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<ToolOutput>> + Send + '_>>;
}

/// Runs tools as child processes via `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ProcessToolRunner;

impl ToolRunner for ProcessToolRunner {
    fn invoke(
        &self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<ToolOutput>> + Send + '_>> {
        Box::pin(run_process(invocation))
    }
}

async fn run_process(invocation: ToolInvocation) -> Result<ToolOutput> {
    info!(cmd = %invocation.command_line(), "starting tool process");

    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .current_dir(&invocation.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning '{}'", invocation.program))?;

    // Drain both pipes concurrently so neither buffer fills up.
    let stdout = child.stdout.take().map(|s| tokio::spawn(collect_lines(s, "stdout")));
    let stderr = child.stderr.take().map(|s| tokio::spawn(collect_lines(s, "stderr")));

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for '{}'", invocation.program))?;

    let stdout = match stdout {
        Some(handle) => handle.await.context("joining stdout reader")?,
        None => String::new(),
    };
    let stderr = match stderr {
        Some(handle) => handle.await.context("joining stderr reader")?,
        None => String::new(),
    };

    debug!(
        program = %invocation.program,
        exit_code = ?status.code(),
        success = status.success(),
        "tool process exited"
    );

    Ok(ToolOutput {
        code: status.code(),
        stdout,
        stderr,
    })
}

/// Read a pipe to the end, one line at a time.
///
/// Output is decoded lossily; a read error stops collecting but the pipe is
/// still drained so the child never blocks or dies writing to it.
async fn collect_lines<R>(reader: R, stream: &'static str) -> String
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut collected = String::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                debug!(stream, "{}", line);
                collected.push_str(line);
                collected.push('\n');
            }
            Err(err) => {
                warn!(stream, error = %err, "failed reading tool output; discarding the rest");
                if let Err(err) = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await {
                    warn!(stream, error = %err, "failed draining tool output");
                }
                break;
            }
        }
    }

    collected
}
