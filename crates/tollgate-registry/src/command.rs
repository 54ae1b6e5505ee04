//! External command execution.
//!
//! Commands are described by a [`CommandSpec`] (program plus argument vector,
//! never a shell string) and run through a [`CommandRunner`], so the push
//! sequence can be exercised without a docker daemon.

use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

/// A command to run: program, arguments and optional standard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    stdin: Option<String>,
}

impl CommandSpec {
    /// Creates a command for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Data written to the command's standard input.
    ///
    /// Not included in the [`Display`](fmt::Display) rendering.
    #[must_use]
    pub fn stdin(mut self, data: impl Into<String>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    /// The program.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// The standard input data, if any.
    #[must_use]
    pub fn stdin_data(&self) -> Option<&str> {
        self.stdin.as_deref()
    }

    fn spawn(&self, stream: bool) -> std::io::Result<Child> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(command = %self, stream, "Running command");
        cmd.spawn()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` if the process was killed by a signal.
    pub status: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns `true` if the command exited with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.status, Some(0))
    }
}

/// Runs external commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `spec` to completion and captures its output.
    ///
    /// # Errors
    ///
    /// Returns an error only if the command cannot be started or its pipes
    /// fail; a non-zero exit status is reported in the output.
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput>;

    /// Runs `spec` to completion, passing each line of standard output and
    /// standard error to `on_line` as it arrives.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    async fn run_streaming(
        &self,
        spec: &CommandSpec,
        on_line: &mut (dyn for<'l> FnMut(&'l str) + Send),
    ) -> std::io::Result<CommandOutput>;
}

/// [`CommandRunner`] that spawns real processes with tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    async fn feed_stdin(child: &mut Child, spec: &CommandSpec) -> std::io::Result<()> {
        if let (Some(mut stdin), Some(data)) = (child.stdin.take(), spec.stdin_data()) {
            stdin.write_all(data.as_bytes()).await?;
            stdin.shutdown().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        let mut child = spec.spawn(false)?;
        Self::feed_stdin(&mut child, spec).await?;

        let output = child.wait_with_output().await?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn run_streaming(
        &self,
        spec: &CommandSpec,
        on_line: &mut (dyn for<'l> FnMut(&'l str) + Send),
    ) -> std::io::Result<CommandOutput> {
        let mut child = spec.spawn(true)?;
        Self::feed_stdin(&mut child, spec).await?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("stderr was not captured"))?;

        let mut stdout = BufReader::new(stdout);
        let mut stderr = BufReader::new(stderr);
        // Partial reads stay in these buffers when the other branch wins.
        let (mut stdout_buf, mut stderr_buf) = (Vec::new(), Vec::new());
        let mut output = CommandOutput::default();
        let (mut stdout_done, mut stderr_done) = (false, false);

        while !(stdout_done && stderr_done) {
            tokio::select! {
                read = stdout.read_until(b'\n', &mut stdout_buf), if !stdout_done => {
                    if read? == 0 {
                        stdout_done = true;
                    } else {
                        let line = take_line(&mut stdout_buf);
                        on_line(&line);
                        output.stdout.push_str(&line);
                        output.stdout.push('\n');
                    }
                },
                read = stderr.read_until(b'\n', &mut stderr_buf), if !stderr_done => {
                    if read? == 0 {
                        stderr_done = true;
                    } else {
                        let line = take_line(&mut stderr_buf);
                        on_line(&line);
                        output.stderr.push_str(&line);
                        output.stderr.push('\n');
                    }
                },
            }
        }

        output.status = child.wait().await?.code();
        Ok(output)
    }
}

/// Decodes one buffered line lossily, without its line terminator, and
/// empties the buffer.
fn take_line(buf: &mut Vec<u8>) -> String {
    let mut end = buf.len();
    while end > 0 && matches!(buf[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    let line = String::from_utf8_lossy(&buf[..end]).into_owned();
    buf.clear();
    line
}
