//! Child process plumbing.
//!
//! Spawns external commands with piped standard streams, relays their output
//! chunk by chunk to the launcher's own stdout/stderr as it arrives, and watches
//! for exit. Nothing here retries, restarts or times out: a command runs until
//! it exits on its own or the launcher is killed.

use std::io;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// An external command: executable, arguments and optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: Option<String>) -> Self {
        self.working_dir = dir;
        self
    }

    /// Same command with extra trailing arguments
    pub fn with_extra_args(mut self, extra: &[String]) -> Self {
        self.args.extend(extra.iter().cloned());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn spawn(&self) -> io::Result<Child> {
        self.command().spawn()
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Which of the launcher's own streams relayed output goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Size of a single relay read
const RELAY_CHUNK_SIZE: usize = 8 * 1024;

/// Copy `reader` to `writer` chunk by chunk, flushing after every chunk.
///
/// Whatever a read returns is written straight away, so partial lines such as
/// prompts or `\r` progress updates are not held back waiting for a newline.
/// Bytes are passed through untouched. Returns the number of bytes copied.
pub async fn copy_chunks<R, W>(mut reader: R, writer: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; RELAY_CHUNK_SIZE];
    let mut total = 0;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        writer.flush().await?;
        total += n as u64;
    }

    Ok(total)
}

/// Relay `reader` to the launcher's stdout or stderr in a background task.
pub fn spawn_relay<R>(reader: R, target: OutputStream) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let result = match target {
            OutputStream::Stdout => copy_chunks(reader, &mut tokio::io::stdout()).await,
            OutputStream::Stderr => copy_chunks(reader, &mut tokio::io::stderr()).await,
        };
        if let Err(e) = result {
            tracing::debug!(stream = ?target, error = %e, "Output relay stopped");
        }
    })
}

/// Start relaying a child's stdout and stderr.
fn attach_relays(child: &mut Child) -> Vec<JoinHandle<()>> {
    let mut relays = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        relays.push(spawn_relay(stdout, OutputStream::Stdout));
    }
    if let Some(stderr) = child.stderr.take() {
        relays.push(spawn_relay(stderr, OutputStream::Stderr));
    }
    relays
}

/// Output captured from a command that ran to completion
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
}

/// Run a command to completion and capture its output.
pub async fn capture(spec: &CommandSpec) -> io::Result<CapturedOutput> {
    let output = spec.command().output().await?;
    Ok(CapturedOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        code: output.status.code(),
    })
}

/// Run a command to completion, relaying its output as it arrives.
///
/// Returns the exit code once the process has exited and both relays have
/// drained.
pub async fn run_relayed(spec: &CommandSpec) -> io::Result<Option<i32>> {
    let mut child = spec.spawn()?;
    let relays = attach_relays(&mut child);
    let status = child.wait().await?;
    for relay in relays {
        let _ = relay.await;
    }
    Ok(status.code())
}

/// A launched, unsupervised child process.
///
/// The exit watcher owns the child; dropping this handle detaches it without
/// killing the process.
#[derive(Debug)]
pub struct LaunchedProcess {
    pub pid: Option<u32>,
    watcher: JoinHandle<Option<i32>>,
}

impl LaunchedProcess {
    /// Wait for the child to exit and return its exit code.
    pub async fn wait(self) -> Option<i32> {
        self.watcher.await.ok().flatten()
    }
}

/// Spawn a command, relay its output and log its exit code when it exits.
///
/// The exit is only logged: there is no restart and the launcher's own exit
/// status is unaffected.
pub fn launch(spec: &CommandSpec) -> io::Result<LaunchedProcess> {
    let mut child = spec.spawn()?;
    let pid = child.id();
    let relays = attach_relays(&mut child);
    let name = spec.program.clone();

    let watcher = tokio::spawn(async move {
        let code = match child.wait().await {
            Ok(status) => status.code(),
            Err(e) => {
                tracing::error!(program = %name, error = %e, "Failed to wait for child process");
                return None;
            }
        };
        for relay in relays {
            let _ = relay.await;
        }
        match code {
            Some(0) => tracing::info!(program = %name, code = 0, "Child process exited"),
            Some(code) => tracing::warn!(program = %name, code, "Child process exited"),
            None => tracing::warn!(program = %name, "Child process terminated by signal"),
        }
        code
    });

    Ok(LaunchedProcess { pid, watcher })
}
