//! Child process lifecycle for delegated commands.
//!
//! Each delegated command runs as its own `<shell> -c <line>` child with
//! piped stdout/stderr. Two reader tasks decode the streams incrementally
//! and forward chunks to the session event channel; a supervisor task awaits
//! the child and reports termination. Completion is push-notified, there is
//! no polling.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::event::SessionEvent;
use crate::shell::decode::StreamDecoder;

const READ_BUFFER: usize = 8192;

/// Returns the user's interactive shell from `$SHELL`, falling back to
/// `/bin/bash`.
pub fn interactive_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string())
}

/// Spawns delegated commands and streams their output to the event sink.
pub struct ProcessManager {
    event_sink: UnboundedSender<SessionEvent>,
    shell: String,
}

/// Handle to one running delegated command.
pub struct ProcessHandle {
    finished: Arc<AtomicBool>,
    pid: Option<u32>,
}

impl ProcessHandle {
    /// True once the child has terminated. The corresponding
    /// [`SessionEvent::CommandFinished`] is sent after this flips.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
}

impl ProcessManager {
    pub fn new(event_sink: UnboundedSender<SessionEvent>) -> Self {
        Self::with_shell(event_sink, interactive_shell())
    }

    /// Uses a specific shell binary instead of `$SHELL`.
    pub fn with_shell(event_sink: UnboundedSender<SessionEvent>, shell: impl Into<String>) -> Self {
        Self {
            event_sink,
            shell: shell.into(),
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Spawns `<shell> -c <command_line>` in `cwd` and starts streaming its
    /// output. Fails if the shell binary cannot be executed; the caller
    /// surfaces that inline and the session stays usable.
    pub fn spawn(&self, command_line: &str, cwd: &Path) -> Result<ProcessHandle> {
        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command_line)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start shell {}", self.shell))?;

        let pid = child.id();
        debug!(pid, shell = %self.shell, "spawned delegated command");

        let stdout_task = child
            .stdout
            .take()
            .map(|out| tokio::spawn(pump_stream(out, self.event_sink.clone(), OutputStream::Stdout)));
        let stderr_task = child
            .stderr
            .take()
            .map(|err| tokio::spawn(pump_stream(err, self.event_sink.clone(), OutputStream::Stderr)));

        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let sink = self.event_sink.clone();

        tokio::spawn(async move {
            // Drain both streams to EOF before reaping; the readers run
            // concurrently so neither pipe can fill up and stall the child.
            for task in [stdout_task, stderr_task].into_iter().flatten() {
                if let Err(e) = task.await {
                    warn!("output reader task failed: {e}");
                }
            }

            let exit_code = match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!("failed to wait for child: {e}");
                    None
                }
            };

            flag.store(true, Ordering::SeqCst);
            debug!(pid, ?exit_code, "delegated command finished");
            if sink.send(SessionEvent::CommandFinished { pid, exit_code }).is_err() {
                debug!("event receiver dropped before completion notice");
            }
        });

        Ok(ProcessHandle { finished, pid })
    }
}

#[derive(Clone, Copy)]
enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    fn wrap(self, chunk: String) -> SessionEvent {
        match self {
            Self::Stdout => SessionEvent::Stdout { chunk },
            Self::Stderr => SessionEvent::Stderr { chunk },
        }
    }
}

/// Reads one stream to EOF, decoding incrementally and forwarding each
/// non-empty chunk in arrival order.
async fn pump_stream<R>(mut reader: R, sink: UnboundedSender<SessionEvent>, stream: OutputStream)
where
    R: AsyncRead + Unpin,
{
    let mut decoder = StreamDecoder::new();
    let mut buf = [0u8; READ_BUFFER];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let chunk = decoder.feed(&buf[..n]);
                // Empty when the read ended inside a multi-byte sequence
                if chunk.is_empty() {
                    continue;
                }
                if sink.send(stream.wrap(chunk)).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("pipe read error: {e}");
                break;
            }
        }
    }

    let tail = decoder.finish();
    if !tail.is_empty() && sink.send(stream.wrap(tail)).is_err() {
        debug!("event receiver dropped before stream tail");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::init_session_events;

    #[tokio::test]
    async fn test_spawn_error_for_missing_shell() {
        let (tx, _rx) = init_session_events();
        let manager = ProcessManager::with_shell(tx, "/nonexistent/shell-binary");
        let result = manager.spawn("echo hi", Path::new("/"));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_streams_output_and_reports_exit() {
        let (tx, mut rx) = init_session_events();
        let manager = ProcessManager::with_shell(tx, "/bin/sh");
        let handle = manager.spawn("printf out; printf err 1>&2; exit 3", Path::new("/")).unwrap();

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut exit_code = None;
        while let Some(event) = rx.recv().await {
            match event {
                SessionEvent::Stdout { chunk } => stdout.push_str(&chunk),
                SessionEvent::Stderr { chunk } => stderr.push_str(&chunk),
                SessionEvent::CommandFinished { exit_code: code, .. } => {
                    exit_code = code;
                    break;
                }
                _ => {}
            }
        }

        assert_eq!(stdout, "out");
        assert_eq!(stderr, "err");
        assert_eq!(exit_code, Some(3));
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn test_runs_in_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = init_session_events();
        let manager = ProcessManager::with_shell(tx, "/bin/sh");
        manager.spawn("pwd", dir.path()).unwrap();

        let mut stdout = String::new();
        while let Some(event) = rx.recv().await {
            match event {
                SessionEvent::Stdout { chunk } => stdout.push_str(&chunk),
                SessionEvent::CommandFinished { .. } => break,
                _ => {}
            }
        }

        let expected = std::fs::canonicalize(dir.path()).unwrap();
        assert_eq!(stdout.trim(), expected.to_string_lossy());
    }
}
