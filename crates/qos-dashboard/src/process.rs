//! Child process supervision for backend scripts and traffic generators.
//!
//! Output is captured line by line into the process's log channel. The
//! supervisor owns the child until it exits, then unregisters it and logs
//! the exit code.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::backend::SharedBackend;

/// How long to wait for the output readers to drain after the child exits.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

pub(crate) fn spawn_piped(mut command: Command) -> io::Result<Child> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    command.spawn()
}

/// Build a command from `argv`. `None` when `argv` is empty.
pub(crate) fn command_from_argv(argv: &[String]) -> Option<Command> {
    let (program, args) = argv.split_first()?;
    let mut command = Command::new(program);
    command.args(args);
    Some(command)
}

/// Exit code as the operator sees it; death by signal `n` reads as `-n`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

fn pipe_lines<R>(state: SharedBackend, channel: String, reader: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    state.write().await.push_log(&channel, line);
                }
                Err(e) => {
                    tracing::debug!(channel = %channel, error = %e, "Output stream closed");
                    break;
                }
            }
        }
    })
}

/// Capture output of `child` into `channel` until it exits or `stop_rx`
/// fires, then unregister process `id`.
pub(crate) async fn supervise(
    state: SharedBackend,
    channel: String,
    id: u64,
    mut child: Child,
    stop_rx: oneshot::Receiver<()>,
) {
    let readers: Vec<JoinHandle<()>> = [
        child
            .stdout
            .take()
            .map(|out| pipe_lines(state.clone(), channel.clone(), out)),
        child
            .stderr
            .take()
            .map(|err| pipe_lines(state.clone(), channel.clone(), err)),
    ]
    .into_iter()
    .flatten()
    .collect();

    let status = tokio::select! {
        status = child.wait() => status,
        Ok(()) = stop_rx => {
            tracing::debug!(channel = %channel, "Stopping child process");
            if let Err(e) = child.kill().await {
                tracing::warn!(channel = %channel, error = %e, "Failed to kill child process");
            }
            child.wait().await
        }
    };

    let code = match status {
        Ok(status) => exit_code(status),
        Err(e) => {
            tracing::warn!(channel = %channel, error = %e, "Failed to wait on child process");
            -1
        }
    };
    state.write().await.finish(&channel, id);

    // Pipes held open by a grandchild must not outlive the drain window.
    let aborts: Vec<_> = readers.iter().map(JoinHandle::abort_handle).collect();
    let drained = tokio::time::timeout(DRAIN_TIMEOUT, futures_util::future::join_all(readers)).await;
    if drained.is_err() {
        tracing::debug!(channel = %channel, "Output readers still open after exit");
        for handle in aborts {
            handle.abort();
        }
    }

    state
        .write()
        .await
        .push_log(&channel, format!("[SYSTEM] {} stopped with code {}.", channel, code));
    tracing::info!(channel = %channel, code, "Child process exited");
}
