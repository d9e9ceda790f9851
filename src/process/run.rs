use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use super::types::{
    CheckCommand, NOT_EXECUTABLE_STATUS, NOT_FOUND_STATUS, OutputLine, ProcessResult,
    TIMEOUT_STATUS,
};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long output is still collected once the check itself has exited.
/// Pipes kept open by background descendants are not waited for past this.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Spawn a check in `cwd` and return a channel that streams its output.
///
/// The caller receives [`OutputLine::Stdout`]/[`OutputLine::Stderr`] as they
/// arrive, followed by exactly one [`OutputLine::Done`] carrying the final
/// result. Spawn errors are returned directly; map them to a status with
/// [`spawn_failure_status`].
///
/// With a timeout, the check runs in its own process group so that expiry
/// kills everything it started, not just the direct child.
pub fn spawn(cmd: &CheckCommand, cwd: &Path) -> Result<Receiver<OutputLine>> {
    let mut command = Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        if cmd.timeout.is_some() {
            command.process_group(0);
        }
    }

    let mut child = command
        .spawn()
        .with_context(|| format!("failed to spawn `{}`", cmd.program))?;

    let stdout = child.stdout.take().context("stdout was not piped")?;
    let stderr = child.stderr.take().context("stderr was not piped")?;

    let (tx, rx) = mpsc::channel();
    let timeout = cmd.timeout;

    std::thread::spawn(move || {
        let (eof_tx, eof_rx) = mpsc::channel();
        forward_lines(stdout, tx.clone(), eof_tx.clone(), OutputLine::Stdout);
        forward_lines(stderr, tx.clone(), eof_tx, OutputLine::Stderr);
        supervise(child, eof_rx, timeout, tx);
    });

    Ok(rx)
}

/// Exit status a shell would report for a check that could not be started.
pub fn spawn_failure_status(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<std::io::Error>().map(|e| e.kind()) {
        Some(ErrorKind::PermissionDenied) => NOT_EXECUTABLE_STATUS,
        _ => NOT_FOUND_STATUS,
    }
}

/// Collapse an [`ExitStatus`] into a single integer, shell style.
pub fn normalize_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// Forward raw lines from `source` until EOF, then signal `eof`.
fn forward_lines<R, F>(source: R, tx: Sender<OutputLine>, eof: Sender<()>, wrap: F)
where
    R: Read + Send + 'static,
    F: Fn(Vec<u8>) -> OutputLine + Send + 'static,
{
    std::thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                // Keep draining after the receiver is gone so the writer
                // never hits a closed pipe.
                Ok(_) => {
                    let _ = tx.send(wrap(std::mem::take(&mut buf)));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(_) => break,
            }
        }
        let _ = eof.send(());
    });
}

fn supervise(
    mut child: Child,
    eof_rx: Receiver<()>,
    timeout: Option<Duration>,
    tx: Sender<OutputLine>,
) {
    let (exit_status, timed_out) = match timeout {
        None => (child.wait().ok(), false),
        Some(limit) => wait_with_timeout(&mut child, limit),
    };

    // Both readers normally hit EOF as soon as the child is gone.
    let deadline = Instant::now() + DRAIN_GRACE;
    for _ in 0..2 {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if eof_rx.recv_timeout(remaining).is_err() {
            tracing::debug!("output pipes still open after exit, not waiting");
            break;
        }
    }

    let status = if timed_out {
        TIMEOUT_STATUS
    } else {
        exit_status.map(normalize_status).unwrap_or(1)
    };

    let _ = tx.send(OutputLine::Done(ProcessResult { status, timed_out }));
}

fn wait_with_timeout(child: &mut Child, limit: Duration) -> (Option<ExitStatus>, bool) {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return (Some(status), false),
            Ok(None) => {}
            Err(_) => return (None, false),
        }

        if start.elapsed() > limit {
            kill_tree(child);
            return (None, true);
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Kill the child and, on Unix, the process group it leads.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        let pgid = child.id() as libc::pid_t;
        // SAFETY: kill(2) only sends a signal; a negative pid targets the
        // group created by `process_group(0)` at spawn, led by this child.
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }

    #[cfg(not(unix))]
    {
        let _ = child.kill();
    }

    let _ = child.wait();
}
