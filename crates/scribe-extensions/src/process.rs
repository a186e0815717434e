//! Bounded, cancellable waits on the installer's subprocesses.
//!
//! Every external step of the pipeline (manifest streaming, extraction,
//! provisioning) runs as a child process. None of them is allowed to block
//! the host forever: waits are deadline-bounded, and a [`CancelToken`] lets
//! the host abort an in-flight attempt. Cancellation is honored at process
//! granularity only — the child is killed between polls, never interrupted
//! mid-write.

use std::io::Read;
use std::process::{Child, ExitStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// How often a bounded wait re-checks the child, the deadline, and the token.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cooperative cancellation flag for one install attempt.
///
/// Cheap to clone; all clones share the flag. Cancelling is sticky — there
/// is no reset, matching the one-shot lifecycle of an attempt.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The next poll of a bounded wait kills the child.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Wall-clock limits for the pipeline's subprocess steps.
#[derive(Debug, Clone)]
pub struct ProcessLimits {
    /// Manifest streaming must produce its first output (or finish) within
    /// this window.
    pub manifest_start: Duration,
    /// Each subsequent read during manifest streaming must make progress
    /// within this window.
    pub manifest_read_idle: Duration,
    /// Upper bound on the whole archive extraction.
    pub extract_timeout: Duration,
    /// Upper bound on dependency provisioning. Generous, because the
    /// dependency manager may be downloading.
    pub provision_timeout: Duration,
}

impl Default for ProcessLimits {
    fn default() -> Self {
        Self {
            manifest_start: Duration::from_secs(20),
            manifest_read_idle: Duration::from_secs(30),
            extract_timeout: Duration::from_secs(10 * 60),
            provision_timeout: Duration::from_secs(15 * 60),
        }
    }
}

/// Why a bounded wait returned.
#[derive(Debug)]
pub(crate) enum WaitOutcome {
    /// The child exited on its own.
    Exited(ExitStatus),
    /// The deadline passed; the child has been killed and reaped.
    TimedOut,
    /// The token was cancelled; the child has been killed and reaped.
    Cancelled,
}

/// Wait for `child` to exit, killing it on deadline or cancellation.
///
/// Polls rather than blocks so both conditions can be observed. The returned
/// I/O error only covers a failure to query the child; timeout and
/// cancellation are ordinary outcomes.
pub(crate) fn wait_bounded(
    child: &mut Child,
    timeout: Duration,
    cancel: &CancelToken,
) -> std::io::Result<WaitOutcome> {
    let deadline = Instant::now() + timeout;
    loop {
        // Cancellation wins over a concurrent exit: the attempt is being
        // abandoned either way, and retry is self-healing.
        if cancel.is_cancelled() {
            kill_and_reap(child);
            return Ok(WaitOutcome::Cancelled);
        }
        if let Some(status) = child.try_wait()? {
            return Ok(WaitOutcome::Exited(status));
        }
        if Instant::now() >= deadline {
            kill_and_reap(child);
            return Ok(WaitOutcome::TimedOut);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Kill the child and collect its exit status so no zombie is left behind.
pub(crate) fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Drain the child's stderr on a background thread.
///
/// A child that writes more stderr than the pipe buffer holds would block
/// until someone reads it; draining concurrently keeps the bounded wait
/// honest and still delivers the full text once the child exits.
pub(crate) fn capture_stderr(child: &mut Child) -> std::thread::JoinHandle<String> {
    let stderr = child.stderr.take();
    std::thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut stderr) = stderr {
            let _ = stderr.read_to_string(&mut text);
        }
        text.trim().to_string()
    })
}
