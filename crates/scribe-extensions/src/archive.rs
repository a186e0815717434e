//! Archive access through the system `tar` utility.
//!
//! Packages are gzip-compressed tarballs. The crate never unpacks them
//! itself: the manifest is streamed out of the archive with
//! `tar --gzip -xOf <archive> manifest.json`, and extraction runs
//! `tar --gzip -xf <archive>` with the target directory as the working
//! directory. Member-path hygiene (stripping leading `/`, refusing `..`)
//! is `tar`'s own behavior and is not re-implemented here.

use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};

use tracing::debug;

use crate::error::{Error, Result};
use crate::process::{
    CancelToken, ProcessLimits, WaitOutcome, capture_stderr, kill_and_reap, wait_bounded,
};

const TAR_PROGRAM: &str = "tar";

/// Stream `manifest.json` out of `archive` without unpacking anything.
///
/// The read is bounded twice over: the first bytes must arrive within
/// `limits.manifest_start`, and every subsequent read must make progress
/// within `limits.manifest_read_idle`. A stalled or failing `tar` is killed
/// and reported as [`Error::ManifestUnavailable`]; so is an archive without
/// a `manifest.json` member, which `tar` reports through its exit status.
pub fn read_manifest(archive: &Path, limits: &ProcessLimits) -> Result<String> {
    let mut cmd = Command::new(TAR_PROGRAM);
    cmd.arg("--gzip")
        .arg("-xOf")
        .arg(archive)
        .arg(crate::MANIFEST_FILENAME)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    debug!("streaming manifest: {cmd:?}");

    let mut child = cmd
        .spawn()
        .map_err(|e| Error::manifest_unavailable(format!("could not launch tar: {e}")))?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::manifest_unavailable("tar stdout was not captured"))?;
    let stderr = capture_stderr(&mut child);

    // A reader thread forwards chunks so the timeouts can be enforced with
    // recv_timeout instead of blocking on the pipe directly.
    let (tx, rx) = mpsc::channel::<Vec<u8>>();
    let reader = std::thread::spawn(move || {
        let mut buf = [0u8; 8192];
        loop {
            match stdout.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
            }
        }
    });

    let mut raw = Vec::new();
    let mut window = limits.manifest_start;
    loop {
        match rx.recv_timeout(window) {
            Ok(chunk) => {
                raw.extend_from_slice(&chunk);
                window = limits.manifest_read_idle;
            }
            Err(RecvTimeoutError::Timeout) => {
                kill_and_reap(&mut child);
                let _ = reader.join();
                return Err(Error::manifest_unavailable(format!(
                    "no output from tar within {}s",
                    window.as_secs()
                )));
            }
            // Sender dropped: the stream hit EOF (or a read error, which
            // surfaces through the exit status below).
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    let _ = reader.join();

    let status = match wait_bounded(&mut child, limits.manifest_read_idle, &CancelToken::new())
        .map_err(|e| Error::manifest_unavailable(format!("failed to monitor tar: {e}")))?
    {
        WaitOutcome::Exited(status) => status,
        WaitOutcome::TimedOut | WaitOutcome::Cancelled => {
            return Err(Error::manifest_unavailable(format!(
                "tar did not exit within {}s of closing its output",
                limits.manifest_read_idle.as_secs()
            )));
        }
    };
    if !status.success() {
        return Err(Error::manifest_unavailable(exit_detail(
            TAR_PROGRAM,
            status,
            &stderr.join().unwrap_or_default(),
        )));
    }
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Unpack `archive` into `dest`, which must already exist.
///
/// The wait is bounded by `limits.extract_timeout` and observes `cancel`;
/// on either, `tar` is killed and whatever it already wrote stays behind
/// for the next attempt to sweep away.
pub(crate) fn extract(
    archive: &Path,
    dest: &Path,
    limits: &ProcessLimits,
    cancel: &CancelToken,
) -> Result<()> {
    let mut cmd = Command::new(TAR_PROGRAM);
    cmd.arg("--gzip")
        .arg("-xf")
        .arg(archive)
        .current_dir(dest)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    debug!("extracting archive: {cmd:?} in {}", dest.display());

    let mut child = cmd.spawn().map_err(|e| Error::ExtractionFailed {
        detail: format!("could not launch tar: {e}"),
    })?;
    let stderr = capture_stderr(&mut child);
    match wait_bounded(&mut child, limits.extract_timeout, cancel).map_err(|e| {
        Error::ExtractionFailed {
            detail: format!("failed to monitor tar: {e}"),
        }
    })? {
        WaitOutcome::Exited(status) if status.success() => Ok(()),
        WaitOutcome::Exited(status) => Err(Error::ExtractionFailed {
            detail: exit_detail(TAR_PROGRAM, status, &stderr.join().unwrap_or_default()),
        }),
        WaitOutcome::TimedOut => Err(Error::ExtractionFailed {
            detail: format!("timed out after {}s", limits.extract_timeout.as_secs()),
        }),
        WaitOutcome::Cancelled => Err(Error::Cancelled),
    }
}

/// Describe a failed exit, folding in whatever the child wrote to stderr.
pub(crate) fn exit_detail(program: &str, status: ExitStatus, stderr: &str) -> String {
    if stderr.is_empty() {
        format!("{program} exited with {status}")
    } else {
        format!("{program} exited with {status}: {stderr}")
    }
}
