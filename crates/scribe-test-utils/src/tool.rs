//! [`StubTool`] executables that stand in for external tooling.
//!
//! Provisioning tests need a "dependency manager" that exists, runs fast,
//! and tells the test how it was invoked. A stub is a small shell script
//! that appends its working directory and arguments to a record file next
//! to itself, then exits with a fixed status.

use std::fs;
use std::path::{Path, PathBuf};

/// One recorded invocation of a [`StubTool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Working directory the tool was started in.
    pub cwd: PathBuf,
    /// Arguments, not including the program name.
    pub args: Vec<String>,
}

/// A fake executable that records invocations.
///
/// # Example
///
/// ```rust,no_run
/// use scribe_test_utils::StubTool;
///
/// let dir = tempfile::tempdir().unwrap();
/// let stub = StubTool::succeeding(dir.path(), "bundle");
/// // ... run code that invokes stub.path() ...
/// let runs = stub.invocations();
/// assert_eq!(runs.len(), 1);
/// assert_eq!(runs[0].args, vec!["install", "--deployment"]);
/// ```
#[derive(Debug)]
pub struct StubTool {
    path: PathBuf,
    record: PathBuf,
}

impl StubTool {
    /// Create a stub named `name` in `dir` that exits 0.
    pub fn succeeding(dir: &Path, name: &str) -> Self {
        Self::write(dir, name, "exit 0\n")
    }

    /// Create a stub that prints `stderr_message` on stderr and exits 1.
    pub fn failing(dir: &Path, name: &str, stderr_message: &str) -> Self {
        let message_file = dir.join(format!("{name}.stderr"));
        fs::write(&message_file, stderr_message).unwrap();
        Self::write(
            dir,
            name,
            &format!("cat \"{}\" >&2\nexit 1\n", message_file.display()),
        )
    }

    fn write(dir: &Path, name: &str, tail: &str) -> Self {
        let path = dir.join(name);
        let record = dir.join(format!("{name}.record"));
        // One block per run, terminated by a blank line, appended so
        // repeated runs are all visible to the test.
        let script = format!(
            "#!/bin/sh\n{{\n  pwd\n  printf '%s\\n' \"$@\"\n  echo\n}} >> \"{}\"\n{tail}",
            record.display()
        );
        fs::write(&path, script).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        Self { path, record }
    }

    /// Path to the stub executable.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every invocation of the stub so far, oldest first.
    pub fn invocations(&self) -> Vec<Invocation> {
        let Ok(text) = fs::read_to_string(&self.record) else {
            return Vec::new();
        };
        text.split("\n\n")
            .filter(|block| !block.trim().is_empty())
            .map(|block| {
                let mut lines = block.lines();
                let cwd = PathBuf::from(lines.next().unwrap_or_default());
                let args = lines.map(str::to_string).collect();
                Invocation { cwd, args }
            })
            .collect()
    }

    /// The most recent invocation, or `None` if the stub never ran.
    pub fn last_invocation(&self) -> Option<Invocation> {
        self.invocations().pop()
    }
}
