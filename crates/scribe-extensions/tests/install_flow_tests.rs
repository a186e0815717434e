//! tests/install_flow_tests.rs

// End-to-end runs of the install pipeline against real tarballs and a stub
// dependency manager: fresh installs, destructive updates, provisioning
// failures, and the sweep-on-retry behavior that stands in for rollback.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use scribe_extensions::{
    BUNDLER_PATH_KEY, Error, InstallOutcome, Installer, MemorySettings, installed,
};
use scribe_test_utils::{ArchiveBuilder, StubTool};

fn ruby_archive(dir: &Path, version: &str) -> PathBuf {
    ArchiveBuilder::new()
        .file(
            "manifest.json",
            format!(
                r#"{{"unique_name": "demo-ext", "name": "Demo Extension", "version": "{version}", "runtime": "ruby"}}"#
            ),
        )
        .file("run.rb", "puts 'extension entry point'\n")
        .file("Gemfile", "source 'https://rubygems.org'\ngem 'rake'\n")
        .write_to(dir.join(format!("demo-{version}.tar.gz")))
}

fn installer_with_bundler(root: &Path, bundler: &StubTool) -> Installer {
    let mut settings = MemorySettings::new();
    settings.set(BUNDLER_PATH_KEY, bundler.path().to_string_lossy());
    Installer::new(root, Box::new(settings))
}

#[test]
fn test_fresh_install_extracts_and_provisions() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("extensions");
    let bundler = StubTool::succeeding(tmp.path(), "bundle");
    let archive = ruby_archive(tmp.path(), "1.0");

    let outcome = installer_with_bundler(&root, &bundler)
        .install(&archive)
        .unwrap();
    assert_eq!(outcome, InstallOutcome::Installed);

    let target = root.join("demo-ext");
    assert!(target.join("run.rb").is_file());
    assert!(target.join("Gemfile").is_file());
    assert!(target.join("manifest.json").is_file());

    let runs = bundler.invocations();
    assert_eq!(runs.len(), 1, "dependency manager must run exactly once");
    assert_eq!(runs[0].args, vec!["install", "--deployment"]);
    assert_eq!(runs[0].cwd, target.canonicalize().unwrap());
}

#[test]
fn test_update_replaces_previous_installation_wholesale() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("extensions");
    let previous = root.join("demo-ext");
    std::fs::create_dir_all(&previous).unwrap();
    std::fs::write(
        previous.join("manifest.json"),
        r#"{"unique_name": "demo-ext", "version": "1.0"}"#,
    )
    .unwrap();
    std::fs::write(previous.join("old.txt"), "left over from 1.0").unwrap();

    let bundler = StubTool::succeeding(tmp.path(), "bundle");
    let archive = ruby_archive(tmp.path(), "2.0");
    let installer = installer_with_bundler(&root, &bundler);

    let pending = installer.prepare(&archive).unwrap();
    assert!(pending.is_update());
    assert_eq!(pending.installed_version(), Some("1.0"));
    let outcome = pending.run().unwrap();
    assert_eq!(outcome, InstallOutcome::Updated);

    // Replacement is wholesale: nothing from 1.0 survives.
    assert!(!previous.join("old.txt").exists());
    assert!(previous.join("run.rb").is_file());
    let manifest = std::fs::read_to_string(previous.join("manifest.json")).unwrap();
    assert!(manifest.contains("2.0"), "manifest: {manifest}");
}

#[test]
fn test_provisioning_failure_leaves_extracted_files_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("extensions");
    let bundler = StubTool::failing(tmp.path(), "bundle", "Could not resolve dependencies");
    let archive = ruby_archive(tmp.path(), "1.0");

    let err = installer_with_bundler(&root, &bundler)
        .install(&archive)
        .unwrap_err();
    match err {
        Error::ProvisioningFailed { detail } => {
            assert!(
                detail.contains("Could not resolve dependencies"),
                "detail: {detail}"
            );
        }
        other => panic!("expected ProvisioningFailed, got {other:?}"),
    }

    // No rollback: the extracted files stay for the next attempt to sweep.
    assert!(root.join("demo-ext/run.rb").is_file());
}

#[test]
fn test_unknown_runtime_fails_after_extraction() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("extensions");
    let archive = ArchiveBuilder::new()
        .file(
            "manifest.json",
            r#"{"unique_name": "py-ext3", "runtime": "python3"}"#,
        )
        .file("main.py", "print('hello')\n")
        .write_to(tmp.path().join("py.tar.gz"));

    let installer = Installer::new(&root, Box::new(MemorySettings::new()));
    let err = installer.install(&archive).unwrap_err();
    match err {
        Error::UnknownRuntime { runtime } => assert_eq!(runtime, "python3"),
        other => panic!("expected UnknownRuntime, got {other:?}"),
    }
    assert!(root.join("py-ext3/main.py").is_file());
}

#[test]
fn test_missing_runtime_is_unknown_after_extraction() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("extensions");
    let archive = ArchiveBuilder::new()
        .file(
            "manifest.json",
            r#"{"unique_name": "plain-ext", "version": "0.3"}"#,
        )
        .file("plain.txt", "no runtime declared")
        .write_to(tmp.path().join("plain.tar.gz"));

    // A manifest without a runtime is an unregistered (empty) tag, not a
    // silent pass.
    let installer = Installer::new(&root, Box::new(MemorySettings::new()));
    let err = installer.install(&archive).unwrap_err();
    match err {
        Error::UnknownRuntime { runtime } => assert_eq!(runtime, ""),
        other => panic!("expected UnknownRuntime, got {other:?}"),
    }
    assert!(root.join("plain-ext/plain.txt").is_file());
}

#[test]
fn test_retry_sweeps_the_debris_of_a_failed_attempt() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("extensions");
    let archive = ruby_archive(tmp.path(), "1.0");

    let broken = StubTool::failing(tmp.path(), "bundle-broken", "boom");
    installer_with_bundler(&root, &broken)
        .install(&archive)
        .unwrap_err();
    assert!(root.join("demo-ext").is_dir(), "partial install expected");

    let fixed = StubTool::succeeding(tmp.path(), "bundle");
    let installer = installer_with_bundler(&root, &fixed);
    let pending = installer.prepare(&archive).unwrap();
    // The partial directory counts as installed, so the retry is an update.
    assert!(pending.is_update());
    let outcome = pending.run().unwrap();
    assert_eq!(outcome, InstallOutcome::Updated);
    assert!(root.join("demo-ext/run.rb").is_file());
}

#[test]
fn test_outcome_follows_prepare_time_detection() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("extensions");
    let bundler = StubTool::succeeding(tmp.path(), "bundle");
    let archive = ruby_archive(tmp.path(), "1.0");
    let installer = installer_with_bundler(&root, &bundler);

    let pending = installer.prepare(&archive).unwrap();
    assert!(!pending.is_update());
    // A directory that shows up between prepare and run is swept by the
    // replace step, but the outcome still reports what the prompt showed.
    std::fs::create_dir_all(root.join("demo-ext")).unwrap();
    std::fs::write(root.join("demo-ext/stale.txt"), "appeared late").unwrap();

    let outcome = pending.run().unwrap();
    assert_eq!(outcome, InstallOutcome::Installed);
    assert!(!root.join("demo-ext/stale.txt").exists());
    assert!(root.join("demo-ext/run.rb").is_file());
}

#[test]
fn test_cancelled_run_leaves_previous_installation_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("extensions");
    let previous = root.join("demo-ext");
    std::fs::create_dir_all(&previous).unwrap();
    std::fs::write(previous.join("old.txt"), "still here").unwrap();

    let bundler = StubTool::succeeding(tmp.path(), "bundle");
    let archive = ruby_archive(tmp.path(), "2.0");
    let installer = installer_with_bundler(&root, &bundler);

    let pending = installer.prepare(&archive).unwrap();
    installer.cancel_token().cancel();
    let err = pending.run().unwrap_err();
    assert!(matches!(err, Error::Cancelled), "got {err:?}");
    // Cancellation arrived before the destructive replace.
    assert_eq!(
        std::fs::read_to_string(previous.join("old.txt")).unwrap(),
        "still here"
    );
}

#[test]
fn test_installed_list_after_installs_is_sorted() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("extensions");
    let bundler = StubTool::succeeding(tmp.path(), "bundle");
    let demo = ruby_archive(tmp.path(), "1.0");
    let zeta = ArchiveBuilder::new()
        .file(
            "manifest.json",
            r#"{"unique_name": "zeta-ext", "runtime": "ruby"}"#,
        )
        .file("zeta.rb", "puts 'zeta'\n")
        .write_to(tmp.path().join("zeta.tar.gz"));

    let installer = installer_with_bundler(&root, &bundler);
    installer.install(&zeta).unwrap();
    installer.install(&demo).unwrap();

    let extensions = installed::list(&root).unwrap();
    let names: Vec<String> = extensions.iter().map(|e| e.display_name()).collect();
    assert_eq!(names, vec!["Demo Extension", "zeta-ext"]);
}
