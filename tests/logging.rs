//! Logging and verbosity tests.

mod support;
use support::*;

#[test]
fn test_verbose_flag_shows_debug_output() {
    let t = Test::with_manifest(MANIFEST);

    let output = t.run(&["--verbose", "plan", "--no-refresh"]);

    assert_success(&output);
    assert_stderr_contains(&output, "loading manifest");
}

#[test]
fn test_default_no_log_output() {
    let t = Test::with_manifest(MANIFEST);

    let output = t.run(&["plan", "--no-refresh"]);

    assert_success(&output);
    let err = stderr(&output);
    assert!(
        !err.contains("DEBUG") && !err.contains("TRACE"),
        "default mode should not show debug output, got: {}",
        err
    );
}

#[test]
fn test_opsync_log_env_var() {
    let t = Test::with_manifest(MANIFEST);

    let output = t
        .cmd()
        .env("OPSYNC_LOG", "opsync=debug")
        .args(["plan", "--no-refresh"])
        .output()
        .unwrap();

    assert_success(&output);
    assert_stderr_contains(&output, "manifest loaded");
}

#[test]
fn test_verbose_flag_is_global() {
    let t = Test::new();

    let output = t.run(&["state", "list", "--verbose"]);

    assert_success(&output);
    assert_stderr_contains(&output, "no state file");
}
