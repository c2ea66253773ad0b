//! Assertions on finished opsync runs.
//!
//! Every failure message includes the exit status and both streams, since a
//! failed plan or apply usually explains itself on stderr while the hint is
//! on stdout.

use std::process::Output;

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn report(output: &Output) -> String {
    format!(
        "status: {}\n--- stdout ---\n{}\n--- stderr ---\n{}",
        output.status,
        stdout(output),
        stderr(output)
    )
}

pub fn assert_success(output: &Output) {
    assert!(output.status.success(), "opsync failed\n{}", report(output));
}

pub fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "opsync unexpectedly succeeded\n{}",
        report(output)
    );
}

pub fn assert_stdout_contains(output: &Output, expected: &str) {
    assert!(
        stdout(output).contains(expected),
        "expected '{}' on stdout\n{}",
        expected,
        report(output)
    );
}

pub fn assert_stderr_contains(output: &Output, expected: &str) {
    assert!(
        stderr(output).contains(expected),
        "expected '{}' on stderr\n{}",
        expected,
        report(output)
    );
}

pub fn assert_stdout_excludes(output: &Output, excluded: &str) {
    assert!(
        !stdout(output).contains(excluded),
        "did not expect '{}' on stdout\n{}",
        excluded,
        report(output)
    );
}
