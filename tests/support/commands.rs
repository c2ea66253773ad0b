//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

/// An `op` binary name that is never on PATH.
pub const MISSING_OP: &str = "opsync-test-no-such-op";

impl Test {
    /// An opsync command running in the project directory.
    ///
    /// Color is disabled and the backend is pointed at a binary that does
    /// not exist, so nothing can reach a real account.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("opsync").expect("failed to find opsync binary");
        cmd.current_dir(self.dir.path());
        cmd.env("NO_COLOR", "1");
        cmd.env("OPSYNC_OP", MISSING_OP);
        cmd.env_remove("OPSYNC_LOG");
        cmd.env_remove("OPSYNC_ACCOUNT");
        cmd.env_remove("OPSYNC_EMAIL");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run opsync")
    }

    pub fn plan(&self) -> Output {
        self.run(&["plan"])
    }

    pub fn state_list(&self) -> Output {
        self.run(&["state", "list"])
    }
}
