//! Common test utilities for pipesh integration tests

use assert_cmd::Command;

/// Search list used by every test shell
pub const TEST_PATH: &str = "/bin:/usr/bin";

/// The pipesh binary with a predictable environment
pub fn pipesh() -> Command {
    let mut cmd = Command::cargo_bin("pipesh").unwrap();
    cmd.env("PATH", TEST_PATH)
        .env_remove("PIPESH_TRACE")
        .env_remove("PIPESH_MAX_STAGES")
        .env_remove("PIPESH_HISTORY")
        .env_remove("PIPESH_MAX_JOBS");
    cmd
}

/// Run pipesh reading `input` from a non-terminal stdin
#[allow(dead_code)]
pub fn run_stdin(input: &str) -> assert_cmd::assert::Assert {
    pipesh().write_stdin(input).assert()
}
