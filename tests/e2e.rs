//! End-to-end tests driving the pipesh binary over stdin

mod common;

use common::{pipesh, run_stdin};
use predicates::prelude::*;
use std::fs;

#[test]
fn output_redirection_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");
    let line = format!("echo hi > {}", out.display());

    run_stdin(&format!("{}\n", line))
        .success()
        .stdout(format!("{}\n", line));
    assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");
}

#[test]
fn pipeline_with_input_redirection() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    fs::write(&input, "pear\napple\npear\n").unwrap();

    run_stdin(&format!("cat < {} | sort | uniq\n", input.display()))
        .success()
        .stdout(predicate::str::starts_with("apple\npear\n"));
}

#[test]
fn too_many_pipes_is_rejected() {
    run_stdin("echo a | cat | cat | cat\necho ok\n")
        .success()
        .stdout(predicate::str::starts_with("ok\n"))
        .stderr(predicate::str::contains("too many pipes"));
}

#[test]
fn unknown_command_does_not_stop_the_shell() {
    run_stdin("nosuchcmd123\necho still here\n")
        .success()
        .stdout(predicate::str::starts_with("still here\n"))
        .stderr(predicate::str::contains("command not found: nosuchcmd123"));
}

#[test]
fn unknown_stage_does_not_stop_its_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");

    run_stdin(&format!("echo hi > {} | nosuchcmd123\nnosuchcmd123 &\n", out.display()))
        .success()
        .stdout(predicate::str::is_match(r"^\[1\] \d+\n").unwrap())
        .stderr(predicate::str::contains("command not found: nosuchcmd123"));
    assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");
}

#[test]
fn background_job_is_announced_and_listed() {
    let listing = r"^\[1\] \d+\n\[1\]\+ \d+ sleep 2 &\njobs\nsleep 2 &\n$";
    run_stdin("sleep 2 &\njobs\n")
        .success()
        .stdout(predicate::str::is_match(listing).unwrap());
}

#[test]
fn finished_job_is_reported_before_next_command() {
    run_stdin("sleep 0 &\nsleep 0.3\njobs\n")
        .success()
        .stdout(predicate::str::contains("[1] + done sleep 0 &\n"))
        .stdout(predicate::str::contains("no active background processes\n"));
}

#[test]
fn cd_with_too_many_arguments() {
    run_stdin("cd /tmp /\n")
        .success()
        .stderr(predicate::str::contains("cd: too many arguments"));
}

#[test]
fn cd_changes_directory_for_later_commands() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().canonicalize().unwrap();

    run_stdin(&format!("cd {}\npwd\n", target.display()))
        .success()
        .stdout(predicate::str::starts_with(format!("{}\n", target.display())));
}

#[test]
fn exit_prints_last_three_commands() {
    run_stdin("echo a\necho b\necho c\necho d\nexit\necho never\n")
        .success()
        .stdout("a\nb\nc\nd\necho d\necho c\necho b\n");
}

#[test]
fn end_of_input_without_history() {
    run_stdin("")
        .success()
        .stdout("no valid commands in history\n");
}

#[test]
fn dash_c_runs_one_line() {
    pipesh()
        .args(["-c", "echo hi | tr a-z A-Z"])
        .assert()
        .success()
        .stdout("HI\n");
}

#[test]
fn dash_c_exit_status_follows_last_stage() {
    pipesh().args(["-c", "false"]).assert().code(1);
    pipesh().args(["-c", "true | false | true"]).assert().code(0);
    pipesh().args(["-c", "nosuchcmd123"]).assert().code(127);
}

#[test]
fn home_and_variables_are_expanded() {
    let dir = tempfile::tempdir().unwrap();
    pipesh()
        .env("HOME", dir.path())
        .env("GREETING", "hello")
        .args(["-c", "echo $GREETING ~/x $UNSET_PIPESH_VAR end"])
        .assert()
        .success()
        .stdout(format!("hello {}/x  end\n", dir.path().display()));
}

#[test]
fn script_file_runs_line_by_line() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("run.sh");
    let out = dir.path().join("out.txt");
    fs::write(
        &script,
        format!("# write then read\necho one > {0}\ncat < {0}\n", out.display()),
    )
    .unwrap();

    pipesh().arg(&script).assert().success().stdout("one\n");
}

#[test]
fn trace_flag_reports_spawned_stages() {
    pipesh()
        .args(["--trace", "-c", "true"])
        .assert()
        .success()
        .stderr(predicate::str::contains("trace: stage 0 pid "));
}

#[test]
fn version_flag() {
    pipesh()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("pipesh-"));
}
