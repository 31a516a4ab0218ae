//! Descriptor accounting for the launcher
//!
//! Lives in its own test binary: counting `/proc/self/fd` is only reliable
//! when no other test opens files at the same time.

#![cfg(target_os = "linux")]

use pipesh::{build, Console, ExecutableResolver, JobTable, LaunchOutcome, Launcher};
use std::fs;

fn open_fds() -> usize {
    fs::read_dir("/proc/self/fd").unwrap().count()
}

fn run(line: &str, launcher: &Launcher<'_>, jobs: &mut JobTable, console: &mut Console) {
    let tokens: Vec<String> = line.split_whitespace().map(String::from).collect();
    let pipeline = build(&tokens, 3).unwrap();
    let _ = launcher.launch(&pipeline, line, jobs, console);
}

#[test]
fn launch_closes_every_descriptor_it_opens() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let output = dir.path().join("out.txt");
    fs::write(&input, "b\na\nb\n").unwrap();

    let resolver = ExecutableResolver::with_path(["/bin", "/usr/bin"]);
    let launcher = Launcher::new(&resolver);
    let mut jobs = JobTable::default();
    let (mut console, _captured) = Console::captured();

    let before = open_fds();

    run(&format!("echo hi > {}", output.display()), &launcher, &mut jobs, &mut console);
    assert_eq!(fs::read_to_string(&output).unwrap(), "hi\n");

    run(
        &format!("cat < {} | sort | uniq > {}", input.display(), output.display()),
        &launcher,
        &mut jobs,
        &mut console,
    );
    assert_eq!(fs::read_to_string(&output).unwrap(), "a\nb\n");

    // An unknown program fails inside its own child
    run("echo a | cat | nosuchcommand-xyz", &launcher, &mut jobs, &mut console);

    // Failing launches release what they acquired
    run("cat < /nonexistent/input/file | sort", &launcher, &mut jobs, &mut console);
    run(&format!("cat < {} | sort", dir.path().display()), &launcher, &mut jobs, &mut console);

    // Background pipes end up in the children only
    let tokens: Vec<String> = ["sleep", "0", "|", "cat", "&"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let pipeline = build(&tokens, 3).unwrap();
    let outcome = launcher
        .launch(&pipeline, "sleep 0 | cat &", &mut jobs, &mut console)
        .unwrap();
    assert!(matches!(outcome, LaunchOutcome::Background { job: Some(1), .. }));

    assert_eq!(open_fds(), before);

    jobs.await_all_and_clear();
}
