use pipesh::{Config, Console, Flow, Shell};
use std::io::{self, BufRead, IsTerminal};
use std::process::ExitCode;

/// Whether commands come from an interactive terminal
pub(crate) fn stdin_is_terminal() -> bool {
    io::stdin().is_terminal()
}

/// Convert a shell status into a process exit code
pub(crate) fn exit_code(code: i32) -> ExitCode {
    ExitCode::from((code & 0xff) as u8)
}

/// Read commands from a non-interactive stdin until `exit` or end of input
pub(crate) fn run_stdin(config: Config) -> i32 {
    let mut shell = Shell::new(config, Console::stdio());
    let stdin = io::stdin();
    let code = run_lines(&mut shell, stdin.lock(), true);
    code.unwrap_or_else(|| shell.last_exit_code())
}

/// Feed `input` to the shell one line at a time, reaping background jobs
/// before each line. Blank lines and `#` comments are skipped.
///
/// Returns `Some(status)` when the shell should end with that status. At end
/// of input the termination builtin runs when `exit_at_eof` is set;
/// otherwise `None` is returned.
pub(crate) fn run_lines<R: BufRead>(shell: &mut Shell, mut input: R, exit_at_eof: bool) -> Option<i32> {
    let mut buf = Vec::new();
    loop {
        shell.reap();

        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                eprintln!("error: reading input: {}", e);
                break;
            }
        }

        let line = String::from_utf8_lossy(&buf);
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Flow::Exit(code) = shell.execute(trimmed) {
            return Some(code);
        }
    }

    exit_at_eof.then(|| shell.terminate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipesh::console::Captured;
    use pipesh::ExecutableResolver;
    use std::io::Cursor;

    // These tests reap with waitpid(-1), so they stick to builtins and
    // lines that fail to parse and never spawn children
    fn shell() -> (Shell, Captured) {
        let (console, captured) = Console::captured();
        let resolver = ExecutableResolver::with_path(["/bin", "/usr/bin"]);
        (Shell::with_resolver(Config::default(), console, resolver), captured)
    }

    #[test]
    fn end_of_input_runs_exit() {
        let (mut sh, captured) = shell();
        let input = Cursor::new("jobs\n\n# comment\n  jobs  \n");
        assert_eq!(run_lines(&mut sh, input, true), Some(0));
        assert_eq!(
            captured.out_text(),
            "no active background processes\n\
             no active background processes\n\
             jobs\n\
             jobs\n"
        );
    }

    #[test]
    fn explicit_exit_stops_reading() {
        let (mut sh, captured) = shell();
        let input = Cursor::new("exit\njobs\n");
        assert_eq!(run_lines(&mut sh, input, true), Some(0));
        assert_eq!(captured.out_text(), "no valid commands in history\n");
    }

    #[test]
    fn scripts_end_without_exit() {
        let (mut sh, captured) = shell();
        let input = Cursor::new("cat <\n");
        assert_eq!(run_lines(&mut sh, input, false), None);
        assert_eq!(sh.last_exit_code(), 2);
        assert!(captured.out_text().is_empty());
        assert_eq!(captured.err_text(), "error: missing input file\n");
    }
}
