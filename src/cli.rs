use crate::terminal::{exit_code, run_lines};
use pipesh::{Config, Console, Flow, Shell};
use std::fs;
use std::io::BufReader;
use std::process::ExitCode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parsed command-line arguments
#[derive(Debug, Default)]
pub(crate) struct CliArgs {
    pub(crate) command: Option<String>,
    pub(crate) script: Option<String>,
    pub(crate) help: bool,
    pub(crate) version: bool,
    pub(crate) trace: bool,
}

/// Parse command-line arguments
pub(crate) fn parse_args(args: &[String]) -> CliArgs {
    let mut cli = CliArgs::default();

    let mut i = 1; // Skip program name
    while i < args.len() {
        match args[i].as_str() {
            "--trace" => {
                cli.trace = true;
            }
            "-c" => {
                // Everything after -c is the command
                if i + 1 < args.len() {
                    cli.command = Some(args[i + 1..].join(" "));
                    break;
                }
            }
            "--help" | "-h" => {
                cli.help = true;
            }
            "--version" | "-V" => {
                cli.version = true;
            }
            path => {
                if !path.starts_with('-') {
                    cli.script = Some(path.to_string());
                }
            }
        }
        i += 1;
    }

    cli
}

pub(crate) fn print_help() {
    println!(
        r#"pipesh-{} - a small pipeline shell

USAGE:
    pipesh                  Start interactive REPL (reads stdin when not a terminal)
    pipesh -c <command>     Execute a single command line
    pipesh <script>         Execute a script file line by line
    pipesh --trace          Print trace lines for pipelines and processes
    pipesh --help           Show this help message
    pipesh --version        Show version

STARTUP:
    ~/.pipeshrc             Executed on REPL startup (if exists)
    PIPESH_BANNER=1         Show startup banner (quiet by default)

ENVIRONMENT:
    PATH                    Program search list (default /bin:/usr/bin)
    HOME                    Target of cd without arguments, value of ~
    PIPESH_MAX_JOBS         Background job slots (default 32)
    PIPESH_HISTORY          Remembered lines (default 3; exit shows at most 3)
    PIPESH_MAX_STAGES       Commands per pipeline (default 3)
    PIPESH_TRACE=1          Same as --trace

SYNTAX:
    cmd args                Run a program found on PATH
    a | b | c               Pipe stdout of each command into the next
    cmd < file              Read stdin from a regular file
    cmd > file              Write stdout to file (truncated, mode 0600)
    cmd &                   Run in the background, prints [job] pid
    ~  ~/path  $NAME        Expanded before the line is split into stages

BUILTINS:
    cd [dir]                Change directory (HOME without an argument)
    jobs                    List active background jobs
    exit                    Wait for background jobs, print recent history, quit

EXAMPLES:
    ls -la /tmp
    cat < notes.txt | sort | uniq > sorted.txt
    sleep 30 &
"#,
        VERSION
    );
}

pub(crate) fn print_version() {
    println!("pipesh-{}", VERSION);
}

/// Execute a single command line and exit with its status
pub(crate) fn execute_command(cmd: &str, config: Config) -> ExitCode {
    let mut shell = Shell::new(config, Console::stdio());
    let code = match shell.execute(cmd) {
        Flow::Exit(code) => code,
        Flow::Continue => {
            shell.finish();
            shell.last_exit_code()
        }
    };
    exit_code(code)
}

/// Execute a script file line by line
pub(crate) fn execute_script(path: &str, config: Config) -> ExitCode {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error reading {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let mut shell = Shell::new(config, Console::stdio());
    match run_lines(&mut shell, BufReader::new(file), false) {
        Some(code) => exit_code(code),
        None => {
            shell.finish();
            exit_code(shell.last_exit_code())
        }
    }
}
