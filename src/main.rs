//! pipesh - a small pipeline shell
//!
//! Usage:
//!   pipesh              Start interactive REPL (or read commands from stdin)
//!   pipesh -c "cmd"     Execute a single command line
//!   pipesh script.sh    Execute a script file line by line

mod cli;
mod prompt;
mod rcfile;
mod repl;
mod terminal;

use pipesh::Config;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let cli = cli::parse_args(&args);

    if cli.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }

    if cli.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let mut config = Config::from_env();
    if cli.trace {
        config.trace = true;
    }

    if let Some(cmd) = cli.command {
        return cli::execute_command(&cmd, config);
    }

    if let Some(script) = cli.script {
        return cli::execute_script(&script, config);
    }

    if let Err(e) = pipesh::signals::install_interrupt_guard() {
        eprintln!("warning: cannot install interrupt handler: {}", e);
    }

    let code = if terminal::stdin_is_terminal() {
        match repl::run_repl(config) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        terminal::run_stdin(config)
    };

    terminal::exit_code(code)
}
