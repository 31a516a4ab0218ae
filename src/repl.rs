use crate::prompt::current_prompt;
use crate::rcfile::load_pipeshrc;
use pipesh::{signals, Config, Console, Flow, Shell};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the interactive loop; returns the status the process should end with
pub(crate) fn run_repl(config: Config) -> RlResult<i32> {
    let mut rl = DefaultEditor::new()?;

    // Show banner only if PIPESH_BANNER is set
    if config.banner {
        println!("pipesh-{} - a small pipeline shell", VERSION);
        println!("  Type 'exit' or Ctrl-D to quit, 'pipesh --help' for usage");
    }

    let mut shell = Shell::new(config, Console::stdio());

    if let Flow::Exit(code) = load_pipeshrc(&mut shell) {
        return Ok(code);
    }

    loop {
        // Completion notices for background jobs come before the prompt
        shell.reap();

        match rl.readline(&current_prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                if let Flow::Exit(code) = shell.execute(trimmed) {
                    return Ok(code);
                }

                // A foreground child was interrupted; start the prompt on a
                // fresh line
                if signals::take_interrupt() {
                    println!();
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C at the prompt - discard the line, continue
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D - same as exit
                return Ok(shell.terminate());
            }
            Err(err) => {
                eprintln!("error: {:?}", err);
                return Ok(shell.terminate());
            }
        }
    }
}
