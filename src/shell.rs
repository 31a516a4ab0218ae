//! Shell - the central coordinator for pipesh
//!
//! The Shell owns all state and runs one command line at a time:
//! 1. Tokenize (lexer)
//! 2. Expand `~` and `$NAME` (expand)
//! 3. Build the pipeline (parser)
//! 4. Dispatch a builtin, or launch child processes (executor)
//! 5. Record the line in history once a builtin ran or a pipeline was
//!    launched
//!
//! Reaping finished background jobs is a separate step, [`Shell::reap`],
//! which the input loop calls once per cycle.

use crate::builtins::{self, Builtin, BuiltinError, Flow};
use crate::config::Config;
use crate::console::Console;
use crate::executor::{ExecuteError, Launcher};
use crate::expand::expand_all;
use crate::history::History;
use crate::jobs::JobTable;
use crate::lexer::tokenize;
use crate::parser::{self, ParseError};
use crate::resolver::ExecutableResolver;
use std::io::Write;
use thiserror::Error;

/// Status reported for a line that could not be parsed
pub const EXIT_USAGE: i32 = 2;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("error: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Execute(#[from] ExecuteError),
    #[error(transparent)]
    Builtin(#[from] BuiltinError),
}

impl ShellError {
    /// Status a failed line leaves behind
    pub fn exit_code(&self) -> i32 {
        match self {
            ShellError::Parse(_) => EXIT_USAGE,
            ShellError::Execute(_) | ShellError::Builtin(_) => 1,
        }
    }
}

pub struct Shell {
    config: Config,
    resolver: ExecutableResolver,
    jobs: JobTable,
    history: History,
    console: Console,
    last_exit_code: i32,
}

impl Shell {
    /// Create a shell that searches the live `PATH`
    pub fn new(config: Config, console: Console) -> Self {
        Self::with_resolver(config, console, ExecutableResolver::new())
    }

    pub fn with_resolver(config: Config, console: Console, resolver: ExecutableResolver) -> Self {
        Shell {
            jobs: JobTable::new(config.max_jobs),
            history: History::new(config.history_size),
            config,
            resolver,
            console,
            last_exit_code: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.config.trace = trace;
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn console(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Status of the most recent command line
    pub fn last_exit_code(&self) -> i32 {
        self.last_exit_code
    }

    /// Run one command line. Errors are reported on the error stream and
    /// never end the shell; only `exit` does.
    pub fn execute(&mut self, line: &str) -> Flow {
        let line = line.trim();
        match self.run_line(line) {
            Ok(flow) => flow,
            Err(e) => {
                let _ = writeln!(self.console.err(), "{}", e);
                let _ = self.console.err().flush();
                self.last_exit_code = e.exit_code();
                Flow::Continue
            }
        }
    }

    fn run_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        let tokens = expand_all(&tokenize(line));
        let pipeline = parser::build(&tokens, self.config.max_stages)?;
        if pipeline.is_empty() {
            return Ok(Flow::Continue);
        }

        if self.config.trace {
            let _ = writeln!(
                self.console.err(),
                "trace: pipeline of {} stage(s){}",
                pipeline.len(),
                if pipeline.background { ", background" } else { "" }
            );
        }

        if let Some(builtin) = Builtin::recognize(&pipeline) {
            let args = pipeline.stages[0].argv.get(1..).unwrap_or_default();
            let result = builtin.run(args, &mut self.jobs, &self.history, &mut self.console);
            // A dispatched builtin counts as a valid command even if it failed
            self.history.push(line);
            let flow = result?;
            self.last_exit_code = match flow {
                Flow::Exit(code) => code,
                Flow::Continue => 0,
            };
            return Ok(flow);
        }

        let outcome = Launcher::new(&self.resolver)
            .with_trace(self.config.trace)
            .launch(&pipeline, line, &mut self.jobs, &mut self.console)?;
        self.history.push(line);
        self.last_exit_code = outcome.exit_code();
        Ok(Flow::Continue)
    }

    /// Collect finished background jobs and announce them
    pub fn reap(&mut self) -> Vec<usize> {
        let finished = self.jobs.reap_nonblocking(self.console.out());
        if self.config.trace {
            for id in &finished {
                let _ = writeln!(self.console.err(), "trace: reaped job {}", id);
            }
        }
        finished
    }

    /// End of input: behave exactly like the `exit` builtin
    pub fn terminate(&mut self) -> i32 {
        match builtins::terminate(&mut self.jobs, &self.history, self.console.out()) {
            Flow::Exit(code) => code,
            Flow::Continue => self.last_exit_code,
        }
    }

    /// Wait for outstanding background jobs without printing anything
    pub fn finish(&mut self) {
        self.jobs.await_all_and_clear();
        self.console.flush();
    }
}
