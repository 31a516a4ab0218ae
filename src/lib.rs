//! pipesh - a small pipeline shell
//!
//! # Overview
//!
//! pipesh reads one command line at a time, splits it on whitespace,
//! expands `~` and `$NAME`, and runs the result as a pipeline of up to
//! three external programs connected by pipes. A pipeline may redirect the
//! input of any stage from a file and the output of any stage to a file,
//! and may be started in the background with a trailing `&`.
//!
//! ```text
//! ls -la /tmp                  # one stage
//! cat < in.txt | sort | uniq   # three stages, first reads in.txt
//! echo hi > out.txt            # output truncated into out.txt (mode 0600)
//! sleep 10 &                   # background job, prints "[1] <pid>"
//! ```
//!
//! Three builtins run inside the shell: `cd`, `jobs` and `exit`.
//!
//! # Example
//!
//! ```no_run
//! use pipesh::{Config, Console, Flow, Shell};
//!
//! let mut shell = Shell::new(Config::from_env(), Console::stdio());
//! assert_eq!(shell.execute("echo hello | tr a-z A-Z"), Flow::Continue);
//! shell.reap();
//! ```

pub mod ast;
pub mod builtins;
pub mod config;
pub mod console;
pub mod executor;
pub mod expand;
pub mod history;
pub mod jobs;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod shell;
pub mod signals;

// Re-export commonly used items
pub use ast::{Pipeline, Stage};
pub use builtins::{Builtin, BuiltinError, Flow};
pub use config::Config;
pub use console::Console;
pub use executor::{ExecuteError, LaunchOutcome, Launcher, StageStatus};
pub use history::History;
pub use jobs::{Job, JobState, JobTable};
pub use lexer::tokenize;
pub use parser::{build, ParseError};
pub use resolver::ExecutableResolver;
pub use shell::{Shell, ShellError};
