//! Builtins that run inside the shell process
//!
//! Only `cd`, `jobs` and `exit` exist, and they are recognized only when
//! they are the sole stage of a foreground pipeline. Redirections on a
//! builtin are ignored.

use crate::ast::Pipeline;
use crate::console::Console;
use crate::history::History;
use crate::jobs::JobTable;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuiltinError {
    #[error("cd: too many arguments")]
    TooManyArguments,
    #[error("cd: HOME not set")]
    HomeNotSet,
    #[error("cd: {path}: {source}")]
    ChangeDir {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Most history lines `exit` prints, whatever the ring holds
pub const EXIT_HISTORY_LINES: usize = 3;

/// What the read-eval loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// End the shell with this status
    Exit(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Jobs,
    Exit,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "cd" => Some(Builtin::Cd),
            "jobs" => Some(Builtin::Jobs),
            "exit" => Some(Builtin::Exit),
            _ => None,
        }
    }

    /// The builtin a pipeline invokes, if it is a lone foreground builtin
    pub fn recognize(pipeline: &Pipeline<'_>) -> Option<Builtin> {
        if pipeline.background {
            return None;
        }
        pipeline.single()?.program().and_then(Builtin::lookup)
    }

    /// Run the builtin with its arguments (program name excluded)
    pub fn run(
        self,
        args: &[&str],
        jobs: &mut JobTable,
        history: &History,
        console: &mut Console,
    ) -> Result<Flow, BuiltinError> {
        match self {
            Builtin::Cd => {
                let home = env::var("HOME").ok();
                change_dir(args, home.as_deref())?;
                Ok(Flow::Continue)
            }
            Builtin::Jobs => {
                list_jobs(jobs, console.out());
                Ok(Flow::Continue)
            }
            Builtin::Exit => Ok(terminate(jobs, history, console.out())),
        }
    }
}

/// Change the working directory to `args[0]`, or to `home` without
/// arguments, and publish the result in `PWD`
pub fn change_dir(args: &[&str], home: Option<&str>) -> Result<PathBuf, BuiltinError> {
    let target = match args {
        [] => home.ok_or(BuiltinError::HomeNotSet)?,
        [dir] => *dir,
        _ => return Err(BuiltinError::TooManyArguments),
    };

    env::set_current_dir(target).map_err(|source| BuiltinError::ChangeDir {
        path: target.to_string(),
        source,
    })?;

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from(target));
    env::set_var("PWD", &cwd);
    Ok(cwd)
}

/// Print one `[<job>]+ <pid> <cmdline>` line per active job
pub fn list_jobs(jobs: &JobTable, out: &mut dyn Write) {
    let mut any = false;
    for job in jobs.list_active() {
        any = true;
        let _ = writeln!(out, "[{}]+ {} {}", job.id, job.pid, job.cmdline);
    }
    if !any {
        let _ = writeln!(out, "no active background processes");
    }
    let _ = out.flush();
}

/// Wait for every background job, print up to [`EXIT_HISTORY_LINES`]
/// recent history entries and ask the loop to end successfully
pub fn terminate(jobs: &mut JobTable, history: &History, out: &mut dyn Write) -> Flow {
    jobs.await_all_and_clear();

    if history.is_empty() {
        let _ = writeln!(out, "no valid commands in history");
    } else {
        for line in history.recent().take(EXIT_HISTORY_LINES) {
            let _ = writeln!(out, "{}", line);
        }
    }
    let _ = out.flush();
    Flow::Exit(0)
}
