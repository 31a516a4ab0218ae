//! Executor: launches pipelines as child processes
//!
//! Launch happens in three phases:
//! 1. Prepare: look up every stage's program, open every redirection file
//!    and create the N-1 pipes. Every descriptor is owned by an RAII value,
//!    so an error here releases everything acquired so far and spawns
//!    nothing. A program that cannot be found is not an error at this
//!    point.
//! 2. Spawn: fork stages in order 0..N-1. Each child wires stdin/stdout
//!    (explicit redirection first, then the adjacent pipe, then inherited),
//!    closes every other pipe and redirection descriptor and execs. A child
//!    whose program was not found prints `command not found: <name>` and
//!    exits 127 instead; its siblings run as usual. The parent closes a
//!    stage's redirection files right after forking it.
//! 3. Hand off: the parent drops all pipe ends, then either registers the
//!    last stage as a background job or waits for every stage.
//!
//! When `launch` returns, every descriptor it opened is either closed or
//! held only by a child.

use crate::ast::{Pipeline, Stage};
use crate::console::Console;
use crate::jobs::JobTable;
use crate::resolver::ExecutableResolver;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{close, dup2, execv, fork, ForkResult, Pid};
use std::ffi::{CString, NulError};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStringExt;
use std::os::unix::fs::OpenOptionsExt;
use thiserror::Error;

/// Exit status of a child that could not run its program
pub const EXIT_NOT_EXECUTED: i32 = 127;

#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("missing command in stage {0}")]
    EmptyStage(usize),
    #[error("argument contains a NUL byte: {0}")]
    InvalidArgument(#[from] NulError),
    #[error("{path}: {source}")]
    Redirect {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{0}: input is not a regular file")]
    NotRegularFile(String),
    #[error("pipe: {0}")]
    Pipe(Errno),
    #[error("fork: {0}")]
    Fork(Errno),
}

/// How one stage of a foreground pipeline ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Exited(i32),
    Signaled(Signal),
    /// Waiting for the process failed
    Lost(Errno),
}

impl StageStatus {
    /// Shell-style numeric status
    pub fn code(&self) -> i32 {
        match self {
            StageStatus::Exited(code) => *code,
            StageStatus::Signaled(signal) => 128 + *signal as i32,
            StageStatus::Lost(_) => -1,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, StageStatus::Exited(0))
    }
}

/// Result of a successful launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Foreground pipeline finished; one status per stage, in stage order
    Completed(Vec<StageStatus>),
    /// Background pipeline started; `job` is `None` when the table was full
    Background { pid: Pid, job: Option<usize> },
}

impl LaunchOutcome {
    /// Status of the pipeline: the last stage's, or 0 for background jobs
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchOutcome::Completed(statuses) => statuses.last().map_or(0, StageStatus::code),
            LaunchOutcome::Background { .. } => 0,
        }
    }
}

/// A stage ready to exec: everything the child needs is built up front
struct Prepared {
    /// `None` when the program is not on the search path
    path: Option<CString>,
    argv: Vec<CString>,
    /// Program name as typed, used in failure messages
    program: Vec<u8>,
}

impl Prepared {
    fn shown_path(&self) -> String {
        match &self.path {
            Some(path) => path.to_string_lossy().into_owned(),
            None => "(not found)".to_string(),
        }
    }
}

/// Both ends of one inter-stage pipe
struct Pipe {
    read: OwnedFd,
    write: OwnedFd,
}

impl Pipe {
    fn new() -> nix::Result<Self> {
        let (read, write) = cloexec_pipe()?;
        Ok(Pipe { read, write })
    }

    fn raw_fds(&self) -> [RawFd; 2] {
        [self.read.as_raw_fd(), self.write.as_raw_fd()]
    }
}

#[cfg(target_os = "linux")]
fn cloexec_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    nix::unistd::pipe2(nix::fcntl::OFlag::O_CLOEXEC)
}

#[cfg(not(target_os = "linux"))]
fn cloexec_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    use nix::fcntl::{fcntl, FcntlArg, FdFlag};

    let (read, write) = nix::unistd::pipe()?;
    for fd in [&read, &write] {
        fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    }
    Ok((read, write))
}

/// Redirection files opened for one stage
#[derive(Default)]
struct StageFiles {
    input: Option<File>,
    output: Option<File>,
}

impl StageFiles {
    fn open(stage: &Stage<'_>) -> Result<Self, ExecuteError> {
        Ok(StageFiles {
            input: stage.input.map(open_input).transpose()?,
            output: stage.output.map(open_output).transpose()?,
        })
    }

    fn input_fd(&self) -> Option<RawFd> {
        self.input.as_ref().map(AsRawFd::as_raw_fd)
    }

    fn output_fd(&self) -> Option<RawFd> {
        self.output.as_ref().map(AsRawFd::as_raw_fd)
    }

    fn raw_fds(&self) -> impl Iterator<Item = RawFd> + '_ {
        self.input_fd().into_iter().chain(self.output_fd())
    }
}

/// Open an input redirection; it must name an existing regular file
fn open_input(path: &str) -> Result<File, ExecuteError> {
    let redirect_error = |source| ExecuteError::Redirect {
        path: path.to_string(),
        source,
    };
    let metadata = fs::metadata(path).map_err(redirect_error)?;
    if !metadata.is_file() {
        return Err(ExecuteError::NotRegularFile(path.to_string()));
    }
    File::open(path).map_err(redirect_error)
}

/// Open an output redirection, creating or truncating it with mode 0600
fn open_output(path: &str) -> Result<File, ExecuteError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .map_err(|source| ExecuteError::Redirect {
            path: path.to_string(),
            source,
        })
}

/// Spawns pipelines, resolving programs with the given resolver
pub struct Launcher<'r> {
    resolver: &'r ExecutableResolver,
    trace: bool,
}

impl<'r> Launcher<'r> {
    pub fn new(resolver: &'r ExecutableResolver) -> Self {
        Launcher {
            resolver,
            trace: false,
        }
    }

    /// Write a `trace:` line to the error stream for every spawned stage
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    fn prepare(&self, stage: &Stage<'_>) -> Result<Prepared, ExecuteError> {
        let program = stage.program().unwrap_or_default();
        let path = self
            .resolver
            .resolve(program)
            .map(|path| CString::new(path.into_os_string().into_vec()))
            .transpose()?;

        Ok(Prepared {
            path,
            argv: stage
                .argv
                .iter()
                .map(|arg| CString::new(*arg))
                .collect::<Result<_, _>>()?,
            program: program.as_bytes().to_vec(),
        })
    }

    /// Launch `pipeline`. Background pipelines are registered in `jobs`
    /// under `cmdline`; foreground pipelines are waited for.
    pub fn launch(
        &self,
        pipeline: &Pipeline<'_>,
        cmdline: &str,
        jobs: &mut JobTable,
        console: &mut Console,
    ) -> Result<LaunchOutcome, ExecuteError> {
        if pipeline.stages.is_empty() {
            return Err(ExecuteError::EmptyStage(1));
        }
        if let Some(index) = pipeline.stages.iter().position(Stage::is_empty) {
            return Err(ExecuteError::EmptyStage(index + 1));
        }

        let commands = pipeline
            .stages
            .iter()
            .map(|stage| self.prepare(stage))
            .collect::<Result<Vec<_>, _>>()?;
        let mut files = pipeline
            .stages
            .iter()
            .map(StageFiles::open)
            .collect::<Result<Vec<_>, _>>()?;
        let pipes = (1..pipeline.len())
            .map(|_| Pipe::new())
            .collect::<Result<Vec<_>, _>>()
            .map_err(ExecuteError::Pipe)?;

        console.flush();
        let mut pids = Vec::with_capacity(commands.len());

        for (i, command) in commands.iter().enumerate() {
            let stdin = files[i]
                .input_fd()
                .or_else(|| i.checked_sub(1).map(|prev| pipes[prev].read.as_raw_fd()));
            let stdout = files[i]
                .output_fd()
                .or_else(|| pipes.get(i).map(|next| next.write.as_raw_fd()));
            let to_close: Vec<RawFd> = pipes
                .iter()
                .flat_map(Pipe::raw_fds)
                .chain(files.iter().flat_map(StageFiles::raw_fds))
                .collect();

            // SAFETY: the child only calls dup2/close/execv/write/_exit
            // before replacing or ending itself.
            match unsafe { fork() } {
                Ok(ForkResult::Child) => exec_stage(command, stdin, stdout, &to_close),
                Ok(ForkResult::Parent { child }) => {
                    if self.trace {
                        let _ = writeln!(
                            console.err(),
                            "trace: stage {} pid {} {}",
                            i,
                            child,
                            command.shown_path()
                        );
                    }
                    pids.push(child);
                    files[i] = StageFiles::default();
                }
                Err(errno) => {
                    drop(files);
                    drop(pipes);
                    for pid in pids {
                        wait_stage(pid);
                    }
                    return Err(ExecuteError::Fork(errno));
                }
            }
        }

        drop(pipes);

        let last = pids[pids.len() - 1];
        if pipeline.background {
            let job = match jobs.register(last, cmdline, console.out()) {
                Ok(id) => Some(id),
                Err(full) => {
                    let _ = writeln!(console.err(), "warning: {}", full);
                    None
                }
            };
            return Ok(LaunchOutcome::Background { pid: last, job });
        }

        let statuses = pids
            .into_iter()
            .map(|pid| {
                let status = wait_stage(pid);
                if let StageStatus::Lost(errno) = status {
                    let _ = writeln!(console.err(), "waitpid {}: {}", pid, errno);
                }
                status
            })
            .collect();
        Ok(LaunchOutcome::Completed(statuses))
    }
}

/// Wait for one stage, retrying on interruption
fn wait_stage(pid: Pid) -> StageStatus {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return StageStatus::Exited(code),
            Ok(WaitStatus::Signaled(_, signal, _)) => return StageStatus::Signaled(signal),
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(errno) => return StageStatus::Lost(errno),
        }
    }
}

/// Child side of a stage: wire descriptors, close the rest, exec. A stage
/// without a resolved program ends here with `command not found`.
fn exec_stage(command: &Prepared, stdin: Option<RawFd>, stdout: Option<RawFd>, to_close: &[RawFd]) -> ! {
    for (source, target, what) in [
        (stdin, libc::STDIN_FILENO, "cannot redirect stdin: "),
        (stdout, libc::STDOUT_FILENO, "cannot redirect stdout: "),
    ] {
        if let Some(fd) = source {
            if let Err(errno) = dup2(fd, target) {
                child_fail(&[
                    command.program.as_slice(),
                    &b": "[..],
                    what.as_bytes(),
                    errno.desc().as_bytes(),
                ]);
            }
        }
    }

    for &fd in to_close {
        if fd > libc::STDERR_FILENO {
            let _ = close(fd);
        }
    }

    let Some(path) = &command.path else {
        child_fail(&[&b"command not found: "[..], command.program.as_slice()])
    };

    let errno = match execv(path, &command.argv) {
        Ok(never) => match never {},
        Err(errno) => errno,
    };
    child_fail(&[command.program.as_slice(), &b": "[..], errno.desc().as_bytes()])
}

/// Report a failure from a forked child and leave without running any
/// of the parent's cleanup
fn child_fail(parts: &[&[u8]]) -> ! {
    for part in parts.iter().copied().chain([&b"\n"[..]]) {
        // SAFETY: writing a valid buffer to the inherited stderr descriptor
        unsafe {
            libc::write(libc::STDERR_FILENO, part.as_ptr().cast(), part.len());
        }
    }
    // SAFETY: _exit skips atexit handlers and stdio flushing that belong
    // to the parent process
    unsafe { libc::_exit(EXIT_NOT_EXECUTED) }
}
