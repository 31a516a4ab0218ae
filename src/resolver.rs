//! Executable resolver
//!
//! Maps a command name to the file that should be executed:
//! 1. Names containing `/` are used as-is when they name an executable file
//! 2. Other names are joined with each `PATH` directory in order; the first
//!    executable match wins
//!
//! Absence is an ordinary answer (`None`), never an error.

use std::env;
use std::path::{Path, PathBuf};

/// Search list used when `PATH` is unset
pub const DEFAULT_PATH: &str = "/bin:/usr/bin";

/// Resolves command names against a search path
#[derive(Debug, Clone)]
pub struct ExecutableResolver {
    /// Fixed search directories; `None` means read `PATH` at lookup time
    path_dirs: Option<Vec<PathBuf>>,
}

impl Default for ExecutableResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutableResolver {
    /// Create a resolver that follows the live `PATH` variable
    pub fn new() -> Self {
        ExecutableResolver { path_dirs: None }
    }

    /// Create a resolver with a fixed search list
    pub fn with_path<I, P>(path_dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        ExecutableResolver {
            path_dirs: Some(path_dirs.into_iter().map(Into::into).collect()),
        }
    }

    /// Directories searched for bare command names, in order
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        match &self.path_dirs {
            Some(dirs) => dirs.clone(),
            None => {
                let path = env::var_os("PATH").unwrap_or_else(|| DEFAULT_PATH.into());
                env::split_paths(&path)
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .collect()
            }
        }
    }

    /// Locate the executable for `name`
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        if name.contains('/') {
            let path = Path::new(name);
            return is_executable_file(path).then(|| path.to_path_buf());
        }

        self.search_dirs()
            .into_iter()
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable_file(candidate))
    }
}

/// Check if a path is a regular file with any execute bit set
pub fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match path.metadata() {
        Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
