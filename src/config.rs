//! Shell limits and switches read from the environment
//!
//! `PIPESH_MAX_JOBS`, `PIPESH_HISTORY` and `PIPESH_MAX_STAGES` size the
//! job table, the history ring and the pipeline builder. `PIPESH_TRACE`
//! and `PIPESH_BANNER` are switches: set and not `0` means on. Values that
//! do not parse fall back to the defaults.

use crate::{history, jobs, parser};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_jobs: usize,
    pub history_size: usize,
    pub max_stages: usize,
    pub trace: bool,
    pub banner: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_jobs: jobs::DEFAULT_CAPACITY,
            history_size: history::DEFAULT_CAPACITY,
            max_stages: parser::DEFAULT_MAX_STAGES,
            trace: false,
            banner: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let number = |key: &str, default: usize| {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };
        let switch = |key: &str| lookup(key).map_or(false, |v| !v.is_empty() && v != "0");

        Config {
            max_jobs: number("PIPESH_MAX_JOBS", defaults.max_jobs),
            history_size: number("PIPESH_HISTORY", defaults.history_size),
            // A pipeline always has room for one stage
            max_stages: number("PIPESH_MAX_STAGES", defaults.max_stages).max(1),
            trace: switch("PIPESH_TRACE"),
            banner: switch("PIPESH_BANNER"),
        }
    }
}
