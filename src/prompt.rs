use std::env;
use std::path::Path;

/// Shown when the working directory cannot be determined
const FALLBACK_PROMPT: &str = "> ";

/// Build the `<user>@<host>:<cwd>> ` prompt for the current process
pub(crate) fn current_prompt() -> String {
    let user = env::var("USER").ok();
    let host = hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().into_owned());
    let cwd = env::current_dir().ok();
    format_prompt(user.as_deref(), host.as_deref(), cwd.as_deref())
}

pub(crate) fn format_prompt(user: Option<&str>, host: Option<&str>, cwd: Option<&Path>) -> String {
    match cwd {
        Some(cwd) => format!(
            "{}@{}:{}> ",
            user.unwrap_or("user"),
            host.unwrap_or("host"),
            cwd.display()
        ),
        None => FALLBACK_PROMPT.to_string(),
    }
}
