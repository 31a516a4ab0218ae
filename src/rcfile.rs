use pipesh::{Flow, Shell};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Get home directory
pub(crate) fn dirs_home() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

/// Load and execute ~/.pipeshrc if it exists
pub(crate) fn load_pipeshrc(shell: &mut Shell) -> Flow {
    let rc_path = match dirs_home() {
        Some(home) => home.join(".pipeshrc"),
        None => return Flow::Continue,
    };

    let content = match fs::read_to_string(&rc_path) {
        Ok(c) => c,
        Err(_) => return Flow::Continue,
    };

    load_rc_content(shell, &content, "~/.pipeshrc")
}

/// Run each line of an rc file, warning about lines that fail
pub(crate) fn load_rc_content(shell: &mut Shell, content: &str, label: &str) -> Flow {
    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let flow = shell.execute(trimmed);
        if flow != Flow::Continue {
            return flow;
        }
        if shell.last_exit_code() != 0 {
            eprintln!(
                "warning: {} line {}: exit status {}",
                label,
                line_num + 1,
                shell.last_exit_code()
            );
        }
    }
    Flow::Continue
}
