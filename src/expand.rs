//! Token expansion
//!
//! Applied to every token before the parser sees it:
//! - `~` and `~/rest` become `$HOME` and `$HOME/rest`
//! - `$NAME` becomes the value of NAME (empty when unset), provided NAME
//!   only contains letters, digits and underscores
//! - everything else is left untouched

use std::env;

fn is_var_name_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Expand a single token against the process environment
pub fn expand(token: &str) -> String {
    expand_with(token, |name| env::var(name).ok())
}

/// Expand a token using `lookup` to resolve variable names
pub fn expand_with<F>(token: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if token == "~" || token.starts_with("~/") {
        let home = lookup("HOME").unwrap_or_default();
        return format!("{}{}", home, &token[1..]);
    }

    if let Some(name) = token.strip_prefix('$') {
        if !name.is_empty() && name.chars().all(is_var_name_char) {
            return lookup(name).unwrap_or_default();
        }
    }

    token.to_string()
}

/// Expand every token, preserving order
pub fn expand_all(tokens: &[String]) -> Vec<String> {
    tokens.iter().map(|t| expand(t)).collect()
}
