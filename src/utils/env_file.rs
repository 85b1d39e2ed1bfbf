//! Minimal `KEY=VALUE` env-file reader
//!
//! Values are returned as a map rather than exported into the process
//! environment; callers consult it after real environment variables.

use std::collections::HashMap;
use std::path::Path;

/// Parse `KEY=VALUE` lines. Blank lines, `#` comments and an optional
/// `export ` prefix are handled; matching surrounding quotes are stripped.
#[must_use]
pub fn parse_env_file(contents: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            log::warn!("Invalid env file entry on line {}; skipping", idx + 1);
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        vars.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    vars
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Read `path` if it exists. A missing file yields an empty map.
#[must_use]
pub fn load_env_file(path: &Path) -> HashMap<String, String> {
    if !path.exists() {
        return HashMap::new();
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let vars = parse_env_file(&contents);
            log::debug!("Loaded {} entries from {}", vars.len(), path.display());
            vars
        }
        Err(e) => {
            log::warn!("Failed to read {}: {e}", path.display());
            HashMap::new()
        }
    }
}
