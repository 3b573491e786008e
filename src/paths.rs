//! Lexical path handling.
//!
//! Nothing here touches the filesystem. Paths are `/`-separated strings so
//! they can be written into `gitdir:` conditions and `IdentityFile` lines
//! exactly as computed.

use crate::{APP_NAME, env::Env};

/// Directories owned by this tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    /// Registry directory holding `config.json`
    pub config_dir: String,
    /// One JSON document per profile
    pub profiles_dir: String,
    /// Generated git fragment files
    pub includes_dir: String,
    /// Copies of shared files taken before each mutation
    pub backups_dir: String,
}

/// Computes the tool's directories for an environment
pub fn app_dirs(env: &Env) -> AppDirs {
    let config_dir = match &env.config_dir {
        Some(dir) => dir.clone(),
        None => join_path([env.home_dir.as_str(), ".config", APP_NAME]),
    };
    AppDirs {
        profiles_dir: join_path([config_dir.as_str(), "profiles"]),
        includes_dir: join_path([config_dir.as_str(), "includes"]),
        backups_dir: join_path([config_dir.as_str(), "backups"]),
        config_dir,
    }
}

/// Joins path segments.
///
/// Empty segments are dropped, redundant separators and `.` segments collapse,
/// and a leading `/` on the first non-empty segment is preserved.
pub fn join_path<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut absolute: Option<bool> = None;
    let mut segments: Vec<String> = Vec::new();

    for part in parts {
        let part = part.as_ref();
        if part.is_empty() {
            continue;
        }
        if absolute.is_none() {
            absolute = Some(part.starts_with('/'));
        }
        segments.extend(
            part.split('/')
                .filter(|segment| !segment.is_empty() && *segment != ".")
                .map(str::to_string),
        );
    }

    match absolute {
        None => String::new(),
        Some(true) => format!("/{}", segments.join("/")),
        Some(false) if segments.is_empty() => ".".to_string(),
        Some(false) => segments.join("/"),
    }
}

/// Appends `/` unless the path already ends with one
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Expands a leading `~` or `~/` to the home directory
pub fn expand_home(path: &str, home_dir: &str) -> String {
    if path == "~" {
        return home_dir.to_string();
    }
    match path.strip_prefix("~/") {
        Some(rest) => join_path([home_dir, rest]),
        None => path.to_string(),
    }
}

/// Resolves a user supplied path to an absolute one.
///
/// Absolute paths are returned unchanged, home references are expanded and
/// anything else is joined onto the working directory (or home when there is
/// none).
pub fn resolve_path(path: &str, env: &Env) -> String {
    if path.is_empty() || path.starts_with('/') {
        return path.to_string();
    }
    let expanded = expand_home(path, &env.home_dir);
    if expanded.starts_with('/') {
        return expanded;
    }
    let base = env.cwd.as_deref().unwrap_or(&env.home_dir);
    join_path([base, expanded.as_str()])
}

/// Renders a path relative to home as `~` or `~/<rest>` for display
pub fn to_home_shortcut(path: &str, home_dir: &str) -> String {
    let home = home_dir.trim_end_matches('/');
    if home.is_empty() {
        return path.to_string();
    }
    if path == home || path == format!("{home}/") {
        return "~".to_string();
    }
    match path.strip_prefix(home).and_then(|rest| rest.strip_prefix('/')) {
        Some(rest) => format!("~/{rest}"),
        None => path.to_string(),
    }
}

/// Last non-empty segment of a path
pub fn basename(path: &str) -> &str {
    path.rsplit('/').find(|segment| !segment.is_empty()).unwrap_or("")
}

/// Parent directory of a path, if it has one
pub fn parent_dir(path: &str) -> Option<String> {
    let trimmed = path.trim_end_matches('/');
    let index = trimmed.rfind('/')?;
    if index == 0 {
        return Some("/".to_string());
    }
    Some(trimmed[..index].to_string())
}
