//! Remote URL rewriting for profile-aware clones.
//!
//! Only SSH remotes are rewritten. The canonical host is swapped for the
//! profile's host alias so the SSH config picks the profile's key.

use crate::{
    GITHUB_HOST, GITHUB_SSH_USER,
    error::{AppError, Result},
    profile::Profile,
};

/// Syntax of an SSH remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    /// `user@host:owner/repo`
    Scp,
    /// `ssh://user@host[:port]/owner/repo`
    Url,
}

/// Parsed SSH remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshRemote {
    pub kind: RemoteKind,
    pub host: String,
    /// Port of a `ssh://` remote, kept verbatim
    pub port: Option<String>,
    /// Repository path without leading `/`
    pub path: String,
    pub username: String,
}

/// Result of rewriting a remote for a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneTarget {
    pub url: String,
    /// Last path segment without `.git`
    pub repo_name: String,
}

/// Whether a clone argument looks like an SSH remote
pub fn is_ssh_like(value: &str) -> bool {
    value.starts_with("ssh://") || (!value.contains("://") && scp_parts(value).is_some())
}

fn scp_parts(value: &str) -> Option<(&str, &str, &str)> {
    let (username, rest) = value.split_once('@')?;
    let (host, path) = rest.split_once(':')?;
    if username.is_empty() || username.contains(['/', ':']) || host.contains('/') {
        return None;
    }
    Some((username, host, path))
}

/// Parses an SSH remote.
///
/// `Ok(None)` means the value is not an SSH remote at all (for example an
/// `https://` URL). An SSH-shaped value missing its host or path is an error.
pub fn parse_remote(url: &str) -> Result<Option<SshRemote>> {
    let url = url.trim();
    let invalid = || AppError::Validation(format!("malformed SSH remote: '{url}'"));

    if let Some(rest) = url.strip_prefix("ssh://") {
        let (authority, path) = rest.split_once('/').ok_or_else(invalid)?;
        let (username, host_port) = match authority.rsplit_once('@') {
            Some((user, host_port)) if !user.is_empty() => (user, host_port),
            Some(_) => return Err(invalid()),
            None => (GITHUB_SSH_USER, authority),
        };
        let (host, port) = match host_port.split_once(':') {
            Some((host, port)) => (host, Some(port.to_string())),
            None => (host_port, None),
        };
        if host.is_empty() || path.trim_matches('/').is_empty() {
            return Err(invalid());
        }
        return Ok(Some(SshRemote {
            kind: RemoteKind::Url,
            host: host.to_string(),
            port,
            path: path.trim_start_matches('/').to_string(),
            username: username.to_string(),
        }));
    }

    if url.contains("://") {
        return Ok(None);
    }

    match scp_parts(url) {
        Some((username, host, path)) => {
            if host.is_empty() || path.trim_matches('/').is_empty() {
                return Err(invalid());
            }
            Ok(Some(SshRemote {
                kind: RemoteKind::Scp,
                host: host.to_string(),
                port: None,
                path: path.to_string(),
                username: username.to_string(),
            }))
        }
        None if url.contains('@') => Err(invalid()),
        None => Ok(None),
    }
}

/// Repository name of a remote path
pub fn repo_name(path: &str) -> String {
    let last = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        "repo".to_string()
    } else {
        name.to_string()
    }
}

/// Rewrites an SSH remote to go through the profile's host alias.
///
/// Remotes already using the alias are returned unchanged. Hosts other than
/// the canonical host and the alias are rejected.
pub fn normalize_clone_url(url: &str, profile: &Profile) -> Result<CloneTarget> {
    let parsed = parse_remote(url)?.ok_or_else(|| {
        AppError::Validation(format!(
            "Only SSH clone URLs are supported. Use {GITHUB_SSH_USER}@{GITHUB_HOST}:owner/repo.git \
             or ssh://{GITHUB_SSH_USER}@{GITHUB_HOST}/owner/repo.git."
        ))
    })?;

    let alias = &profile.ssh.host_alias;
    if parsed.host != GITHUB_HOST && &parsed.host != alias {
        return Err(AppError::Conflict(format!(
            "Only {GITHUB_HOST} SSH URLs are supported, got host '{}'.",
            parsed.host
        )));
    }

    let repo_name = repo_name(&parsed.path);
    if &parsed.host == alias {
        return Ok(CloneTarget {
            url: url.trim().to_string(),
            repo_name,
        });
    }

    let url = match parsed.kind {
        RemoteKind::Scp => format!("{}@{alias}:{}", parsed.username, parsed.path),
        RemoteKind::Url => {
            let port = parsed.port.map(|port| format!(":{port}")).unwrap_or_default();
            format!("ssh://{}@{alias}{port}/{}", parsed.username, parsed.path)
        }
    };
    Ok(CloneTarget { url, repo_name })
}

/// Picks the remote and target directory out of free-form clone arguments.
///
/// The last SSH-looking argument is the remote; the first plain argument after
/// it is the directory unless `dir_flag` is given. Without any SSH-looking
/// argument the first one is taken as the remote.
pub fn parse_clone_args(args: &[String], dir_flag: Option<String>) -> (Option<String>, Option<String>) {
    let parts: Vec<&String> = args.iter().filter(|arg| !arg.is_empty()).collect();
    let Some(repo_index) = parts.iter().rposition(|arg| is_ssh_like(arg)) else {
        return (parts.first().map(|arg| arg.to_string()), dir_flag);
    };

    let dir = dir_flag.or_else(|| {
        parts[repo_index + 1..]
            .iter()
            .find(|arg| !is_ssh_like(arg))
            .map(|arg| arg.to_string())
    });
    (Some(parts[repo_index].to_string()), dir)
}
