//! SSH client config patching.
//!
//! Each profile owns one `Host <alias>` stanza in `~/.ssh/config`, wrapped in
//! a managed block of kind `ssh` keyed by the profile id.

use tracing::debug;

use crate::{
    GITHUB_HOST, GITHUB_SSH_USER,
    backup::backup_file,
    blocks::{remove_block, upsert_block},
    env::Env,
    error::Result,
    paths::{join_path, to_home_shortcut},
    profile::Profile,
    storage::{read_file_or_empty, write_file_atomic},
};

/// Block kind for SSH host stanzas
pub const SSH_BLOCK_KIND: &str = "ssh";

/// Gets the path to the shared SSH client config
pub fn ssh_config_path(env: &Env) -> String {
    join_path([env.home_dir.as_str(), ".ssh", "config"])
}

/// Renders the `Host` stanza for a profile.
///
/// The key path is shown relative to `home_dir` when given, and quoted when it
/// contains whitespace.
pub fn render_ssh_block(profile: &Profile, home_dir: Option<&str>) -> String {
    let key_path = match home_dir {
        Some(home) => to_home_shortcut(&profile.ssh.key_path, home),
        None => profile.ssh.key_path.clone(),
    };
    let key_value = if key_path.chars().any(char::is_whitespace) {
        format!("\"{key_path}\"")
    } else {
        key_path
    };

    [
        format!("Host {}", profile.ssh.host_alias),
        format!("  HostName {GITHUB_HOST}"),
        format!("  User {GITHUB_SSH_USER}"),
        format!("  IdentityFile {key_value}"),
        "  IdentitiesOnly yes".to_string(),
    ]
    .join("\n")
}

/// Writes or refreshes a profile's stanza.
///
/// Returns whether the file changed. The previous file is backed up only when
/// it does.
pub fn upsert_ssh_config(env: &Env, profile: &Profile) -> Result<bool> {
    let path = ssh_config_path(env);
    let current = read_file_or_empty(&path)?;
    let next = upsert_block(
        &current,
        SSH_BLOCK_KIND,
        &profile.id,
        &render_ssh_block(profile, Some(&env.home_dir)),
    )?;
    if next == current {
        debug!(profile = %profile.id, "ssh config already up to date");
        return Ok(false);
    }
    backup_file(env, &path)?;
    write_file_atomic(&path, &next)?;
    debug!(profile = %profile.id, %path, "patched ssh config");
    Ok(true)
}

/// Removes a profile's stanza, returning whether the file changed
pub fn remove_ssh_config(env: &Env, profile_id: &str) -> Result<bool> {
    let path = ssh_config_path(env);
    let current = read_file_or_empty(&path)?;
    if current.is_empty() {
        return Ok(false);
    }
    let next = remove_block(&current, SSH_BLOCK_KIND, profile_id)?;
    if next == current {
        return Ok(false);
    }
    backup_file(env, &path)?;
    write_file_atomic(&path, &next)?;
    debug!(profile = %profile_id, %path, "removed ssh config block");
    Ok(true)
}
