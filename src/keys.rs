use std::{fs, path::Path};

use tracing::info;

use crate::{
    GITHUB_SSH_USER,
    error::{AppError, Result},
    exec::{run_attached, run_checked},
    paths::parent_dir,
    profile::Profile,
};

/// Generates an ed25519 key pair without passphrase.
///
/// Refuses to overwrite an existing key.
///
/// # Arguments
/// * `key_path` - Absolute path of the private key
/// * `comment` - Key comment, usually the profile email
pub fn generate_key(key_path: &str, comment: &str) -> Result<()> {
    if let Some(parent) = parent_dir(key_path) {
        fs::create_dir_all(parent)?;
    }
    if Path::new(key_path).exists() {
        return Err(AppError::Conflict(format!(
            "SSH key already exists at {key_path}"
        )));
    }
    run_checked(
        "ssh-keygen",
        &["-t", "ed25519", "-f", key_path, "-C", comment, "-N", ""],
    )?;
    info!(%key_path, "generated ssh key");
    Ok(())
}

/// Path of the public half of a key
pub fn public_key_path(profile: &Profile) -> String {
    format!("{}.pub", profile.ssh.key_path)
}

/// Key type and material of a public key line, without its comment
pub fn extract_public_key_material(public_key: &str) -> String {
    let mut parts = public_key.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(kind), Some(material)) => format!("{kind} {material}"),
        _ => public_key.trim().to_string(),
    }
}

/// Opens a test connection through the profile's host alias.
///
/// GitHub closes authenticated sessions with exit code 1 since it grants no
/// shell, so only other codes count as failures.
pub fn test_connection(profile: &Profile) -> Result<()> {
    let target = format!("{GITHUB_SSH_USER}@{}", profile.ssh.host_alias);
    let status = run_attached("ssh", &["-T", &target])?;
    match status.code() {
        Some(0 | 1) => Ok(()),
        _ => Err(AppError::Command(format!(
            "ssh could not authenticate to {target} ({status})"
        ))),
    }
}
