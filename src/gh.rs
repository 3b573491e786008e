//! GitHub CLI (`gh`) collaborator.
//!
//! Account switching and public key upload go through `gh`; this module only
//! builds argument lists and interprets output.

use std::fs;

use regex::Regex;
use serde::Deserialize;

use crate::{
    GITHUB_HOST,
    error::{AppError, Result},
    exec::{run_captured, run_checked, run_inherited},
    keys::extract_public_key_material,
};

/// Public key registered on the GitHub account
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GhKey {
    pub id: u64,
    pub title: String,
    pub key: String,
}

/// Checks that `gh` is on the PATH
pub fn ensure_available() -> Result<()> {
    match run_captured("gh", &["--version"]) {
        Ok(output) if output.status.success() => Ok(()),
        _ => Err(AppError::Command("GitHub CLI (gh) not found in PATH.".to_string())),
    }
}

/// Checks that `gh` has at least one authenticated account
pub fn ensure_authed() -> Result<()> {
    let output = run_captured("gh", &["auth", "status", "--hostname", GITHUB_HOST])?;
    if !output.status.success() {
        return Err(AppError::Command(
            "GitHub CLI not authenticated. Run `gh auth login`.".to_string(),
        ));
    }
    Ok(())
}

/// Accounts known to `gh`, active one first
pub fn list_accounts() -> Result<Vec<String>> {
    let output = run_captured("gh", &["auth", "status", "--hostname", GITHUB_HOST])?;
    if !output.status.success() {
        return Ok(Vec::new());
    }
    let text = format!(
        "{}\n{}",
        String::from_utf8(output.stdout)?,
        String::from_utf8(output.stderr)?
    );
    parse_accounts(&text)
}

/// Extracts account names from `gh auth status` output
pub fn parse_accounts(status: &str) -> Result<Vec<String>> {
    let logged_in = Regex::new(&format!(
        r"(?i)Logged in to {} (?:account |as )(\S+)",
        regex::escape(GITHUB_HOST)
    ))?;
    let active = Regex::new(r"(?i)Active account:\s*(\S+)")?;

    let mut accounts: Vec<String> = Vec::new();
    // newer gh prints `Active account: true|false` under each login instead
    let active_name = active
        .captures(status)
        .map(|captures| captures[1].to_string())
        .filter(|name| !matches!(name.as_str(), "true" | "false"));
    let names = active_name.into_iter().chain(
        logged_in
            .captures_iter(status)
            .map(|captures| captures[1].to_string()),
    );
    for name in names {
        if !accounts.contains(&name) {
            accounts.push(name);
        }
    }
    Ok(accounts)
}

/// Runs the interactive `gh` login for the canonical host over SSH
pub fn login() -> Result<()> {
    run_inherited(
        "gh",
        &["auth", "login", "--hostname", GITHUB_HOST, "--git-protocol", "ssh"],
    )
}

/// Makes `username` the active `gh` account
pub fn switch_account(username: &str) -> Result<()> {
    run_checked(
        "gh",
        &["auth", "switch", "--hostname", GITHUB_HOST, "--user", username],
    )?;
    Ok(())
}

/// Public keys of the active account
pub fn list_keys() -> Result<Vec<GhKey>> {
    let stdout = run_checked("gh", &["api", "/user/keys"])?;
    Ok(serde_json::from_str(&stdout)?)
}

/// Finds the uploaded key matching a local public key file
pub fn find_key_by_material(public_key_path: &str) -> Result<Option<GhKey>> {
    let material = extract_public_key_material(&fs::read_to_string(public_key_path)?);
    Ok(list_keys()?
        .into_iter()
        .find(|key| key.key.trim() == material))
}

/// Uploads a public key file
pub fn add_key(public_key_path: &str, title: &str) -> Result<()> {
    run_checked("gh", &["ssh-key", "add", public_key_path, "--title", title])?;
    Ok(())
}

/// Deletes an uploaded key by id
pub fn delete_key(key_id: u64) -> Result<()> {
    let id = key_id.to_string();
    run_checked("gh", &["ssh-key", "delete", &id, "--yes"])?;
    Ok(())
}
