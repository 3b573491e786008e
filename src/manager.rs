//! Profile and mapping operations.
//!
//! Each operation loads the registry, mutates profiles or mappings, patches
//! the shared files and saves the registry last. Every step is idempotent, so
//! an interrupted operation is recovered by running it again.

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info};

use crate::{
    APP_NAME, build_host_alias,
    backup::list_backups,
    blocks::block_ids,
    clone::{CloneTarget, normalize_clone_url},
    env::Env,
    error::{AppError, Result},
    gh, git,
    include::{
        INCLUDE_BLOCK_KIND, git_config_path, remove_git_include_mapping, remove_include_file,
        upsert_git_include_mapping, write_include_file,
    },
    keys::{self, public_key_path},
    mapping::{create_mapping, replace_mapping, slugify, unique_profile_id},
    paths::{ensure_trailing_slash, resolve_path},
    profile::{AppConfig, GitIdentity, GithubAccount, Mapping, Profile, SshIdentity},
    ssh::{SSH_BLOCK_KIND, remove_ssh_config, ssh_config_path, upsert_ssh_config},
    storage::{
        delete_profile, ensure_dirs, load_config, load_profiles, read_file_or_empty,
        require_profile, save_config, save_profile,
    },
    validation::{
        validate_host_alias, validate_input_email, validate_input_username, validate_profile_id,
    },
};

/// Current time as RFC 3339
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Input for creating a profile
#[derive(Debug, Clone, Default)]
pub struct ProfileDraft {
    /// Requested id, derived from the label when absent
    pub id: Option<String>,
    pub label: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub key_path: Option<String>,
    pub host_alias: Option<String>,
    pub github_user: Option<String>,
    /// Run `ssh-keygen` for the key path
    pub generate_key: bool,
    /// Directory to map to the new profile
    pub map_dir: Option<String>,
}

/// Snapshot of profiles, mappings and managed block drift
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub profiles: Vec<Profile>,
    pub mappings: Vec<Mapping>,
    /// Mapping ids without an include block in the git config
    pub missing_include_blocks: Vec<String>,
    /// Include block ids with no mapping in the registry
    pub orphan_include_blocks: Vec<String>,
    /// Profile ids without an SSH block
    pub missing_ssh_blocks: Vec<String>,
    /// SSH block ids with no profile in the registry
    pub orphan_ssh_blocks: Vec<String>,
    /// Backup file names, sorted
    pub backups: Vec<String>,
}

/// Creates the directories and writes the registry back in canonical form
pub fn init(env: &Env) -> Result<AppConfig> {
    ensure_dirs(env)?;
    let config = load_config(env)?;
    save_config(env, &config)?;
    Ok(config)
}

/// Creates a profile and writes its SSH block and git fragment
pub fn add_profile(env: &Env, draft: ProfileDraft) -> Result<Profile> {
    ensure_dirs(env)?;
    let mut config = load_config(env)?;

    let (Some(name), Some(email)) = (
        draft.name.filter(|name| !name.trim().is_empty()),
        draft.email.filter(|email| !email.trim().is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Provide both a git name and a git email".to_string(),
        ));
    };
    let name = name.trim().to_string();
    let email = email.trim().to_string();
    validate_input_username(&name)?;
    validate_input_email(&email)?;

    let label = draft
        .label
        .filter(|label| !label.trim().is_empty())
        .unwrap_or_else(|| name.clone());
    let base_id = match draft.id {
        Some(id) => {
            validate_profile_id(&id)?;
            id
        }
        None => slugify(&label),
    };
    let id = unique_profile_id(&base_id, &config);
    let host_alias = draft.host_alias.unwrap_or_else(|| build_host_alias(&id));
    validate_host_alias(&host_alias)?;
    let key_path = resolve_path(
        &draft
            .key_path
            .unwrap_or_else(|| format!("~/.ssh/id_ed25519_{id}")),
        env,
    );

    if draft.generate_key {
        keys::generate_key(&key_path, &email)?;
    }

    let now = now_iso();
    let profile = Profile {
        id: id.clone(),
        label,
        git: GitIdentity { name, email },
        ssh: SshIdentity {
            key_path,
            host_alias,
        },
        github: draft.github_user.map(|username| GithubAccount {
            username: Some(username),
            ..GithubAccount::default()
        }),
        created_at: now.clone(),
        updated_at: now,
    };

    save_profile(env, &profile)?;
    upsert_ssh_config(env, &profile)?;
    write_include_file(env, &profile)?;
    if !config.has_profile(&id) {
        config.profiles.push(id.clone());
    }

    if let Some(dir) = draft.map_dir {
        attach_mapping(env, &mut config, &resolve_path(&dir, env), &id)?;
    }

    save_config(env, &config)?;
    info!(profile = %id, "added profile");
    Ok(profile)
}

/// Rewrites a profile's SSH block and git fragment from its stored document
pub fn refresh_profile(env: &Env, profile_id: &str) -> Result<Profile> {
    let profile = require_profile(env, profile_id)?;
    upsert_ssh_config(env, &profile)?;
    write_include_file(env, &profile)?;
    Ok(profile)
}

/// Deletes a profile, its mappings and every block referencing it
pub fn remove_profile(env: &Env, profile_id: &str) -> Result<Profile> {
    ensure_dirs(env)?;
    let mut config = load_config(env)?;
    let profile = require_profile(env, profile_id)?;

    for mapping in config
        .mappings
        .iter()
        .filter(|mapping| mapping.profile_id == profile_id)
    {
        remove_git_include_mapping(env, &mapping.id)?;
        debug!(mapping = %mapping.id, "removed mapping of deleted profile");
    }
    config
        .mappings
        .retain(|mapping| mapping.profile_id != profile_id);
    config.profiles.retain(|id| id != profile_id);
    if config.default_profile_id.as_deref() == Some(profile_id) {
        config.default_profile_id = None;
    }

    remove_include_file(env, profile_id)?;
    remove_ssh_config(env, profile_id)?;
    delete_profile(env, profile_id)?;
    save_config(env, &config)?;
    info!(profile = %profile_id, "removed profile");
    Ok(profile)
}

/// Puts a mapping into the registry and git config.
///
/// A mapping of the same path to another profile is removed, block included,
/// before the new block is written.
fn attach_mapping(env: &Env, config: &mut AppConfig, path: &str, profile_id: &str) -> Result<Mapping> {
    let mapping = create_mapping(path, profile_id);
    for displaced in replace_mapping(config, mapping.clone()) {
        remove_git_include_mapping(env, &displaced.id)?;
        debug!(old = %displaced.id, new = %mapping.id, "replaced mapping for path");
    }
    upsert_git_include_mapping(env, &mapping)?;
    Ok(mapping)
}

/// Maps a directory to a profile
pub fn map_directory(env: &Env, path: &str, profile_id: &str) -> Result<Mapping> {
    ensure_dirs(env)?;
    let mut config = load_config(env)?;
    require_profile(env, profile_id)?;

    let mapping = attach_mapping(env, &mut config, &resolve_path(path, env), profile_id)?;
    save_config(env, &config)?;
    Ok(mapping)
}

/// Removes a mapping given its id or directory.
///
/// Returns `None` when nothing matched.
pub fn unmap_directory(env: &Env, path_or_id: &str) -> Result<Option<Mapping>> {
    ensure_dirs(env)?;
    let mut config = load_config(env)?;
    let normalized = ensure_trailing_slash(&resolve_path(path_or_id, env));
    let Some(mapping) = config
        .mappings
        .iter()
        .find(|mapping| mapping.id == path_or_id)
        .or_else(|| config.mapping_for_path(&normalized))
        .cloned()
    else {
        return Ok(None);
    };

    remove_git_include_mapping(env, &mapping.id)?;
    config.mappings.retain(|existing| existing.id != mapping.id);
    save_config(env, &config)?;
    Ok(Some(mapping))
}

/// Sets a profile's identity in one repository's local config.
///
/// Returns the profile and the resolved repository path.
pub fn apply_to_repo(env: &Env, profile_id: &str, path: Option<&str>) -> Result<(Profile, String)> {
    let profile = require_profile(env, profile_id)?;
    let repo_path = match path {
        Some(path) => resolve_path(path, env),
        None => env.cwd.clone().ok_or_else(|| {
            AppError::Validation("no repository path given and no working directory".to_string())
        })?,
    };
    git::apply_profile_to_repo(&profile, &repo_path)?;
    Ok((profile, repo_path))
}

/// Clones a GitHub SSH remote through a profile's host alias and applies the
/// profile's identity to the clone.
///
/// Returns the rewritten remote and the clone's path.
pub fn clone_with_profile(
    env: &Env,
    remote: &str,
    dir: Option<&str>,
    profile: &Profile,
) -> Result<(CloneTarget, String)> {
    let target = normalize_clone_url(remote, profile)?;
    git::clone_repository(&target.url, dir)?;
    let repo_path = resolve_path(dir.unwrap_or(&target.repo_name), env);
    git::apply_profile_to_repo(profile, &repo_path)?;
    Ok((target, repo_path))
}

/// Records the GitHub account of a profile
pub fn link_account(env: &Env, profile_id: &str, username: &str) -> Result<Profile> {
    let mut profile = require_profile(env, profile_id)?;
    let account = profile.github.get_or_insert_with(GithubAccount::default);
    account.username = Some(username.to_string());
    profile.updated_at = now_iso();
    save_profile(env, &profile)?;
    Ok(profile)
}

/// Logs `gh` into GitHub for a profile's account
pub fn login_account(env: &Env, profile_id: &str) -> Result<Profile> {
    let profile = require_profile(env, profile_id)?;
    gh::ensure_available()?;
    gh::login()?;
    Ok(profile)
}

/// Makes the profile's GitHub account active in `gh`
pub fn switch_account(env: &Env, profile_id: &str) -> Result<Profile> {
    let profile = require_profile(env, profile_id)?;
    let username = profile.github_username().ok_or_else(|| {
        AppError::Validation(format!(
            "Profile '{profile_id}' has no linked GitHub account. Link one first."
        ))
    })?;
    gh::ensure_available()?;
    gh::switch_account(username)?;
    Ok(profile)
}

/// Uploads the profile's public key unless GitHub already has it, and
/// records the key on the profile.
///
/// With `switch` the linked account is made active in `gh` first.
pub fn sync_key(env: &Env, profile_id: &str, title: Option<String>, switch: bool) -> Result<Profile> {
    let mut profile = require_profile(env, profile_id)?;
    gh::ensure_available()?;
    gh::ensure_authed()?;
    if let Some(username) = profile.github_username().filter(|_| switch) {
        gh::switch_account(username)?;
    }

    let public_key = public_key_path(&profile);
    if !std::path::Path::new(&public_key).exists() {
        return Err(AppError::Validation(format!(
            "Public key not found: {public_key}"
        )));
    }

    let key = match gh::find_key_by_material(&public_key)? {
        Some(existing) => {
            debug!(key_id = existing.id, "key already on GitHub");
            Some(existing)
        }
        None => {
            let title = title.unwrap_or_else(|| {
                format!("{APP_NAME} {} {}", profile.label, &now_iso()[..10])
            });
            gh::add_key(&public_key, &title)?;
            gh::find_key_by_material(&public_key)?
        }
    };

    let now = now_iso();
    let account = profile.github.get_or_insert_with(GithubAccount::default);
    if let Some(key) = key {
        account.key_id = Some(key.id);
        account.key_title = Some(key.title);
    }
    account.key_synced_at = Some(now.clone());
    profile.updated_at = now;
    save_profile(env, &profile)?;
    Ok(profile)
}

/// Deletes the profile's public key from GitHub and forgets it
pub fn remove_synced_key(env: &Env, profile_id: &str) -> Result<Profile> {
    let mut profile = require_profile(env, profile_id)?;
    gh::ensure_available()?;
    gh::ensure_authed()?;
    if let Some(username) = profile.github_username() {
        gh::switch_account(username)?;
    }

    let key_id = match profile.github.as_ref().and_then(|account| account.key_id) {
        Some(id) => id,
        None => gh::find_key_by_material(&public_key_path(&profile))?
            .map(|key| key.id)
            .ok_or_else(|| {
                AppError::Validation("Could not determine key id. Add the key first.".to_string())
            })?,
    };
    gh::delete_key(key_id)?;

    if let Some(account) = profile.github.as_mut() {
        account.key_id = None;
        account.key_title = None;
        account.key_synced_at = None;
    }
    profile.updated_at = now_iso();
    save_profile(env, &profile)?;
    Ok(profile)
}

/// Profiles, mappings and drift between the registry and the shared files
pub fn status(env: &Env) -> Result<Status> {
    ensure_dirs(env)?;
    let config = load_config(env)?;
    let profiles = load_profiles(env, &config)?;

    let include_ids = block_ids(&read_file_or_empty(&git_config_path(env))?, INCLUDE_BLOCK_KIND)?;
    let ssh_ids = block_ids(&read_file_or_empty(&ssh_config_path(env))?, SSH_BLOCK_KIND)?;

    let mapping_ids: Vec<&String> = config.mappings.iter().map(|mapping| &mapping.id).collect();
    let missing_include_blocks = mapping_ids
        .iter()
        .filter(|id| !include_ids.contains(id))
        .map(|id| id.to_string())
        .collect();
    let orphan_include_blocks = include_ids
        .iter()
        .filter(|id| !mapping_ids.contains(id))
        .cloned()
        .collect();
    let missing_ssh_blocks = profiles
        .iter()
        .filter(|profile| !ssh_ids.contains(&profile.id))
        .map(|profile| profile.id.clone())
        .collect();
    let orphan_ssh_blocks = ssh_ids
        .iter()
        .filter(|id| !config.has_profile(id))
        .cloned()
        .collect();

    Ok(Status {
        profiles,
        mappings: config.mappings,
        missing_include_blocks,
        orphan_include_blocks,
        missing_ssh_blocks,
        orphan_ssh_blocks,
        backups: list_backups(env)?,
    })
}
