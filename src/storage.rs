use std::{
    fs::{self, File, Permissions},
    io::Write,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    env::Env,
    error::{AppError, Result},
    paths::{app_dirs, join_path, parent_dir},
    profile::{AppConfig, CONFIG_VERSION, Mapping, Profile},
};

/// Registry file name inside the config directory
const CONFIG_FILE: &str = "config.json";

/// Registry as found on disk, before version checks
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConfig {
    #[serde(default)]
    version: Option<serde_json::Value>,
    #[serde(default)]
    profiles: Option<Vec<String>>,
    #[serde(default)]
    mappings: Option<Vec<Mapping>>,
    #[serde(default)]
    default_profile_id: Option<String>,
}

/// Gets the path to the registry file
pub fn config_path(env: &Env) -> String {
    join_path([app_dirs(env).config_dir.as_str(), CONFIG_FILE])
}

/// Gets the path to a profile document
///
/// # Arguments
/// * `id` - Profile id
pub fn profile_path(env: &Env, id: &str) -> String {
    join_path([app_dirs(env).profiles_dir.as_str(), &format!("{id}.json")])
}

/// Creates the registry directory and its subdirectories
pub fn ensure_dirs(env: &Env) -> Result<()> {
    let dirs = app_dirs(env);
    for dir in [
        &dirs.config_dir,
        &dirs.profiles_dir,
        &dirs.includes_dir,
        &dirs.backups_dir,
    ] {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Loads the registry.
///
/// A missing file yields the default registry. So does a file that cannot be
/// parsed or carries no recognized `version`.
pub fn load_config(env: &Env) -> Result<AppConfig> {
    let path = config_path(env);
    if !Path::new(&path).exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(&path)?;
    let stored: StoredConfig = match serde_json::from_str(&raw) {
        Ok(stored) => stored,
        Err(err) => {
            warn!(%path, %err, "registry is not valid JSON, starting from defaults");
            return Ok(AppConfig::default());
        }
    };

    let version = stored.version.as_ref().and_then(serde_json::Value::as_u64);
    if version != Some(u64::from(CONFIG_VERSION)) {
        warn!(%path, ?version, "registry version not recognized, starting from defaults");
        return Ok(AppConfig::default());
    }

    Ok(AppConfig {
        version: CONFIG_VERSION,
        profiles: stored.profiles.unwrap_or_default(),
        mappings: stored.mappings.unwrap_or_default(),
        default_profile_id: stored.default_profile_id,
    })
}

/// Saves the registry as pretty-printed JSON
///
/// # Arguments
/// * `config` - Registry to save
pub fn save_config(env: &Env, config: &AppConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    write_file_atomic(&config_path(env), &format!("{json}\n"))?;
    debug!(profiles = config.profiles.len(), mappings = config.mappings.len(), "saved registry");
    Ok(())
}

/// Loads a profile document, `None` if it does not exist
pub fn load_profile(env: &Env, id: &str) -> Result<Option<Profile>> {
    let path = profile_path(env, id);
    if !Path::new(&path).exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Loads a profile document that must exist
pub fn require_profile(env: &Env, id: &str) -> Result<Profile> {
    load_profile(env, id)?.ok_or_else(|| AppError::ProfileNotFound(id.to_string()))
}

/// Saves a profile document
pub fn save_profile(env: &Env, profile: &Profile) -> Result<()> {
    let json = serde_json::to_string_pretty(profile)?;
    write_file_atomic(&profile_path(env, &profile.id), &format!("{json}\n"))
}

/// Deletes a profile document if present
pub fn delete_profile(env: &Env, id: &str) -> Result<()> {
    remove_file_if_exists(&profile_path(env, id))
}

/// Loads every registered profile in registry order.
///
/// Ids without a document are skipped.
pub fn load_profiles(env: &Env, config: &AppConfig) -> Result<Vec<Profile>> {
    let mut profiles = Vec::with_capacity(config.profiles.len());
    for id in &config.profiles {
        match load_profile(env, id)? {
            Some(profile) => profiles.push(profile),
            None => debug!(%id, "skipping registered profile without a document"),
        }
    }
    Ok(profiles)
}

/// Reads a file, treating a missing file as empty
pub fn read_file_or_empty(path: &str) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err.into()),
    }
}

/// Writes a whole file through a temporary sibling and a rename.
///
/// A symlinked path is resolved first so the link survives and its target is
/// updated. The existing file's permissions carry over to the new one. The
/// parent directory is created when missing.
pub fn write_file_atomic(path: &str, content: &str) -> Result<()> {
    let target = match fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            if let Some(parent) = parent_dir(path) {
                fs::create_dir_all(parent)?;
            }
            PathBuf::from(path)
        }
        Err(err) => return Err(err.into()),
    };
    let permissions = fs::metadata(&target).ok().map(|meta| meta.permissions());

    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = target.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()));

    let written = write_synced(&temp_path, content, permissions)
        .and_then(|()| fs::rename(&temp_path, &target));
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    Ok(())
}

fn write_synced(path: &Path, content: &str, permissions: Option<Permissions>) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    if let Some(permissions) = permissions {
        file.set_permissions(permissions)?;
    }
    file.sync_all()
}

/// Removes a file, ignoring a missing one
pub fn remove_file_if_exists(path: &str) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
