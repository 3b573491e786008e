//! Directory mappings and profile ids.

use sha2::{Digest, Sha256};

use crate::{
    paths::ensure_trailing_slash,
    profile::{AppConfig, Mapping},
};

/// Hex digits of the path digest kept in mapping ids
const PATH_HASH_LEN: usize = 8;

/// Short content hash of a normalized path
pub fn hash_path(path: &str) -> String {
    let digest = Sha256::digest(path.as_bytes());
    let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
    hex[..PATH_HASH_LEN].to_string()
}

/// Creates the mapping of a directory to a profile.
///
/// The id only depends on the normalized path and the profile id, so mapping
/// the same directory to the same profile twice yields the same mapping.
///
/// # Arguments
/// * `path` - Absolute directory, with or without trailing slash
/// * `profile_id` - Profile the directory maps to
pub fn create_mapping(path: &str, profile_id: &str) -> Mapping {
    let normalized = ensure_trailing_slash(path);
    Mapping {
        id: format!("{profile_id}-{}", hash_path(&normalized)),
        path: normalized,
        profile_id: profile_id.to_string(),
    }
}

/// Returns `base` if no profile uses it, else the first free `base-N` from 2 up
pub fn unique_profile_id(base: &str, config: &AppConfig) -> String {
    if !config.has_profile(base) {
        return base.to_string();
    }
    (2..)
        .map(|index| format!("{base}-{index}"))
        .find(|candidate| !config.has_profile(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Turns a label into a profile id slug
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for ch in value.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "profile".to_string()
    } else {
        slug.to_string()
    }
}

/// Places `mapping` in the registry.
///
/// Any mapping with the same id or the same path is dropped first. The
/// displaced mappings that had a different id are returned so their git config
/// blocks can be removed.
pub fn replace_mapping(config: &mut AppConfig, mapping: Mapping) -> Vec<Mapping> {
    let mut displaced = Vec::new();
    config.mappings.retain(|existing| {
        let same_slot = existing.id == mapping.id || existing.path == mapping.path;
        if same_slot && existing.id != mapping.id {
            displaced.push(existing.clone());
        }
        !same_slot
    });
    config.mappings.push(mapping);
    displaced
}
