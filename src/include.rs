//! Git config patching.
//!
//! Every profile gets a fragment file under the includes directory holding its
//! `[user]` identity and the `insteadOf` rules routing GitHub remotes through
//! its SSH host alias. Directory mappings are managed blocks of kind `include`
//! in `~/.gitconfig`, each pointing a `gitdir:` condition at a fragment.

use tracing::debug;

use crate::{
    APP_NAME, GITHUB_HOST, GITHUB_SSH_USER,
    backup::backup_file,
    blocks::{remove_block, upsert_block},
    env::Env,
    error::Result,
    paths::{app_dirs, ensure_trailing_slash, join_path},
    profile::{Mapping, Profile},
    storage::{read_file_or_empty, remove_file_if_exists, write_file_atomic},
};

/// Block kind for conditional includes
pub const INCLUDE_BLOCK_KIND: &str = "include";

/// Gets the path to the shared git config
pub fn git_config_path(env: &Env) -> String {
    join_path([env.home_dir.as_str(), ".gitconfig"])
}

/// Gets the path to a profile's fragment file
pub fn include_file_path(env: &Env, profile_id: &str) -> String {
    join_path([
        app_dirs(env).includes_dir.as_str(),
        &format!("{profile_id}.gitconfig"),
    ])
}

fn quote_if_spaced(value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Renders a git config value, quoting it when git would otherwise cut it
/// short or trim it
fn config_value(value: &str) -> String {
    let needs_quotes = value.contains(['#', ';', '"', '\\'])
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace);
    if !needs_quotes {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Renders a profile's fragment file
pub fn render_include_file(profile: &Profile) -> String {
    let lines = [
        format!("# Managed by {APP_NAME} ({})", profile.id),
        "[user]".to_string(),
        format!("  name = {}", config_value(&profile.git.name)),
        format!("  email = {}", config_value(&profile.git.email)),
        String::new(),
        format!("[url \"{GITHUB_SSH_USER}@{}:\"]", profile.ssh.host_alias),
        format!("  insteadOf = {GITHUB_SSH_USER}@{GITHUB_HOST}:"),
        format!("  insteadOf = https://{GITHUB_HOST}/"),
    ];
    format!("{}\n", lines.join("\n").trim_end())
}

/// Writes or overwrites a profile's fragment file
pub fn write_include_file(env: &Env, profile: &Profile) -> Result<()> {
    let path = include_file_path(env, &profile.id);
    write_file_atomic(&path, &render_include_file(profile))?;
    debug!(profile = %profile.id, %path, "wrote git fragment");
    Ok(())
}

/// Deletes a profile's fragment file if present
pub fn remove_include_file(env: &Env, profile_id: &str) -> Result<()> {
    remove_file_if_exists(&include_file_path(env, profile_id))
}

/// Renders the conditional include stanza for a mapping
pub fn render_include_block(mapping: &Mapping, include_path: &str) -> String {
    let git_dir = ensure_trailing_slash(&mapping.path);
    format!(
        "[includeIf \"gitdir:{git_dir}\"]\n  path = {}",
        quote_if_spaced(include_path)
    )
}

/// Writes or refreshes the include block for a mapping.
///
/// Returns whether the git config changed. The previous file is backed up
/// only when it does.
pub fn upsert_git_include_mapping(env: &Env, mapping: &Mapping) -> Result<bool> {
    let path = git_config_path(env);
    let include_path = include_file_path(env, &mapping.profile_id);
    let current = read_file_or_empty(&path)?;
    let next = upsert_block(
        &current,
        INCLUDE_BLOCK_KIND,
        &mapping.id,
        &render_include_block(mapping, &include_path),
    )?;
    if next == current {
        debug!(mapping = %mapping.id, "git config already up to date");
        return Ok(false);
    }
    backup_file(env, &path)?;
    write_file_atomic(&path, &next)?;
    debug!(mapping = %mapping.id, %path, "patched git config");
    Ok(true)
}

/// Removes the include block for a mapping, returning whether the file changed
pub fn remove_git_include_mapping(env: &Env, mapping_id: &str) -> Result<bool> {
    let path = git_config_path(env);
    let current = read_file_or_empty(&path)?;
    if current.is_empty() {
        return Ok(false);
    }
    let next = remove_block(&current, INCLUDE_BLOCK_KIND, mapping_id)?;
    if next == current {
        return Ok(false);
    }
    backup_file(env, &path)?;
    write_file_atomic(&path, &next)?;
    debug!(mapping = %mapping_id, %path, "removed git config block");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{GitIdentity, SshIdentity};
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn profile() -> Profile {
        Profile {
            id: "work".into(),
            label: "Work".into(),
            git: GitIdentity {
                name: "Jane Doe".into(),
                email: "jane@work.com".into(),
            },
            ssh: SshIdentity {
                key_path: "/home/jane/.ssh/id_ed25519_work".into(),
                host_alias: "work.github.com".into(),
            },
            github: None,
            created_at: "2026-01-01T00:00:00Z".into(),
            updated_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn fragment_sets_identity_and_rewrites() {
        let expect = indoc! {r#"
            # Managed by gitid (work)
            [user]
              name = Jane Doe
              email = jane@work.com

            [url "git@work.github.com:"]
              insteadOf = git@github.com:
              insteadOf = https://github.com/
        "#};
        assert_eq!(render_include_file(&profile()), expect);
    }

    #[test]
    fn fragment_quotes_values_git_would_misread() {
        let mut profile = profile();
        profile.git.name = r#"Jane "JD" Doe #1; \o/"#.into();
        let rendered = render_include_file(&profile);
        assert!(rendered.contains(r#"  name = "Jane \"JD\" Doe #1; \\o/""#));
        assert!(rendered.contains("  email = jane@work.com\n"));

        assert_eq!(config_value("Jane Doe"), "Jane Doe");
        assert_eq!(config_value(" padded"), "\" padded\"");
    }

    #[test]
    fn include_block_normalizes_and_quotes() {
        let mapping = Mapping {
            id: "work-1".into(),
            path: "/home/jane/code/work".into(),
            profile_id: "work".into(),
        };
        assert_eq!(
            render_include_block(&mapping, "/home/jane/My Config/work.gitconfig"),
            "[includeIf \"gitdir:/home/jane/code/work/\"]\n  path = \"/home/jane/My Config/work.gitconfig\""
        );
    }

    #[test]
    fn mapping_blocks_patch_shared_config() -> Result<()> {
        let dir = TempDir::new()?;
        let env = Env::new(dir.path().to_string_lossy().into_owned());
        let path = git_config_path(&env);
        write_file_atomic(&path, "[core]\n  autocrlf = input\n")?;

        let mapping = Mapping {
            id: "work-1".into(),
            path: format!("{}/code/work/", env.home_dir),
            profile_id: "work".into(),
        };
        assert!(upsert_git_include_mapping(&env, &mapping)?);
        assert!(!upsert_git_include_mapping(&env, &mapping)?);

        let content = fs::read_to_string(&path)?;
        assert!(content.starts_with("[core]\n  autocrlf = input\n\n# >>> gitid:include:work-1\n"));
        assert!(content.contains(&format!("path = {}", include_file_path(&env, "work"))));

        assert!(remove_git_include_mapping(&env, "work-1")?);
        assert!(!remove_git_include_mapping(&env, "work-1")?);
        assert_eq!(fs::read_to_string(&path)?, "[core]\n  autocrlf = input\n");
        Ok(())
    }

    #[test]
    fn fragment_file_lifecycle() -> Result<()> {
        let dir = TempDir::new()?;
        let env = Env::new(dir.path().to_string_lossy().into_owned());
        write_include_file(&env, &profile())?;
        let path = include_file_path(&env, "work");
        assert_eq!(fs::read_to_string(&path)?, render_include_file(&profile()));

        remove_include_file(&env, "work")?;
        assert!(!std::path::Path::new(&path).exists());
        Ok(())
    }
}
