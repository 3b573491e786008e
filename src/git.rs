use crate::{
    error::Result,
    exec::{run_captured, run_checked, run_inherited},
    profile::Profile,
};

/// Executes Git config get command
///
/// Returns an empty string when the key is unset.
///
/// # Arguments
/// * `key` - Git config key (user.name or user.email)
pub fn get_git_user(key: &str) -> Result<String> {
    let output = run_captured("git", &["config", "--get", key])?;
    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

/// Executes a Git config set command inside a repository
///
/// # Arguments
/// * `repo_path` - Repository working tree
/// * `key` - Git config key to set (user.name or user.email)
/// * `value` - Value to set for key (username or email)
pub fn set_repo_config(repo_path: &str, key: &str, value: &str) -> Result<()> {
    run_checked("git", &["-C", repo_path, "config", key, value])?;
    Ok(())
}

/// Writes a profile's identity into a repository's local config
pub fn apply_profile_to_repo(profile: &Profile, repo_path: &str) -> Result<()> {
    set_repo_config(repo_path, "user.name", &profile.git.name)?;
    set_repo_config(repo_path, "user.email", &profile.git.email)?;
    Ok(())
}

/// Clones a repository, streaming git's progress to the terminal
///
/// # Arguments
/// * `url` - Remote to clone from
/// * `dir` - Target directory, git picks one when absent
pub fn clone_repository(url: &str, dir: Option<&str>) -> Result<()> {
    let mut args = vec!["clone", url];
    if let Some(dir) = dir {
        args.push(dir);
    }
    run_inherited("git", &args)
}
