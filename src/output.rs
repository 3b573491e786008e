use colored::Colorize;

use crate::{
    env::Env,
    error::Result,
    git::get_git_user,
    manager::Status,
    paths::to_home_shortcut,
    profile::{Mapping, Profile},
};

/// Prints one line per profile
pub fn print_profiles(profiles: &[Profile]) {
    if profiles.is_empty() {
        println!("{}", "no profiles found".yellow());
        return;
    }
    for profile in profiles {
        println!("{} | {}", profile.summary(), profile.ssh.host_alias.dimmed());
    }
}

/// Prints one line per mapping with home-relative paths
pub fn print_mappings(env: &Env, mappings: &[Mapping]) {
    if mappings.is_empty() {
        println!("{}", "no directory mappings".yellow());
        return;
    }
    for mapping in mappings {
        println!(
            "{} -> {}",
            to_home_shortcut(&mapping.path, &env.home_dir),
            mapping.profile_id.green()
        );
    }
}

/// Prints profiles, mappings and any drift found in the shared files
pub fn print_status(env: &Env, status: &Status) {
    println!("{}", "profiles:".blue());
    print_profiles(&status.profiles);
    println!("{}", "mappings:".blue());
    print_mappings(env, &status.mappings);

    let drift = [
        ("mapping without include block", &status.missing_include_blocks),
        ("include block without mapping", &status.orphan_include_blocks),
        ("profile without ssh block", &status.missing_ssh_blocks),
        ("ssh block without profile", &status.orphan_ssh_blocks),
    ];
    for (what, ids) in drift {
        for id in ids {
            println!("{} {what}: {id}", "warning:".yellow());
        }
    }
    if !status.backups.is_empty() {
        println!("{} {}", "backups:".blue(), status.backups.len());
    }
}

/// Shows the effective git user of the working directory
pub fn show_current_user() -> Result<()> {
    let name = get_git_user("user.name")?;
    let email = get_git_user("user.email")?;
    println!("{} {} <{}>", "current user:".blue(), name, email);
    Ok(())
}
