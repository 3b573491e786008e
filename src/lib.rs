//! Per-directory Git identities.
//!
//! A machine can host several identity profiles, each bundling a git author
//! identity, an SSH key and an optional linked GitHub account. `gitid` keeps
//! `~/.ssh/config` and `~/.gitconfig` in sync with its own registry by patching
//! marker-delimited blocks, so a repository picks up the right identity from
//! the directory it lives in.

pub mod backup;
pub mod blocks;
pub mod clone;
pub mod env;
pub mod error;
pub mod exec;
pub mod gh;
pub mod git;
pub mod include;
pub mod keys;
pub mod manager;
pub mod mapping;
pub mod menu;
pub mod output;
pub mod paths;
pub mod profile;
pub mod ssh;
pub mod storage;
pub mod validation;

pub use env::Env;
pub use error::{AppError, Result};
pub use profile::{AppConfig, Mapping, Profile};

/// Application name, also used for the config directory
pub const APP_NAME: &str = "gitid";
/// Tag namespacing every managed block this tool writes
pub const MANAGED_TAG: &str = "gitid";
/// Canonical external host remotes are rewritten from
pub const GITHUB_HOST: &str = "github.com";
/// Remote user for SSH access to the canonical host
pub const GITHUB_SSH_USER: &str = "git";

/// Builds the default SSH host alias for a profile id
pub fn build_host_alias(profile_id: &str) -> String {
    format!("{profile_id}.{GITHUB_HOST}")
}
