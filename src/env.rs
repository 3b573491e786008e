use std::path::PathBuf;

use crate::error::{AppError, Result};

/// Environment variable overriding the registry directory
pub const CONFIG_DIR_VAR: &str = "GITID_CONFIG_DIR";

/// Environment the tool runs in.
///
/// Paths are kept as `/`-separated strings since they are rendered verbatim
/// into SSH and git config files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Env {
    /// Absolute home directory of the current user
    pub home_dir: String,
    /// Working directory relative paths resolve against
    pub cwd: Option<String>,
    /// Registry directory override
    pub config_dir: Option<String>,
}

impl Env {
    /// Builds an environment with an explicit home and no overrides
    pub fn new(home_dir: impl Into<String>) -> Self {
        Self {
            home_dir: home_dir.into(),
            cwd: None,
            config_dir: None,
        }
    }

    /// Sets the working directory
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Sets the registry directory override
    pub fn with_config_dir(mut self, config_dir: impl Into<String>) -> Self {
        self.config_dir = Some(config_dir.into());
        self
    }

    /// Detects the environment of the running process
    pub fn detect() -> Result<Self> {
        let home_dir: PathBuf = dirs::home_dir().ok_or_else(|| {
            AppError::Validation("failed to find the home directory".to_string())
        })?;
        let cwd = std::env::current_dir()
            .ok()
            .map(|dir| dir.to_string_lossy().into_owned());
        let config_dir = std::env::var(CONFIG_DIR_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty());

        Ok(Self {
            home_dir: home_dir.to_string_lossy().into_owned(),
            cwd,
            config_dir,
        })
    }
}
