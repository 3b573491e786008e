use serde::{Deserialize, Serialize};

/// Schema version written to the registry file
pub const CONFIG_VERSION: u32 = 1;

/// Git author identity of a profile
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    /// Git username (user.name)
    pub name: String,
    /// Git email address (user.email)
    pub email: String,
}

/// SSH identity of a profile
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SshIdentity {
    /// Absolute path of the private key
    pub key_path: String,
    /// Synthetic host name selecting this key in the SSH config
    pub host_alias: String,
}

/// Link between a profile and a GitHub account
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GithubAccount {
    /// Account name used for `gh auth switch`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Id of the uploaded public key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<u64>,
    /// Title of the uploaded public key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_title: Option<String>,
    /// RFC 3339 time of the last key sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_synced_at: Option<String>,
}

/// Represents an identity profile stored in the profiles directory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique slug-like id
    pub id: String,
    /// Display label
    pub label: String,
    pub git: GitIdentity,
    pub ssh: SshIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubAccount>,
    pub created_at: String,
    pub updated_at: String,
}

impl Profile {
    /// One-line summary used in listings
    pub fn summary(&self) -> String {
        format!("{} ({} <{}>)", self.id, self.git.name, self.git.email)
    }

    /// Linked GitHub username, if any
    pub fn github_username(&self) -> Option<&str> {
        self.github.as_ref()?.username.as_deref()
    }
}

/// Binding from a directory to a profile
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    /// Derived from the profile id and the normalized path
    pub id: String,
    /// Absolute directory, always ending with `/`
    pub path: String,
    pub profile_id: String,
}

/// Profile registry persisted as `config.json`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub version: u32,
    /// Profile ids in presentation order
    pub profiles: Vec<String>,
    pub mappings: Vec<Mapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            profiles: Vec::new(),
            mappings: Vec::new(),
            default_profile_id: None,
        }
    }
}

impl AppConfig {
    /// Whether a profile id is registered
    pub fn has_profile(&self, id: &str) -> bool {
        self.profiles.iter().any(|profile_id| profile_id == id)
    }

    /// Mapping with the given normalized path
    pub fn mapping_for_path(&self, path: &str) -> Option<&Mapping> {
        self.mappings.iter().find(|mapping| mapping.path == path)
    }
}
