use clap::{Args, Parser, Subcommand};

/// CLI arguments parser using `clap`
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Subcommand chosen to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Registry setup
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Manages identity profiles
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Manages directory to profile mappings
    #[command(subcommand)]
    Dir(DirCommand),
    /// Applies a profile's identity to one repository
    Use {
        /// Profile to apply
        profile_id: String,
        /// Repository path, defaults to the working directory
        path: Option<String>,
    },
    /// Clones a GitHub SSH remote with a profile
    #[command(alias = "init")]
    Clone {
        /// Remote and optional target directory
        #[arg(required = true, num_args = 1..)]
        args: Vec<String>,
        /// Profile to clone with, prompts when absent
        #[arg(long)]
        profile: Option<String>,
        /// Target directory
        #[arg(long)]
        dir: Option<String>,
    },
    /// Shows profiles, mappings and config drift
    Status,
    /// Displays current Git user
    Current,
    /// SSH helpers
    #[command(subcommand)]
    Ssh(SshCommand),
    /// GitHub account helpers (requires gh)
    #[command(subcommand)]
    Account(AccountCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Creates the config directories and registry
    Init,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Adds a new profile
    Add(ProfileAddArgs),
    /// Lists profiles
    List,
    /// Deletes a profile with its mappings and config blocks
    Remove {
        /// Profile to delete
        profile_id: String,
    },
    /// Rewrites a profile's SSH block and git fragment
    Refresh {
        /// Profile to refresh
        profile_id: String,
    },
}

#[derive(Args, Debug)]
pub struct ProfileAddArgs {
    /// Profile id, derived from the label when absent
    #[arg(long)]
    pub id: Option<String>,
    /// Display label
    #[arg(long)]
    pub label: Option<String>,
    /// Git user.name
    #[arg(long)]
    pub name: Option<String>,
    /// Git user.email
    #[arg(long)]
    pub email: Option<String>,
    /// SSH private key path
    #[arg(long)]
    pub key_path: Option<String>,
    /// SSH host alias
    #[arg(long)]
    pub host_alias: Option<String>,
    /// GitHub username used for gh account switching
    #[arg(long)]
    pub gh_user: Option<String>,
    /// Generates an ed25519 key at the key path
    #[arg(long)]
    pub generate_key: bool,
    /// Maps a directory to the new profile
    #[arg(long)]
    pub map_dir: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum DirCommand {
    /// Maps a directory to a profile
    Map {
        /// Directory whose repositories use the profile
        path: String,
        /// Profile to map to
        profile_id: String,
    },
    /// Lists directory mappings
    List,
    /// Removes a mapping by directory or id
    Unmap {
        /// Mapped directory or mapping id
        path_or_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SshCommand {
    /// Tests the SSH connection through a profile's host alias
    Test {
        /// Profile to test
        profile_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Logs gh into GitHub over SSH for a profile
    Login {
        /// Profile to log in for
        profile_id: String,
    },
    /// Links a profile to a GitHub account
    Link {
        /// Profile to link
        profile_id: String,
        /// Account name, prompts from gh's accounts when absent
        username: Option<String>,
    },
    /// Switches gh to the profile's account
    Switch {
        /// Profile whose account to activate
        profile_id: String,
    },
    /// Uploads the profile's public key to GitHub
    KeyAdd {
        /// Profile whose key to upload
        profile_id: String,
        /// Key title shown on GitHub
        #[arg(long)]
        title: Option<String>,
        /// Keeps the active gh account even if the profile links another
        #[arg(long)]
        no_switch: bool,
    },
    /// Deletes the profile's public key from GitHub
    KeyRemove {
        /// Profile whose key to delete
        profile_id: String,
    },
}
