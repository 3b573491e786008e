mod cli;

use std::process::exit;

use clap::Parser;
use colored::Colorize;
use inquire::Select;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{AccountCommand, Cli, Commands, ConfigCommand, DirCommand, ProfileAddArgs, ProfileCommand, SshCommand};
use gitid::{
    AppError, Env, Result, gh, keys,
    clone::parse_clone_args,
    manager::{self, ProfileDraft},
    menu::{run_menu, select_profile},
    output::{print_mappings, print_profiles, print_status, show_current_user},
    paths::to_home_shortcut,
    storage::{load_config, load_profiles, require_profile},
};

/// Environment variable holding the log filter
const LOG_ENV: &str = "GITID_LOG";

// Main
fn main() {
    let layer = fmt::layer().compact().with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry().with(layer).with(filter).init();

    if let Err(err) = run() {
        debug!(?err, "command failed");
        eprintln!("{}", err.to_string().red());
        exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let env = Env::detect()?;

    match cli.command {
        Some(Commands::Config(ConfigCommand::Init)) => {
            manager::init(&env)?;
            let dirs = gitid::paths::app_dirs(&env);
            println!("{} {}", "initialized".green(), dirs.config_dir);
        }
        Some(Commands::Profile(command)) => run_profile(&env, command)?,
        Some(Commands::Dir(command)) => run_dir(&env, command)?,
        Some(Commands::Use { profile_id, path }) => {
            let (profile, path) = manager::apply_to_repo(&env, &profile_id, path.as_deref())?;
            println!(
                "{} {} -> {}",
                "applied".green(),
                profile.id,
                to_home_shortcut(&path, &env.home_dir)
            );
        }
        Some(Commands::Clone { args, profile, dir }) => run_clone(&env, &args, profile, dir)?,
        Some(Commands::Status) => print_status(&env, &manager::status(&env)?),
        Some(Commands::Current) => show_current_user()?,
        Some(Commands::Ssh(SshCommand::Test { profile_id })) => {
            keys::test_connection(&require_profile(&env, &profile_id)?)?;
        }
        Some(Commands::Account(command)) => run_account(&env, command)?,
        None => run_menu(&env)?,
    }
    Ok(())
}

fn run_profile(env: &Env, command: ProfileCommand) -> Result<()> {
    match command {
        ProfileCommand::Add(args) => {
            let profile = manager::add_profile(env, draft_from_args(args))?;
            println!("{} {}", "added profile".green(), profile.summary());
        }
        ProfileCommand::List => {
            let config = load_config(env)?;
            print_profiles(&load_profiles(env, &config)?);
        }
        ProfileCommand::Remove { profile_id } => {
            manager::remove_profile(env, &profile_id)?;
            println!("{} {}", "removed profile".green(), profile_id);
        }
        ProfileCommand::Refresh { profile_id } => {
            let profile = manager::refresh_profile(env, &profile_id)?;
            println!("{} {}", "refreshed profile".green(), profile.summary());
        }
    }
    Ok(())
}

fn draft_from_args(args: ProfileAddArgs) -> ProfileDraft {
    ProfileDraft {
        id: args.id,
        label: args.label,
        name: args.name,
        email: args.email,
        key_path: args.key_path,
        host_alias: args.host_alias,
        github_user: args.gh_user,
        generate_key: args.generate_key,
        map_dir: args.map_dir,
    }
}

fn run_dir(env: &Env, command: DirCommand) -> Result<()> {
    match command {
        DirCommand::Map { path, profile_id } => {
            let mapping = manager::map_directory(env, &path, &profile_id)?;
            println!(
                "{} {} -> {}",
                "mapped".green(),
                to_home_shortcut(&mapping.path, &env.home_dir),
                profile_id
            );
        }
        DirCommand::List => print_mappings(env, &load_config(env)?.mappings),
        DirCommand::Unmap { path_or_id } => {
            let mapping = manager::unmap_directory(env, &path_or_id)?
                .ok_or(AppError::MappingNotFound(path_or_id))?;
            println!("{} {}", "removed mapping".green(), mapping.id);
        }
    }
    Ok(())
}

fn run_clone(env: &Env, args: &[String], profile: Option<String>, dir: Option<String>) -> Result<()> {
    let (remote, dir) = parse_clone_args(args, dir);
    let remote = remote.ok_or_else(|| {
        AppError::Validation("repository SSH URL is required".to_string())
    })?;

    let profile = match profile {
        Some(profile_id) => require_profile(env, &profile_id)?,
        None => {
            let config = load_config(env)?;
            let profiles = load_profiles(env, &config)?;
            if profiles.is_empty() {
                return Err(AppError::Validation(
                    "no profiles found, create one with `gitid profile add`".to_string(),
                ));
            }
            match select_profile(&profiles, "select profile to clone with:")? {
                Some(profile) => profile,
                None => {
                    println!("{}", "cancelled".yellow());
                    return Ok(());
                }
            }
        }
    };

    let (target, path) = manager::clone_with_profile(env, &remote, dir.as_deref(), &profile)?;
    println!(
        "{} {} with {} into {}",
        "cloned".green(),
        target.url,
        profile.id,
        to_home_shortcut(&path, &env.home_dir)
    );
    Ok(())
}

fn run_account(env: &Env, command: AccountCommand) -> Result<()> {
    match command {
        AccountCommand::Login { profile_id } => {
            manager::login_account(env, &profile_id)?;
            println!("{} {}", "logged in gh for".green(), profile_id);
        }
        AccountCommand::Link {
            profile_id,
            username,
        } => {
            require_profile(env, &profile_id)?;
            let username = match username {
                Some(username) => username,
                None => {
                    gh::ensure_available()?;
                    gh::ensure_authed()?;
                    let accounts = gh::list_accounts()?;
                    if accounts.is_empty() {
                        return Err(AppError::Validation(
                            "no GitHub accounts found in gh, run `gh auth login`".to_string(),
                        ));
                    }
                    Select::new(&format!("{}", "select GitHub account:".blue()), accounts)
                        .prompt()?
                }
            };
            manager::link_account(env, &profile_id, &username)?;
            println!("{} {} -> {}", "linked".green(), profile_id, username);
        }
        AccountCommand::Switch { profile_id } => {
            let profile = manager::switch_account(env, &profile_id)?;
            println!(
                "{} {}",
                "switched gh account to".green(),
                profile.github_username().unwrap_or_default()
            );
        }
        AccountCommand::KeyAdd {
            profile_id,
            title,
            no_switch,
        } => {
            let profile = manager::sync_key(env, &profile_id, title, !no_switch)?;
            let key_id = profile
                .github
                .and_then(|account| account.key_id)
                .map(|id| id.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!("{} {} (key id {})", "synced key for".green(), profile_id, key_id);
        }
        AccountCommand::KeyRemove { profile_id } => {
            manager::remove_synced_key(env, &profile_id)?;
            println!("{} {}", "removed key for".green(), profile_id);
        }
    }
    Ok(())
}
