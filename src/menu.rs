use colored::Colorize;
use inquire::{Confirm, Select, Text};

use crate::{
    env::Env,
    error::Result,
    manager::{self, ProfileDraft},
    output::{print_status, show_current_user},
    profile::Profile,
    storage::{load_config, load_profiles},
    validation::{prompt_until_valid, validate_input_email, validate_input_username},
};

/// Menu entry that returns to the previous menu
pub const BACK_OPTION: &str = "back";

/// Runs interactive menu interface
pub fn run_menu(env: &Env) -> Result<()> {
    loop {
        let actions: Vec<&'static str> = vec![
            "use profile in repository",
            "add profile",
            "remove profile",
            "map directory",
            "show status",
            "show current user",
            "quit",
        ];

        let action_selected: &'static str =
            Select::new(&format!("{}", "select action".blue()), actions).prompt()?;

        match action_selected {
            "use profile in repository" => menu_use_profile(env)?,
            "add profile" => menu_add_profile(env)?,
            "remove profile" => menu_remove_profile(env)?,
            "map directory" => menu_map_directory(env)?,
            "show status" => print_status(env, &manager::status(env)?),
            "show current user" => show_current_user()?,
            "quit" => {
                println!("{}", "quitting".yellow());
                break Ok(());
            }
            _ => unreachable!("unexpected input"),
        }
    }
}

/// Lets the user pick a profile, `None` when they go back
pub fn select_profile(profiles: &[Profile], prompt: &str) -> Result<Option<Profile>> {
    if profiles.is_empty() {
        println!("{}", "no profiles found".red());
        return Ok(None);
    }
    let mut choices: Vec<String> = profiles.iter().map(Profile::summary).collect();
    choices.push(BACK_OPTION.to_string());

    let selected = Select::new(&format!("{}", prompt.blue()), choices).raw_prompt()?;
    Ok(profiles.get(selected.index).cloned())
}

fn pick_profile(env: &Env, prompt: &str) -> Result<Option<Profile>> {
    let config = load_config(env)?;
    let profiles = load_profiles(env, &config)?;
    select_profile(&profiles, prompt)
}

/// Menu for applying a profile to the current repository
fn menu_use_profile(env: &Env) -> Result<()> {
    if let Some(profile) = pick_profile(env, "select profile to use:")? {
        let (profile, path) = manager::apply_to_repo(env, &profile.id, None)?;
        println!("{} {} -> {}", "applied".green(), profile.id, path);
    }
    Ok(())
}

/// Menu for adding a new profile
fn menu_add_profile(env: &Env) -> Result<()> {
    let name = prompt_until_valid(
        &format!("{}", "enter git name:".blue()),
        validate_input_username,
    )?;
    let email = prompt_until_valid(
        &format!("{}", "enter git email:".blue()),
        validate_input_email,
    )?;
    let label = Text::new(&format!("{}", "enter label:".blue()))
        .with_default(&name)
        .prompt()?;
    let generate_key = Confirm::new(&format!("{}", "generate an ed25519 key?".blue()))
        .with_default(true)
        .prompt()?;

    let profile = manager::add_profile(
        env,
        ProfileDraft {
            label: Some(label),
            name: Some(name),
            email: Some(email),
            generate_key,
            ..ProfileDraft::default()
        },
    )?;
    println!("{} {}", "added profile".green(), profile.summary());
    Ok(())
}

/// Menu for removing a profile
fn menu_remove_profile(env: &Env) -> Result<()> {
    if let Some(profile) = pick_profile(env, "select profile to remove:")? {
        manager::remove_profile(env, &profile.id)?;
        println!("{} {}", "removed profile".green(), profile.id);
    }
    Ok(())
}

/// Menu for mapping a directory to a profile
fn menu_map_directory(env: &Env) -> Result<()> {
    let Some(profile) = pick_profile(env, "select profile to map:")? else {
        return Ok(());
    };
    let message = format!("{}", "directory:".blue());
    let mut dir_prompt = Text::new(&message);
    if let Some(cwd) = env.cwd.as_deref() {
        dir_prompt = dir_prompt.with_default(cwd);
    }
    let dir = dir_prompt.prompt()?;
    let mapping = manager::map_directory(env, &dir, &profile.id)?;
    println!("{} {} -> {}", "mapped".green(), mapping.path, profile.id);
    Ok(())
}
