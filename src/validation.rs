use colored::Colorize;
use inquire::Text;
use validator::ValidateEmail;

use crate::error::{AppError, Result};

/// Maximum length for Git username
const MAX_USERNAME_LENGTH: usize = 100;
/// Maximum length for Git email address
const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum length for profile id
const MAX_ID_LENGTH: usize = 40;

/// Prompts user for input until valid input is provided
pub fn prompt_until_valid<F>(prompt_message: &str, input_validation: F) -> Result<String>
where
    F: Fn(&str) -> Result<()>,
{
    loop {
        let input: String = Text::new(prompt_message).prompt()?;
        match input_validation(input.trim()) {
            Ok(_) => break Ok(input.trim().to_string()),
            Err(AppError::Validation(msg)) => println!("{}", msg.red()),
            Err(e) => return Err(e),
        }
    }
}

// Validate input helper functions

/// Validates git username input
pub fn validate_input_username(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        Err(AppError::Validation("Name cannot be empty".to_string()))
    } else if name.len() > MAX_USERNAME_LENGTH {
        Err(AppError::Validation(format!(
            "Name too long (max {MAX_USERNAME_LENGTH} characters)"
        )))
    } else if name.contains(['\n', '\r']) {
        Err(AppError::Validation("Name must be a single line".to_string()))
    } else {
        Ok(())
    }
}

/// Validates email input
pub fn validate_input_email(email: &str) -> Result<()> {
    if email.is_empty() {
        Err(AppError::Validation("Email cannot be empty".to_string()))
    } else if email.len() > MAX_EMAIL_LENGTH {
        Err(AppError::Validation(format!(
            "Email too long (max {MAX_EMAIL_LENGTH} characters)"
        )))
    } else if !email.validate_email() {
        Err(AppError::Validation(format!("Invalid email format: '{email}'")))
    } else {
        Ok(())
    }
}

/// Validates a profile id.
///
/// Ids end up in file names, block markers and host aliases, so only
/// lowercase ASCII letters, digits, `-` and `_` are allowed.
pub fn validate_profile_id(id: &str) -> Result<()> {
    if id.is_empty() {
        Err(AppError::Validation("Profile id cannot be empty".to_string()))
    } else if id.len() > MAX_ID_LENGTH {
        Err(AppError::Validation(format!(
            "Profile id too long (max {MAX_ID_LENGTH} characters)"
        )))
    } else if !id
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
    {
        Err(AppError::Validation(format!(
            "Profile id '{id}' may only contain a-z, 0-9, '-' and '_'"
        )))
    } else {
        Ok(())
    }
}

/// Validates an SSH host alias
pub fn validate_host_alias(alias: &str) -> Result<()> {
    if alias.is_empty() {
        Err(AppError::Validation("Host alias cannot be empty".to_string()))
    } else if alias.chars().any(|ch| ch.is_whitespace() || matches!(ch, '*' | '?' | '!' | '#')) {
        Err(AppError::Validation(format!(
            "Host alias '{alias}' cannot contain whitespace or SSH pattern characters"
        )))
    } else {
        Ok(())
    }
}
