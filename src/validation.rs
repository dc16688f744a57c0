use colored::Colorize;
use inquire::Text;

use crate::error::AppError;

/// Prompts user for input until valid input is provided
pub fn prompt_until_valid<F>(prompt_message: &str, input_validation: F) -> Result<String, AppError>
where
    F: Fn(&str) -> Result<(), AppError>,
{
    loop {
        let input: String = Text::new(prompt_message).prompt()?;
        let input = input.trim().to_string();
        match input_validation(&input) {
            Ok(_) => break Ok(input),
            Err(AppError::Validation(msg)) => println!("{}", msg.red()),
            Err(e) => return Err(e),
        }
    }
}

// Presence checks only, git accepts any non-empty value

/// Validates username input
pub fn validate_input_username(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        Err(AppError::Validation("Username cannot be empty".to_string()))
    } else {
        Ok(())
    }
}

/// Validates email input
pub fn validate_input_email(email: &str) -> Result<(), AppError> {
    if email.trim().is_empty() {
        Err(AppError::Validation("Email cannot be empty".to_string()))
    } else {
        Ok(())
    }
}
