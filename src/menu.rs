use colored::Colorize;
use inquire::{MultiSelect, Select};

use crate::{
    add_identity, config::Settings, delete_identities, error::AppError, git::{Git, GitScope}, list_all_users,
    registry::IdentityRegistry, show_current_user, storage::EntryStore, switch_to,
    validation::{prompt_until_valid, validate_input_email, validate_input_username},
    GitUserEntry,
};

/// Extra choice in the selection list that leads to the add flow
pub const ADD_NEW_OPTION: &str = "Add New Username/Email";

/// Runs interactive menu interface
pub fn run_menu<S: EntryStore>(registry: &IdentityRegistry<S>, settings: &Settings, git: &Git) -> Result<(), AppError> {
    loop {
        let actions: Vec<&'static str> = vec![
            "switch user",
            "add user",
            "delete users",
            "show current user",
            "show all users",
            "quit",
        ];

        let action_selected = cancellable(Select::new(&format!("{}", "select action".blue()), actions).prompt())?
            .unwrap_or("quit");

        let result = match action_selected {
            "switch user" => select_identity(registry, settings, git),
            "add user" => add_new_identity(registry, settings, git),
            "delete users" => delete_selected(registry),
            "show current user" => show_current_user(git),
            "show all users" => list_all_users(registry),
            "quit" => {
                println!("{}", "quitting".yellow());
                break Ok(());
            }
            _ => unreachable!("unexpected input"),
        };

        // Errors from one action are shown, the menu keeps running
        if let Err(err) = result {
            println!("{}", err.to_string().red());
        }
    }
}

/// Picks a stored identity and switches to it, or falls through to adding one
pub fn select_identity<S: EntryStore>(registry: &IdentityRegistry<S>, settings: &Settings, git: &Git) -> Result<(), AppError> {
    let Some(display_keys) = registry.list_display_keys()? else {
        return add_new_identity(registry, settings, git);
    };

    let choice = Select::new(
        &format!("{}", "select a user or add a new entry:".blue()),
        build_pick_list(display_keys),
    )
    .prompt();

    match cancellable(choice)? {
        None => Ok(()),
        Some(choice) if choice == ADD_NEW_OPTION => add_new_identity(registry, settings, git),
        Some(display_key) => switch_to(registry, git, &display_key, GitScope::Global),
    }
}

/// Menu for adding a new identity; the new identity becomes the active one
pub fn add_new_identity<S: EntryStore>(registry: &IdentityRegistry<S>, settings: &Settings, git: &Git) -> Result<(), AppError> {
    let user_name = prompt_until_valid(&format!("{}", "enter git username:".blue()), validate_input_username);
    let Some(user_name) = cancellable(user_name)? else {
        return Ok(());
    };

    let user_email: String = if settings.use_noreply_email {
        Settings::noreply_email(&user_name)
    } else {
        let user_email = prompt_until_valid(&format!("{}", "enter git email:".blue()), validate_input_email);
        match cancellable(user_email)? {
            Some(user_email) => user_email,
            None => return Ok(()),
        }
    };

    add_identity(registry, git, GitUserEntry::new(user_name, user_email), GitScope::Global, true)?;
    Ok(())
}

/// Menu for deleting any number of identities at once
pub fn delete_selected<S: EntryStore>(registry: &IdentityRegistry<S>) -> Result<(), AppError> {
    let Some(display_keys) = registry.list_display_keys()? else {
        println!("{}", "no users to delete".red());
        return Ok(());
    };

    let chosen = MultiSelect::new(&format!("{}", "select users to delete:".blue()), display_keys).prompt();

    match cancellable(chosen)? {
        Some(chosen) if !chosen.is_empty() => {
            delete_identities(registry, &chosen)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Builds the selection list: display keys followed by the add option
pub fn build_pick_list(display_keys: Vec<String>) -> Vec<String> {
    let mut pick_list: Vec<String> = display_keys;
    pick_list.push(ADD_NEW_OPTION.to_string());
    pick_list
}

/// Turns a cancelled prompt into `None`
fn cancellable<T, E: Into<AppError>>(result: Result<T, E>) -> Result<Option<T>, AppError> {
    match result.map_err(Into::into) {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_cancelled() => Ok(None),
        Err(err) => Err(err),
    }
}
