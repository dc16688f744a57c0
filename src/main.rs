use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use colored::Colorize;
use tracing::debug;

use gitmu::{
    add_identity,
    cli::{Cli, Commands},
    complete_entry,
    config::default_settings_path,
    delete_identities, ensure_configuration_or_warn, import_existing_identities, list_all_users, menu,
    show_current_user, startup, switch_to, AppError, Git, IdentityRegistry, JsonFileStore, Settings,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_cancelled() => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr, warnings only unless `--verbose`
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    let settings_path: PathBuf = match cli.settings {
        Some(path) => path,
        None => default_settings_path()?,
    };
    debug!("using settings file {}", settings_path.display());

    let settings = Settings::load(&settings_path)?;
    let registry = IdentityRegistry::new(JsonFileStore::new(settings_path));
    let git = Git::default();

    // Commands that asked for the import report its failures themselves
    if !matches!(cli.command, Some(Commands::Startup | Commands::Import)) {
        ensure_configuration_or_warn(&registry, &git);
    }

    match cli.command {
        Some(Commands::Select) => menu::select_identity(&registry, &settings, &git),
        Some(Commands::Switch { display_key, scope }) => switch_to(&registry, &git, &display_key, scope.scope()),
        Some(Commands::Add { user_name, user_email, scope, no_switch }) => {
            let entry = complete_entry(&settings, &user_name, user_email.as_deref())?;
            add_identity(&registry, &git, entry, scope.scope(), !no_switch)?;
            Ok(())
        }
        Some(Commands::Delete { display_keys }) if display_keys.is_empty() => menu::delete_selected(&registry),
        Some(Commands::Delete { display_keys }) => {
            delete_identities(&registry, &display_keys)?;
            Ok(())
        }
        Some(Commands::List) => list_all_users(&registry),
        Some(Commands::Current) => show_current_user(&git),
        Some(Commands::Unset) => {
            git.unset_identity()?;
            println!("{}", "unset user.name and user.email".green());
            Ok(())
        }
        Some(Commands::Import) => {
            let found = import_existing_identities(&registry, &git)?;
            println!("{} {}", "identities found in git config:".green(), found);
            Ok(())
        }
        Some(Commands::Startup) => startup(&registry, &settings, &git),
        None => menu::run_menu(&registry, &settings, &git),
    }
}
