//! Keep several Git identities around and switch between them.
//!
//! Identities live in a JSON settings file under `userEmailConfigList` and
//! are addressed by their display key, `"<name> (<email>)"`.

pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod git;
pub mod menu;
pub mod registry;
pub mod storage;
pub mod validation;

use colored::Colorize;
use tracing::{info, warn};

pub use config::Settings;
pub use entry::GitUserEntry;
pub use error::AppError;
pub use git::{Git, GitScope};

use git::{USER_EMAIL_KEY, USER_NAME_KEY};
pub use registry::IdentityRegistry;
pub use storage::{EntryStore, JsonFileStore};

/// Adds the identities already configured in git, returns how many were found
///
/// Global config is read first, then local config when inside a repository.
/// Only scopes with both user.name and user.email set count.
pub fn import_existing_identities<S: EntryStore>(registry: &IdentityRegistry<S>, git: &Git) -> Result<usize, AppError> {
    let mut found = 0;

    if let Some(entry) = git.read_identity(GitScope::Global)? {
        info!("importing global identity {}", entry.display_key());
        registry.add(entry)?;
        found += 1;
    }

    if git.is_inside_git_repo()? {
        if let Some(entry) = git.read_identity(GitScope::Local)? {
            info!("importing local identity {}", entry.display_key());
            registry.add(entry)?;
            found += 1;
        }
    }

    Ok(found)
}

/// Imports existing git identities when no identity list is stored yet
pub fn ensure_configuration<S: EntryStore>(registry: &IdentityRegistry<S>, git: &Git) -> Result<(), AppError> {
    if registry.exists()? {
        return Ok(());
    }

    info!("no identities stored, checking git config");
    import_existing_identities(registry, git)?;
    Ok(())
}

/// [`ensure_configuration`] for commands that did not ask for an import: failures are logged, not returned
pub fn ensure_configuration_or_warn<S: EntryStore>(registry: &IdentityRegistry<S>, git: &Git) {
    if let Err(err) = ensure_configuration(registry, git) {
        warn!("could not import identities from git config: {err}");
    }
}

/// First-run import followed by the optional unset of user.name and user.email
pub fn startup<S: EntryStore>(registry: &IdentityRegistry<S>, settings: &Settings, git: &Git) -> Result<(), AppError> {
    ensure_configuration(registry, git)?;

    if settings.unset_user_email_on_startup {
        info!("unsetting user.name and user.email on startup");
        git.unset_identity()?;
    }

    Ok(())
}

/// Builds an entry, deriving a noreply email when none is given and the setting allows it
///
/// # Arguments
/// * `settings` - Loaded settings
/// * `user_name` - Git username
/// * `user_email` - Git email, if provided
pub fn complete_entry(
    settings: &Settings,
    user_name: &str,
    user_email: Option<&str>,
) -> Result<GitUserEntry, AppError> {
    validation::validate_input_username(user_name)?;

    let user_email: String = match user_email {
        Some(user_email) => user_email.to_string(),
        None if settings.use_noreply_email => Settings::noreply_email(user_name.trim()),
        None => {
            return Err(AppError::Validation(
                "Email is required unless useNoreplyEmail is enabled".to_string(),
            ));
        }
    };
    validation::validate_input_email(&user_email)?;

    Ok(GitUserEntry::new(user_name.trim(), user_email.trim()))
}

/// Switches git to the stored identity with the given display key
///
/// # Arguments
/// * `registry` - Identity registry
/// * `git` - Git invocation settings
/// * `display_key` - Key of the identity to switch to
/// * `scope` - Git config scope to write
pub fn switch_to<S: EntryStore>(
    registry: &IdentityRegistry<S>,
    git: &Git,
    display_key: &str,
    scope: GitScope,
) -> Result<(), AppError> {
    let entry: GitUserEntry = registry
        .resolve(display_key)?
        .ok_or_else(|| AppError::UserNotFound(display_key.to_string()))?;

    git.apply_identity(&entry, scope)?;
    println!("{} {}", "switched to user:".green(), entry.display_key());
    Ok(())
}

/// Stores an identity and, when `switch` is set, makes it the active one.
///
/// Returns whether the identity was new.
pub fn add_identity<S: EntryStore>(
    registry: &IdentityRegistry<S>,
    git: &Git,
    entry: GitUserEntry,
    scope: GitScope,
    switch: bool,
) -> Result<bool, AppError> {
    let added = registry.add(entry.clone())?;
    if added {
        println!("{} {}", "stored user:".green(), entry.display_key());
    } else {
        println!("{} {}", "user already stored:".yellow(), entry.display_key());
    }

    if switch {
        git.apply_identity(&entry, scope)?;
        println!("{} {}", "switched to user:".green(), entry.display_key());
    }
    Ok(added)
}

/// Deletes the identities with the given display keys, returns how many were removed
pub fn delete_identities<S: EntryStore>(registry: &IdentityRegistry<S>, display_keys: &[String]) -> Result<usize, AppError> {
    let removed = registry.delete_many(display_keys)?;
    match removed {
        0 => println!("{}", "no matching users to delete".yellow()),
        1 => println!("{}", "deleted 1 user".green()),
        n => println!("{}", format!("deleted {n} users").green()),
    }
    Ok(removed)
}

/// Shows current git user
pub fn show_current_user(git: &Git) -> Result<(), AppError> {
    let user_name = git.get_effective_config(USER_NAME_KEY)?.unwrap_or_default();
    let user_email = git.get_effective_config(USER_EMAIL_KEY)?.unwrap_or_default();

    println!("{} {} <{}>", "current user:".blue(), user_name, user_email);
    Ok(())
}

/// Lists all stored identities
pub fn list_all_users<S: EntryStore>(registry: &IdentityRegistry<S>) -> Result<(), AppError> {
    match registry.list_display_keys()? {
        Some(display_keys) => display_keys.iter().for_each(|display_key| println!("{display_key}")),
        None => println!("{}", "no users to show".red()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{git::sandbox::Sandbox, registry::tests::MemoryStore};

    fn alice() -> GitUserEntry {
        GitUserEntry::new("alice", "a@x.com")
    }

    fn bob() -> GitUserEntry {
        GitUserEntry::new("bob", "b@x.com")
    }

    #[test]
    fn complete_entry_keeps_given_email() {
        let entry = complete_entry(&Settings::default(), "alice", Some("a@x.com")).unwrap();
        assert_eq!(entry, GitUserEntry::new("alice", "a@x.com"));
    }

    #[test]
    fn complete_entry_derives_noreply_email() {
        let settings = Settings {
            use_noreply_email: true,
            ..Settings::default()
        };
        let entry = complete_entry(&settings, "octocat", None).unwrap();
        assert_eq!(entry.user_email, "octocat@users.noreply.github.com");
    }

    #[test]
    fn complete_entry_requires_email_without_noreply() {
        let result = complete_entry(&Settings::default(), "alice", None);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn complete_entry_rejects_blank_name() {
        let result = complete_entry(&Settings::default(), " ", Some("a@x.com"));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn ensure_configuration_skips_import_when_identities_exist() {
        let store = MemoryStore::with(vec![GitUserEntry::new("alice", "a@x.com")]);
        let registry = IdentityRegistry::new(store);

        ensure_configuration(&registry, &Git::new("gitmu-no-such-git-binary")).unwrap();
        assert_eq!(registry.store().saves.get(), 0);
    }

    #[test]
    fn delete_identities_updates_store() {
        let store = MemoryStore::with(vec![
            GitUserEntry::new("alice", "a@x.com"),
            GitUserEntry::new("bob", "b@x.com"),
        ]);
        let registry = IdentityRegistry::new(store);

        let display_keys = ["bob (b@x.com)".to_string(), "nobody (n@x.com)".to_string()];
        let removed = delete_identities(&registry, &display_keys).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(
            registry.list_display_keys().unwrap(),
            Some(vec!["alice (a@x.com)".to_string()])
        );
    }

    #[test]
    fn failed_import_does_not_block_other_commands() {
        let registry = IdentityRegistry::new(MemoryStore::default());
        let git = Git::new("gitmu-no-such-git-binary");

        assert!(matches!(ensure_configuration(&registry, &git), Err(AppError::Io(_))));
        ensure_configuration_or_warn(&registry, &git);

        assert_eq!(registry.list_display_keys().unwrap(), None);
        assert_eq!(registry.store().saves.get(), 0);
    }

    #[test]
    fn add_identity_reports_duplicates() {
        let registry = IdentityRegistry::new(MemoryStore::default());
        let git = Git::new("gitmu-no-such-git-binary");

        assert!(add_identity(&registry, &git, alice(), GitScope::Global, false).unwrap());
        assert!(!add_identity(&registry, &git, alice(), GitScope::Global, false).unwrap());
        assert_eq!(registry.list_display_keys().unwrap(), Some(vec![alice().display_key()]));
    }

    #[test]
    fn import_reads_global_identity_outside_repository() {
        let sandbox = Sandbox::new();
        let git = sandbox.git();
        git.apply_identity(&alice(), GitScope::Global).unwrap();
        let registry = IdentityRegistry::new(MemoryStore::default());

        assert_eq!(import_existing_identities(&registry, &git).unwrap(), 1);
        assert_eq!(*registry.store().entries.borrow(), Some(vec![alice()]));
    }

    #[test]
    fn import_reads_local_identity_inside_repository() {
        let sandbox = Sandbox::new();
        sandbox.init_repo();
        let git = sandbox.git();
        git.apply_identity(&bob(), GitScope::Local).unwrap();
        let registry = IdentityRegistry::new(MemoryStore::default());

        assert_eq!(import_existing_identities(&registry, &git).unwrap(), 1);
        assert_eq!(*registry.store().entries.borrow(), Some(vec![bob()]));
    }

    #[test]
    fn import_stores_global_before_local() {
        let sandbox = Sandbox::new();
        sandbox.init_repo();
        let git = sandbox.git();
        git.apply_identity(&alice(), GitScope::Global).unwrap();
        git.apply_identity(&bob(), GitScope::Local).unwrap();
        let registry = IdentityRegistry::new(MemoryStore::default());

        assert_eq!(import_existing_identities(&registry, &git).unwrap(), 2);
        assert_eq!(*registry.store().entries.borrow(), Some(vec![alice(), bob()]));
    }

    #[test]
    fn import_skips_scope_with_only_a_name() {
        let sandbox = Sandbox::new();
        let git = sandbox.git();
        git.set_config(GitScope::Global, USER_NAME_KEY, "alice").unwrap();
        let registry = IdentityRegistry::new(MemoryStore::default());

        assert_eq!(import_existing_identities(&registry, &git).unwrap(), 0);
        assert_eq!(registry.list_display_keys().unwrap(), None);
    }

    #[test]
    fn startup_imports_only_into_an_empty_list() {
        let sandbox = Sandbox::new();
        let git = sandbox.git();
        git.apply_identity(&alice(), GitScope::Global).unwrap();

        let empty = IdentityRegistry::new(MemoryStore::default());
        startup(&empty, &Settings::default(), &git).unwrap();
        assert_eq!(*empty.store().entries.borrow(), Some(vec![alice()]));

        let populated = IdentityRegistry::new(MemoryStore::with(vec![bob()]));
        startup(&populated, &Settings::default(), &git).unwrap();
        assert_eq!(*populated.store().entries.borrow(), Some(vec![bob()]));
        assert_eq!(populated.store().saves.get(), 0);
    }

    #[test]
    fn startup_unsets_identity_when_enabled() {
        let sandbox = Sandbox::new();
        let git = sandbox.git();
        git.apply_identity(&alice(), GitScope::Global).unwrap();
        let settings = Settings {
            unset_user_email_on_startup: true,
            ..Settings::default()
        };
        let registry = IdentityRegistry::new(MemoryStore::default());

        startup(&registry, &settings, &git).unwrap();

        assert_eq!(*registry.store().entries.borrow(), Some(vec![alice()]));
        assert_eq!(git.read_identity(GitScope::Global).unwrap(), None);
    }
}
