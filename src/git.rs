use std::{
    ffi::{OsStr, OsString},
    path::PathBuf,
    process::{Command, Output},
};

use tracing::debug;

use crate::{entry::GitUserEntry, error::AppError};

/// Git config key for the user name
pub const USER_NAME_KEY: &str = "user.name";
/// Git config key for the user email
pub const USER_EMAIL_KEY: &str = "user.email";

/// `git config --get` exit status when the key is not set
const EXIT_KEY_MISSING: i32 = 1;
/// `git config --unset` exit status when there is nothing to unset
const EXIT_NOTHING_TO_UNSET: i32 = 5;

/// Which git config file a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitScope {
    Global,
    Local,
}

impl GitScope {
    pub fn flag(self) -> &'static str {
        match self {
            GitScope::Global => "--global",
            GitScope::Local => "--local",
        }
    }
}

/// Arguments for reading `key`, with no scope meaning the effective value
pub fn get_args(scope: Option<GitScope>, key: &str) -> Vec<&str> {
    let mut args = vec!["config"];
    args.extend(scope.map(GitScope::flag));
    args.extend(["--get", key]);
    args
}

/// Arguments for writing `value` to `key`
pub fn set_args<'a>(scope: GitScope, key: &'a str, value: &'a str) -> Vec<&'a str> {
    vec!["config", scope.flag(), key, value]
}

/// Arguments for removing `key`
pub fn unset_args(scope: GitScope, key: &str) -> Vec<&str> {
    vec!["config", scope.flag(), "--unset", key]
}

/// How git gets invoked: which binary, from which directory, with which environment
#[derive(Debug, Clone)]
pub struct Git {
    program: OsString,
    work_dir: Option<PathBuf>,
    envs: Vec<(OsString, OsString)>,
}

impl Default for Git {
    fn default() -> Self {
        Self::new("git")
    }
}

impl Git {
    /// Runs `program` as git from the current directory
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            work_dir: None,
            envs: Vec::new(),
        }
    }

    /// Runs git from `work_dir` instead of the current directory
    pub fn in_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }

    /// Adds an environment variable to every git invocation
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs.push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    fn run(&self, args: &[&str]) -> Result<Output, AppError> {
        debug!("running git {}", args.join(" "));
        let mut command = Command::new(&self.program);
        command.args(args).envs(self.envs.iter().map(|(key, value)| (key, value)));
        if let Some(work_dir) = &self.work_dir {
            command.current_dir(work_dir);
        }
        Ok(command.output()?)
    }

    fn read_value(&self, args: &[&str]) -> Result<Option<String>, AppError> {
        let git_command_output: Output = self.run(args)?;

        if git_command_output.status.code() == Some(EXIT_KEY_MISSING) {
            return Ok(None);
        }
        if !git_command_output.status.success() {
            return Err(command_error(git_command_output)?);
        }

        let value = String::from_utf8_lossy(&git_command_output.stdout).trim().to_string();
        Ok(Some(value).filter(|value| !value.is_empty()))
    }

    /// Reads a git config value from one scope
    ///
    /// # Arguments
    /// * `scope` - Config file to read
    /// * `key` - Git config key (user.name or user.email)
    pub fn get_config(&self, scope: GitScope, key: &str) -> Result<Option<String>, AppError> {
        self.read_value(&get_args(Some(scope), key))
    }

    /// Reads the value git would actually use for `key`
    pub fn get_effective_config(&self, key: &str) -> Result<Option<String>, AppError> {
        self.read_value(&get_args(None, key))
    }

    /// Executes a Git config set command
    ///
    /// # Arguments
    /// * `scope` - Config file to write
    /// * `key` - Git config key to set (user.name or user.email)
    /// * `value` - Value to set for key (username or email)
    pub fn set_config(&self, scope: GitScope, key: &str, value: &str) -> Result<(), AppError> {
        let git_command_output: Output = self.run(&set_args(scope, key, value))?;

        if !git_command_output.status.success() {
            return Err(command_error(git_command_output)?);
        }

        Ok(())
    }

    /// Removes `key` from one scope, a key that is already unset is fine
    pub fn unset_config(&self, scope: GitScope, key: &str) -> Result<(), AppError> {
        let git_command_output: Output = self.run(&unset_args(scope, key))?;

        if git_command_output.status.success()
            || git_command_output.status.code() == Some(EXIT_NOTHING_TO_UNSET)
        {
            return Ok(());
        }

        Err(command_error(git_command_output)?)
    }

    /// Checks if the working directory is in a Git repository for executing Git commands
    pub fn is_inside_git_repo(&self) -> Result<bool, AppError> {
        let git_command_output: Output = self.run(&["rev-parse", "--is-inside-work-tree"])?;

        if !git_command_output.status.success() {
            return Ok(false);
        }

        let value = String::from_utf8_lossy(&git_command_output.stdout).to_string();
        Ok(value.trim() == "true")
    }

    /// Reads a complete identity from one scope, `None` unless both keys are set
    pub fn read_identity(&self, scope: GitScope) -> Result<Option<GitUserEntry>, AppError> {
        let user_email = self.get_config(scope, USER_EMAIL_KEY)?;
        let user_name = self.get_config(scope, USER_NAME_KEY)?;

        Ok(user_name
            .zip(user_email)
            .map(|(user_name, user_email)| GitUserEntry::new(user_name, user_email)))
    }

    /// Writes an identity's email and name to `scope`
    pub fn apply_identity(&self, entry: &GitUserEntry, scope: GitScope) -> Result<(), AppError> {
        if scope == GitScope::Local && !self.is_inside_git_repo()? {
            return Err(AppError::NotInGitRepository);
        }

        self.set_config(scope, USER_EMAIL_KEY, &entry.user_email)?;
        self.set_config(scope, USER_NAME_KEY, &entry.user_name)
    }

    /// Unsets user.name and user.email in the global and, inside a repository, local config
    pub fn unset_identity(&self) -> Result<(), AppError> {
        let inside_repo = self.is_inside_git_repo()?;

        for scope in [GitScope::Global, GitScope::Local] {
            if scope == GitScope::Local && !inside_repo {
                debug!("not inside a repository, skipping local config");
                continue;
            }
            self.unset_config(scope, USER_NAME_KEY)?;
            self.unset_config(scope, USER_EMAIL_KEY)?;
        }

        Ok(())
    }
}

fn command_error(output: Output) -> Result<AppError, AppError> {
    Ok(AppError::GitCommand(
        String::from_utf8(output.stderr)?.trim().to_string(),
    ))
}

/// Sandboxed git setups shared by the tests that drive a real git binary
#[cfg(test)]
pub(crate) mod sandbox {
    use std::{fs, path::Path, process::Command};

    use tempfile::TempDir;

    use super::*;

    /// A private global gitconfig plus a working directory, no system config
    pub(crate) struct Sandbox {
        pub root: TempDir,
    }

    impl Sandbox {
        pub fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            fs::create_dir(root.path().join("work")).unwrap();
            fs::write(root.path().join("gitconfig"), "").unwrap();
            Self { root }
        }

        pub fn work_dir(&self) -> PathBuf {
            self.root.path().join("work")
        }

        /// Turns the working directory into a repository
        pub fn init_repo(&self) {
            let status = Command::new("git")
                .args(["init", "--quiet"])
                .current_dir(self.work_dir())
                .status()
                .unwrap();
            assert!(status.success());
        }

        pub fn git(&self) -> Git {
            let root: &Path = self.root.path();
            Git::default()
                .in_dir(self.work_dir())
                .env("GIT_CONFIG_GLOBAL", root.join("gitconfig"))
                .env("GIT_CONFIG_NOSYSTEM", "1")
                .env("GIT_CEILING_DIRECTORIES", root)
                .env("HOME", root)
        }
    }
}
