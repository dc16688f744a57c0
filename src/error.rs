use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Error during file I/O operations
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization
    #[error("json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    /// Error when user input fails.
    #[error("inquire error: {0}")]
    Inquire(#[from] inquire::InquireError),
    /// Error when executing Git commands
    #[error("git command failed: {0}")]
    GitCommand(String),
    /// Error when current directory is not a Git repository
    #[error("not in git repository")]
    NotInGitRepository,
    /// Error during input validation.
    #[error("validation error: {0}")]
    Validation(String),
    /// Error when no stored identity matches a display key.
    #[error("identity not found: '{0}'")]
    UserNotFound(String),
    /// Error during UTF-8 conversion.
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
    /// Error when the settings file has an unexpected shape.
    #[error("settings error: {0}")]
    Settings(String),
}

impl AppError {
    /// True when the error is the user backing out of a prompt
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            AppError::Inquire(
                inquire::InquireError::OperationCanceled | inquire::InquireError::OperationInterrupted
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_prompts_are_recognised() {
        assert!(AppError::from(inquire::InquireError::OperationCanceled).is_cancelled());
        assert!(AppError::from(inquire::InquireError::OperationInterrupted).is_cancelled());
        assert!(!AppError::NotInGitRepository.is_cancelled());
    }

    #[test]
    fn user_not_found_names_the_key() {
        let err = AppError::UserNotFound("alice (a@x.com)".to_string());
        assert_eq!(err.to_string(), "identity not found: 'alice (a@x.com)'");
    }
}
