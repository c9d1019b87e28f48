//! Validation shared by projects and issues

use thiserror::Error;

/// Errors raised when validating titles and descriptions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title cannot exceed {0} characters")]
    TitleTooLong(usize),

    #[error("Description cannot be empty")]
    EmptyDescription,

    #[error("Unknown project type '{0}'. Expected one of BACKEND, FRONTEND, IOS, ANDROID")]
    UnknownType(String),
}

/// Maximum title length for projects and issues
pub const MAX_TITLE_LENGTH: usize = 255;

/// Validate a project or issue title
pub fn validate_title(title: &str) -> Result<(), ProjectValidationError> {
    if title.trim().is_empty() {
        return Err(ProjectValidationError::EmptyTitle);
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ProjectValidationError::TitleTooLong(MAX_TITLE_LENGTH));
    }

    Ok(())
}

/// Validate a free-text description
pub fn validate_description(description: &str) -> Result<(), ProjectValidationError> {
    if description.trim().is_empty() {
        return Err(ProjectValidationError::EmptyDescription);
    }

    Ok(())
}

impl From<ProjectValidationError> for crate::domain::DomainError {
    fn from(err: ProjectValidationError) -> Self {
        Self::validation(err.to_string())
    }
}
