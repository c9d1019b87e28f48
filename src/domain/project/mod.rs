//! Project domain module

mod entity;
mod repository;
mod validation;

pub use entity::{NewProject, Project, ProjectId, ProjectType};
pub use repository::ProjectRepository;
pub use validation::{
    validate_description, validate_title, ProjectValidationError, MAX_TITLE_LENGTH,
};

#[cfg(test)]
pub use repository::MockProjectRepository;
