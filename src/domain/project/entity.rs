//! Project entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_description, validate_title, ProjectValidationError};
use crate::domain::user::UserId;

/// Project identifier assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(i64);

impl ProjectId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ProjectId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform a project targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectType {
    Backend,
    Frontend,
    Ios,
    Android,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backend => "BACKEND",
            Self::Frontend => "FRONTEND",
            Self::Ios => "IOS",
            Self::Android => "ANDROID",
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = ProjectValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BACKEND" => Ok(Self::Backend),
            "FRONTEND" => Ok(Self::Frontend),
            "IOS" => Ok(Self::Ios),
            "ANDROID" => Ok(Self::Android),
            other => Err(ProjectValidationError::UnknownType(other.to_string())),
        }
    }
}

/// Data required to create a project; the author is always the acting user
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub project_type: ProjectType,
    pub author: UserId,
}

impl NewProject {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        project_type: ProjectType,
        author: UserId,
    ) -> Result<Self, ProjectValidationError> {
        let title = title.into();
        let description = description.into();
        validate_title(&title)?;
        validate_description(&description)?;

        Ok(Self {
            title,
            description,
            project_type,
            author,
        })
    }
}

/// A project owned by exactly one author
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    id: ProjectId,
    title: String,
    description: String,
    #[serde(rename = "type")]
    project_type: ProjectType,
    author: UserId,
    created_time: DateTime<Utc>,
}

impl Project {
    /// Materialize a newly stored project
    pub fn create(id: ProjectId, new: NewProject) -> Self {
        Self::from_parts(
            id,
            new.title,
            new.description,
            new.project_type,
            new.author,
            Utc::now(),
        )
    }

    /// Rebuild a project from stored columns
    pub fn from_parts(
        id: ProjectId,
        title: String,
        description: String,
        project_type: ProjectType,
        author: UserId,
        created_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            project_type,
            author,
            created_time,
        }
    }

    // Getters

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn project_type(&self) -> ProjectType {
        self.project_type
    }

    /// The author is fixed at creation; there is no setter.
    pub fn author(&self) -> UserId {
        self.author
    }

    pub fn created_time(&self) -> DateTime<Utc> {
        self.created_time
    }

    // Mutators

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ProjectValidationError> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        Ok(())
    }

    pub fn set_description(
        &mut self,
        description: impl Into<String>,
    ) -> Result<(), ProjectValidationError> {
        let description = description.into();
        validate_description(&description)?;
        self.description = description;
        Ok(())
    }

    pub fn set_project_type(&mut self, project_type: ProjectType) {
        self.project_type = project_type;
    }
}
