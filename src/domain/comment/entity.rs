//! Comment entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::contributor::ContributorId;
use crate::domain::issue::IssueId;
use crate::domain::project::{validate_description, ProjectValidationError};

/// Comment identifier, generated at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(Uuid);

impl CommentId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for CommentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Data required to post a comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub description: String,
    pub issue: IssueId,
    /// The poster's membership record in the issue's project
    pub author: ContributorId,
}

impl NewComment {
    pub fn new(
        description: impl Into<String>,
        issue: IssueId,
        author: ContributorId,
    ) -> Result<Self, ProjectValidationError> {
        let description = description.into();
        validate_description(&description)?;
        Ok(Self {
            description,
            issue,
            author,
        })
    }
}

/// A remark attached to an issue, authored through a contributor record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    id: CommentId,
    description: String,
    issue: IssueId,
    author: ContributorId,
    created_time: DateTime<Utc>,
}

impl Comment {
    pub fn create(new: NewComment) -> Self {
        Self::from_parts(
            CommentId::generate(),
            new.description,
            new.issue,
            new.author,
            Utc::now(),
        )
    }

    pub fn from_parts(
        id: CommentId,
        description: String,
        issue: IssueId,
        author: ContributorId,
        created_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            description,
            issue,
            author,
            created_time,
        }
    }

    pub fn id(&self) -> CommentId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn issue(&self) -> IssueId {
        self.issue
    }

    pub fn author(&self) -> ContributorId {
        self.author
    }

    pub fn created_time(&self) -> DateTime<Utc> {
        self.created_time
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
}
