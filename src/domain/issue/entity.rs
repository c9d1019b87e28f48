//! Issue entity and its classification enums

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::project::{validate_description, validate_title, ProjectId, ProjectValidationError};
use crate::domain::user::UserId;

/// Issue identifier assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(i64);

impl IssueId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for IssueId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for IssueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored string did not match any known choice
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Unknown {field} '{value}'")]
pub struct UnknownChoice {
    pub field: &'static str,
    pub value: String,
}

impl From<UnknownChoice> for crate::domain::DomainError {
    fn from(err: UnknownChoice) -> Self {
        Self::validation(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssuePriority {
    #[default]
    Low,
    Medium,
    High,
}

impl IssuePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl FromStr for IssuePriority {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            other => Err(UnknownChoice {
                field: "priority",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueTag {
    Bug,
    Feature,
    #[default]
    Task,
}

impl IssueTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "BUG",
            Self::Feature => "FEATURE",
            Self::Task => "TASK",
        }
    }
}

impl FromStr for IssueTag {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUG" => Ok(Self::Bug),
            "FEATURE" => Ok(Self::Feature),
            "TASK" => Ok(Self::Task),
            other => Err(UnknownChoice {
                field: "tag",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    #[default]
    Todo,
    InProgress,
    Finished,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Finished => "FINISHED",
        }
    }
}

impl FromStr for IssueStatus {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(Self::Todo),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "FINISHED" => Ok(Self::Finished),
            other => Err(UnknownChoice {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Data required to file an issue; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub project: ProjectId,
    pub author: UserId,
    pub assignee: Option<UserId>,
    pub priority: IssuePriority,
    pub tag: IssueTag,
    pub status: IssueStatus,
}

impl NewIssue {
    /// Build an issue draft with default priority, tag and status
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        project: ProjectId,
        author: UserId,
    ) -> Result<Self, ProjectValidationError> {
        let title = title.into();
        let description = description.into();
        validate_title(&title)?;
        validate_description(&description)?;

        Ok(Self {
            title,
            description,
            project,
            author,
            assignee: None,
            priority: IssuePriority::default(),
            tag: IssueTag::default(),
            status: IssueStatus::default(),
        })
    }

    pub fn with_assignee(mut self, assignee: Option<UserId>) -> Self {
        self.assignee = assignee;
        self
    }

    pub fn with_priority(mut self, priority: IssuePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tag(mut self, tag: IssueTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = status;
        self
    }
}

/// Every persisted column of an issue
#[derive(Debug, Clone)]
pub struct IssueParts {
    pub id: IssueId,
    pub title: String,
    pub description: String,
    pub project: ProjectId,
    pub author: UserId,
    pub assignee: Option<UserId>,
    pub priority: IssuePriority,
    pub tag: IssueTag,
    pub status: IssueStatus,
    pub created_time: DateTime<Utc>,
}

/// A unit of work filed against exactly one project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    id: IssueId,
    title: String,
    description: String,
    project: ProjectId,
    author: UserId,
    assignee: Option<UserId>,
    priority: IssuePriority,
    tag: IssueTag,
    status: IssueStatus,
    created_time: DateTime<Utc>,
}

impl Issue {
    pub fn create(id: IssueId, new: NewIssue) -> Self {
        Self::from_parts(IssueParts {
            id,
            title: new.title,
            description: new.description,
            project: new.project,
            author: new.author,
            assignee: new.assignee,
            priority: new.priority,
            tag: new.tag,
            status: new.status,
            created_time: Utc::now(),
        })
    }

    pub fn from_parts(parts: IssueParts) -> Self {
        Self {
            id: parts.id,
            title: parts.title,
            description: parts.description,
            project: parts.project,
            author: parts.author,
            assignee: parts.assignee,
            priority: parts.priority,
            tag: parts.tag,
            status: parts.status,
            created_time: parts.created_time,
        }
    }

    // Getters

    pub fn id(&self) -> IssueId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn author(&self) -> UserId {
        self.author
    }

    pub fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    pub fn priority(&self) -> IssuePriority {
        self.priority
    }

    pub fn tag(&self) -> IssueTag {
        self.tag
    }

    pub fn status(&self) -> IssueStatus {
        self.status
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

    /// Membership of the assignee is checked by the caller, not here
    pub fn set_assignee(&mut self, assignee: Option<UserId>) {
        self.assignee = assignee;
    }

    pub fn set_priority(&mut self, priority: IssuePriority) {
        self.priority = priority;
    }

    pub fn set_tag(&mut self, tag: IssueTag) {
        self.tag = tag;
    }

    pub fn set_status(&mut self, status: IssueStatus) {
        self.status = status;
    }
}
