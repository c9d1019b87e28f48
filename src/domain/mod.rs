//! Domain layer - Core business logic and entities

pub mod authorization;
pub mod comment;
pub mod contributor;
pub mod error;
pub mod issue;
pub mod project;
pub mod user;

pub use authorization::{authorize, ensure_allowed, Action, Actor, Decision, Resource};
pub use comment::{Comment, CommentId, CommentRepository, NewComment};
pub use contributor::{Contributor, ContributorId, ContributorRepository};
pub use error::DomainError;
pub use issue::{
    Issue, IssueId, IssueParts, IssuePriority, IssueRepository, IssueStatus, IssueTag, NewIssue,
};
pub use project::{NewProject, Project, ProjectId, ProjectRepository, ProjectType};
pub use user::{NewUser, User, UserId, UserParts, UserRepository};
