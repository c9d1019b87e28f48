//! Issue domain module

mod entity;
mod repository;

pub use entity::{
    Issue, IssueId, IssueParts, IssuePriority, IssueStatus, IssueTag, NewIssue, UnknownChoice,
};
pub use repository::IssueRepository;

#[cfg(test)]
pub use repository::MockIssueRepository;
