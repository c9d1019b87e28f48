//! Authorization policy
//!
//! Reading is open to everyone. Writing is reserved to the author of the
//! resource, or to the author of the project that owns it. Plain
//! contributors can see everything in a project but may only change what
//! they wrote themselves.

use serde::Serialize;

use crate::domain::comment::Comment;
use crate::domain::contributor::Contributor;
use crate::domain::issue::Issue;
use crate::domain::project::Project;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Operation attempted on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Read)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Identity performing a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    User(UserId),
    Anonymous,
}

impl Actor {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Anonymous => None,
        }
    }

    /// The authenticated user, or `Unauthenticated`
    pub fn require_user(&self) -> Result<UserId, DomainError> {
        self.user_id()
            .ok_or_else(|| DomainError::unauthenticated("Authentication credentials were not provided"))
    }

    pub fn is(&self, user: UserId) -> bool {
        self.user_id() == Some(user)
    }
}

impl From<UserId> for Actor {
    fn from(id: UserId) -> Self {
        Self::User(id)
    }
}

/// A resource together with the records the policy needs to judge it
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Project(&'a Project),
    Issue {
        issue: &'a Issue,
        project: &'a Project,
    },
    Comment {
        comment: &'a Comment,
        /// Contributor record the comment was written through
        author: &'a Contributor,
        project: &'a Project,
    },
    /// Membership rows of a project; they have no author of their own
    Contributor { project: &'a Project },
    /// A user account
    Account(UserId),
}

impl Resource<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Project(_) => "project",
            Self::Issue { .. } => "issue",
            Self::Comment { .. } => "comment",
            Self::Contributor { .. } => "contributor",
            Self::Account(_) => "account",
        }
    }

    /// User who wrote this resource, if it has one
    fn direct_author(&self) -> Option<UserId> {
        match self {
            Self::Project(project) => Some(project.author()),
            Self::Issue { issue, .. } => Some(issue.author()),
            Self::Comment { comment, author, .. } => {
                debug_assert_eq!(comment.author(), author.id());
                Some(author.user())
            }
            Self::Contributor { .. } => None,
            Self::Account(user) => Some(*user),
        }
    }

    /// Author of the owning project, for resources nested under one
    fn project_author(&self) -> Option<UserId> {
        match self {
            Self::Issue { project, .. }
            | Self::Comment { project, .. }
            | Self::Contributor { project } => Some(project.author()),
            Self::Project(_) | Self::Account(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

/// Decide whether `actor` may perform `action` on `resource`
pub fn authorize(actor: Actor, action: Action, resource: &Resource<'_>) -> Decision {
    if !action.is_write() {
        return Decision::Allow;
    }

    let Actor::User(user) = actor else {
        return Decision::Deny;
    };

    let is_author = resource.direct_author() == Some(user);
    let is_project_author = resource.project_author() == Some(user);

    if is_author || is_project_author {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Like [`authorize`], mapping `Deny` to the matching error.
/// Anonymous writers get `Unauthenticated`, others `Forbidden`.
pub fn ensure_allowed(
    actor: Actor,
    action: Action,
    resource: &Resource<'_>,
) -> Result<(), DomainError> {
    match authorize(actor, action, resource) {
        Decision::Allow => Ok(()),
        Decision::Deny if actor == Actor::Anonymous => Err(DomainError::unauthenticated(
            "Authentication credentials were not provided",
        )),
        Decision::Deny => Err(DomainError::forbidden(format!(
            "You do not have permission to {} this {}",
            action.as_str(),
            resource.kind()
        ))),
    }
}
