//! Contributor entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::project::ProjectId;
use crate::domain::user::UserId;

/// Contributor identifier assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributorId(i64);

impl ContributorId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ContributorId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ContributorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Membership record binding one user to one project.
/// A (user, project) pair exists at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contributor {
    id: ContributorId,
    user: UserId,
    project: ProjectId,
    created_time: DateTime<Utc>,
}

impl Contributor {
    pub fn create(id: ContributorId, user: UserId, project: ProjectId) -> Self {
        Self::from_parts(id, user, project, Utc::now())
    }

    pub fn from_parts(
        id: ContributorId,
        user: UserId,
        project: ProjectId,
        created_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user,
            project,
            created_time,
        }
    }

    pub fn id(&self) -> ContributorId {
        self.id
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn created_time(&self) -> DateTime<Utc> {
        self.created_time
    }
}
