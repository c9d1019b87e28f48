//! Membership ledger - who contributes to which project

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::contributor::{Contributor, ContributorRepository};
use crate::domain::project::ProjectId;
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::observability::record_membership_change;

/// Records which users are contributors of which projects.
///
/// Duplicate detection is left to the repository's uniqueness constraint;
/// the ledger never checks before inserting.
#[derive(Clone)]
pub struct MembershipLedger {
    contributors: Arc<dyn ContributorRepository>,
}

impl std::fmt::Debug for MembershipLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipLedger").finish_non_exhaustive()
    }
}

impl MembershipLedger {
    pub fn new(contributors: Arc<dyn ContributorRepository>) -> Self {
        Self { contributors }
    }

    /// Make `user` a contributor of `project`
    pub async fn add(&self, user: UserId, project: ProjectId) -> Result<Contributor, DomainError> {
        match self.contributors.insert(user, project).await {
            Ok(contributor) => {
                record_membership_change("add", "added");
                info!(
                    user_id = %user,
                    project_id = %project,
                    contributor_id = %contributor.id(),
                    "Contributor added"
                );
                Ok(contributor)
            }
            Err(e) => {
                let outcome = match e {
                    DomainError::DuplicateMembership { .. } => "duplicate",
                    DomainError::NotFound { .. } => "not_found",
                    _ => "error",
                };
                record_membership_change("add", outcome);
                debug!(user_id = %user, project_id = %project, outcome, "Contributor not added");
                Err(e)
            }
        }
    }

    /// Remove `user` from `project`; returns whether a row was removed
    pub async fn remove(&self, user: UserId, project: ProjectId) -> Result<bool, DomainError> {
        let removed = self.contributors.delete(user, project).await?;

        record_membership_change("remove", if removed { "removed" } else { "absent" });
        if removed {
            info!(user_id = %user, project_id = %project, "Contributor removed");
        }

        Ok(removed)
    }

    pub async fn is_member(&self, user: UserId, project: ProjectId) -> Result<bool, DomainError> {
        Ok(self.membership(user, project).await?.is_some())
    }

    /// The membership record of `user` in `project`, if any
    pub async fn membership(
        &self,
        user: UserId,
        project: ProjectId,
    ) -> Result<Option<Contributor>, DomainError> {
        self.contributors.find(user, project).await
    }

    /// Users contributing to `project`
    pub async fn list_members(&self, project: ProjectId) -> Result<Vec<UserId>, DomainError> {
        let contributors = self.contributors.list_by_project(project).await?;
        Ok(contributors.iter().map(|c| c.user()).collect())
    }

    /// Membership records of `project`
    pub async fn list_contributors(
        &self,
        project: ProjectId,
    ) -> Result<Vec<Contributor>, DomainError> {
        self.contributors.list_by_project(project).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contributor::{ContributorId, MockContributorRepository};
    use crate::infrastructure::storage::Repositories;
    use mockall::predicate::eq;

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);
    const WEBSITE: ProjectId = ProjectId::new(1);

    #[tokio::test]
    async fn test_add_delegates_duplicate_detection_to_store() {
        let mut repo = MockContributorRepository::new();
        repo.expect_find().never();
        repo.expect_insert()
            .with(eq(BOB), eq(WEBSITE))
            .times(1)
            .returning(|_, _| Err(DomainError::duplicate_membership("already a member")));

        let ledger = MembershipLedger::new(Arc::new(repo));
        let err = ledger.add(BOB, WEBSITE).await.unwrap_err();

        assert!(matches!(err, DomainError::DuplicateMembership { .. }));
    }

    #[tokio::test]
    async fn test_add_returns_new_row() {
        let mut repo = MockContributorRepository::new();
        repo.expect_insert()
            .returning(|user, project| Ok(Contributor::create(ContributorId::new(5), user, project)));

        let ledger = MembershipLedger::new(Arc::new(repo));
        let contributor = ledger.add(BOB, WEBSITE).await.unwrap();

        assert_eq!(contributor.id(), ContributorId::new(5));
        assert_eq!(contributor.user(), BOB);
    }

    #[tokio::test]
    async fn test_list_members_maps_to_users() {
        let mut repo = MockContributorRepository::new();
        repo.expect_list_by_project().with(eq(WEBSITE)).returning(|project| {
            Ok(vec![
                Contributor::create(ContributorId::new(1), ALICE, project),
                Contributor::create(ContributorId::new(2), BOB, project),
            ])
        });

        let ledger = MembershipLedger::new(Arc::new(repo));

        assert_eq!(ledger.list_members(WEBSITE).await.unwrap(), vec![ALICE, BOB]);
    }

    #[tokio::test]
    async fn test_is_member_against_store() {
        let repos = Repositories::in_memory();
        let ledger = MembershipLedger::new(repos.contributors.clone());
        let alice = repos
            .users
            .create(crate::domain::user::NewUser {
                username: "alice".to_string(),
                email: None,
                password_hash: "hash".to_string(),
                age: None,
                can_be_contacted: false,
                can_data_be_shared: false,
            })
            .await
            .unwrap();
        let (project, _) = repos
            .projects
            .create_with_author(
                crate::domain::project::NewProject::new(
                    "Website",
                    "Site",
                    crate::domain::project::ProjectType::Frontend,
                    alice.id(),
                )
                .unwrap(),
            )
            .await
            .unwrap();

        assert!(ledger.is_member(alice.id(), project.id()).await.unwrap());
        assert!(!ledger.is_member(BOB, project.id()).await.unwrap());

        assert!(ledger.remove(alice.id(), project.id()).await.unwrap());
        assert!(!ledger.remove(alice.id(), project.id()).await.unwrap());
        assert!(!ledger.is_member(alice.id(), project.id()).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_adds_yield_one_membership() {
        let repos = Repositories::in_memory();
        let ledger = MembershipLedger::new(repos.contributors.clone());
        let mut users = Vec::new();
        for name in ["alice", "bob"] {
            users.push(
                repos
                    .users
                    .create(crate::domain::user::NewUser {
                        username: name.to_string(),
                        email: None,
                        password_hash: "hash".to_string(),
                        age: None,
                        can_be_contacted: false,
                        can_data_be_shared: false,
                    })
                    .await
                    .unwrap(),
            );
        }
        let (project, _) = repos
            .projects
            .create_with_author(
                crate::domain::project::NewProject::new(
                    "Website",
                    "Site",
                    crate::domain::project::ProjectType::Frontend,
                    users[0].id(),
                )
                .unwrap(),
            )
            .await
            .unwrap();
        let bob = users[1].id();
        let project_id = project.id();

        let first = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.add(bob, project_id).await }
        });
        let second = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.add(bob, project_id).await }
        });
        let results = [first.await.unwrap(), second.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(DomainError::DuplicateMembership { .. })))
                .count(),
            1
        );
        assert_eq!(
            ledger.list_members(project_id).await.unwrap(),
            vec![users[0].id(), bob]
        );
    }
}
