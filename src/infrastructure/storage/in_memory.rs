//! In-memory store
//!
//! Every table lives behind one lock, so multi-row writes (a project with
//! its author's membership, cascading deletes) are atomic the same way a
//! database transaction is. Data is lost when the process terminates.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::comment::{Comment, CommentId, CommentRepository, NewComment};
use crate::domain::contributor::{Contributor, ContributorId, ContributorRepository};
use crate::domain::issue::{Issue, IssueId, IssueParts, IssueRepository, NewIssue};
use crate::domain::project::{NewProject, Project, ProjectId, ProjectRepository};
use crate::domain::user::{NewUser, User, UserId, UserRepository, MIN_USER_AGE};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Sequences {
    user: i64,
    project: i64,
    contributor: i64,
    issue: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    projects: BTreeMap<ProjectId, Project>,
    contributors: BTreeMap<ContributorId, Contributor>,
    /// Unique (user, project) index over `contributors`
    memberships: HashMap<(UserId, ProjectId), ContributorId>,
    issues: BTreeMap<IssueId, Issue>,
    /// Kept in insertion order
    comments: Vec<Comment>,
    sequences: Sequences,
}

impl Tables {
    fn require_user(&self, id: UserId) -> Result<(), DomainError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(DomainError::not_found("Referenced user does not exist"))
        }
    }

    fn require_project(&self, id: ProjectId) -> Result<(), DomainError> {
        if self.projects.contains_key(&id) {
            Ok(())
        } else {
            Err(DomainError::not_found("Referenced project does not exist"))
        }
    }

    fn insert_membership(
        &mut self,
        user: UserId,
        project: ProjectId,
    ) -> Result<Contributor, DomainError> {
        use std::collections::hash_map::Entry;

        match self.memberships.entry((user, project)) {
            Entry::Occupied(_) => Err(DomainError::duplicate_membership(
                "This user is already a contributor of the project",
            )),
            Entry::Vacant(slot) => {
                let id = ContributorId::new(next(&mut self.sequences.contributor));
                let contributor = Contributor::create(id, user, project);
                slot.insert(id);
                self.contributors.insert(id, contributor.clone());
                Ok(contributor)
            }
        }
    }

    fn remove_comments_where(&mut self, predicate: impl Fn(&Comment) -> bool) {
        self.comments.retain(|c| !predicate(c));
    }

    fn remove_contributor_row(&mut self, id: ContributorId) -> bool {
        let Some(contributor) = self.contributors.remove(&id) else {
            return false;
        };

        self.memberships
            .remove(&(contributor.user(), contributor.project()));
        self.remove_comments_where(|c| c.author() == id);
        true
    }

    fn remove_issue(&mut self, id: IssueId) -> bool {
        if self.issues.remove(&id).is_none() {
            return false;
        }

        self.remove_comments_where(|c| c.issue() == id);
        true
    }

    fn remove_project(&mut self, id: ProjectId) -> bool {
        if self.projects.remove(&id).is_none() {
            return false;
        }

        let issues: Vec<IssueId> = self
            .issues
            .values()
            .filter(|i| i.project() == id)
            .map(|i| i.id())
            .collect();
        for issue in issues {
            self.remove_issue(issue);
        }

        let contributors: Vec<ContributorId> = self
            .contributors
            .values()
            .filter(|c| c.project() == id)
            .map(|c| c.id())
            .collect();
        for contributor in contributors {
            self.remove_contributor_row(contributor);
        }

        true
    }

    fn remove_user(&mut self, id: UserId) -> bool {
        if self.users.remove(&id).is_none() {
            return false;
        }

        let projects: Vec<ProjectId> = self
            .projects
            .values()
            .filter(|p| p.author() == id)
            .map(|p| p.id())
            .collect();
        for project in projects {
            self.remove_project(project);
        }

        let issues: Vec<IssueId> = self
            .issues
            .values()
            .filter(|i| i.author() == id)
            .map(|i| i.id())
            .collect();
        for issue in issues {
            self.remove_issue(issue);
        }

        let contributors: Vec<ContributorId> = self
            .contributors
            .values()
            .filter(|c| c.user() == id)
            .map(|c| c.id())
            .collect();
        for contributor in contributors {
            self.remove_contributor_row(contributor);
        }

        for issue in self.issues.values_mut() {
            if issue.assignee() == Some(id) {
                issue.set_assignee(None);
            }
        }

        true
    }
}

/// Reject ages the entity layer would have refused
fn check_age(age: Option<u32>) -> Result<(), DomainError> {
    match age {
        Some(age) if age < MIN_USER_AGE => Err(DomainError::validation(format!(
            "Users must be at least {} years old",
            MIN_USER_AGE
        ))),
        _ => Ok(()),
    }
}

/// Thread-safe store implementing every repository trait
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username() == username)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        check_age(user.age)?;

        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username() == user.username) {
            return Err(DomainError::conflict(
                "A user with that username already exists",
            ));
        }

        let id = UserId::new(next(&mut tables.sequences.user));
        let user = User::create(id, user);
        tables.users.insert(id, user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        check_age(user.age())?;

        let mut tables = self.tables.write().await;

        match tables.users.get_mut(&user.id()) {
            Some(stored) => {
                *stored = user.clone();
                Ok(user.clone())
            }
            None => Err(DomainError::not_found(format!("User '{}' not found", user.id()))),
        }
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        Ok(tables.remove_user(id))
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().cloned().collect())
    }

    async fn exists(&self, id: UserId) -> Result<bool, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.contains_key(&id))
    }
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn get(&self, id: ProjectId) -> Result<Option<Project>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Project>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.values().cloned().collect())
    }

    async fn create_with_author(
        &self,
        project: NewProject,
    ) -> Result<(Project, Contributor), DomainError> {
        let mut tables = self.tables.write().await;
        tables.require_user(project.author)?;

        let id = ProjectId::new(next(&mut tables.sequences.project));
        let project = Project::create(id, project);
        let contributor = tables.insert_membership(project.author(), id)?;
        tables.projects.insert(id, project.clone());

        Ok((project, contributor))
    }

    async fn update(&self, project: &Project) -> Result<Project, DomainError> {
        let mut tables = self.tables.write().await;

        match tables.projects.get_mut(&project.id()) {
            Some(stored) if stored.author() == project.author() => {
                *stored = project.clone();
                Ok(project.clone())
            }
            Some(_) => Err(DomainError::validation("The project author cannot be changed")),
            None => Err(DomainError::not_found(format!(
                "Project '{}' not found",
                project.id()
            ))),
        }
    }

    async fn delete(&self, id: ProjectId) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        Ok(tables.remove_project(id))
    }

    async fn exists(&self, id: ProjectId) -> Result<bool, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.contains_key(&id))
    }
}

#[async_trait]
impl ContributorRepository for InMemoryStore {
    async fn insert(&self, user: UserId, project: ProjectId) -> Result<Contributor, DomainError> {
        let mut tables = self.tables.write().await;
        tables.require_project(project)?;
        tables.require_user(user)?;
        tables.insert_membership(user, project)
    }

    async fn get(&self, id: ContributorId) -> Result<Option<Contributor>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.contributors.get(&id).cloned())
    }

    async fn find(
        &self,
        user: UserId,
        project: ProjectId,
    ) -> Result<Option<Contributor>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .get(&(user, project))
            .and_then(|id| tables.contributors.get(id))
            .cloned())
    }

    async fn delete(&self, user: UserId, project: ProjectId) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;

        match tables.memberships.get(&(user, project)).copied() {
            Some(id) => Ok(tables.remove_contributor_row(id)),
            None => Ok(false),
        }
    }

    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Contributor>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .contributors
            .values()
            .filter(|c| c.project() == project)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl IssueRepository for InMemoryStore {
    async fn get(&self, id: IssueId) -> Result<Option<Issue>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.issues.get(&id).cloned())
    }

    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Issue>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .issues
            .values()
            .filter(|i| i.project() == project)
            .cloned()
            .collect())
    }

    async fn create(&self, issue: NewIssue) -> Result<Issue, DomainError> {
        let mut tables = self.tables.write().await;
        tables.require_project(issue.project)?;
        tables.require_user(issue.author)?;
        if let Some(assignee) = issue.assignee {
            tables.require_user(assignee)?;
        }

        let id = IssueId::new(next(&mut tables.sequences.issue));
        let issue = Issue::create(id, issue);
        tables.issues.insert(id, issue.clone());

        Ok(issue)
    }

    async fn update(&self, issue: &Issue) -> Result<Issue, DomainError> {
        let mut tables = self.tables.write().await;
        if let Some(assignee) = issue.assignee() {
            tables.require_user(assignee)?;
        }

        let Some(stored) = tables.issues.get_mut(&issue.id()) else {
            return Err(DomainError::not_found(format!("Issue '{}' not found", issue.id())));
        };

        *stored = Issue::from_parts(IssueParts {
            id: stored.id(),
            title: issue.title().to_string(),
            description: issue.description().to_string(),
            project: stored.project(),
            author: stored.author(),
            assignee: issue.assignee(),
            priority: issue.priority(),
            tag: issue.tag(),
            status: issue.status(),
            created_time: stored.created_time(),
        });

        Ok(stored.clone())
    }

    async fn delete(&self, id: IssueId) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        Ok(tables.remove_issue(id))
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn get(&self, id: CommentId) -> Result<Option<Comment>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id() == id).cloned())
    }

    async fn list_by_issue(&self, issue: IssueId) -> Result<Vec<Comment>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.issue() == issue)
            .cloned()
            .collect())
    }

    async fn create(&self, comment: NewComment) -> Result<Comment, DomainError> {
        let mut tables = self.tables.write().await;

        if !tables.issues.contains_key(&comment.issue) {
            return Err(DomainError::not_found("Referenced issue does not exist"));
        }
        if !tables.contributors.contains_key(&comment.author) {
            return Err(DomainError::not_found("Referenced contributor does not exist"));
        }

        let comment = Comment::create(comment);
        tables.comments.push(comment.clone());

        Ok(comment)
    }

    async fn update(&self, comment: &Comment) -> Result<Comment, DomainError> {
        let mut tables = self.tables.write().await;

        match tables.comments.iter_mut().find(|c| c.id() == comment.id()) {
            Some(stored) => {
                stored.set_description(comment.description())?;
                Ok(stored.clone())
            }
            None => Err(DomainError::not_found(format!(
                "Comment '{}' not found",
                comment.id()
            ))),
        }
    }

    async fn delete(&self, id: CommentId) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id() != id);
        Ok(tables.comments.len() != before)
    }
}
