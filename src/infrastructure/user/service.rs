//! User service for registration, authentication and account management

use std::sync::Arc;

use tracing::info;

use crate::domain::user::{
    validate_age, validate_email, validate_password, validate_username, NewUser, User, UserId,
    UserRepository,
};
use crate::domain::{Action, Actor, DomainError, Resource};
use crate::infrastructure::services::{enforce, Deletion};

use super::password::PasswordHasher;

/// Request for registering a new account
#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub age: Option<u32>,
    pub can_be_contacted: bool,
    pub can_data_be_shared: bool,
}

/// Request for updating one's own account.
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub email: Option<Option<String>>,
    pub age: Option<Option<u32>>,
    pub can_be_contacted: Option<bool>,
    pub can_data_be_shared: Option<bool>,
}

/// User service for authentication and management
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new account
    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError> {
        validate_username(&request.username)?;
        validate_password(&request.password)?;
        if let Some(ref email) = request.email {
            validate_email(email)?;
        }
        validate_age(request.age)?;

        if self
            .repository
            .get_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                request.username
            )));
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let user = self
            .repository
            .create(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                age: request.age,
                can_be_contacted: request.can_be_contacted,
                can_data_be_shared: request.can_data_be_shared,
            })
            .await?;
        info!(user_id = %user.id(), username = %user.username(), "User registered");

        Ok(user)
    }

    /// Check credentials. Unknown usernames and wrong passwords both yield `None`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let Some(user) = self.repository.get_by_username(username).await? else {
            self.hasher.verify_absent(password);
            return Ok(None);
        };

        if !self.hasher.verify(password, user.password_hash()) {
            return Ok(None);
        }

        Ok(Some(user))
    }

    pub async fn get(&self, id: UserId) -> Result<User, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }

    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.repository.list().await
    }

    /// Update an account; only its owner may do so
    pub async fn update(
        &self,
        actor: Actor,
        id: UserId,
        request: UpdateUserRequest,
    ) -> Result<User, DomainError> {
        let mut user = self.get(id).await?;
        enforce(actor, Action::Update, &Resource::Account(id))?;

        if let Some(password) = request.password {
            validate_password(&password)?;
            user.set_password_hash(self.hasher.hash(&password)?);
        }
        if let Some(email) = request.email {
            user.set_email(email)?;
        }
        if let Some(age) = request.age {
            user.set_age(age)?;
        }
        if let Some(value) = request.can_be_contacted {
            user.set_can_be_contacted(value);
        }
        if let Some(value) = request.can_data_be_shared {
            user.set_can_data_be_shared(value);
        }

        let user = self.repository.update(&user).await?;
        info!(user_id = %id, "User updated");

        Ok(user)
    }

    /// Delete an account together with everything it authored
    pub async fn delete(&self, actor: Actor, id: UserId) -> Result<Deletion<UserId>, DomainError> {
        self.get(id).await?;
        enforce(actor, Action::Delete, &Resource::Account(id))?;

        if !self.repository.delete(id).await? {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }
        info!(user_id = %id, "User deleted");

        Ok(Deletion::of(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::storage::Repositories;
    use crate::infrastructure::user::password::Argon2Hasher;

    fn service() -> UserService {
        UserService::new(Repositories::in_memory().users, Arc::new(Argon2Hasher::new()))
    }

    fn register(username: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            password: "password123".to_string(),
            email: Some(format!("{}@example.com", username)),
            age: Some(30),
            can_be_contacted: false,
            can_data_be_shared: false,
        }
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let service = service();

        let user = service.register(register("alice")).await.unwrap();
        assert_eq!(user.username(), "alice");
        assert_ne!(user.password_hash(), "password123");

        let found = service.authenticate("alice", "password123").await.unwrap();
        assert_eq!(found.map(|u| u.id()), Some(user.id()));

        assert!(service.authenticate("alice", "wrong").await.unwrap().is_none());
        assert!(service.authenticate("nobody", "password123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let service = service();
        service.register(register("alice")).await.unwrap();

        let err = service.register(register("alice")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_register_underage_rejected() {
        let mut repository = MockUserRepository::new();
        repository.expect_create().never();
        let service = UserService::new(Arc::new(repository), Arc::new(Argon2Hasher::new()));

        let err = service
            .register(RegisterUserRequest {
                age: Some(14),
                ..register("young")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_register_short_password_rejected() {
        let err = service()
            .register(RegisterUserRequest {
                password: "short".to_string(),
                ..register("alice")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_only_by_owner() {
        let service = service();
        let alice = service.register(register("alice")).await.unwrap();
        let bob = service.register(register("bob")).await.unwrap();

        let err = service
            .update(
                Actor::User(bob.id()),
                alice.id(),
                UpdateUserRequest {
                    can_be_contacted: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));

        let updated = service
            .update(
                Actor::User(alice.id()),
                alice.id(),
                UpdateUserRequest {
                    email: Some(None),
                    can_be_contacted: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.can_be_contacted());
        assert!(updated.email().is_none());
    }

    #[tokio::test]
    async fn test_update_age_below_minimum() {
        let service = service();
        let alice = service.register(register("alice")).await.unwrap();

        let err = service
            .update(
                Actor::User(alice.id()),
                alice.id(),
                UpdateUserRequest {
                    age: Some(Some(12)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(service.get(alice.id()).await.unwrap().age(), Some(30));
    }

    #[tokio::test]
    async fn test_password_change_takes_effect() {
        let service = service();
        let alice = service.register(register("alice")).await.unwrap();

        service
            .update(
                Actor::User(alice.id()),
                alice.id(),
                UpdateUserRequest {
                    password: Some("new-password".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(service.authenticate("alice", "password123").await.unwrap().is_none());
        assert!(service.authenticate("alice", "new-password").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_self_only() {
        let service = service();
        let alice = service.register(register("alice")).await.unwrap();

        let err = service.delete(Actor::Anonymous, alice.id()).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated { .. }));

        let deletion = service.delete(Actor::User(alice.id()), alice.id()).await.unwrap();
        assert_eq!(deletion, Deletion::of(alice.id()));

        let err = service.get(alice.id()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_account_writes_record_authorization_decisions() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = metrics::set_default_local_recorder(&recorder);

        let service = service();
        let alice = service.register(register("alice")).await.unwrap();
        let bob = service.register(register("bob")).await.unwrap();

        let err = service
            .delete(Actor::User(bob.id()), alice.id())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));

        service
            .update(
                Actor::User(alice.id()),
                alice.id(),
                UpdateUserRequest {
                    can_be_contacted: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let rendered = handle.render();
        let decisions: Vec<&str> = rendered
            .lines()
            .filter(|line| line.starts_with("authorization_decisions_total{"))
            .collect();
        assert!(decisions.iter().any(|line| line.contains(r#"resource="account""#)
            && line.contains(r#"action="delete""#)
            && line.contains(r#"decision="deny""#)));
        assert!(decisions.iter().any(|line| line.contains(r#"resource="account""#)
            && line.contains(r#"action="update""#)
            && line.contains(r#"decision="allow""#)));
    }
}
