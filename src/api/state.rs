//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::services::ResourceLifecycleManager;
use crate::infrastructure::storage::Repositories;
use crate::infrastructure::user::{Argon2Hasher, UserService};

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: ResourceLifecycleManager,
    pub user_service: UserService,
    pub jwt_service: Arc<dyn JwtGenerator>,
    pub repositories: Repositories,
}

impl AppState {
    /// Wire services over a repository bundle
    pub fn new(repositories: Repositories, jwt_service: Arc<dyn JwtGenerator>) -> Self {
        let user_service =
            UserService::new(repositories.users.clone(), Arc::new(Argon2Hasher::new()));

        Self {
            lifecycle: ResourceLifecycleManager::new(repositories.clone()),
            user_service,
            jwt_service,
            repositories,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("repositories", &self.repositories)
            .field("jwt_service", &self.jwt_service)
            .finish_non_exhaustive()
    }
}
