//! Identity store services
//!
//! Registration, credential checks and self-service account management on
//! top of the `users` repository.

mod password;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use service::{RegisterUserRequest, UpdateUserRequest, UserService};
