//! User domain
//!
//! Account entities, field validation, and the repository trait used as the
//! identity store.

mod entity;
mod repository;
mod validation;

pub use entity::{NewUser, User, UserId, UserParts};
pub use repository::UserRepository;
pub use validation::{
    validate_age, validate_email, validate_password, validate_username, UserValidationError,
    MIN_USER_AGE,
};

#[cfg(test)]
pub use repository::MockUserRepository;
