//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_age, validate_email, UserValidationError};

/// User identifier assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Data required to register a user; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub age: Option<u32>,
    pub can_be_contacted: bool,
    pub can_data_be_shared: bool,
}

/// Every persisted column of a user, used by repositories to rebuild entities
#[derive(Debug, Clone)]
pub struct UserParts {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub age: Option<u32>,
    pub can_be_contacted: bool,
    pub can_data_be_shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registered account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    id: UserId,
    username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<u32>,
    can_be_contacted: bool,
    can_data_be_shared: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Materialize a freshly registered user
    pub fn create(id: UserId, new: NewUser) -> Self {
        let now = Utc::now();

        Self {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            age: new.age,
            can_be_contacted: new.can_be_contacted,
            can_data_be_shared: new.can_data_be_shared,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user from stored columns without re-validating them
    pub fn from_parts(parts: UserParts) -> Self {
        Self {
            id: parts.id,
            username: parts.username,
            email: parts.email,
            password_hash: parts.password_hash,
            age: parts.age,
            can_be_contacted: parts.can_be_contacted,
            can_data_be_shared: parts.can_data_be_shared,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn age(&self) -> Option<u32> {
        self.age
    }

    pub fn can_be_contacted(&self) -> bool {
        self.can_be_contacted
    }

    pub fn can_data_be_shared(&self) -> bool {
        self.can_data_be_shared
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    /// Update the age; ages under the minimum are rejected
    pub fn set_age(&mut self, age: Option<u32>) -> Result<(), UserValidationError> {
        validate_age(age)?;
        self.age = age;
        self.touch();
        Ok(())
    }

    /// Update the email address
    pub fn set_email(&mut self, email: Option<String>) -> Result<(), UserValidationError> {
        if let Some(ref email) = email {
            validate_email(email)?;
        }

        self.email = email;
        self.touch();
        Ok(())
    }

    pub fn set_can_be_contacted(&mut self, value: bool) {
        self.can_be_contacted = value;
        self.touch();
    }

    pub fn set_can_data_be_shared(&mut self, value: bool) {
        self.can_data_be_shared = value;
        self.touch();
    }

    /// Update the password hash
    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}
