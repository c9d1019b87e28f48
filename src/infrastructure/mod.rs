//! Infrastructure layer - storage, identity and observability implementations

pub mod auth;
pub mod logging;
pub mod observability;
pub mod services;
pub mod storage;
pub mod user;
