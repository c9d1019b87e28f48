//! Contributor domain module
//!
//! A contributor is the unit of "who may act within a project".

mod entity;
mod repository;

pub use entity::{Contributor, ContributorId};
pub use repository::ContributorRepository;

#[cfg(test)]
pub use repository::MockContributorRepository;
