//! Authorization domain: actors, actions, resources and the write policy

mod policy;

pub use policy::{authorize, ensure_allowed, Action, Actor, Decision, Resource};
