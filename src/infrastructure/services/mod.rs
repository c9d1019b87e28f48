//! Infrastructure services

mod lifecycle;
mod membership_ledger;

pub use lifecycle::{
    CreateCommentRequest, CreateIssueRequest, CreateProjectRequest, Deletion,
    ResourceLifecycleManager, UpdateCommentRequest, UpdateIssueRequest, UpdateProjectRequest,
};
pub use membership_ledger::MembershipLedger;

pub(crate) use lifecycle::enforce;
