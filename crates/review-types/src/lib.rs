//! Shared data model for the compliance review pipeline
//!
//! These types cross every boundary in the workspace: the LLM response is
//! decoded into them, the report formatter renders them, and the HTTP
//! endpoint returns them verbatim.

pub mod senders;
pub mod types;

pub use senders::AllowList;
pub use types::{
    Category, ComplianceIssue, ComplianceReport, ReviewPayload, Severity, ThreadContext,
};
