//! wrapperaudit core library.
//!
//! This crate audits a Gradle wrapper properties file: it parses the
//! document, checks repeated keys for consistency, and applies a
//! configurable policy of direct checks (required keys, URL shape, boolean
//! flags, timeout bounds, pinned values).

pub mod checks;
pub mod errors;
pub mod policy;
pub mod properties;
pub mod report;

// Re-exports for convenience.
pub use checks::{CheckId, CheckOutcome, CheckStatus, WrapperAuditor};
pub use policy::AuditPolicy;
pub use properties::{ConflictRecord, ConsistencyChecker, PropertyMap};
pub use report::AuditReport;
