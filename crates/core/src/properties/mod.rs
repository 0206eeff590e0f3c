//! Reading `.properties` documents.
//!
//! Two independent views over the same text:
//! 1. **Consistency** -- a line-oriented scan that records every value each
//!    key was given and reports keys whose values disagree.
//! 2. **Loading** -- a `java.util.Properties`-compatible parser producing the
//!    flat map the direct checks run against (escapes, continuations, last
//!    occurrence wins).

pub mod consistency;
pub mod loader;

pub use consistency::{ConflictRecord, ConsistencyChecker, PropertyEntry};
pub use loader::PropertyMap;
