//! The client-facing entry point wrapping the admission pipeline.

mod error;
mod submission;

pub use error::ServiceError;
pub use submission::OrderSubmissionService;
