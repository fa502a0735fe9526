//! Data models for the RAG status application.
//!
//! Field names serialize in camelCase to match the dashboard client.

mod analytics;
mod member;
mod revision;
mod status;

pub use analytics::*;
pub use member::*;
pub use revision::*;
pub use status::*;
