//! Domain types for the AutoML job gateway.
//!
//! Zero internal dependencies: the job record, its lifecycle state machine,
//! submission validation, and the shared error type live here so the store,
//! the worker client, and the HTTP layer all agree on them.

pub mod error;
pub mod job;
pub mod submission;
pub mod types;
