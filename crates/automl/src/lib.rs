//! Client side of the gateway <-> AutoML core protocol.
//!
//! [`api::AutoMlApi`] forwards submitted jobs to the worker's `/process`
//! endpoint; [`messages`] holds the JSON bodies exchanged in both
//! directions, including the callbacks the worker posts back.

pub mod api;
pub mod messages;

pub use api::{AutoMlApi, AutoMlApiError, JobForwarder};
pub use messages::{CompleteJobRequest, ProcessJobRequest, UpdateStatusRequest};
