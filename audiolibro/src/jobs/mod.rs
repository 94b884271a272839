//! Background conversion jobs.
//!
//! A [`Dispatcher`] registers each request in the [`JobRegistry`] and spawns a
//! conversion worker that narrates the chapters and publishes progress.

mod dispatcher;
mod registry;
mod types;
mod worker;

pub use dispatcher::Dispatcher;
pub use registry::JobRegistry;
pub use types::{JobId, JobRecord, JobStatus};
pub use worker::{BackoffPolicy, ConversionRequest, MIN_NARRATABLE_CHARS};

