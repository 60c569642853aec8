//! rx-client - Server access for rx-export
//!
//! This crate talks to the platform server: it starts export jobs, reads
//! job statuses, and fetches the operational modules and user info the
//! export form depends on. [`Submitter`] wraps a submit with the single
//! delayed status refresh that follows a successful one.

mod api;
mod error;
mod http;
mod submitter;

pub use api::ExportApi;
pub use error::{ClientError, Result};
pub use http::HttpExportApi;
pub use submitter::{ScheduledRefresh, Submitter};
