//! Export request state
//!
//! This module holds everything the export form needs between screen open
//! and submit: the request state and its reducer, the option lists derived
//! from the operational modules, the wire payload, and the submission
//! guard.
//!
//! # Example
//!
//! ```ignore
//! use rx_core::request::{applicable_options, request_body, ExportAction, ExportRequest};
//!
//! let state = ExportRequest::new()
//!     .reduce(ExportAction::ReportType(ReportType::Enrolment))
//!     .reduce(ExportAction::SubjectType(Some("Patient".into())));
//! let options = applicable_options(&modules, &state);
//! let body = request_body(&state);
//! ```

mod body;
mod dates;
mod options;
mod state;
mod validation;

pub use body::{request_body, RequestBody};
pub use dates::{parse_date, utc_midnight, DateField, DateInput, INVALID_DATE_MESSAGE};
pub use options::{applicable_options, ApplicableOptions};
pub use state::{ExportAction, ExportRequest};
pub use validation::{validate_address_level_ids, Blocker, SubmissionCheck};
