//! Server operations the export flow needs

use crate::error::Result;
use rx_core::jobs::JobStatusPage;
use rx_core::modules::RawOperationalModules;
use rx_core::request::RequestBody;
use rx_core::user::UserInfo;
use std::future::Future;

/// Trait for export backends
///
/// Implemented over HTTP by [`crate::HttpExportApi`]; tests substitute an
/// in-memory double.
pub trait ExportApi: Send + Sync + 'static {
    /// Start an export job; success means the server accepted it
    fn start_export_job(&self, body: &RequestBody) -> impl Future<Output = Result<()>> + Send;

    /// Fetch one page of export job statuses
    fn fetch_job_statuses(&self, page: u32) -> impl Future<Output = Result<JobStatusPage>> + Send;

    /// Fetch the organisation's operational modules
    fn fetch_operational_modules(
        &self,
    ) -> impl Future<Output = Result<RawOperationalModules>> + Send;

    /// Fetch the signed-in user
    fn fetch_user_info(&self) -> impl Future<Output = Result<UserInfo>> + Send;
}
