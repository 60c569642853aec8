//! Export submission with a one-shot status refresh

use crate::api::ExportApi;
use crate::error::{ClientError, Result};
use rx_core::jobs::JobStatusPage;
use rx_core::request::{request_body, ExportRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Submits export requests and schedules the follow-up status refresh
pub struct Submitter<A: ExportApi> {
    api: Arc<A>,
    refresh_delay: Duration,
}

impl<A: ExportApi> Submitter<A> {
    pub fn new(api: A, refresh_delay: Duration) -> Self {
        Self::with_shared(Arc::new(api), refresh_delay)
    }

    /// Create a submitter over an API that is also used elsewhere
    pub fn with_shared(api: Arc<A>, refresh_delay: Duration) -> Self {
        Self { api, refresh_delay }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Send the request's payload to the server
    ///
    /// A failure is returned as-is and nothing is retried. On success a
    /// single refresh of status page 0 is scheduled after the configured
    /// delay. The request is only read, never modified.
    pub async fn submit(&self, request: &ExportRequest) -> Result<ScheduledRefresh> {
        let body = request_body(request);
        if let Err(err) = self.api.start_export_job(&body).await {
            warn!("Export submission failed: {}", err);
            return Err(err);
        }
        info!("Export submitted, refreshing statuses in {:?}", self.refresh_delay);
        Ok(self.schedule_refresh())
    }

    fn schedule_refresh(&self) -> ScheduledRefresh {
        let api = Arc::clone(&self.api);
        let delay = self.refresh_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!("Refreshing export job statuses");
            api.fetch_job_statuses(0).await
        });
        ScheduledRefresh { handle }
    }
}

/// The pending status refresh started by a successful submit
///
/// Dropping it leaves the refresh running in the background.
#[derive(Debug)]
pub struct ScheduledRefresh {
    handle: JoinHandle<Result<JobStatusPage>>,
}

impl ScheduledRefresh {
    /// Wait for the refresh and return the first status page
    pub async fn wait(self) -> Result<JobStatusPage> {
        self.handle
            .await
            .map_err(|e| ClientError::Refresh(e.to_string()))?
    }

    /// Stop the refresh if it has not run yet
    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rx_core::modules::RawOperationalModules;
    use rx_core::request::{ExportAction, RequestBody};
    use rx_core::types::ReportType;
    use rx_core::user::UserInfo;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Default)]
    struct FakeApi {
        fail_with: Option<u16>,
        submitted: Mutex<Vec<RequestBody>>,
        status_fetches: AtomicUsize,
    }

    impl ExportApi for FakeApi {
        async fn start_export_job(&self, body: &RequestBody) -> Result<()> {
            self.submitted.lock().unwrap().push(body.clone());
            match self.fail_with {
                Some(status) => Err(ClientError::Server {
                    status,
                    message: "export failed".to_string(),
                }),
                None => Ok(()),
            }
        }

        async fn fetch_job_statuses(&self, page: u32) -> Result<JobStatusPage> {
            self.status_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(JobStatusPage {
                number: page,
                total_pages: 1,
                ..JobStatusPage::default()
            })
        }

        async fn fetch_operational_modules(&self) -> Result<RawOperationalModules> {
            Ok(RawOperationalModules::default())
        }

        async fn fetch_user_info(&self) -> Result<UserInfo> {
            Ok(UserInfo::default())
        }
    }

    fn registration() -> ExportRequest {
        ExportRequest::new().reduce_all([
            ExportAction::ReportType(ReportType::Registration),
            ExportAction::SubjectType(Some("Patient".into())),
            ExportAction::Program(Some("TB".into())),
        ])
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_schedules_one_refresh_after_delay() {
        let delay = Duration::from_millis(1000);
        let submitter = Submitter::new(FakeApi::default(), delay);
        let started = Instant::now();

        let refresh = submitter.submit(&registration()).await.unwrap();
        assert_eq!(submitter.api().status_fetches.load(Ordering::SeqCst), 0);

        let page = refresh.wait().await.unwrap();
        assert_eq!(page.number, 0);
        assert!(started.elapsed() >= delay);
        assert_eq!(submitter.api().status_fetches.load(Ordering::SeqCst), 1);

        tokio::time::sleep(delay * 5).await;
        assert_eq!(submitter.api().status_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submitted_body_matches_request() {
        let submitter = Submitter::new(FakeApi::default(), Duration::from_millis(10));
        submitter.submit(&registration()).await.unwrap().cancel();

        let submitted = submitter.api().submitted.lock().unwrap().clone();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].report_type, Some(ReportType::Registration));
        assert_eq!(submitted[0].program, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_returns_error_without_refresh_or_retry() {
        let api = FakeApi {
            fail_with: Some(500),
            ..FakeApi::default()
        };
        let delay = Duration::from_millis(1000);
        let submitter = Submitter::new(api, delay);
        let request = registration();
        let before = request.clone();

        let err = submitter.submit(&request).await.unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 500, .. }));
        assert_eq!(request, before);

        tokio::time::sleep(delay * 3).await;
        assert_eq!(submitter.api().status_fetches.load(Ordering::SeqCst), 0);
        assert_eq!(submitter.api().submitted.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_refresh_never_runs() {
        let delay = Duration::from_millis(500);
        let submitter = Submitter::new(FakeApi::default(), delay);
        let refresh = submitter.submit(&registration()).await.unwrap();
        assert!(!refresh.is_finished());
        refresh.cancel();

        tokio::time::sleep(delay * 2).await;
        assert_eq!(submitter.api().status_fetches.load(Ordering::SeqCst), 0);
    }
}
