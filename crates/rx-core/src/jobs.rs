//! Export job status models

use crate::types::{EncounterTypeId, JobId, ProgramId, SubjectTypeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an export job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Starting,
    Started,
    Stopping,
    Stopped,
    Completed,
    Failed,
    Abandoned,
    #[serde(other)]
    Unknown,
}

impl JobState {
    /// Whether the job will not change state again
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Abandoned | JobState::Stopped
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Starting => "STARTING",
            JobState::Started => "STARTED",
            JobState::Stopping => "STOPPING",
            JobState::Stopped => "STOPPED",
            JobState::Completed => "COMPLETED",
            JobState::Failed => "FAILED",
            JobState::Abandoned => "ABANDONED",
            JobState::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

/// One export job as reported by the status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub uuid: JobId,
    pub status: JobState,
    #[serde(default)]
    pub report_type: Option<String>,
    #[serde(rename = "subjectTypeUUID", default)]
    pub subject_type_uuid: Option<SubjectTypeId>,
    #[serde(rename = "programUUID", default)]
    pub program_uuid: Option<ProgramId>,
    #[serde(rename = "encounterTypeUUID", default)]
    pub encounter_type_uuid: Option<EncounterTypeId>,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exit_message: Option<String>,
}

impl JobStatus {
    /// Time the job ran for, when it has both ends
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.end_time? - self.start_time?)
    }
}

/// A page of job statuses, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusPage {
    #[serde(default)]
    pub content: Vec<JobStatus>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
}

impl JobStatusPage {
    pub fn is_last(&self) -> bool {
        self.number.saturating_add(1) >= self.total_pages
    }

    /// Jobs still queued or running
    pub fn in_progress(&self) -> impl Iterator<Item = &JobStatus> {
        self.content.iter().filter(|j| !j.status.is_finished())
    }
}
